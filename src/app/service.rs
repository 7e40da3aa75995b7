//! Application service: the hexagonal core.
//!
//! [`AppService`] owns the reset button state machine, the upload
//! scheduler, and the display reconciler.  All I/O flows through the port
//! traits bundled in [`Ports`], injected at each call, so the whole loop
//! runs against mock adapters on the host.
//!
//! ```text
//!   button level ──▶ ┌──────────────────────────┐ ──▶ DisplayPort
//!   now_ms       ──▶ │        AppService         │ ──▶ UploadPort
//!   WifiPort     ──▶ │ Button · Upload · Display │ ──▶ SystemPort
//!   SensorPort   ──▶ └──────────────────────────┘ ──▶ EventSink
//! ```
//!
//! One [`tick`](AppService::tick) polls, in order: button, upload
//! scheduler, display reconciler.

use log::{info, warn};

use crate::config::DeviceConfig;
use crate::display::screens::{self, ScreenContext};
use crate::display::DisplayReconciler;
use crate::drivers::button::{ButtonAction, ResetButton};
use crate::scheduler::{UploadFlag, UploadScheduler};
use crate::sensors::Reading;
use crate::wifi_state::WifiState;

use super::events::AppEvent;
use super::ports::{
    DisplayPort, EventSink, SensorPort, SystemPort, UploadPort, UploadTimerPort, WifiPort,
};

// ───────────────────────────────────────────────────────────────
// Ports bundle
// ───────────────────────────────────────────────────────────────

/// Driven adapters used on every tick.
pub struct Ports<W, D, S, U, Y> {
    pub wifi: W,
    pub display: D,
    pub sensor: S,
    pub uploader: U,
    pub system: Y,
}

/// Result of one loop iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Running,
    /// The factory reset ran and a restart was requested.  The caller must
    /// stop polling.
    Restarting,
}

/// Strings shown on the status screens, fixed at boot.
struct Identity {
    device_id: heapless::String<16>,
    ap_name: heapless::String<32>,
    server_url: heapless::String<96>,
}

impl Identity {
    fn screen(&self) -> ScreenContext<'_> {
        ScreenContext {
            ap_name: &self.ap_name,
            device_id: &self.device_id,
            server_url: &self.server_url,
        }
    }
}

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

pub struct AppService {
    button: ResetButton,
    scheduler: UploadScheduler,
    reconciler: DisplayReconciler,
    identity: Identity,
    reset_settle_ms: u32,
    upload_period_ms: u32,
}

impl AppService {
    /// Construct the service from configuration.
    ///
    /// Does **not** arm the upload timer; call [`start`](Self::start) next.
    pub fn new(config: &DeviceConfig, device_id: &str, flag: &'static UploadFlag) -> Self {
        let mut id = heapless::String::new();
        if id.push_str(device_id).is_err() {
            warn!("device id '{}' truncated", device_id);
            for c in device_id.chars() {
                if id.push(c).is_err() {
                    break;
                }
            }
        }

        Self {
            button: ResetButton::new(config.reset_hold_ms),
            scheduler: UploadScheduler::new(flag, config.upload_period_ms()),
            reconciler: DisplayReconciler::new(),
            identity: Identity {
                device_id: id,
                ap_name: config.ap_name.clone(),
                server_url: config.server_url.clone(),
            },
            reset_settle_ms: config.reset_settle_ms,
            upload_period_ms: config.upload_period_ms(),
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Arm the upload timer.  A timer failure is reported and the device
    /// keeps running without uploads.
    pub fn start(&mut self, timer: &mut impl UploadTimerPort, sink: &mut impl EventSink) {
        match self.scheduler.start(timer) {
            Ok(()) => {
                sink.emit(&AppEvent::Started {
                    upload_period_ms: self.upload_period_ms,
                });
                info!("AppService started");
            }
            Err(e) => {
                warn!("AppService: upload timer unavailable: {}", e);
                sink.emit(&AppEvent::TimerUnavailable);
            }
        }
    }

    /// Disarm the upload timer.  Safe when not started.
    pub fn stop(&mut self, timer: &mut impl UploadTimerPort) {
        self.scheduler.stop(timer);
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one loop iteration: button → upload scheduler → display.
    ///
    /// `button_active` is the debounced-by-polling pin level (pressed =
    /// `true`).  Once this returns [`TickOutcome::Restarting`] every later
    /// call is a no-op that returns it again.
    pub fn tick<W, D, S, U, Y>(
        &mut self,
        now_ms: u32,
        button_active: bool,
        ports: &mut Ports<W, D, S, U, Y>,
        sink: &mut impl EventSink,
    ) -> TickOutcome
    where
        W: WifiPort,
        D: DisplayPort,
        S: SensorPort,
        U: UploadPort,
        Y: SystemPort,
    {
        if self.button.is_resetting() {
            return TickOutcome::Restarting;
        }

        // 1. Reset button
        match self.button.poll(button_active, now_ms) {
            ButtonAction::None => {}
            ButtonAction::Pressed => {
                screens::reset_prompt(&mut ports.display);
                self.reconciler.invalidate();
                sink.emit(&AppEvent::ResetPromptShown);
            }
            ButtonAction::Released { held_ms } => {
                self.reconciler.invalidate();
                sink.emit(&AppEvent::ResetCancelled { held_ms });
            }
            ButtonAction::HoldElapsed => {
                self.factory_reset(ports, sink);
                return TickOutcome::Restarting;
            }
        }

        // 2. Upload, if the timer fired since the last tick
        let online = ports.wifi.current_state().is_connected();
        if let Some(outcome) = self.scheduler.poll(
            &mut ports.sensor,
            &mut ports.uploader,
            online,
            &self.identity.device_id,
        ) {
            sink.emit(&AppEvent::Upload(outcome));
        }

        // 3. Status screen, unless the reset prompt owns the panel
        if !self.button.is_pressed() {
            let state = ports.wifi.current_state();
            if self
                .reconciler
                .reconcile(state, &mut ports.display, &self.identity.screen())
            {
                sink.emit(&AppEvent::Redrawn(state));
            }
        }

        TickOutcome::Running
    }

    fn factory_reset<W, D, S, U, Y>(
        &mut self,
        ports: &mut Ports<W, D, S, U, Y>,
        sink: &mut impl EventSink,
    ) where
        W: WifiPort,
        D: DisplayPort,
        Y: SystemPort,
    {
        warn!("AppService: reset button held, erasing WiFi credentials");
        sink.emit(&AppEvent::FactoryReset);
        screens::resetting(&mut ports.display);
        self.reconciler.invalidate();
        ports.wifi.reset_credentials();
        ports.system.delay_ms(self.reset_settle_ms);
        ports.system.restart();
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn last_displayed(&self) -> Option<WifiState> {
        self.reconciler.last_displayed()
    }

    pub fn reading(&self) -> Reading {
        self.scheduler.reading()
    }

    pub fn is_button_pressed(&self) -> bool {
        self.button.is_pressed()
    }

    pub fn is_restarting(&self) -> bool {
        self.button.is_resetting()
    }

    pub fn device_id(&self) -> &str {
        &self.identity.device_id
    }
}
