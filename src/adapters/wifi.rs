//! WiFi lifecycle adapter.
//!
//! Implements [`WifiPort`], the hexagonal boundary for the connection
//! status and the credential reset.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: real ESP-IDF WiFi driver via `esp_idf_svc::wifi`.
//! - **all other targets**: simulation backend for host-side tests.
//!
//! ## Lifecycle
//!
//! ```text
//!  boot ──(stored creds)──▶ Connecting ──link up──▶ Connected
//!    │                        │    ▲                   │
//!    │             timeout    │    └────link down──────┘
//!    └──(no creds)──▶ ConfigMode ◀┘
//!  driver failure (any state) ──▶ Error
//!  Error ──driver answers again──▶ Connecting (stored creds) / ConfigMode
//! ```
//!
//! Transitions are computed by [`WifiLifecycle`] (pure) from link
//! observations made in [`WifiManager::poll`].  The result is published
//! into a [`WifiStatusCell`]; `current_state()` only loads that cell.
//! Entering `ConfigMode` opens the configuration access point next to the
//! station interface.  With stored credentials the station is asked to
//! rejoin once per connect timeout while the portal is up.

use log::{debug, info, warn};

use crate::app::ports::WifiPort;
use crate::error::WifiError;
use crate::wifi_state::{WifiState, WifiStatusCell};

use super::utils::is_valid_ssid;

#[cfg(target_os = "espidf")]
use esp_idf_svc::{
    eventloop::EspSystemEventLoop,
    hal::modem::Modem,
    nvs::EspDefaultNvsPartition,
    wifi::{AccessPointConfiguration, AuthMethod, ClientConfiguration, Configuration, EspWifi},
};

// ───────────────────────────────────────────────────────────────
// Pure lifecycle
// ───────────────────────────────────────────────────────────────

/// Something the driver reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkEvent {
    Boot { has_credentials: bool },
    /// Associated and an IP address is assigned.
    LinkUp,
    LinkDown,
    DriverFailed,
    /// The driver answers queries again after a failure.
    DriverRecovered { has_credentials: bool },
}

/// Hold-off between a driver coming back and the reconnect attempt.
pub const DRIVER_RETRY_MS: u32 = 5_000;

/// Connection-timeout bookkeeping plus the transition table.
#[derive(Debug)]
pub struct WifiLifecycle {
    connect_timeout_ms: u32,
    connecting_since_ms: Option<u32>,
}

impl WifiLifecycle {
    pub fn new(connect_timeout_ms: u32) -> Self {
        Self {
            connect_timeout_ms,
            connecting_since_ms: None,
        }
    }

    /// Next state after `event`.
    pub fn on_event(&mut self, current: WifiState, event: LinkEvent, now_ms: u32) -> WifiState {
        let next = match (current, event) {
            (_, LinkEvent::DriverFailed) => WifiState::Error,
            (
                _,
                LinkEvent::Boot { has_credentials: true }
                | LinkEvent::DriverRecovered { has_credentials: true },
            ) => WifiState::Connecting,
            (
                _,
                LinkEvent::Boot { has_credentials: false }
                | LinkEvent::DriverRecovered { has_credentials: false },
            ) => WifiState::ConfigMode,
            (_, LinkEvent::LinkUp) => WifiState::Connected,
            (WifiState::Connected, LinkEvent::LinkDown) => WifiState::Connecting,
            (state, LinkEvent::LinkDown) => state,
        };
        self.track(next, now_ms);
        next
    }

    /// `Some(ConfigMode)` once `Connecting` has lasted the full timeout.
    pub fn check_timeout(&mut self, current: WifiState, now_ms: u32) -> Option<WifiState> {
        self.track(current, now_ms);
        let since = self.connecting_since_ms?;
        if now_ms.wrapping_sub(since) >= self.connect_timeout_ms {
            self.connecting_since_ms = None;
            return Some(WifiState::ConfigMode);
        }
        None
    }

    fn track(&mut self, state: WifiState, now_ms: u32) {
        match state {
            WifiState::Connecting => {
                self.connecting_since_ms.get_or_insert(now_ms);
            }
            _ => self.connecting_since_ms = None,
        }
    }
}

// ───────────────────────────────────────────────────────────────
// WiFi manager
// ───────────────────────────────────────────────────────────────

pub struct WifiManager {
    cell: &'static WifiStatusCell,
    lifecycle: WifiLifecycle,
    ap_name: heapless::String<32>,
    link_up: bool,
    portal_open: bool,
    recover_since_ms: Option<u32>,
    station_retry_since_ms: Option<u32>,
    #[cfg(target_os = "espidf")]
    wifi: Box<EspWifi<'static>>,
    #[cfg(not(target_os = "espidf"))]
    sim: SimRadio,
}

/// Simulation: the radio as the tests drive it.
#[cfg(not(target_os = "espidf"))]
#[derive(Debug, Default)]
struct SimRadio {
    stored_ssid: Option<heapless::String<32>>,
    link_up: bool,
    failed: bool,
    connect_attempts: u32,
    credential_resets: u32,
}

impl WifiManager {
    #[cfg(target_os = "espidf")]
    pub fn new(
        modem: Modem,
        sysloop: EspSystemEventLoop,
        nvs: EspDefaultNvsPartition,
        cell: &'static WifiStatusCell,
        ap_name: &str,
        connect_timeout_ms: u32,
        now_ms: u32,
    ) -> Result<Self, WifiError> {
        let ap_name = checked_ap_name(ap_name)?;
        let wifi = EspWifi::new(modem, sysloop, Some(nvs)).map_err(|e| {
            warn!("WiFi: driver init failed: {}", e);
            WifiError::DriverInit
        })?;

        let mut mgr = Self {
            cell,
            lifecycle: WifiLifecycle::new(connect_timeout_ms),
            ap_name,
            link_up: false,
            portal_open: false,
            recover_since_ms: None,
            station_retry_since_ms: None,
            wifi: Box::new(wifi),
        };
        let has_credentials = mgr.has_stored_credentials();
        mgr.boot(has_credentials, now_ms);
        Ok(mgr)
    }

    /// Simulation constructor.  `stored_ssid` stands in for the
    /// credentials the driver would find in NVS.
    #[cfg(not(target_os = "espidf"))]
    pub fn new(
        cell: &'static WifiStatusCell,
        ap_name: &str,
        connect_timeout_ms: u32,
        stored_ssid: Option<&str>,
        now_ms: u32,
    ) -> Result<Self, WifiError> {
        let ap_name = checked_ap_name(ap_name)?;
        let stored_ssid = match stored_ssid {
            Some(s) if is_valid_ssid(s) => Some(bounded_ssid(s)?),
            Some(_) => return Err(WifiError::InvalidSsid),
            None => None,
        };
        let mut mgr = Self {
            cell,
            lifecycle: WifiLifecycle::new(connect_timeout_ms),
            ap_name,
            link_up: false,
            portal_open: false,
            recover_since_ms: None,
            station_retry_since_ms: None,
            sim: SimRadio { stored_ssid, ..SimRadio::default() },
        };
        let has_credentials = mgr.has_stored_credentials();
        mgr.boot(has_credentials, now_ms);
        Ok(mgr)
    }

    fn boot(&mut self, has_credentials: bool, now_ms: u32) {
        let state = self.lifecycle.on_event(
            WifiState::Connecting,
            LinkEvent::Boot { has_credentials },
            now_ms,
        );
        if state == WifiState::Connecting {
            if let Err(e) = self.platform_connect() {
                warn!("WiFi: connect failed: {}", e);
                self.apply(LinkEvent::DriverFailed, now_ms);
                return;
            }
        }
        self.publish(state);
    }

    /// Sample the driver and advance the lifecycle.  Call once per loop
    /// iteration.
    pub fn poll(&mut self, now_ms: u32) {
        let up = match self.platform_link_up() {
            Ok(up) => up,
            Err(e) => {
                self.recover_since_ms = None;
                if self.cell.load() != WifiState::Error {
                    warn!("WiFi: driver failure: {}", e);
                    self.apply(LinkEvent::DriverFailed, now_ms);
                }
                return;
            }
        };

        if up != self.link_up {
            self.link_up = up;
            self.recover_since_ms = None;
            let event = if up { LinkEvent::LinkUp } else { LinkEvent::LinkDown };
            self.apply(event, now_ms);
        } else if self.cell.load() == WifiState::Error {
            self.try_recover(now_ms);
        }

        let current = self.cell.load();
        if let Some(next) = self.lifecycle.check_timeout(current, now_ms) {
            warn!("WiFi: no connection after {} ms", self.lifecycle.connect_timeout_ms);
            self.publish(next);
        }
        self.retry_station(now_ms);
    }

    pub fn is_portal_open(&self) -> bool {
        self.portal_open
    }

    /// Leave `Error` once the driver has answered for [`DRIVER_RETRY_MS`].
    fn try_recover(&mut self, now_ms: u32) {
        let since = *self.recover_since_ms.get_or_insert(now_ms);
        if now_ms.wrapping_sub(since) < DRIVER_RETRY_MS {
            return;
        }
        self.recover_since_ms = None;
        self.portal_open = false;
        info!("WiFi: driver responding again");

        let event = if self.link_up {
            LinkEvent::LinkUp
        } else {
            LinkEvent::DriverRecovered {
                has_credentials: self.has_stored_credentials(),
            }
        };
        self.apply(event, now_ms);
        if self.cell.load() == WifiState::Connecting {
            if let Err(e) = self.platform_connect() {
                warn!("WiFi: connect failed: {}", e);
                self.apply(LinkEvent::DriverFailed, now_ms);
            }
        }
    }

    /// In `ConfigMode` with stored credentials, ask the station to rejoin
    /// once per connect timeout.  The driver does not retry on its own.
    fn retry_station(&mut self, now_ms: u32) {
        if self.cell.load() != WifiState::ConfigMode || !self.has_stored_credentials() {
            self.station_retry_since_ms = None;
            return;
        }
        let since = *self.station_retry_since_ms.get_or_insert(now_ms);
        if now_ms.wrapping_sub(since) < self.lifecycle.connect_timeout_ms {
            return;
        }
        self.station_retry_since_ms = Some(now_ms);
        if let Err(e) = self.platform_connect() {
            debug!("WiFi: station retry failed: {}", e);
        }
    }

    fn apply(&mut self, event: LinkEvent, now_ms: u32) {
        let current = self.cell.load();
        let next = self.lifecycle.on_event(current, event, now_ms);
        self.publish(next);
    }

    fn publish(&mut self, state: WifiState) {
        let previous = self.cell.publish(state);
        if previous != state {
            info!("WiFi: {} -> {}", previous, state);
        }
        if state == WifiState::ConfigMode && !self.portal_open {
            match self.platform_open_portal() {
                Ok(()) => {
                    self.portal_open = true;
                    info!("WiFi: configuration AP '{}' open", self.ap_name);
                    if self.has_stored_credentials() {
                        if let Err(e) = self.platform_connect() {
                            debug!("WiFi: station retry failed: {}", e);
                        }
                    }
                }
                Err(e) => {
                    warn!("WiFi: {}", e);
                    self.cell.publish(WifiState::Error);
                }
            }
        }
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn has_stored_credentials(&self) -> bool {
        self.stored_client().is_some()
    }

    #[cfg(not(target_os = "espidf"))]
    fn has_stored_credentials(&self) -> bool {
        self.sim.stored_ssid.is_some()
    }

    #[cfg(target_os = "espidf")]
    fn stored_client(&self) -> Option<ClientConfiguration> {
        match self.wifi.get_configuration() {
            Ok(Configuration::Client(c)) | Ok(Configuration::Mixed(c, _)) if !c.ssid.is_empty() => {
                Some(c)
            }
            _ => None,
        }
    }

    #[cfg(target_os = "espidf")]
    fn platform_connect(&mut self) -> Result<(), WifiError> {
        if let Some(client) = self.stored_client() {
            info!("WiFi: connecting to '{}'", client.ssid);
        }
        self.wifi.start().map_err(|_| WifiError::DriverInit)?;
        self.wifi.connect().map_err(|_| WifiError::DriverInit)?;
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_connect(&mut self) -> Result<(), WifiError> {
        if self.sim.failed {
            return Err(WifiError::DriverInit);
        }
        self.sim.connect_attempts += 1;
        if let Some(ssid) = &self.sim.stored_ssid {
            info!("WiFi(sim): connecting to '{}'", ssid);
        }
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn platform_link_up(&self) -> Result<bool, WifiError> {
        let associated = self.wifi.is_connected().map_err(|_| WifiError::DriverInit)?;
        let ip_up = self.wifi.sta_netif().is_up().map_err(|_| WifiError::DriverInit)?;
        Ok(associated && ip_up)
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_link_up(&self) -> Result<bool, WifiError> {
        if self.sim.failed {
            return Err(WifiError::DriverInit);
        }
        Ok(self.sim.link_up)
    }

    /// AP + STA.  The stored station config is kept so a later `connect`
    /// can still rejoin the network.
    #[cfg(target_os = "espidf")]
    fn platform_open_portal(&mut self) -> Result<(), WifiError> {
        let client = self.stored_client().unwrap_or_default();
        let ap = AccessPointConfiguration {
            ssid: self.ap_name.clone(),
            auth_method: AuthMethod::None,
            channel: 1,
            ..Default::default()
        };
        self.wifi
            .set_configuration(&Configuration::Mixed(client, ap))
            .map_err(|_| WifiError::AccessPointStart)?;
        self.wifi.start().map_err(|_| WifiError::AccessPointStart)?;
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_open_portal(&mut self) -> Result<(), WifiError> {
        if self.sim.failed {
            return Err(WifiError::AccessPointStart);
        }
        Ok(())
    }

    /// Restore the WiFi driver's NVS settings to factory defaults.
    #[cfg(target_os = "espidf")]
    fn platform_reset_credentials(&mut self) -> Result<(), WifiError> {
        let _ = self.wifi.disconnect();
        // SAFETY: plain driver call on an initialised WiFi stack, main task.
        let ret = unsafe { esp_idf_svc::sys::esp_wifi_restore() };
        if ret != esp_idf_svc::sys::ESP_OK as i32 {
            return Err(WifiError::CredentialReset);
        }
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_reset_credentials(&mut self) -> Result<(), WifiError> {
        self.sim.stored_ssid = None;
        self.sim.credential_resets += 1;
        Ok(())
    }
}

/// Simulation controls used by host tests.
#[cfg(not(target_os = "espidf"))]
impl WifiManager {
    pub fn sim_set_link(&mut self, up: bool) {
        self.sim.link_up = up;
    }

    pub fn sim_fail_driver(&mut self) {
        self.sim.failed = true;
    }

    pub fn sim_recover_driver(&mut self) {
        self.sim.failed = false;
    }

    pub fn sim_connect_attempts(&self) -> u32 {
        self.sim.connect_attempts
    }

    pub fn sim_has_stored_credentials(&self) -> bool {
        self.sim.stored_ssid.is_some()
    }

    pub fn sim_credential_resets(&self) -> u32 {
        self.sim.credential_resets
    }
}

impl WifiPort for WifiManager {
    fn current_state(&self) -> WifiState {
        self.cell.load()
    }

    fn reset_credentials(&mut self) {
        match self.platform_reset_credentials() {
            Ok(()) => info!("WiFi: stored credentials erased"),
            Err(e) => warn!("WiFi: {}", e),
        }
    }
}

fn checked_ap_name(name: &str) -> Result<heapless::String<32>, WifiError> {
    if !is_valid_ssid(name) {
        return Err(WifiError::InvalidSsid);
    }
    bounded_ssid(name)
}

fn bounded_ssid(s: &str) -> Result<heapless::String<32>, WifiError> {
    let mut out = heapless::String::new();
    out.push_str(s).map_err(|_| WifiError::InvalidSsid)?;
    Ok(out)
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
