//! Interrupt-to-task upload scheduling.
//!
//! ```text
//!   esp_timer callback            main task (AppService::tick)
//!   ──────────────────            ────────────────────────────
//!   UPLOAD_DUE.raise()  ──flag──▶ UploadScheduler::poll()
//!                                   ├─ take()   (swap → false)
//!                                   ├─ SensorCache::refresh()
//!                                   └─ UploadPort::send()
//! ```
//!
//! The timer side touches nothing but the flag.  All I/O happens in the
//! polling task, one attempt per observed flag.  A firing that lands while
//! an upload is in flight re-raises the flag and is picked up next poll.

use core::sync::atomic::{AtomicBool, Ordering};

use log::{debug, info, warn};

use crate::app::ports::{SensorPort, UploadPort, UploadTimerPort};
use crate::error::{SensorError, TimerError, UploadError};
use crate::sensors::{Reading, SensorCache};

// ═══════════════════════════════════════════════════════════════
//  Upload-due flag
// ═══════════════════════════════════════════════════════════════

/// Single boolean shared between the timer callback and the main task.
pub struct UploadFlag(AtomicBool);

impl UploadFlag {
    pub const fn new() -> Self {
        Self(AtomicBool::new(false))
    }

    /// Mark an upload as due.  Callback-safe: one atomic store.
    #[inline]
    pub fn raise(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Read-and-clear.  Returns `true` at most once per `raise`.
    #[inline]
    pub fn take(&self) -> bool {
        self.0.swap(false, Ordering::AcqRel)
    }

    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

impl Default for UploadFlag {
    fn default() -> Self {
        Self::new()
    }
}

/// The flag raised by the hardware upload timer.
pub static UPLOAD_DUE: UploadFlag = UploadFlag::new();

// ═══════════════════════════════════════════════════════════════
//  Outcome of one upload period
// ═══════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UploadOutcome {
    /// Reading taken and accepted by the server.
    Sent(Reading),
    /// Sensor read failed; nothing was transmitted.
    SensorFailed(SensorError),
    /// Reading taken but WiFi was not connected.
    Offline(Reading),
    /// Reading taken, transmission failed.
    SendFailed { reading: Reading, error: UploadError },
}

// ═══════════════════════════════════════════════════════════════
//  Scheduler
// ═══════════════════════════════════════════════════════════════

pub struct UploadScheduler {
    flag: &'static UploadFlag,
    cache: SensorCache,
    period_ms: u32,
    running: bool,
}

impl UploadScheduler {
    pub fn new(flag: &'static UploadFlag, period_ms: u32) -> Self {
        Self {
            flag,
            cache: SensorCache::new(),
            period_ms,
            running: false,
        }
    }

    /// Arm the periodic timer.
    pub fn start(&mut self, timer: &mut impl UploadTimerPort) -> Result<(), TimerError> {
        if self.period_ms == 0 {
            return Err(TimerError::ZeroPeriod);
        }
        timer.arm(self.period_ms)?;
        self.running = true;
        info!("scheduler: uploads every {} ms", self.period_ms);
        Ok(())
    }

    /// Disarm the timer and drop any pending firing.  Idempotent.
    pub fn stop(&mut self, timer: &mut impl UploadTimerPort) {
        if timer.is_armed() {
            timer.disarm();
        }
        if self.flag.take() {
            debug!("scheduler: discarded pending upload on stop");
        }
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Run one upload if the flag is raised.  Returns `None` when nothing
    /// was due.
    ///
    /// The flag is cleared before any I/O so a firing during a slow upload
    /// is not lost.
    pub fn poll(
        &mut self,
        sensor: &mut impl SensorPort,
        uploader: &mut impl UploadPort,
        online: bool,
        device_id: &str,
    ) -> Option<UploadOutcome> {
        if !self.flag.take() {
            return None;
        }

        let reading = match self.cache.refresh(sensor) {
            Ok(r) => r,
            Err(e) => {
                warn!("scheduler: skipping upload, sensor error: {}", e);
                return Some(UploadOutcome::SensorFailed(e));
            }
        };

        if !online {
            debug!("scheduler: offline, upload skipped");
            return Some(UploadOutcome::Offline(reading));
        }

        Some(match uploader.send(&reading, device_id) {
            Ok(()) => UploadOutcome::Sent(reading),
            Err(error) => {
                warn!("scheduler: upload failed: {}", error);
                UploadOutcome::SendFailed { reading, error }
            }
        })
    }

    /// Last cached reading (possibly stale; see `valid`).
    pub fn reading(&self) -> Reading {
        self.cache.reading()
    }
}
