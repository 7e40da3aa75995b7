//! Periodic upload timer using ESP-IDF's esp_timer API.
//!
//! The callback does one thing: raise the [`UploadFlag`] passed as its
//! argument.  Callbacks run in the esp_timer task (not ISR), but the
//! handler is kept ISR-grade anyway: no I/O, no blocking, no heap.
//!
//! On simulation targets the timer only records its armed period; tests
//! raise the flag by hand to stand in for a firing.

use crate::app::ports::UploadTimerPort;
use crate::error::TimerError;
use crate::scheduler::UploadFlag;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
use log::info;

#[cfg(target_os = "espidf")]
unsafe extern "C" fn upload_tick_cb(arg: *mut core::ffi::c_void) {
    // SAFETY: `arg` is the `&'static UploadFlag` handed to esp_timer_create
    // in `arm()`; it outlives every firing.
    let flag = unsafe { &*(arg as *const UploadFlag) };
    flag.raise();
}

/// esp_timer-backed [`UploadTimerPort`].
pub struct UploadTimer {
    #[cfg_attr(not(target_os = "espidf"), allow(dead_code))]
    flag: &'static UploadFlag,
    #[cfg(target_os = "espidf")]
    handle: esp_timer_handle_t,
    armed_period_ms: Option<u32>,
}

impl UploadTimer {
    pub fn new(flag: &'static UploadFlag) -> Self {
        Self {
            flag,
            #[cfg(target_os = "espidf")]
            handle: core::ptr::null_mut(),
            armed_period_ms: None,
        }
    }

    pub fn period_ms(&self) -> Option<u32> {
        self.armed_period_ms
    }

    #[cfg(target_os = "espidf")]
    fn ensure_created(&mut self) -> Result<(), TimerError> {
        if !self.handle.is_null() {
            return Ok(());
        }
        let args = esp_timer_create_args_t {
            callback: Some(upload_tick_cb),
            arg: self.flag as *const UploadFlag as *mut core::ffi::c_void,
            dispatch_method: esp_timer_dispatch_t_ESP_TIMER_TASK,
            name: b"upload\0".as_ptr() as *const _,
            skip_unhandled_events: true,
        };
        // SAFETY: `args` lives for the call; `handle` is owned by self and
        // only touched from the main task.
        let ret = unsafe { esp_timer_create(&args, &mut self.handle) };
        if ret != ESP_OK {
            self.handle = core::ptr::null_mut();
            return Err(TimerError::Create(ret));
        }
        Ok(())
    }
}

#[cfg(target_os = "espidf")]
impl UploadTimerPort for UploadTimer {
    fn arm(&mut self, period_ms: u32) -> Result<(), TimerError> {
        if period_ms == 0 {
            return Err(TimerError::ZeroPeriod);
        }
        self.ensure_created()?;
        if self.armed_period_ms.is_some() {
            self.disarm();
        }
        // SAFETY: handle was created above and is non-null.
        let ret = unsafe { esp_timer_start_periodic(self.handle, u64::from(period_ms) * 1_000) };
        if ret != ESP_OK {
            log::error!("hw_timer: upload timer start failed (rc={})", ret);
            return Err(TimerError::Start(ret));
        }
        self.armed_period_ms = Some(period_ms);
        info!("hw_timer: upload timer armed ({} ms)", period_ms);
        Ok(())
    }

    fn disarm(&mut self) {
        if self.handle.is_null() || self.armed_period_ms.is_none() {
            return;
        }
        // SAFETY: non-null handle created by ensure_created(); stopping a
        // stopped timer only returns ESP_ERR_INVALID_STATE.
        unsafe { esp_timer_stop(self.handle) };
        self.armed_period_ms = None;
        info!("hw_timer: upload timer disarmed");
    }

    fn is_armed(&self) -> bool {
        self.armed_period_ms.is_some()
    }
}

#[cfg(target_os = "espidf")]
impl Drop for UploadTimer {
    fn drop(&mut self) {
        if !self.handle.is_null() {
            // SAFETY: handle is valid and owned; stop before delete.
            unsafe {
                esp_timer_stop(self.handle);
                esp_timer_delete(self.handle);
            }
        }
    }
}

#[cfg(not(target_os = "espidf"))]
impl UploadTimerPort for UploadTimer {
    fn arm(&mut self, period_ms: u32) -> Result<(), TimerError> {
        if period_ms == 0 {
            return Err(TimerError::ZeroPeriod);
        }
        self.armed_period_ms = Some(period_ms);
        log::info!("hw_timer(sim): upload timer armed ({} ms)", period_ms);
        Ok(())
    }

    fn disarm(&mut self) {
        self.armed_period_ms = None;
    }

    fn is_armed(&self) -> bool {
        self.armed_period_ms.is_some()
    }
}
