//! Chip-level effects: blocking delay and restart.

use log::warn;

use crate::app::ports::SystemPort;

/// [`SystemPort`] for the ESP32; the simulation variant only records calls
/// and never blocks.
#[derive(Debug, Default)]
pub struct EspSystem {
    #[cfg(not(target_os = "espidf"))]
    delays: Vec<u32>,
    #[cfg(not(target_os = "espidf"))]
    restarts: u32,
}

impl EspSystem {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn restarts(&self) -> u32 {
        self.restarts
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn delays(&self) -> &[u32] {
        &self.delays
    }
}

impl SystemPort for EspSystem {
    #[cfg(target_os = "espidf")]
    fn delay_ms(&mut self, ms: u32) {
        esp_idf_hal::delay::FreeRtos::delay_ms(ms);
    }

    #[cfg(not(target_os = "espidf"))]
    fn delay_ms(&mut self, ms: u32) {
        self.delays.push(ms);
    }

    #[cfg(target_os = "espidf")]
    fn restart(&mut self) {
        warn!("system: restarting");
        // SAFETY: esp_restart never returns.
        unsafe { esp_idf_svc::sys::esp_restart() };
    }

    #[cfg(not(target_os = "espidf"))]
    fn restart(&mut self) {
        warn!("system(sim): restart requested");
        self.restarts += 1;
    }
}
