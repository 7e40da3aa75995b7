//! Device configuration parameters
//!
//! Loaded once at boot (NVS blob, or compiled-in defaults) and treated as
//! immutable afterwards.  The server URL and AP name can be baked in at
//! build time through `CITONPHYDE_SERVER_URL` / `CITONPHYDE_AP_NAME`; an
//! override that fails validation is replaced by its built-in constant, so
//! `DeviceConfig::default()` always validates.

use log::warn;
use serde::{Deserialize, Serialize};

use crate::adapters::utils::is_valid_ssid;
use crate::app::ports::ConfigError;

/// Fallback collection server when no build-time override is given.
pub const DEFAULT_SERVER_URL: &str = "http://192.168.0.10:8000";
/// Fallback captive-portal SSID.
pub const DEFAULT_AP_NAME: &str = "Citonphyde-Setup";

/// Core device configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceConfig {
    // --- Network ---
    /// Base URL of the collection server (no trailing path).
    pub server_url: heapless::String<96>,
    /// SSID of the configuration access point.
    pub ap_name: heapless::String<32>,
    /// How long station mode may stay in Connecting before the portal opens.
    pub wifi_connect_timeout_secs: u32,
    /// HTTP client timeout for one upload (milliseconds)
    pub http_timeout_ms: u32,

    // --- Upload ---
    /// Period of the hardware upload timer (seconds)
    pub upload_interval_secs: u32,

    // --- Reset button ---
    /// Continuous hold required to trigger a factory reset (milliseconds)
    pub reset_hold_ms: u32,
    /// Pause between the credential reset and the restart (milliseconds)
    pub reset_settle_ms: u32,

    // --- Timing ---
    /// Main loop polling interval (milliseconds)
    pub loop_interval_ms: u32,
    /// Task watchdog timeout (milliseconds)
    pub watchdog_timeout_ms: u32,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self::with_network(
            option_env!("CITONPHYDE_SERVER_URL").unwrap_or(DEFAULT_SERVER_URL),
            option_env!("CITONPHYDE_AP_NAME").unwrap_or(DEFAULT_AP_NAME),
        )
    }
}

impl DeviceConfig {
    /// Built-in constants only.
    fn builtin() -> Self {
        Self {
            server_url: bounded(DEFAULT_SERVER_URL, ""),
            ap_name: bounded(DEFAULT_AP_NAME, ""),
            wifi_connect_timeout_secs: 30,
            http_timeout_ms: 5_000,

            upload_interval_secs: 60,

            reset_hold_ms: 3_000,
            reset_settle_ms: 1_000,

            loop_interval_ms: 20,
            watchdog_timeout_ms: 15_000,
        }
    }

    /// Defaults with the given server URL and AP name.  Either value is
    /// replaced by its built-in constant if it would fail [`validate`].
    ///
    /// [`validate`]: DeviceConfig::validate
    pub fn with_network(server_url: &str, ap_name: &str) -> Self {
        let builtin = Self::builtin();
        let mut cfg = builtin.clone();

        cfg.server_url = bounded(server_url, DEFAULT_SERVER_URL);
        if let Err(e) = cfg.validate() {
            warn!(
                "config: server URL '{}' rejected ({}), using {}",
                server_url, e, DEFAULT_SERVER_URL
            );
            cfg.server_url = builtin.server_url;
        }

        cfg.ap_name = bounded(ap_name, DEFAULT_AP_NAME);
        if let Err(e) = cfg.validate() {
            warn!(
                "config: AP name '{}' rejected ({}), using {}",
                ap_name, e, DEFAULT_AP_NAME
            );
            cfg.ap_name = builtin.ap_name;
        }
        cfg
    }
}

/// Copy `value` into a bounded string, falling back to `fallback` when it
/// does not fit.
fn bounded<const N: usize>(value: &str, fallback: &str) -> heapless::String<N> {
    let mut s = heapless::String::new();
    if s.push_str(value).is_err() {
        s.clear();
        let _ = s.push_str(fallback);
    }
    s
}

impl DeviceConfig {
    /// Range-check every field.
    ///
    /// The watchdog must outlast one blocking upload plus the reset settle
    /// delay, otherwise a slow server would reboot the device.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.server_url.starts_with("http://") || self.server_url.starts_with("https://")) {
            return Err(ConfigError::ValidationFailed(
                "server_url must start with http:// or https://",
            ));
        }
        if self.server_url.ends_with('/') {
            return Err(ConfigError::ValidationFailed(
                "server_url must not end with '/'",
            ));
        }
        if !is_valid_ssid(&self.ap_name) {
            return Err(ConfigError::ValidationFailed(
                "ap_name must be 1-32 printable ASCII bytes",
            ));
        }
        if !(5..=86_400).contains(&self.upload_interval_secs) {
            return Err(ConfigError::ValidationFailed(
                "upload_interval_secs must be 5-86400",
            ));
        }
        if !(500..=30_000).contains(&self.reset_hold_ms) {
            return Err(ConfigError::ValidationFailed(
                "reset_hold_ms must be 500-30000",
            ));
        }
        if self.reset_settle_ms > 10_000 {
            return Err(ConfigError::ValidationFailed(
                "reset_settle_ms must be <= 10000",
            ));
        }
        if !(1..=1_000).contains(&self.loop_interval_ms) {
            return Err(ConfigError::ValidationFailed(
                "loop_interval_ms must be 1-1000",
            ));
        }
        if !(1_000..=60_000).contains(&self.http_timeout_ms) {
            return Err(ConfigError::ValidationFailed(
                "http_timeout_ms must be 1000-60000",
            ));
        }
        if self.wifi_connect_timeout_secs == 0 {
            return Err(ConfigError::ValidationFailed(
                "wifi_connect_timeout_secs must be > 0",
            ));
        }
        if self.watchdog_timeout_ms <= self.http_timeout_ms + self.reset_settle_ms {
            return Err(ConfigError::ValidationFailed(
                "watchdog_timeout_ms must exceed http_timeout_ms + reset_settle_ms",
            ));
        }
        Ok(())
    }

    /// Upload period in milliseconds, as handed to the hardware timer.
    pub fn upload_period_ms(&self) -> u32 {
        self.upload_interval_secs.saturating_mul(1000)
    }
}
