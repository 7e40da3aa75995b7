//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService (domain)
//! ```
//!
//! Driven adapters (WiFi, display, sensor, uploader, timer, system) implement
//! these traits.  The [`AppService`](super::service::AppService) consumes them
//! via generics, so the domain core never touches hardware directly.

use crate::config::DeviceConfig;
use crate::error::{SensorError, TimerError, UploadError};
use crate::sensors::{Measurement, Reading};
use crate::wifi_state::WifiState;

// ───────────────────────────────────────────────────────────────
// WiFi lifecycle port
// ───────────────────────────────────────────────────────────────

/// The WiFi manager as seen by the core.
///
/// The adapter updates its current state asynchronously from driver
/// events; the core only samples it.
pub trait WifiPort {
    /// Current lifecycle phase.
    fn current_state(&self) -> WifiState;

    /// Erase stored network credentials so the next boot opens the
    /// configuration portal.
    fn reset_credentials(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Display port
// ───────────────────────────────────────────────────────────────

/// Colours available to the status screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    White,
    Yellow,
    Cyan,
    Green,
    Red,
}

/// Text primitives of the attached display.  Calls are synchronous.
pub trait DisplayPort {
    /// Fill the whole screen with the background colour.
    fn clear(&mut self);

    /// Draw `text` with its top-left corner at (`x`, `y`).
    /// `size` is a font scale: 1 = small, 2 = normal, 3+ = large.
    fn draw_text(&mut self, x: i32, y: i32, text: &str, color: Color, size: u8);
}

// ───────────────────────────────────────────────────────────────
// Sensor port
// ───────────────────────────────────────────────────────────────

/// Temperature/humidity sensor.
pub trait SensorPort {
    /// Take one measurement.
    fn try_read(&mut self) -> Result<Measurement, SensorError>;
}

// ───────────────────────────────────────────────────────────────
// Upload port
// ───────────────────────────────────────────────────────────────

/// Sends one reading to the collection server.
///
/// Blocking; the implementation bounds the call with its own timeout.
pub trait UploadPort {
    fn send(&mut self, reading: &Reading, device_id: &str) -> Result<(), UploadError>;
}

// ───────────────────────────────────────────────────────────────
// Periodic timer port
// ───────────────────────────────────────────────────────────────

/// Periodic hardware timer whose callback raises the upload flag.
pub trait UploadTimerPort {
    /// Start firing every `period_ms`.  Re-arming replaces the period.
    fn arm(&mut self, period_ms: u32) -> Result<(), TimerError>;

    /// Stop firing.  Safe to call when not armed.
    fn disarm(&mut self);

    fn is_armed(&self) -> bool;
}

// ───────────────────────────────────────────────────────────────
// System port
// ───────────────────────────────────────────────────────────────

/// Chip-level effects used by the factory-reset path.
pub trait SystemPort {
    /// Block the calling task for `ms` milliseconds.
    fn delay_ms(&mut self, ms: u32);

    /// Hard restart.  On hardware this never returns.
    fn restart(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists the device configuration.
///
/// Implementations MUST validate before persisting; invalid values are
/// rejected with [`ConfigError::ValidationFailed`], never clamped.
pub trait ConfigPort {
    /// Load configuration from persistent storage.
    /// Returns [`ConfigError::NotFound`] on first boot.
    fn load(&self) -> Result<DeviceConfig, ConfigError>;

    /// Validate and persist configuration.
    fn save(&self, config: &DeviceConfig) -> Result<(), ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ConfigPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// No config found in storage (first boot).
    NotFound,
    /// Stored config failed deserialization.
    Corrupted,
    /// A config field failed range validation.
    ValidationFailed(&'static str),
    /// Generic I/O error from the storage backend.
    IoError,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "config not found"),
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}
