//! WiFi lifecycle phase shared between the WiFi adapter and the core.
//!
//! The WiFi manager's `poll`, run from the main loop, samples the driver
//! and publishes the result into a [`WifiStatusCell`] (a single `AtomicU8`).
//! The core only loads it.

use core::fmt;
use core::sync::atomic::{AtomicU8, Ordering};

/// The device's network lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum WifiState {
    /// Station mode, association or DHCP in progress.
    Connecting = 0,
    /// Access point + captive portal up, waiting for credentials.
    ConfigMode = 1,
    /// Associated with an IP address.
    Connected = 2,
    /// The WiFi driver could not be brought up.
    Error = 3,
}

impl WifiState {
    /// Convert a raw discriminant back into a state.  Unknown values map
    /// to `Error` so a corrupted cell never shows a healthy screen.
    pub fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Self::Connecting,
            1 => Self::ConfigMode,
            2 => Self::Connected,
            _ => Self::Error,
        }
    }

    pub fn is_connected(self) -> bool {
        self == Self::Connected
    }
}

impl fmt::Display for WifiState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connecting => write!(f, "connecting"),
            Self::ConfigMode => write!(f, "config mode"),
            Self::Connected => write!(f, "connected"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Lock-free holder for the current [`WifiState`].
///
/// Written by `WifiManager::poll` and read by `AppService::tick`, both on
/// the main loop.
pub struct WifiStatusCell(AtomicU8);

impl WifiStatusCell {
    pub const fn new(initial: WifiState) -> Self {
        Self(AtomicU8::new(initial as u8))
    }

    /// Publish a new state.  Returns the previous one.
    pub fn publish(&self, state: WifiState) -> WifiState {
        WifiState::from_u8(self.0.swap(state as u8, Ordering::AcqRel))
    }

    pub fn load(&self) -> WifiState {
        WifiState::from_u8(self.0.load(Ordering::Acquire))
    }
}

/// The device-wide status cell.  Starts in `Connecting` until the WiFi
/// manager has looked for stored credentials.
pub static WIFI_STATUS: WifiStatusCell = WifiStatusCell::new(WifiState::Connecting);
