//! Sensor subsystem: the SHT31 driver and the cached [`Reading`].
//!
//! [`SensorCache`] is the sole owner of the last reading.  A failed read
//! keeps the previous values but flips `valid` to `false`, so consumers can
//! still show the last known climate while knowing it is stale.

pub mod sht31;

use log::warn;

use crate::app::ports::SensorPort;
use crate::error::SensorError;

/// Plausible operating envelope of the SHT3x family.
const MIN_TEMPERATURE_C: f32 = -45.0;
const MAX_TEMPERATURE_C: f32 = 130.0;

/// One raw measurement as returned by the sensor port.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    pub temperature_c: f32,
    pub humidity_pct: f32,
}

impl Measurement {
    /// Reject NaN and values outside the sensor's physical range.
    pub fn check(self) -> Result<Self, SensorError> {
        let t = self.temperature_c;
        let h = self.humidity_pct;
        if t.is_nan() || h.is_nan() {
            return Err(SensorError::InvalidData);
        }
        if !(MIN_TEMPERATURE_C..=MAX_TEMPERATURE_C).contains(&t) || !(0.0..=100.0).contains(&h) {
            return Err(SensorError::InvalidData);
        }
        Ok(self)
    }
}

/// Last known climate values plus the outcome of the most recent read.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Reading {
    pub temperature_c: f32,
    pub humidity_pct: f32,
    /// `true` only if the most recent read succeeded.
    pub valid: bool,
}

/// Owns the last [`Reading`] and refreshes it from a [`SensorPort`].
#[derive(Debug, Default)]
pub struct SensorCache {
    reading: Reading,
    consecutive_failures: u32,
}

impl SensorCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the sensor once and update the cache.
    pub fn refresh(&mut self, sensor: &mut impl SensorPort) -> Result<Reading, SensorError> {
        match sensor.try_read().and_then(Measurement::check) {
            Ok(m) => {
                self.reading = Reading {
                    temperature_c: m.temperature_c,
                    humidity_pct: m.humidity_pct,
                    valid: true,
                };
                self.consecutive_failures = 0;
                Ok(self.reading)
            }
            Err(e) => {
                self.reading.valid = false;
                self.consecutive_failures = self.consecutive_failures.saturating_add(1);
                warn!(
                    "sensor: read failed ({}), {} in a row",
                    e, self.consecutive_failures
                );
                Err(e)
            }
        }
    }

    pub fn reading(&self) -> Reading {
        self.reading
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }
}
