//! Sensirion SHT31 temperature/humidity sensor over I2C.
//!
//! Thin single-shot driver: one "measure, high repeatability, no clock
//! stretching" command, a fixed conversion wait, then a 6-byte read of two
//! CRC-protected words.  Generic over any `embedded-hal` 1.0 I2C bus and
//! delay, so the host tests drive it with a scripted bus.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use log::{info, warn};

use crate::app::ports::SensorPort;
use crate::error::SensorError;

use super::Measurement;

/// Default address (ADDR pin low).
pub const DEFAULT_ADDRESS: u8 = 0x44;

const CMD_MEASURE_HIGH_REP: [u8; 2] = [0x24, 0x00];
const CMD_SOFT_RESET: [u8; 2] = [0x30, 0xA2];
/// Max conversion time for high repeatability is 15.5 ms.
const MEASURE_WAIT_MS: u32 = 16;
const RESET_WAIT_MS: u32 = 2;

pub struct Sht31<I2C, D> {
    i2c: I2C,
    delay: D,
    address: u8,
    initialized: bool,
}

impl<I2C: I2c, D: DelayNs> Sht31<I2C, D> {
    pub fn new(i2c: I2C, delay: D, address: u8) -> Self {
        Self {
            i2c,
            delay,
            address,
            initialized: false,
        }
    }

    /// Soft-reset the sensor.  Reads fail with `NotInitialized` until this
    /// succeeds once.
    pub fn init(&mut self) -> Result<(), SensorError> {
        self.i2c
            .write(self.address, &CMD_SOFT_RESET)
            .map_err(|_| SensorError::Bus)?;
        self.delay.delay_ms(RESET_WAIT_MS);
        self.initialized = true;
        info!("SHT31: initialised at 0x{:02X}", self.address);
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    fn measure(&mut self) -> Result<Measurement, SensorError> {
        if !self.initialized {
            return Err(SensorError::NotInitialized);
        }

        self.i2c
            .write(self.address, &CMD_MEASURE_HIGH_REP)
            .map_err(|_| SensorError::Bus)?;
        self.delay.delay_ms(MEASURE_WAIT_MS);

        let mut buf = [0u8; 6];
        self.i2c
            .read(self.address, &mut buf)
            .map_err(|_| SensorError::Bus)?;

        let raw_t = checked_word(&buf[0..3])?;
        let raw_h = checked_word(&buf[3..6])?;

        Ok(Measurement {
            temperature_c: -45.0 + 175.0 * (raw_t as f32 / 65535.0),
            humidity_pct: 100.0 * (raw_h as f32 / 65535.0),
        })
    }
}

impl<I2C: I2c, D: DelayNs> SensorPort for Sht31<I2C, D> {
    fn try_read(&mut self) -> Result<Measurement, SensorError> {
        self.measure().inspect_err(|e| warn!("SHT31: {}", e))
    }
}

/// Validate one `[msb, lsb, crc]` triple and return the 16-bit word.
fn checked_word(triple: &[u8]) -> Result<u16, SensorError> {
    let (data, crc) = (&triple[..2], triple[2]);
    if crc8(data) != crc {
        return Err(SensorError::Crc);
    }
    Ok(u16::from_be_bytes([data[0], data[1]]))
}

/// CRC-8, polynomial 0x31, init 0xFF (Sensirion).
fn crc8(data: &[u8]) -> u8 {
    let mut crc: u8 = 0xFF;
    for &byte in data {
        crc ^= byte;
        for _ in 0..8 {
            crc = if crc & 0x80 != 0 {
                (crc << 1) ^ 0x31
            } else {
                crc << 1
            };
        }
    }
    crc
}
