//! GPIO / peripheral pin assignments for the Citonphyde sensor node.
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// User button (active-low, internal pull-up)
// ---------------------------------------------------------------------------

/// BOOT button.  LOW = pressed.  Held for the reset threshold it erases the
/// stored WiFi credentials.
pub const BUTTON_GPIO: i32 = 0;

// ---------------------------------------------------------------------------
// I²C bus (SHT31 temperature/humidity sensor)
// ---------------------------------------------------------------------------

pub const I2C_SDA_GPIO: i32 = 4;
pub const I2C_SCL_GPIO: i32 = 5;
/// Standard-mode I²C.  The SHT31 supports up to 1 MHz.
pub const I2C_FREQ_HZ: u32 = 100_000;

// ---------------------------------------------------------------------------
// SPI display (ST7789, 240 × 320)
// ---------------------------------------------------------------------------

pub const LCD_SCLK_GPIO: i32 = 18;
pub const LCD_MOSI_GPIO: i32 = 23;
pub const LCD_CS_GPIO: i32 = 15;
pub const LCD_DC_GPIO: i32 = 2;
pub const LCD_RST_GPIO: i32 = 22;

pub const LCD_WIDTH: u16 = 240;
pub const LCD_HEIGHT: u16 = 320;
pub const LCD_SPI_FREQ_MHZ: u32 = 26;
