//! Text display adapter over any `embedded-graphics` RGB565 target.
//!
//! On the device the target is an ST7789 panel driven by `mipidsi` over
//! the ESP-IDF SPI master ([`init_st7789`]).  Host tests use an in-memory
//! framebuffer.  Draw errors are logged and dropped: a failed frame is
//! fixed by the next redraw.

use embedded_graphics::{
    mono_font::{
        ascii::{FONT_6X10, FONT_10X20},
        MonoFont, MonoTextStyle,
    },
    pixelcolor::Rgb565,
    prelude::*,
    text::{Baseline, Text},
};
use log::warn;

use crate::app::ports::{Color, DisplayPort};

fn font(size: u8) -> &'static MonoFont<'static> {
    match size {
        0 | 1 => &FONT_6X10,
        _ => &FONT_10X20,
    }
}

fn rgb(color: Color) -> Rgb565 {
    match color {
        Color::White => Rgb565::WHITE,
        Color::Yellow => Rgb565::YELLOW,
        Color::Cyan => Rgb565::CYAN,
        Color::Green => Rgb565::GREEN,
        Color::Red => Rgb565::RED,
    }
}

/// [`DisplayPort`] backed by an `embedded-graphics` draw target.
pub struct LcdDisplay<D> {
    target: D,
    background: Rgb565,
}

impl<D> LcdDisplay<D>
where
    D: DrawTarget<Color = Rgb565>,
    D::Error: core::fmt::Debug,
{
    pub fn new(target: D) -> Self {
        Self {
            target,
            background: Rgb565::BLACK,
        }
    }

    pub fn target(&self) -> &D {
        &self.target
    }
}

impl<D> DisplayPort for LcdDisplay<D>
where
    D: DrawTarget<Color = Rgb565>,
    D::Error: core::fmt::Debug,
{
    fn clear(&mut self) {
        if let Err(e) = self.target.clear(self.background) {
            warn!("display: clear failed: {:?}", e);
        }
    }

    fn draw_text(&mut self, x: i32, y: i32, text: &str, color: Color, size: u8) {
        let style = MonoTextStyle::new(font(size), rgb(color));
        let drawn = Text::with_baseline(text, Point::new(x, y), style, Baseline::Top)
            .draw(&mut self.target);
        if let Err(e) = drawn {
            warn!("display: text '{}' failed: {:?}", text, e);
        }
    }
}

// ───────────────────────────────────────────────────────────────
// ST7789 bring-up (device only)
// ───────────────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
mod st7789 {
    use esp_idf_hal::delay::FreeRtos;
    use esp_idf_hal::gpio::{AnyIOPin, AnyOutputPin, Output, PinDriver};
    use esp_idf_hal::spi::{config::Config, SpiAnyPins, SpiDeviceDriver, SpiDriver, SpiDriverConfig};
    use esp_idf_hal::peripheral::Peripheral;
    use esp_idf_hal::units::FromValueType;
    use mipidsi::interface::SpiInterface;
    use mipidsi::models::ST7789;
    use mipidsi::options::{ColorInversion, ColorOrder};
    use mipidsi::Builder;

    use crate::pins;

    pub type Panel = mipidsi::Display<
        SpiInterface<
            'static,
            SpiDeviceDriver<'static, SpiDriver<'static>>,
            PinDriver<'static, AnyOutputPin, Output>,
        >,
        ST7789,
        PinDriver<'static, AnyOutputPin, Output>,
    >;

    /// Bring up the panel on the pins from [`crate::pins`].
    pub fn init_st7789<SPI: SpiAnyPins>(
        spi: impl Peripheral<P = SPI> + 'static,
        sclk: AnyOutputPin,
        mosi: AnyOutputPin,
        cs: AnyOutputPin,
        dc: AnyOutputPin,
        rst: AnyOutputPin,
    ) -> anyhow::Result<Panel> {
        let driver = SpiDriver::new(spi, sclk, mosi, None::<AnyIOPin>, &SpiDriverConfig::new())?;
        let config = Config::new().baudrate(pins::LCD_SPI_FREQ_MHZ.MHz().into());
        let device = SpiDeviceDriver::new(driver, Some(cs), &config)?;

        let buffer: &'static mut [u8; 512] = Box::leak(Box::new([0u8; 512]));
        let di = SpiInterface::new(device, PinDriver::output(dc)?, buffer);

        Builder::new(ST7789, di)
            .display_size(pins::LCD_WIDTH, pins::LCD_HEIGHT)
            .color_order(ColorOrder::Rgb)
            .invert_colors(ColorInversion::Inverted)
            .reset_pin(PinDriver::output(rst)?)
            .init(&mut FreeRtos)
            .map_err(|e| anyhow::anyhow!("display init failed: {:?}", e))
    }
}

#[cfg(target_os = "espidf")]
pub use st7789::{init_st7789, Panel};

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;

    /// Framebuffer that counts lit (non-background) pixels.
    struct Framebuffer {
        pixels: Vec<Rgb565>,
        width: u32,
        height: u32,
    }

    impl Framebuffer {
        fn new(width: u32, height: u32) -> Self {
            Self {
                pixels: vec![Rgb565::BLACK; (width * height) as usize],
                width,
                height,
            }
        }

        fn count(&self, color: Rgb565) -> usize {
            self.pixels.iter().filter(|&&p| p == color).count()
        }
    }

    impl OriginDimensions for Framebuffer {
        fn size(&self) -> Size {
            Size::new(self.width, self.height)
        }
    }

    impl DrawTarget for Framebuffer {
        type Color = Rgb565;
        type Error = Infallible;

        fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
        where
            I: IntoIterator<Item = Pixel<Self::Color>>,
        {
            for Pixel(p, c) in pixels {
                if p.x >= 0 && p.y >= 0 && (p.x as u32) < self.width && (p.y as u32) < self.height {
                    self.pixels[(p.y as u32 * self.width + p.x as u32) as usize] = c;
                }
            }
            Ok(())
        }
    }

    #[test]
    fn text_lights_pixels_in_requested_color() {
        let mut lcd = LcdDisplay::new(Framebuffer::new(240, 320));
        lcd.draw_text(10, 100, "Hold for 3 seconds", Color::Yellow, 2);
        assert!(lcd.target().count(Rgb565::YELLOW) > 0);
        assert_eq!(lcd.target().count(Rgb565::CYAN), 0);
    }

    #[test]
    fn clear_resets_to_background() {
        let mut lcd = LcdDisplay::new(Framebuffer::new(64, 32));
        lcd.draw_text(0, 0, "x", Color::Red, 1);
        lcd.clear();
        assert_eq!(lcd.target().count(Rgb565::BLACK), 64 * 32);
    }

    #[test]
    fn small_font_is_smaller() {
        let mut small = LcdDisplay::new(Framebuffer::new(240, 40));
        let mut large = LcdDisplay::new(Framebuffer::new(240, 40));
        small.draw_text(0, 0, "Connected", Color::Green, 1);
        large.draw_text(0, 0, "Connected", Color::Green, 2);
        assert!(small.target().count(Rgb565::GREEN) < large.target().count(Rgb565::GREEN));
    }
}
