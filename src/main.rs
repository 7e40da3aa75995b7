//! Citonphyde firmware entry point.
//!
//! Hexagonal architecture with a cooperative polling loop and one
//! hardware timer.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  WifiManager    LcdDisplay    Sht31        HttpUploader        │
//! │  (WifiPort)     (DisplayPort) (SensorPort) (UploadPort)        │
//! │  EspSystem      UploadTimer   NvsAdapter   LogEventSink        │
//! │  (SystemPort)   (TimerPort)   (Config)     (EventSink)         │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              AppService (pure logic)                   │    │
//! │  │  Reset button · Upload scheduler · Display reconciler  │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  esp_timer ISR ──▶ UPLOAD_DUE flag ──▶ next loop iteration     │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

// ── Imports ───────────────────────────────────────────────────
use anyhow::Result;
use log::{error, info, warn};

use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::hal::delay::FreeRtos;
use esp_idf_svc::hal::gpio::OutputPin;
use esp_idf_svc::hal::i2c::{I2cConfig, I2cDriver};
use esp_idf_svc::hal::peripherals::Peripherals;
use esp_idf_svc::hal::units::Hertz;
use esp_idf_svc::nvs::EspDefaultNvsPartition;

use citonphyde::adapters::device_id;
use citonphyde::adapters::display::{init_st7789, LcdDisplay};
use citonphyde::adapters::http_upload::HttpUploader;
use citonphyde::adapters::log_sink::LogEventSink;
use citonphyde::adapters::nvs::NvsAdapter;
use citonphyde::adapters::system::EspSystem;
use citonphyde::adapters::time::MonotonicClock;
use citonphyde::adapters::wifi::WifiManager;
use citonphyde::app::service::{AppService, Ports, TickOutcome};
use citonphyde::drivers::button::is_pressed_hw;
use citonphyde::drivers::hw_init::init_peripherals;
use citonphyde::drivers::hw_timer::UploadTimer;
use citonphyde::drivers::watchdog::Watchdog;
use citonphyde::error::Error;
use citonphyde::scheduler::UPLOAD_DUE;
use citonphyde::sensors::sht31::{Sht31, DEFAULT_ADDRESS};
use citonphyde::pins;
use citonphyde::wifi_state::WIFI_STATUS;

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Citonphyde v{}                      ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;
    let nvs_partition = EspDefaultNvsPartition::take()?;

    // ── 2. Button GPIO ────────────────────────────────────────
    if let Err(e) = init_peripherals() {
        // Without the button there is no way back to the portal; keep
        // running, the device still uploads.
        error!("button init failed: {}, factory reset unavailable", e);
    }

    // ── 3. Configuration (NVS or defaults) ────────────────────
    let config = match NvsAdapter::new(nvs_partition.clone()) {
        Ok(nvs) => nvs.load_or_default(),
        Err(e) => {
            warn!("NVS init failed ({}), running with defaults", e);
            citonphyde::config::DeviceConfig::default()
        }
    };

    let watchdog = Watchdog::new(config.watchdog_timeout_ms);
    let clock = MonotonicClock::new();

    // ── 4. Device identity ────────────────────────────────────
    let dev_id = device_id::device_id(&device_id::read_mac());
    info!("Device ID: {}", dev_id);

    // ── 5. Sensor (I2C) ───────────────────────────────────────
    // SDA/SCL follow pins::I2C_SDA_GPIO / pins::I2C_SCL_GPIO.
    let i2c = I2cDriver::new(
        peripherals.i2c0,
        peripherals.pins.gpio4,
        peripherals.pins.gpio5,
        &I2cConfig::new().baudrate(Hertz(pins::I2C_FREQ_HZ)),
    )?;
    let mut sensor = Sht31::new(i2c, FreeRtos, DEFAULT_ADDRESS);
    if let Err(e) = sensor.init() {
        // Every upload cycle will be skipped until the next boot.
        warn!("SHT31 init failed: {}", e);
    }

    // ── 6. Display (SPI) ──────────────────────────────────────
    let panel = init_st7789(
        peripherals.spi2,
        peripherals.pins.gpio18.downgrade_output(),
        peripherals.pins.gpio23.downgrade_output(),
        peripherals.pins.gpio15.downgrade_output(),
        peripherals.pins.gpio2.downgrade_output(),
        peripherals.pins.gpio22.downgrade_output(),
    )?;
    let display = LcdDisplay::new(panel);

    // ── 7. WiFi ───────────────────────────────────────────────
    let wifi = WifiManager::new(
        peripherals.modem,
        sysloop,
        nvs_partition,
        &WIFI_STATUS,
        &config.ap_name,
        config.wifi_connect_timeout_secs.saturating_mul(1000),
        clock.now_ms(),
    )
    .map_err(Error::from)?;

    // ── 8. Upload path ────────────────────────────────────────
    let uploader =
        HttpUploader::new(&config.server_url, config.http_timeout_ms).map_err(Error::from)?;
    let mut timer = UploadTimer::new(&UPLOAD_DUE);
    let mut log_sink = LogEventSink::new();

    let mut ports = Ports {
        wifi,
        display,
        sensor,
        uploader,
        system: EspSystem::new(),
    };

    // ── 9. App service ────────────────────────────────────────
    let mut app = AppService::new(&config, &dev_id, &UPLOAD_DUE);
    app.start(&mut timer, &mut log_sink);

    info!("System ready. Entering main loop.");

    // ── 10. Main loop ─────────────────────────────────────────
    loop {
        watchdog.feed();

        let now_ms = clock.now_ms();
        ports.wifi.poll(now_ms);

        match app.tick(now_ms, is_pressed_hw(), &mut ports, &mut log_sink) {
            TickOutcome::Running => {}
            TickOutcome::Restarting => {
                // esp_restart() does not return; if it ever does, idle
                // until the watchdog fires.
                app.stop(&mut timer);
                loop {
                    FreeRtos::delay_ms(1_000);
                }
            }
        }

        FreeRtos::delay_ms(config.loop_interval_ms);
    }
}
