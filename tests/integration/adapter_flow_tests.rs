//! End-to-end flows through the host simulation adapters: WiFi manager,
//! HTTP uploader, upload timer and NVS, wired into a real AppService.

use citonphyde::adapters::device_id;
use citonphyde::adapters::http_upload::HttpUploader;
use citonphyde::adapters::nvs::NvsAdapter;
use citonphyde::adapters::system::EspSystem;
use citonphyde::adapters::wifi::WifiManager;
use citonphyde::app::ports::ConfigPort;
use citonphyde::app::service::{AppService, Ports, TickOutcome};
use citonphyde::config::DeviceConfig;
use citonphyde::drivers::hw_timer::UploadTimer;
use citonphyde::scheduler::UploadOutcome;
use citonphyde::app::events::AppEvent;
use citonphyde::wifi_state::{WifiState, WifiStatusCell};

use super::mock_hw::{leaked_flag, MockDisplay, MockSensor, RecordingSink};

type SimPorts = Ports<WifiManager, MockDisplay, MockSensor, HttpUploader, EspSystem>;

fn leaked_cell() -> &'static WifiStatusCell {
    Box::leak(Box::new(WifiStatusCell::new(WifiState::Connecting)))
}

fn sim_ports(config: &DeviceConfig, stored_ssid: Option<&str>) -> SimPorts {
    let wifi = WifiManager::new(
        leaked_cell(),
        &config.ap_name,
        config.wifi_connect_timeout_secs * 1000,
        stored_ssid,
        0,
    )
    .unwrap();
    Ports {
        wifi,
        display: MockDisplay::default(),
        sensor: MockSensor::healthy(24.0, 38.5),
        uploader: HttpUploader::new(&config.server_url, config.http_timeout_ms).unwrap(),
        system: EspSystem::new(),
    }
}

#[test]
fn boot_connect_and_upload_json() {
    let config = DeviceConfig::default();
    let dev_id = device_id::device_id(&device_id::read_mac());
    let flag = leaked_flag();
    let mut timer = UploadTimer::new(flag);
    let mut sink = RecordingSink::default();
    let mut ports = sim_ports(&config, Some("HomeNet"));

    let mut app = AppService::new(&config, &dev_id, flag);
    app.start(&mut timer, &mut sink);
    assert_eq!(timer.period_ms(), Some(config.upload_period_ms()));

    ports.wifi.poll(0);
    app.tick(0, false, &mut ports, &mut sink);
    assert_eq!(app.last_displayed(), Some(WifiState::Connecting));

    ports.wifi.sim_set_link(true);
    ports.wifi.poll(800);
    app.tick(800, false, &mut ports, &mut sink);
    assert_eq!(app.last_displayed(), Some(WifiState::Connected));

    // Stand-in for the esp_timer firing.
    flag.raise();
    app.tick(820, false, &mut ports, &mut sink);

    let sent = ports.uploader.sent();
    assert_eq!(sent.len(), 1);
    let body: serde_json::Value = serde_json::from_slice(&sent[0]).unwrap();
    assert_eq!(body["device_id"], "CT-A1B2C3");
    assert_eq!(body["temperature"], 24.0);
    assert_eq!(body["humidity"], 38.5);
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::Upload(UploadOutcome::Sent(_)))),
        1
    );
}

#[test]
fn connect_timeout_shows_portal_and_skips_uploads() {
    let config = DeviceConfig::default();
    let flag = leaked_flag();
    let mut sink = RecordingSink::default();
    let mut ports = sim_ports(&config, Some("HomeNet"));
    let mut app = AppService::new(&config, "CT-000001", flag);

    let timeout_ms = config.wifi_connect_timeout_secs * 1000;
    ports.wifi.poll(timeout_ms);
    assert!(ports.wifi.is_portal_open());

    flag.raise();
    app.tick(timeout_ms, false, &mut ports, &mut sink);
    assert_eq!(app.last_displayed(), Some(WifiState::ConfigMode));
    assert!(ports.display.shows(&config.ap_name));
    assert!(ports.uploader.sent().is_empty());
}

#[test]
fn driver_fault_screen_clears_after_recovery() {
    let config = DeviceConfig::default();
    let flag = leaked_flag();
    let mut sink = RecordingSink::default();
    let mut ports = sim_ports(&config, Some("HomeNet"));
    let mut app = AppService::new(&config, "CT-000001", flag);

    ports.wifi.sim_fail_driver();
    ports.wifi.poll(100);
    app.tick(100, false, &mut ports, &mut sink);
    assert!(ports.display.shows("WiFi Error"));

    ports.wifi.sim_recover_driver();
    ports.wifi.sim_set_link(true);
    ports.wifi.poll(200);
    app.tick(200, false, &mut ports, &mut sink);
    assert_eq!(app.last_displayed(), Some(WifiState::Connected));
    assert_eq!(sink.redraws(), vec![WifiState::Error, WifiState::Connected]);
}

#[test]
fn held_button_erases_stored_credentials() {
    let config = DeviceConfig::default();
    let flag = leaked_flag();
    let mut sink = RecordingSink::default();
    let mut ports = sim_ports(&config, Some("HomeNet"));
    let mut app = AppService::new(&config, "CT-000001", flag);

    app.tick(0, true, &mut ports, &mut sink);
    let outcome = app.tick(config.reset_hold_ms, true, &mut ports, &mut sink);

    assert_eq!(outcome, TickOutcome::Restarting);
    assert!(!ports.wifi.sim_has_stored_credentials());
    assert_eq!(ports.wifi.sim_credential_resets(), 1);
    assert_eq!(ports.system.restarts(), 1);
    assert_eq!(ports.system.delays(), &[config.reset_settle_ms]);
}

#[test]
fn stored_config_drives_the_service() {
    let nvs = NvsAdapter::new().unwrap();
    let mut stored = DeviceConfig::default();
    stored.upload_interval_secs = 30;
    stored.reset_hold_ms = 5_000;
    nvs.save(&stored).unwrap();

    let config = nvs.load_or_default();
    assert_eq!(config, stored);

    let flag = leaked_flag();
    let mut timer = UploadTimer::new(flag);
    let mut sink = RecordingSink::default();
    let mut app = AppService::new(&config, "CT-000001", flag);
    app.start(&mut timer, &mut sink);
    assert_eq!(timer.period_ms(), Some(30_000));

    // 3 s is no longer enough to reset.
    let mut ports = sim_ports(&config, Some("HomeNet"));
    app.tick(0, true, &mut ports, &mut sink);
    assert_eq!(app.tick(3_000, true, &mut ports, &mut sink), TickOutcome::Running);
    assert_eq!(app.tick(5_000, true, &mut ports, &mut sink), TickOutcome::Restarting);
}

#[test]
fn corrupted_store_falls_back_to_defaults() {
    let nvs = NvsAdapter::new().unwrap();
    nvs.put_raw(&[0xFF; 7]);
    assert_eq!(nvs.load_or_default(), DeviceConfig::default());
}
