//! Integration tests for the AppService → button / scheduler / display
//! pipeline against mock adapters.

use citonphyde::app::events::AppEvent;
use citonphyde::app::service::{AppService, TickOutcome};
use citonphyde::config::DeviceConfig;
use citonphyde::error::{SensorError, TimerError, UploadError};
use citonphyde::scheduler::{UploadFlag, UploadOutcome};
use citonphyde::wifi_state::WifiState;

use super::mock_hw::{leaked_flag, mock_ports, MockPorts, MockSensor, MockTimer, RecordingSink};

const DEVICE_ID: &str = "CT-A1B2C3";

fn make_app(state: WifiState) -> (AppService, MockPorts, RecordingSink, &'static UploadFlag) {
    let flag = leaked_flag();
    let mut app = AppService::new(&DeviceConfig::default(), DEVICE_ID, flag);
    let mut timer = MockTimer::default();
    let mut sink = RecordingSink::default();
    app.start(&mut timer, &mut sink);
    (app, mock_ports(state), sink, flag)
}

// ── Lifecycle ─────────────────────────────────────────────────

#[test]
fn start_arms_timer_with_configured_period() {
    let flag = leaked_flag();
    let mut app = AppService::new(&DeviceConfig::default(), DEVICE_ID, flag);
    let mut timer = MockTimer::default();
    let mut sink = RecordingSink::default();

    app.start(&mut timer, &mut sink);
    assert_eq!(timer.armed_ms, Some(60_000));
    assert_eq!(
        sink.events,
        vec![AppEvent::Started {
            upload_period_ms: 60_000
        }]
    );

    flag.raise();
    app.stop(&mut timer);
    assert_eq!(timer.armed_ms, None);
    assert!(!flag.is_raised(), "stop discards a pending firing");
}

#[test]
fn timer_failure_is_reported_and_device_keeps_running() {
    let flag = leaked_flag();
    let mut app = AppService::new(&DeviceConfig::default(), DEVICE_ID, flag);
    let mut timer = MockTimer {
        fail_with: Some(TimerError::Create(-1)),
        ..MockTimer::default()
    };
    let mut sink = RecordingSink::default();
    app.start(&mut timer, &mut sink);
    assert_eq!(sink.events, vec![AppEvent::TimerUnavailable]);

    let mut ports = mock_ports(WifiState::Connected);
    assert_eq!(app.tick(0, false, &mut ports, &mut sink), TickOutcome::Running);
    assert_eq!(sink.redraws(), vec![WifiState::Connected]);
}

// ── Display reconciliation ────────────────────────────────────

#[test]
fn connecting_then_connected_draws_each_screen_once() {
    let (mut app, mut ports, mut sink, _) = make_app(WifiState::Connecting);
    sink.clear();

    app.tick(0, false, &mut ports, &mut sink);
    app.tick(20, false, &mut ports, &mut sink);
    assert_eq!(sink.redraws(), vec![WifiState::Connecting]);
    assert!(ports.display.shows("Connecting"));

    ports.wifi.state = WifiState::Connected;
    ports.display.reset();
    for t in (40..400).step_by(20) {
        app.tick(t, false, &mut ports, &mut sink);
    }
    assert_eq!(
        sink.redraws(),
        vec![WifiState::Connecting, WifiState::Connected]
    );
    assert_eq!(ports.display.clears(), 1);
    assert!(ports.display.shows(DEVICE_ID));
    assert!(ports.display.shows(&DeviceConfig::default().server_url));
    assert_eq!(app.last_displayed(), Some(WifiState::Connected));
}

#[test]
fn config_mode_screen_names_the_access_point() {
    let (mut app, mut ports, mut sink, _) = make_app(WifiState::ConfigMode);
    app.tick(0, false, &mut ports, &mut sink);
    assert!(ports.display.shows(&DeviceConfig::default().ap_name));
    assert!(ports.display.shows("to configure WiFi"));
    assert!(!ports.display.shows("192.168.71.1"), "no portal address is advertised");
}

#[test]
fn error_state_has_its_own_screen() {
    let (mut app, mut ports, mut sink, _) = make_app(WifiState::Error);
    app.tick(0, false, &mut ports, &mut sink);
    assert!(ports.display.shows("WiFi Error"));
    assert_eq!(sink.redraws(), vec![WifiState::Error]);
}

// ── Reset button ──────────────────────────────────────────────

#[test]
fn short_press_cancels_and_redraws_once() {
    let (mut app, mut ports, mut sink, _) = make_app(WifiState::Connected);
    app.tick(0, false, &mut ports, &mut sink);
    sink.clear();
    ports.display.reset();

    // Pin active t=0 (relative), inactive t=1500.
    assert_eq!(app.tick(100, true, &mut ports, &mut sink), TickOutcome::Running);
    assert!(app.is_button_pressed());
    assert!(ports.display.shows("Hold for 3 seconds"));
    for t in [600, 1100] {
        app.tick(t, true, &mut ports, &mut sink);
    }
    assert_eq!(app.tick(1600, false, &mut ports, &mut sink), TickOutcome::Running);

    assert!(!app.is_button_pressed());
    assert!(!app.is_restarting());
    assert_eq!(ports.wifi.credential_resets, 0);
    assert_eq!(ports.system.restarts, 0);
    assert_eq!(sink.count(|e| *e == AppEvent::ResetPromptShown), 1);
    assert_eq!(
        sink.count(|e| *e == AppEvent::ResetCancelled { held_ms: 1500 }),
        1
    );
    assert_eq!(sink.redraws(), vec![WifiState::Connected]);

    app.tick(1620, false, &mut ports, &mut sink);
    assert_eq!(sink.redraws().len(), 1, "no redundant redraw after release");
}

#[test]
fn hold_for_threshold_resets_exactly_once() {
    let (mut app, mut ports, mut sink, _) = make_app(WifiState::Connected);
    app.tick(0, false, &mut ports, &mut sink);

    for t in [10, 1_000, 2_000, 3_009] {
        assert_eq!(app.tick(t, true, &mut ports, &mut sink), TickOutcome::Running);
    }
    assert_eq!(app.tick(3_010, true, &mut ports, &mut sink), TickOutcome::Restarting);

    assert!(app.is_restarting());
    assert_eq!(ports.wifi.credential_resets, 1);
    assert_eq!(ports.system.restarts, 1);
    assert_eq!(ports.system.delays, vec![1_000]);
    assert_eq!(ports.display.last_text(), Some("Resetting WiFi..."));
    assert_eq!(sink.count(|e| *e == AppEvent::FactoryReset), 1);

    // Terminal: nothing else happens, even on release.
    let calls = ports.display.calls.len();
    assert_eq!(app.tick(3_100, false, &mut ports, &mut sink), TickOutcome::Restarting);
    assert_eq!(app.tick(3_200, true, &mut ports, &mut sink), TickOutcome::Restarting);
    assert_eq!(ports.wifi.credential_resets, 1);
    assert_eq!(ports.system.restarts, 1);
    assert_eq!(ports.display.calls.len(), calls);
}

#[test]
fn status_changes_wait_until_release() {
    let (mut app, mut ports, mut sink, _) = make_app(WifiState::Connecting);
    app.tick(0, false, &mut ports, &mut sink);
    app.tick(20, true, &mut ports, &mut sink);

    ports.wifi.state = WifiState::Connected;
    app.tick(40, true, &mut ports, &mut sink);
    assert_eq!(sink.redraws(), vec![WifiState::Connecting]);
    assert_eq!(ports.display.last_text(), Some("to reset WiFi"));

    app.tick(60, false, &mut ports, &mut sink);
    assert_eq!(
        sink.redraws(),
        vec![WifiState::Connecting, WifiState::Connected]
    );
}

#[test]
fn button_hold_survives_clock_wrap() {
    let (mut app, mut ports, mut sink, _) = make_app(WifiState::Connected);
    let start = u32::MAX - 1_000;
    app.tick(start, true, &mut ports, &mut sink);
    assert_eq!(
        app.tick(start.wrapping_add(2_999), true, &mut ports, &mut sink),
        TickOutcome::Running
    );
    assert_eq!(
        app.tick(start.wrapping_add(3_000), true, &mut ports, &mut sink),
        TickOutcome::Restarting
    );
}

// ── Uploads ───────────────────────────────────────────────────

#[test]
fn upload_runs_once_per_firing() {
    let (mut app, mut ports, mut sink, flag) = make_app(WifiState::Connected);

    app.tick(0, false, &mut ports, &mut sink);
    assert!(ports.uploader.sent.is_empty());

    flag.raise();
    app.tick(20, false, &mut ports, &mut sink);
    app.tick(40, false, &mut ports, &mut sink);

    assert_eq!(ports.uploader.sent.len(), 1);
    let (reading, id) = &ports.uploader.sent[0];
    assert_eq!(id, DEVICE_ID);
    assert!(reading.valid);
    assert!((reading.temperature_c - 22.5).abs() < f32::EPSILON);
    assert!(!flag.is_raised());
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::Upload(UploadOutcome::Sent(_)))),
        1
    );
}

#[test]
fn sensor_failures_skip_upload_and_clear_flag() {
    let (mut app, mut ports, mut sink, flag) = make_app(WifiState::Connected);
    ports.sensor = MockSensor::failing(SensorError::Bus);

    for t in [0, 60_000, 120_000] {
        flag.raise();
        app.tick(t, false, &mut ports, &mut sink);
        assert!(!flag.is_raised());
    }

    assert!(ports.uploader.sent.is_empty());
    assert_eq!(ports.sensor.reads, 3);
    assert_eq!(
        sink.count(|e| *e == AppEvent::Upload(UploadOutcome::SensorFailed(SensorError::Bus))),
        3
    );
    assert!(!app.reading().valid);
}

#[test]
fn offline_still_refreshes_the_reading() {
    let (mut app, mut ports, mut sink, flag) = make_app(WifiState::ConfigMode);
    flag.raise();
    app.tick(0, false, &mut ports, &mut sink);

    assert!(ports.uploader.sent.is_empty());
    assert_eq!(ports.sensor.reads, 1);
    assert!(app.reading().valid);
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::Upload(UploadOutcome::Offline(_)))),
        1
    );
}

#[test]
fn failed_send_is_not_retried_until_next_firing() {
    let (mut app, mut ports, mut sink, flag) = make_app(WifiState::Connected);
    ports.uploader.fail_with = Some(UploadError::Timeout);

    flag.raise();
    app.tick(0, false, &mut ports, &mut sink);
    app.tick(20, false, &mut ports, &mut sink);

    assert_eq!(ports.sensor.reads, 1);
    assert_eq!(
        sink.count(|e| matches!(
            e,
            AppEvent::Upload(UploadOutcome::SendFailed {
                error: UploadError::Timeout,
                ..
            })
        )),
        1
    );
}

#[test]
fn upload_still_runs_while_button_is_held() {
    let (mut app, mut ports, mut sink, flag) = make_app(WifiState::Connected);
    app.tick(0, true, &mut ports, &mut sink);
    flag.raise();
    app.tick(500, true, &mut ports, &mut sink);
    assert_eq!(ports.uploader.sent.len(), 1);
}
