//! Mock adapters for integration tests.
//!
//! Each mock records what the core asked of it so tests can assert on the
//! full call history without a panel, a radio or a sensor.

use std::collections::VecDeque;

use citonphyde::app::events::AppEvent;
use citonphyde::app::ports::{
    Color, DisplayPort, EventSink, SensorPort, SystemPort, UploadPort, UploadTimerPort, WifiPort,
};
use citonphyde::app::service::Ports;
use citonphyde::error::{SensorError, TimerError, UploadError};
use citonphyde::scheduler::UploadFlag;
use citonphyde::sensors::{Measurement, Reading};
use citonphyde::wifi_state::WifiState;

/// A fresh flag per test; the global one is shared across test threads.
pub fn leaked_flag() -> &'static UploadFlag {
    Box::leak(Box::new(UploadFlag::new()))
}

// ── WiFi ──────────────────────────────────────────────────────

pub struct MockWifi {
    pub state: WifiState,
    pub credential_resets: u32,
}

impl MockWifi {
    pub fn new(state: WifiState) -> Self {
        Self {
            state,
            credential_resets: 0,
        }
    }
}

impl WifiPort for MockWifi {
    fn current_state(&self) -> WifiState {
        self.state
    }

    fn reset_credentials(&mut self) {
        self.credential_resets += 1;
    }
}

// ── Display ───────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum DisplayCall {
    Clear,
    Text { text: String, color: Color },
}

#[derive(Default)]
pub struct MockDisplay {
    pub calls: Vec<DisplayCall>,
}

#[allow(dead_code)]
impl MockDisplay {
    pub fn clears(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, DisplayCall::Clear))
            .count()
    }

    pub fn shows(&self, needle: &str) -> bool {
        self.calls
            .iter()
            .any(|c| matches!(c, DisplayCall::Text { text, .. } if text == needle))
    }

    pub fn last_text(&self) -> Option<&str> {
        self.calls.iter().rev().find_map(|c| match c {
            DisplayCall::Text { text, .. } => Some(text.as_str()),
            DisplayCall::Clear => None,
        })
    }

    pub fn reset(&mut self) {
        self.calls.clear();
    }
}

impl DisplayPort for MockDisplay {
    fn clear(&mut self) {
        self.calls.push(DisplayCall::Clear);
    }

    fn draw_text(&mut self, _x: i32, _y: i32, text: &str, color: Color, _size: u8) {
        self.calls.push(DisplayCall::Text {
            text: text.to_string(),
            color,
        });
    }
}

// ── Sensor ────────────────────────────────────────────────────

/// Replays a script, then repeats `fallback` forever.
pub struct MockSensor {
    script: VecDeque<Result<Measurement, SensorError>>,
    fallback: Result<Measurement, SensorError>,
    pub reads: u32,
}

#[allow(dead_code)]
impl MockSensor {
    pub fn healthy(temperature_c: f32, humidity_pct: f32) -> Self {
        Self {
            script: VecDeque::new(),
            fallback: Ok(Measurement {
                temperature_c,
                humidity_pct,
            }),
            reads: 0,
        }
    }

    pub fn failing(error: SensorError) -> Self {
        Self {
            script: VecDeque::new(),
            fallback: Err(error),
            reads: 0,
        }
    }

    pub fn then(mut self, next: Result<Measurement, SensorError>) -> Self {
        self.script.push_back(next);
        self
    }
}

impl SensorPort for MockSensor {
    fn try_read(&mut self) -> Result<Measurement, SensorError> {
        self.reads += 1;
        self.script.pop_front().unwrap_or(self.fallback)
    }
}

// ── Uploader ──────────────────────────────────────────────────

#[derive(Default)]
pub struct MockUploader {
    pub sent: Vec<(Reading, String)>,
    pub fail_with: Option<UploadError>,
}

impl UploadPort for MockUploader {
    fn send(&mut self, reading: &Reading, device_id: &str) -> Result<(), UploadError> {
        if let Some(e) = self.fail_with {
            return Err(e);
        }
        self.sent.push((*reading, device_id.to_string()));
        Ok(())
    }
}

// ── Timer ─────────────────────────────────────────────────────

#[derive(Default)]
pub struct MockTimer {
    pub armed_ms: Option<u32>,
    pub fail_with: Option<TimerError>,
}

impl UploadTimerPort for MockTimer {
    fn arm(&mut self, period_ms: u32) -> Result<(), TimerError> {
        if let Some(e) = self.fail_with {
            return Err(e);
        }
        self.armed_ms = Some(period_ms);
        Ok(())
    }

    fn disarm(&mut self) {
        self.armed_ms = None;
    }

    fn is_armed(&self) -> bool {
        self.armed_ms.is_some()
    }
}

// ── System ────────────────────────────────────────────────────

#[derive(Default)]
pub struct MockSystem {
    pub delays: Vec<u32>,
    pub restarts: u32,
}

impl SystemPort for MockSystem {
    fn delay_ms(&mut self, ms: u32) {
        self.delays.push(ms);
    }

    fn restart(&mut self) {
        self.restarts += 1;
    }
}

// ── Event sink ────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn redraws(&self) -> Vec<WifiState> {
        self.events
            .iter()
            .filter_map(|e| match e {
                AppEvent::Redrawn(s) => Some(*s),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── Bundle ────────────────────────────────────────────────────

pub type MockPorts = Ports<MockWifi, MockDisplay, MockSensor, MockUploader, MockSystem>;

pub fn mock_ports(state: WifiState) -> MockPorts {
    Ports {
        wifi: MockWifi::new(state),
        display: MockDisplay::default(),
        sensor: MockSensor::healthy(22.5, 45.0),
        uploader: MockUploader::default(),
        system: MockSystem::default(),
    }
}
