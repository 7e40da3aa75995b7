//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (UART / USB-CDC in production).

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;
use crate::scheduler::UploadOutcome;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started { upload_period_ms } => {
                info!("START | upload every {} s", upload_period_ms / 1000);
            }
            AppEvent::TimerUnavailable => {
                warn!("UPLOAD | timer unavailable, uploads disabled");
            }
            AppEvent::Redrawn(state) => {
                info!("DISPLAY | {}", state);
            }
            AppEvent::ResetPromptShown => {
                info!("BUTTON | pressed, hold to reset WiFi");
            }
            AppEvent::ResetCancelled { held_ms } => {
                info!("BUTTON | released after {} ms", held_ms);
            }
            AppEvent::FactoryReset => {
                warn!("BUTTON | held, resetting WiFi and restarting");
            }
            AppEvent::Upload(outcome) => match outcome {
                UploadOutcome::Sent(r) => {
                    info!(
                        "UPLOAD | sent T={:.1}\u{00b0}C RH={:.1}%",
                        r.temperature_c, r.humidity_pct
                    );
                }
                UploadOutcome::Offline(r) => {
                    info!(
                        "UPLOAD | offline, kept T={:.1}\u{00b0}C RH={:.1}%",
                        r.temperature_c, r.humidity_pct
                    );
                }
                UploadOutcome::SensorFailed(e) => {
                    warn!("UPLOAD | skipped, sensor: {}", e);
                }
                UploadOutcome::SendFailed { error, .. } => {
                    warn!("UPLOAD | failed: {}", error);
                }
            },
        }
    }
}
