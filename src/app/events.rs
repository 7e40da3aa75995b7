//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them (serial log, test recorder, ...).

use crate::scheduler::UploadOutcome;
use crate::wifi_state::WifiState;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The service has started and armed the upload timer.
    Started { upload_period_ms: u32 },

    /// The upload timer could not be armed; uploads are disabled.
    TimerUnavailable,

    /// The reconciler drew a new status screen.
    Redrawn(WifiState),

    /// The reset button went active; the hold prompt is on screen.
    ResetPromptShown,

    /// The button was released before the hold threshold.
    ResetCancelled { held_ms: u32 },

    /// The hold threshold was reached; credentials are being erased.
    FactoryReset,

    /// One upload period was processed.
    Upload(UploadOutcome),
}
