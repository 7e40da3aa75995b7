//! Redraw-on-change reconciliation of the WiFi status screen.
//!
//! `last_displayed` is `None` whenever the screen does not show a valid
//! status (boot, after the reset prompt).  Any `Some(state)` means exactly
//! that state's screen is on the panel.

use super::screens::{self, ScreenContext};
use crate::app::ports::DisplayPort;
use crate::wifi_state::WifiState;

/// Pure reconcile step.
///
/// Returns `(did_redraw, new_last_displayed)`.  After the call
/// `new_last_displayed == Some(current)` always holds.
pub fn reconcile(
    current: WifiState,
    last_displayed: Option<WifiState>,
    display: &mut impl DisplayPort,
    ctx: &ScreenContext<'_>,
) -> (bool, Option<WifiState>) {
    if last_displayed == Some(current) {
        return (false, last_displayed);
    }
    display.clear();
    screens::render_state(display, current, ctx);
    (true, Some(current))
}

/// Holds the last rendered state between loop iterations.
#[derive(Debug, Default)]
pub struct DisplayReconciler {
    last_displayed: Option<WifiState>,
}

impl DisplayReconciler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Redraw if `current` differs from what is on screen.
    pub fn reconcile(
        &mut self,
        current: WifiState,
        display: &mut impl DisplayPort,
        ctx: &ScreenContext<'_>,
    ) -> bool {
        let (redrawn, last) = reconcile(current, self.last_displayed, display, ctx);
        self.last_displayed = last;
        redrawn
    }

    /// Something else drew over the status screen; force the next redraw.
    pub fn invalidate(&mut self) {
        self.last_displayed = None;
    }

    pub fn last_displayed(&self) -> Option<WifiState> {
        self.last_displayed
    }
}
