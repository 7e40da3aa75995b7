//! Status screens, drawn with the [`DisplayPort`] text primitives.
//!
//! Layout targets a 240 × 320 portrait panel: size-2 text is 10 × 20 px,
//! size-1 text is 6 × 10 px.  Renderers assume a cleared screen.

use crate::app::ports::{Color, DisplayPort};
use crate::wifi_state::WifiState;

const MARGIN_X: i32 = 10;
const TITLE_Y: i32 = 40;
const LINE: i32 = 25;

/// Values the status screens show besides the state itself.
#[derive(Debug, Clone, Copy)]
pub struct ScreenContext<'a> {
    pub ap_name: &'a str,
    pub device_id: &'a str,
    pub server_url: &'a str,
}

/// Draw the screen for `state`.
pub fn render_state(display: &mut impl DisplayPort, state: WifiState, ctx: &ScreenContext<'_>) {
    match state {
        WifiState::ConfigMode => config_mode(display, ctx),
        WifiState::Connecting => connecting(display),
        WifiState::Connected => connected(display, ctx),
        WifiState::Error => error(display),
    }
}

fn config_mode(d: &mut impl DisplayPort, ctx: &ScreenContext<'_>) {
    d.draw_text(MARGIN_X, TITLE_Y, "WiFi Setup", Color::Yellow, 2);
    d.draw_text(MARGIN_X, TITLE_Y + 2 * LINE, "Join network:", Color::White, 2);
    d.draw_text(MARGIN_X, TITLE_Y + 3 * LINE, ctx.ap_name, Color::Cyan, 2);
    d.draw_text(MARGIN_X, TITLE_Y + 5 * LINE, "to configure WiFi", Color::White, 2);
}

fn connecting(d: &mut impl DisplayPort) {
    d.draw_text(MARGIN_X, 100, "Connecting", Color::Yellow, 2);
    d.draw_text(MARGIN_X, 125, "to WiFi...", Color::Yellow, 2);
}

fn connected(d: &mut impl DisplayPort, ctx: &ScreenContext<'_>) {
    d.draw_text(MARGIN_X, TITLE_Y, "WiFi Connected", Color::Green, 2);
    d.draw_text(MARGIN_X, TITLE_Y + 2 * LINE, "Device ID:", Color::White, 2);
    d.draw_text(MARGIN_X, TITLE_Y + 3 * LINE, ctx.device_id, Color::Cyan, 2);
    d.draw_text(MARGIN_X, TITLE_Y + 5 * LINE, "Server:", Color::White, 2);
    d.draw_text(MARGIN_X, TITLE_Y + 6 * LINE, ctx.server_url, Color::White, 1);
}

fn error(d: &mut impl DisplayPort) {
    d.draw_text(MARGIN_X, 100, "WiFi Error", Color::Red, 2);
    d.draw_text(MARGIN_X, 150, "Hold button 3s", Color::White, 2);
    d.draw_text(MARGIN_X, 175, "to reset WiFi", Color::White, 2);
}

/// Shown while the reset button is being held.
pub fn reset_prompt(d: &mut impl DisplayPort) {
    d.clear();
    d.draw_text(MARGIN_X, 100, "Hold for 3 seconds", Color::Yellow, 2);
    d.draw_text(MARGIN_X, 125, "to reset WiFi", Color::Yellow, 2);
}

/// Shown once the hold threshold is reached, just before the restart.
pub fn resetting(d: &mut impl DisplayPort) {
    d.clear();
    d.draw_text(MARGIN_X, 100, "Resetting WiFi...", Color::Cyan, 2);
}
