//! Hold-to-reset button driver.
//!
//! ## Hardware
//!
//! Active-low momentary switch on the BOOT pin (internal pull-up).  The
//! main loop samples the level once per iteration and feeds it to
//! [`ResetButton::poll`] together with the monotonic time.
//!
//! ## States
//!
//! | State            | Leaves on                    | Action reported   |
//! |------------------|------------------------------|-------------------|
//! | `Idle`           | pin active                   | `Pressed`         |
//! | `PressedWaiting` | pin inactive before hold     | `Released`        |
//! | `PressedWaiting` | held >= `hold_ms`            | `HoldElapsed`     |
//! | `Resetting`      | never (terminal)             |                   |
//!
//! The hold is measured only while the pin stays continuously active: any
//! inactive sample drops back to `Idle` and the next press starts a fresh
//! measurement.  This is the only debouncing needed, a bounce can only
//! shorten a hold, never lengthen it.

/// Default continuous hold before a factory reset.
pub const DEFAULT_HOLD_MS: u32 = 3_000;

/// What the caller must do after a poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonAction {
    None,
    /// Idle → PressedWaiting.
    Pressed,
    /// PressedWaiting → Idle.
    Released { held_ms: u32 },
    /// PressedWaiting → Resetting.  Reported exactly once.
    HoldElapsed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonState {
    Idle,
    PressedWaiting { since_ms: u32 },
    Resetting,
}

pub struct ResetButton {
    state: ButtonState,
    hold_ms: u32,
}

impl ResetButton {
    pub fn new(hold_ms: u32) -> Self {
        Self {
            state: ButtonState::Idle,
            hold_ms,
        }
    }

    pub fn state(&self) -> ButtonState {
        self.state
    }

    /// `true` while a press is being timed.
    pub fn is_pressed(&self) -> bool {
        matches!(self.state, ButtonState::PressedWaiting { .. })
    }

    pub fn is_resetting(&self) -> bool {
        self.state == ButtonState::Resetting
    }

    /// Advance the state machine with one pin sample.
    /// `now_ms` wraps; elapsed time uses `wrapping_sub`.
    pub fn poll(&mut self, active: bool, now_ms: u32) -> ButtonAction {
        match self.state {
            ButtonState::Idle => {
                if active {
                    self.state = ButtonState::PressedWaiting { since_ms: now_ms };
                    return ButtonAction::Pressed;
                }
                ButtonAction::None
            }

            ButtonState::PressedWaiting { since_ms } => {
                let held_ms = now_ms.wrapping_sub(since_ms);

                if !active {
                    self.state = ButtonState::Idle;
                    return ButtonAction::Released { held_ms };
                }

                if held_ms >= self.hold_ms {
                    self.state = ButtonState::Resetting;
                    return ButtonAction::HoldElapsed;
                }

                ButtonAction::None
            }

            ButtonState::Resetting => ButtonAction::None,
        }
    }
}

/// Sample the physical button.  `true` = pressed.
#[cfg(target_os = "espidf")]
pub fn is_pressed_hw() -> bool {
    !crate::drivers::hw_init::gpio_read(crate::pins::BUTTON_GPIO)
}

#[cfg(not(target_os = "espidf"))]
pub fn is_pressed_hw() -> bool {
    false
}
