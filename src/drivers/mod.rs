//! Button, upload timer, watchdog, and GPIO helpers.

pub mod button;
pub mod hw_init;
pub mod hw_timer;
pub mod watchdog;
