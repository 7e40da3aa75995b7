//! Status display: the redraw-on-change reconciler and the screens it draws.

pub mod reconciler;
pub mod screens;

pub use reconciler::{reconcile, DisplayReconciler};
pub use screens::ScreenContext;
