//! Citonphyde sensor node firmware library.
//!
//! Exposes the pure-logic modules for integration testing and external
//! inspection. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod display;
pub mod error;
pub mod scheduler;
pub mod wifi_state;

pub mod pins;

// The adapters and drivers carry a simulation backend on the host, so
// the crate compiles and tests everywhere.
pub mod adapters;
pub mod drivers;
pub mod sensors;
