//! Smart home controller firmware library.
//!
//! Exposes the arbitration core, handlers and scheduler for integration
//! testing.  All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod arbiter;
pub mod clock;
pub mod config;
pub mod diagnostics;
pub mod drivers;
pub mod error;
pub mod handlers;
pub mod pins;
pub mod scheduler;
pub mod sensors;
