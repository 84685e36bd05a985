//! Disc-handling module node firmware library.
//!
//! Exposes the module framework, the subsystem state machines and their
//! adapters for integration testing.  ESP-IDF specifics are guarded by
//! `#[cfg(target_os = "espidf")]` within each module; everything else runs
//! on the host against simulated pins.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod drivers;
pub mod fsm;
pub mod module;
pub mod scheduler;
pub mod sensors;
pub mod subsystems;

mod error;

pub use error::{CommandError, ConfigError, Error, GpioError, RegistryError};
