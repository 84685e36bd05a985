//! Uniform module lifecycle.
//!
//! Every subsystem (intake, turntable, photobooth) implements [`Lifecycle`]
//! and is registered by name into the [`registry::ModuleRegistry`], which
//! routes commands and derives the published [`ModuleStatus`].

pub mod registry;

use heapless::String;
use serde::{Deserialize, Serialize};

use crate::config::NAME_CAPACITY;

pub use registry::{DispatchOutcome, ModuleHandle, ModuleRegistry, ModuleSnapshot};

/// Fixed-capacity module name.
pub type ModuleName = String<NAME_CAPACITY>;

/// Externally published module status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum ModuleStatus {
    Idle = 0,
    Running = 1,
    /// Held for exactly one tick after the module finishes.
    Complete = 2,
}

impl ModuleStatus {
    pub fn code(self) -> u8 {
        self as u8
    }
}

/// Result of advancing a module by one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    /// Not running a sequence.
    Idle,
    /// Sequence in progress.
    Busy,
    /// The sequence finished on this tick.
    Completed,
}

/// Capability object the registry drives.
///
/// Implementations never block: `poll` does at most one tick of work and
/// `stop` always lands in the idle state regardless of pending timers.
pub trait Lifecycle {
    /// Begin a new sequence.
    fn start(&mut self, now_ms: u64);

    /// Advance one tick.
    fn poll(&mut self, now_ms: u64) -> Progress;

    /// `true` when no sequence is in progress.
    fn is_complete(&self) -> bool;

    /// Abort any sequence and switch every actuator off.
    fn stop(&mut self, now_ms: u64);

    fn calibrate(&mut self);

    /// Current subsystem state as its wire integer.
    fn state_code(&self) -> u8;
}
