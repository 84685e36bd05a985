//! Subsystem state machines, one module per electromechanical unit.
//!
//! Each subsystem owns its I/O port, its [`Fsm`](crate::fsm::Fsm) and its
//! timers, and is driven through the [`Lifecycle`](crate::module::Lifecycle)
//! trait by the module registry.

pub mod capture;
pub mod intake;
pub mod photobooth;
pub mod turntable;

pub use intake::{Intake, IntakeState};
pub use photobooth::{Photobooth, PhotoboothState};
pub use turntable::{Turntable, TurntableState};
