//! Port traits, the hexagonal boundary between the state machines and
//! the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ Subsystem / NodeService (domain)
//! ```
//!
//! Hardware adapters (pins, motors, LEDs), telemetry sinks and clocks
//! implement these traits.  Subsystems consume them via generics, so the
//! state machines never touch a pin directly and run unchanged against
//! simulated I/O in tests.

use crate::drivers::motor::{Direction, MotorDrive};
use crate::drivers::status_led::LedPattern;
use crate::error::GpioError;

use super::events::NodeEvent;

// ───────────────────────────────────────────────────────────────
// Subsystem I/O ports (driven adapters: domain ↔ hardware)
// ───────────────────────────────────────────────────────────────

/// Intake rollers and beam break.
pub trait IntakeIo {
    /// Raw beam-break pin level.
    fn beam_break_high(&mut self) -> Result<bool, GpioError>;

    fn drive_intake_motor(&mut self, drive: MotorDrive) -> Result<(), GpioError>;

    fn drive_top_motor(&mut self, drive: MotorDrive) -> Result<(), GpioError>;

    /// No-op on boards without the teeth roller.
    fn drive_teeth_motor(&mut self, drive: MotorDrive) -> Result<(), GpioError>;
}

/// Stepper lift, spin motor and lift limit switches.
pub trait TurntableIo {
    fn upper_limit_high(&mut self) -> Result<bool, GpioError>;

    fn lower_limit_high(&mut self) -> Result<bool, GpioError>;

    /// Enable or disable the lift stepper and latch its direction
    /// (`Forward` = up).
    fn set_lift(&mut self, enabled: bool, direction: Direction) -> Result<(), GpioError>;

    /// Flip the lift step line.
    fn toggle_lift_step(&mut self) -> Result<(), GpioError>;

    fn set_spin(&mut self, on: bool) -> Result<(), GpioError>;
}

/// DC lift, turntable stepper and status LEDs.
pub trait PhotoboothIo {
    fn upper_limit_high(&mut self) -> Result<bool, GpioError>;

    fn lower_limit_high(&mut self) -> Result<bool, GpioError>;

    /// Drive the lift motor (`Forward` = up).
    fn drive_lift(&mut self, drive: MotorDrive) -> Result<(), GpioError>;

    /// Set the turntable step line.
    fn set_turn_step(&mut self, high: bool) -> Result<(), GpioError>;

    fn show_leds(&mut self, pattern: LedPattern) -> Result<(), GpioError>;
}

// ───────────────────────────────────────────────────────────────
// Telemetry sink (driven adapter: domain → log / controller link)
// ───────────────────────────────────────────────────────────────

/// The node emits structured [`NodeEvent`]s through this port.
pub trait TelemetrySink {
    fn emit(&mut self, event: &NodeEvent);
}

// ───────────────────────────────────────────────────────────────
// Clock (driven adapter: monotonic time source)
// ───────────────────────────────────────────────────────────────

pub trait Clock {
    /// Milliseconds since boot.
    fn now_ms(&self) -> u64;
}
