//! Step/dir/enable stepper driver (A4988-style carrier).
//!
//! The driver only latches pin levels; pulse timing comes from the owning
//! subsystem's tick, so nothing here blocks.

use embedded_hal::digital::OutputPin;

use crate::config::ActiveLevel;
use crate::drivers::motor::Direction;
use crate::error::GpioError;

pub struct Stepper<STEP, DIR, EN> {
    step: STEP,
    dir: DIR,
    enable: EN,
    /// Direction pin level for `Direction::Forward`.
    forward_level: ActiveLevel,
    step_high: bool,
    enabled: bool,
}

impl<STEP: OutputPin, DIR: OutputPin, EN: OutputPin> Stepper<STEP, DIR, EN> {
    /// Enable is active-high.
    pub fn new(step: STEP, dir: DIR, enable: EN, forward_level: ActiveLevel) -> Self {
        Self {
            step,
            dir,
            enable,
            forward_level,
            step_high: false,
            enabled: false,
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) -> Result<(), GpioError> {
        write(&mut self.enable, enabled)?;
        self.enabled = enabled;
        Ok(())
    }

    pub fn set_direction(&mut self, direction: Direction) -> Result<(), GpioError> {
        let forward_high = self.forward_level == ActiveLevel::High;
        let high = match direction {
            Direction::Forward => forward_high,
            Direction::Reverse => !forward_high,
        };
        write(&mut self.dir, high)
    }

    pub fn set_step(&mut self, high: bool) -> Result<(), GpioError> {
        write(&mut self.step, high)?;
        self.step_high = high;
        Ok(())
    }

    /// Flip the step line; two toggles make one micro-step.
    pub fn toggle_step(&mut self) -> Result<(), GpioError> {
        self.set_step(!self.step_high)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

fn write<P: OutputPin>(pin: &mut P, high: bool) -> Result<(), GpioError> {
    let res = if high { pin.set_high() } else { pin.set_low() };
    res.map_err(|_| GpioError::WriteFailed)
}
