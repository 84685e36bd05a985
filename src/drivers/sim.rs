//! Simulated `embedded-hal` pins for host builds.
//!
//! Each handle shares its level through an `Rc<Cell<_>>`, so a test keeps a
//! clone to drive inputs and inspect outputs while the hardware adapter owns
//! the other clone, the way it would own a real `PinDriver`.

use core::cell::Cell;
use core::convert::Infallible;
use std::rc::Rc;

use embedded_hal::digital::{self, InputPin, OutputPin};
use embedded_hal::pwm::{self, SetDutyCycle};

/// Simulated digital pin, usable as input or output.
#[derive(Debug, Clone)]
pub struct SimPin {
    level: Rc<Cell<bool>>,
}

impl SimPin {
    pub fn new(high: bool) -> Self {
        Self {
            level: Rc::new(Cell::new(high)),
        }
    }

    /// Drive the simulated level (for inputs).
    pub fn set(&self, high: bool) {
        self.level.set(high);
    }

    /// Current level, whatever side last wrote it.
    pub fn level(&self) -> bool {
        self.level.get()
    }
}

impl digital::ErrorType for SimPin {
    type Error = Infallible;
}

impl InputPin for SimPin {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.level.get())
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.level.get())
    }
}

impl OutputPin for SimPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.level.set(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.level.set(true);
        Ok(())
    }
}

/// Simulated 8-bit PWM channel.
#[derive(Debug, Clone)]
pub struct SimPwm {
    duty: Rc<Cell<u16>>,
}

impl SimPwm {
    pub const MAX_DUTY: u16 = 255;

    pub fn new() -> Self {
        Self {
            duty: Rc::new(Cell::new(0)),
        }
    }

    pub fn duty(&self) -> u16 {
        self.duty.get()
    }
}

impl Default for SimPwm {
    fn default() -> Self {
        Self::new()
    }
}

impl pwm::ErrorType for SimPwm {
    type Error = Infallible;
}

impl SetDutyCycle for SimPwm {
    fn max_duty_cycle(&self) -> u16 {
        Self::MAX_DUTY
    }

    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
        self.duty.set(duty.min(Self::MAX_DUTY));
        Ok(())
    }
}
