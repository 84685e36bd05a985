//! Photobooth status LEDs.
//!
//! Three discrete LEDs (blue, yellow, green), each wired either active-high
//! or active-low.  The photobooth computes a [`LedPattern`] every tick and
//! the bank drives the pins to match.

use embedded_hal::digital::OutputPin;

use crate::config::ActiveLevel;
use crate::error::GpioError;

/// Which LEDs are lit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LedPattern {
    pub blue: bool,
    pub yellow: bool,
    pub green: bool,
}

impl LedPattern {
    pub const OFF: Self = Self::new(false, false, false);
    pub const ALL: Self = Self::new(true, true, true);

    pub const fn new(blue: bool, yellow: bool, green: bool) -> Self {
        Self { blue, yellow, green }
    }
}

/// LED that remembers its active level and last driven state.
pub struct Led<PIN> {
    pin: PIN,
    active: ActiveLevel,
    is_on: bool,
}

impl<PIN: OutputPin> Led<PIN> {
    /// Wrap a pin, leaving the LED off.
    pub fn new(pin: PIN, active: ActiveLevel) -> Result<Self, GpioError> {
        let mut led = Self {
            pin,
            active,
            is_on: true,
        };
        led.set(false)?;
        Ok(led)
    }

    /// Drive the LED logically on or off.
    pub fn set(&mut self, on: bool) -> Result<(), GpioError> {
        let res = match (self.active, on) {
            (ActiveLevel::High, true) | (ActiveLevel::Low, false) => self.pin.set_high(),
            (ActiveLevel::High, false) | (ActiveLevel::Low, true) => self.pin.set_low(),
        };
        res.map_err(|_| GpioError::WriteFailed)?;
        self.is_on = on;
        Ok(())
    }

    #[inline]
    pub fn is_on(&self) -> bool {
        self.is_on
    }
}

/// Blue/yellow/green LED bank.
pub struct LedBank<B, Y, G> {
    blue: Led<B>,
    yellow: Led<Y>,
    green: Led<G>,
}

impl<B: OutputPin, Y: OutputPin, G: OutputPin> LedBank<B, Y, G> {
    pub fn new(blue: Led<B>, yellow: Led<Y>, green: Led<G>) -> Self {
        Self { blue, yellow, green }
    }

    /// Show `pattern`.  Pins already at the right level are left alone.
    pub fn show(&mut self, pattern: LedPattern) -> Result<(), GpioError> {
        if self.blue.is_on() != pattern.blue {
            self.blue.set(pattern.blue)?;
        }
        if self.yellow.is_on() != pattern.yellow {
            self.yellow.set(pattern.yellow)?;
        }
        if self.green.is_on() != pattern.green {
            self.green.set(pattern.green)?;
        }
        Ok(())
    }

    pub fn pattern(&self) -> LedPattern {
        LedPattern::new(self.blue.is_on(), self.yellow.is_on(), self.green.is_on())
    }
}
