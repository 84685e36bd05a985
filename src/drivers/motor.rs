//! Brushed DC motor driver (PWM speed + direction pin H-bridge).
//!
//! Used for the intake, top and teeth rollers and the photobooth lift.
//! Speed is the 0-255 value from the board configuration and is scaled to
//! whatever duty range the PWM channel exposes.

use embedded_hal::digital::OutputPin;
use embedded_hal::pwm::SetDutyCycle;

use crate::config::ActiveLevel;
use crate::error::GpioError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Reverse,
}

/// What a motor should be doing this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MotorDrive {
    #[default]
    Stopped,
    Run { speed: u8, direction: Direction },
}

impl MotorDrive {
    pub fn forward(speed: u8) -> Self {
        Self::Run {
            speed,
            direction: Direction::Forward,
        }
    }

    pub fn reverse(speed: u8) -> Self {
        Self::Run {
            speed,
            direction: Direction::Reverse,
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self, Self::Run { speed, .. } if *speed > 0)
    }
}

/// Anything that can be told to run or stop.
pub trait Motor {
    fn drive(&mut self, drive: MotorDrive) -> Result<(), GpioError>;
}

/// Slot for a motor that is not fitted on this board.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoMotor;

impl Motor for NoMotor {
    fn drive(&mut self, _drive: MotorDrive) -> Result<(), GpioError> {
        Ok(())
    }
}

/// H-bridge motor: one PWM channel for speed, one GPIO for direction.
pub struct DcMotor<PWM, DIR> {
    pwm: PWM,
    dir: DIR,
    /// Direction pin level that spins the motor forward.
    forward_level: ActiveLevel,
    state: MotorDrive,
}

impl<PWM: SetDutyCycle, DIR: OutputPin> DcMotor<PWM, DIR> {
    pub fn new(pwm: PWM, dir: DIR, forward_level: ActiveLevel) -> Self {
        Self {
            pwm,
            dir,
            forward_level,
            state: MotorDrive::Stopped,
        }
    }

    pub fn state(&self) -> MotorDrive {
        self.state
    }

    fn set_direction_hw(&mut self, direction: Direction) -> Result<(), GpioError> {
        let high = match (direction, self.forward_level) {
            (Direction::Forward, ActiveLevel::High) | (Direction::Reverse, ActiveLevel::Low) => {
                true
            }
            (Direction::Forward, ActiveLevel::Low) | (Direction::Reverse, ActiveLevel::High) => {
                false
            }
        };
        let res = if high { self.dir.set_high() } else { self.dir.set_low() };
        res.map_err(|_| GpioError::WriteFailed)
    }

    fn set_speed_hw(&mut self, speed: u8) -> Result<(), GpioError> {
        self.pwm
            .set_duty_cycle_fraction(u16::from(speed), 255)
            .map_err(|_| GpioError::PwmFailed)
    }
}

impl<PWM: SetDutyCycle, DIR: OutputPin> Motor for DcMotor<PWM, DIR> {
    fn drive(&mut self, drive: MotorDrive) -> Result<(), GpioError> {
        match drive {
            MotorDrive::Run { speed, direction } if speed > 0 => {
                self.set_direction_hw(direction)?;
                self.set_speed_hw(speed)?;
            }
            _ => self.set_speed_hw(0)?,
        }
        self.state = drive;
        Ok(())
    }
}
