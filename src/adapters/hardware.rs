//! Hardware adapters, bridging `embedded-hal` peripherals to the subsystem
//! port traits.
//!
//! Each adapter owns the pins and drivers of exactly one subsystem, so pin
//! ownership is enforced by the type system.  The same adapters run against
//! ESP-IDF `PinDriver`/`LedcDriver` on target and against
//! [`drivers::sim`](crate::drivers::sim) pins in host tests.

use embedded_hal::digital::{InputPin, OutputPin};

use crate::app::ports::{IntakeIo, PhotoboothIo, TurntableIo};
use crate::drivers::motor::{Direction, Motor, MotorDrive};
use crate::drivers::status_led::{LedBank, LedPattern};
use crate::drivers::stepper::Stepper;
use crate::error::GpioError;

fn read<P: InputPin>(pin: &mut P) -> Result<bool, GpioError> {
    pin.is_high().map_err(|_| GpioError::ReadFailed)
}

fn write<P: OutputPin>(pin: &mut P, high: bool) -> Result<(), GpioError> {
    let res = if high { pin.set_high() } else { pin.set_low() };
    res.map_err(|_| GpioError::WriteFailed)
}

// ── Intake ────────────────────────────────────────────────────

pub struct IntakeHardware<BEAM, IM, TM, TH> {
    beam_break: BEAM,
    intake_motor: IM,
    top_motor: TM,
    teeth_motor: TH,
}

impl<BEAM, IM, TM, TH> IntakeHardware<BEAM, IM, TM, TH>
where
    BEAM: InputPin,
    IM: Motor,
    TM: Motor,
    TH: Motor,
{
    /// Pass [`NoMotor`](crate::drivers::motor::NoMotor) for an unfitted
    /// teeth roller.
    pub fn new(beam_break: BEAM, intake_motor: IM, top_motor: TM, teeth_motor: TH) -> Self {
        Self {
            beam_break,
            intake_motor,
            top_motor,
            teeth_motor,
        }
    }
}

impl<BEAM, IM, TM, TH> IntakeIo for IntakeHardware<BEAM, IM, TM, TH>
where
    BEAM: InputPin,
    IM: Motor,
    TM: Motor,
    TH: Motor,
{
    fn beam_break_high(&mut self) -> Result<bool, GpioError> {
        read(&mut self.beam_break)
    }

    fn drive_intake_motor(&mut self, drive: MotorDrive) -> Result<(), GpioError> {
        self.intake_motor.drive(drive)
    }

    fn drive_top_motor(&mut self, drive: MotorDrive) -> Result<(), GpioError> {
        self.top_motor.drive(drive)
    }

    fn drive_teeth_motor(&mut self, drive: MotorDrive) -> Result<(), GpioError> {
        self.teeth_motor.drive(drive)
    }
}

// ── Turntable ─────────────────────────────────────────────────

pub struct TurntableHardware<UP, LO, STEP, DIR, EN, SPIN> {
    upper_limit: UP,
    lower_limit: LO,
    lift: Stepper<STEP, DIR, EN>,
    spin_enable: SPIN,
}

impl<UP, LO, STEP, DIR, EN, SPIN> TurntableHardware<UP, LO, STEP, DIR, EN, SPIN>
where
    UP: InputPin,
    LO: InputPin,
    STEP: OutputPin,
    DIR: OutputPin,
    EN: OutputPin,
    SPIN: OutputPin,
{
    pub fn new(
        upper_limit: UP,
        lower_limit: LO,
        lift: Stepper<STEP, DIR, EN>,
        spin_enable: SPIN,
    ) -> Self {
        Self {
            upper_limit,
            lower_limit,
            lift,
            spin_enable,
        }
    }
}

impl<UP, LO, STEP, DIR, EN, SPIN> TurntableIo for TurntableHardware<UP, LO, STEP, DIR, EN, SPIN>
where
    UP: InputPin,
    LO: InputPin,
    STEP: OutputPin,
    DIR: OutputPin,
    EN: OutputPin,
    SPIN: OutputPin,
{
    fn upper_limit_high(&mut self) -> Result<bool, GpioError> {
        read(&mut self.upper_limit)
    }

    fn lower_limit_high(&mut self) -> Result<bool, GpioError> {
        read(&mut self.lower_limit)
    }

    fn set_lift(&mut self, enabled: bool, direction: Direction) -> Result<(), GpioError> {
        self.lift.set_direction(direction)?;
        self.lift.set_enabled(enabled)
    }

    fn toggle_lift_step(&mut self) -> Result<(), GpioError> {
        self.lift.toggle_step()
    }

    fn set_spin(&mut self, on: bool) -> Result<(), GpioError> {
        write(&mut self.spin_enable, on)
    }
}

// ── Photobooth ────────────────────────────────────────────────

pub struct PhotoboothHardware<UP, LO, LIFT, STEP, B, Y, G> {
    upper_limit: UP,
    lower_limit: LO,
    lift: LIFT,
    turn_step: STEP,
    leds: LedBank<B, Y, G>,
}

impl<UP, LO, LIFT, STEP, B, Y, G> PhotoboothHardware<UP, LO, LIFT, STEP, B, Y, G>
where
    UP: InputPin,
    LO: InputPin,
    LIFT: Motor,
    STEP: OutputPin,
    B: OutputPin,
    Y: OutputPin,
    G: OutputPin,
{
    pub fn new(
        upper_limit: UP,
        lower_limit: LO,
        lift: LIFT,
        turn_step: STEP,
        leds: LedBank<B, Y, G>,
    ) -> Self {
        Self {
            upper_limit,
            lower_limit,
            lift,
            turn_step,
            leds,
        }
    }
}

impl<UP, LO, LIFT, STEP, B, Y, G> PhotoboothIo for PhotoboothHardware<UP, LO, LIFT, STEP, B, Y, G>
where
    UP: InputPin,
    LO: InputPin,
    LIFT: Motor,
    STEP: OutputPin,
    B: OutputPin,
    Y: OutputPin,
    G: OutputPin,
{
    fn upper_limit_high(&mut self) -> Result<bool, GpioError> {
        read(&mut self.upper_limit)
    }

    fn lower_limit_high(&mut self) -> Result<bool, GpioError> {
        read(&mut self.lower_limit)
    }

    fn drive_lift(&mut self, drive: MotorDrive) -> Result<(), GpioError> {
        self.lift.drive(drive)
    }

    fn set_turn_step(&mut self, high: bool) -> Result<(), GpioError> {
        write(&mut self.turn_step, high)
    }

    fn show_leds(&mut self, pattern: LedPattern) -> Result<(), GpioError> {
        self.leds.show(pattern)
    }
}
