//! Simulated hardware rigs for integration tests.
//!
//! Each rig builds the real hardware adapter over shared simulated pins and
//! keeps its own clones, so tests drive sensor levels and read actuator
//! levels exactly where the GPIO would be.

use discnode::adapters::hardware::{IntakeHardware, PhotoboothHardware, TurntableHardware};
use discnode::app::events::{ModuleReport, NodeEvent};
use discnode::app::ports::TelemetrySink;
use discnode::config::ActiveLevel;
use discnode::drivers::motor::DcMotor;
use discnode::drivers::sim::{SimPin, SimPwm};
use discnode::drivers::status_led::{Led, LedBank};
use discnode::drivers::stepper::Stepper;
use discnode::module::ModuleStatus;

pub type SimMotor = DcMotor<SimPwm, SimPin>;
pub type IntakeSim = IntakeHardware<SimPin, SimMotor, SimMotor, SimMotor>;
pub type TurntableSim = TurntableHardware<SimPin, SimPin, SimPin, SimPin, SimPin, SimPin>;
pub type PhotoboothSim = PhotoboothHardware<SimPin, SimPin, SimMotor, SimPin, SimPin, SimPin, SimPin>;

// ── Motor lines ───────────────────────────────────────────────

/// Test-side view of one H-bridge.
pub struct MotorLines {
    pub pwm: SimPwm,
    pub dir: SimPin,
    forward_level: ActiveLevel,
}

#[allow(dead_code)]
impl MotorLines {
    fn new(forward_level: ActiveLevel) -> (Self, SimMotor) {
        let pwm = SimPwm::new();
        let dir = SimPin::new(!forward_level.is_asserted(true));
        let motor = DcMotor::new(pwm.clone(), dir.clone(), forward_level);
        (
            Self {
                pwm,
                dir,
                forward_level,
            },
            motor,
        )
    }

    pub fn running(&self) -> bool {
        self.pwm.duty() > 0
    }

    pub fn forward(&self) -> bool {
        self.running() && self.forward_level.is_asserted(self.dir.level())
    }

    pub fn reverse(&self) -> bool {
        self.running() && !self.forward_level.is_asserted(self.dir.level())
    }
}

// ── Intake ────────────────────────────────────────────────────

/// Active-low beam break, starts clear.  Intake and top rollers run
/// forward with DIR low, the teeth with DIR high, as on module_a.
pub struct IntakeRig {
    pub beam: SimPin,
    pub intake: MotorLines,
    pub top: MotorLines,
    pub teeth: MotorLines,
}

#[allow(dead_code)]
impl IntakeRig {
    pub fn new() -> (Self, IntakeSim) {
        let beam = SimPin::new(true);
        let (intake, intake_motor) = MotorLines::new(ActiveLevel::Low);
        let (top, top_motor) = MotorLines::new(ActiveLevel::Low);
        let (teeth, teeth_motor) = MotorLines::new(ActiveLevel::High);
        let hw = IntakeHardware::new(beam.clone(), intake_motor, top_motor, teeth_motor);
        (
            Self {
                beam,
                intake,
                top,
                teeth,
            },
            hw,
        )
    }

    pub fn break_beam(&self) {
        self.beam.set(false);
    }

    pub fn clear_beam(&self) {
        self.beam.set(true);
    }

    pub fn all_stopped(&self) -> bool {
        !self.intake.running() && !self.top.running() && !self.teeth.running()
    }
}

// ── Turntable ─────────────────────────────────────────────────

/// Active-high limit switches, both released; DIR high raises the lift.
pub struct TurntableRig {
    pub upper: SimPin,
    pub lower: SimPin,
    pub step: SimPin,
    pub dir: SimPin,
    pub enable: SimPin,
    pub spin: SimPin,
}

#[allow(dead_code)]
impl TurntableRig {
    pub fn new() -> (Self, TurntableSim) {
        let rig = Self {
            upper: SimPin::new(false),
            lower: SimPin::new(false),
            step: SimPin::new(false),
            dir: SimPin::new(false),
            enable: SimPin::new(false),
            spin: SimPin::new(false),
        };
        let lift = Stepper::new(
            rig.step.clone(),
            rig.dir.clone(),
            rig.enable.clone(),
            ActiveLevel::High,
        );
        let hw = TurntableHardware::new(rig.upper.clone(), rig.lower.clone(), lift, rig.spin.clone());
        (rig, hw)
    }

    pub fn lift_raising(&self) -> bool {
        self.enable.level() && self.dir.level()
    }

    pub fn lift_lowering(&self) -> bool {
        self.enable.level() && !self.dir.level()
    }
}

// ── Photobooth ────────────────────────────────────────────────

/// Active-low limit switches (pulled up, released).  Blue LED is
/// active-high, yellow and green active-low.
pub struct PhotoboothRig {
    pub upper: SimPin,
    pub lower: SimPin,
    pub lift: MotorLines,
    pub step: SimPin,
    pub blue: SimPin,
    pub yellow: SimPin,
    pub green: SimPin,
}

#[allow(dead_code)]
impl PhotoboothRig {
    pub fn new() -> (Self, PhotoboothSim) {
        let (lift, lift_motor) = MotorLines::new(ActiveLevel::High);
        let rig = Self {
            upper: SimPin::new(true),
            lower: SimPin::new(true),
            lift,
            step: SimPin::new(false),
            blue: SimPin::new(false),
            yellow: SimPin::new(true),
            green: SimPin::new(true),
        };
        let leds = LedBank::new(
            Led::new(rig.blue.clone(), ActiveLevel::High).unwrap(),
            Led::new(rig.yellow.clone(), ActiveLevel::Low).unwrap(),
            Led::new(rig.green.clone(), ActiveLevel::Low).unwrap(),
        );
        let hw = PhotoboothHardware::new(
            rig.upper.clone(),
            rig.lower.clone(),
            lift_motor,
            rig.step.clone(),
            leds,
        );
        (rig, hw)
    }

    /// Lit LEDs as (blue, yellow, green).
    pub fn leds(&self) -> (bool, bool, bool) {
        (self.blue.level(), !self.yellow.level(), !self.green.level())
    }

    pub fn press_upper(&self) {
        self.upper.set(false);
    }

    pub fn press_lower(&self) {
        self.lower.set(false);
    }
}

// ── Recording telemetry sink ──────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<NodeEvent>,
}

impl TelemetrySink for RecordingSink {
    fn emit(&mut self, event: &NodeEvent) {
        self.events.push(event.clone());
    }
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn reports<'s>(&'s self, module: &'s str) -> impl Iterator<Item = &'s ModuleReport> + 's {
        self.events.iter().filter_map(move |e| match e {
            NodeEvent::ModuleReport(r) if r.module.as_str() == module => Some(r),
            _ => None,
        })
    }

    pub fn last_report(&self, module: &str) -> Option<ModuleReport> {
        self.reports(module).last().cloned()
    }

    pub fn completions(&self, module: &str) -> usize {
        self.reports(module)
            .filter(|r| r.status == ModuleStatus::Complete)
            .count()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
