//! Photobooth: DC lift, stepper turntable and three status LEDs.
//!
//! ```text
//!   IDLE ──start──▶ RISING ──upper limit──▶ TURNING ──sweep done / confirm──▶ LOWERING
//!    ▲                                                                          │
//!    └─────────────────────────── lower limit (COMPLETE) ◀──────────────────────┘
//! ```
//!
//! TURNING either dwells for a fixed time or runs the step-and-flash
//! [`CaptureSequence`], depending on [`TurnMode`].  The LED pattern is a
//! pure function of state and capture phase, recomputed every tick.

use log::{info, warn};

use crate::app::ports::PhotoboothIo;
use crate::config::{PhotoboothConfig, TurnMode};
use crate::drivers::motor::MotorDrive;
use crate::drivers::status_led::LedPattern;
use crate::error::GpioError;
use crate::fsm::{Fsm, StateClock, StateDescriptor, StateId, Timed};
use crate::module::{Lifecycle, Progress};
use crate::sensors::BinarySensor;

use super::capture::{CapturePhase, CaptureSequence};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PhotoboothState {
    Idle = 0,
    Rising = 1,
    Turning = 2,
    Lowering = 3,
}

impl StateId for PhotoboothState {
    fn index(self) -> usize {
        self as usize
    }
}

/// LED pattern for a state; `phase` only matters while turning.
pub fn led_pattern(state: PhotoboothState, phase: CapturePhase) -> LedPattern {
    match state {
        PhotoboothState::Idle => LedPattern::new(true, false, false),
        PhotoboothState::Rising => LedPattern::new(false, true, false),
        PhotoboothState::Turning if phase == CapturePhase::Flash => LedPattern::ALL,
        PhotoboothState::Turning => LedPattern::new(false, false, true),
        PhotoboothState::Lowering => LedPattern::new(true, true, false),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhotoboothOutputs {
    pub lift: MotorDrive,
    pub turn_step: bool,
    pub leds: LedPattern,
}

#[derive(Debug)]
pub struct PhotoboothContext {
    clock: StateClock,
    config: PhotoboothConfig,
    upper: bool,
    lower: bool,
    capture: CaptureSequence,
    outputs: PhotoboothOutputs,
    turn_confirmed: bool,
    completed: bool,
}

impl Timed for PhotoboothContext {
    fn clock(&mut self) -> &mut StateClock {
        &mut self.clock
    }
}

// ---------------------------------------------------------------------------
// State handlers
// ---------------------------------------------------------------------------

fn idle_enter(ctx: &mut PhotoboothContext) {
    ctx.outputs.lift = MotorDrive::Stopped;
    ctx.outputs.turn_step = false;
}

fn idle_update(ctx: &mut PhotoboothContext) -> Option<PhotoboothState> {
    idle_enter(ctx);
    None
}

fn rising_enter(ctx: &mut PhotoboothContext) {
    ctx.outputs.lift = MotorDrive::forward(ctx.config.lift_speed);
}

fn rising_update(ctx: &mut PhotoboothContext) -> Option<PhotoboothState> {
    ctx.upper.then_some(PhotoboothState::Turning)
}

fn turning_enter(ctx: &mut PhotoboothContext) {
    ctx.outputs.lift = MotorDrive::Stopped;
    ctx.turn_confirmed = false;
    if let TurnMode::Capture(_) = ctx.config.turn {
        ctx.capture = CaptureSequence::begin(ctx.clock.now_ms);
        ctx.outputs.turn_step = ctx.capture.step_high();
    }
}

fn turning_update(ctx: &mut PhotoboothContext) -> Option<PhotoboothState> {
    let finished = match ctx.config.turn {
        TurnMode::Dwell { dwell_ms } => ctx.clock.elapsed_ms() > u64::from(dwell_ms),
        TurnMode::Capture(cfg) => {
            if let Some(phase) = ctx.capture.advance(ctx.clock.now_ms, &cfg) {
                if phase == CapturePhase::Flash {
                    info!("photobooth: view {} captured", ctx.capture.view() + 1);
                }
            }
            ctx.outputs.turn_step = ctx.capture.step_high();
            ctx.capture.is_done()
        }
    };
    (ctx.turn_confirmed || finished).then_some(PhotoboothState::Lowering)
}

fn turning_exit(ctx: &mut PhotoboothContext) {
    ctx.outputs.turn_step = false;
    ctx.capture = CaptureSequence::default();
}

fn lowering_enter(ctx: &mut PhotoboothContext) {
    ctx.outputs.lift = MotorDrive::reverse(ctx.config.lift_speed);
}

fn lowering_update(ctx: &mut PhotoboothContext) -> Option<PhotoboothState> {
    if ctx.lower {
        ctx.completed = true;
        Some(PhotoboothState::Idle)
    } else {
        None
    }
}

fn build_state_table() -> [StateDescriptor<PhotoboothState, PhotoboothContext>; 4] {
    [
        StateDescriptor {
            id: PhotoboothState::Idle,
            name: "IDLE",
            on_enter: Some(idle_enter),
            on_exit: None,
            on_update: idle_update,
        },
        StateDescriptor {
            id: PhotoboothState::Rising,
            name: "RISING",
            on_enter: Some(rising_enter),
            on_exit: None,
            on_update: rising_update,
        },
        StateDescriptor {
            id: PhotoboothState::Turning,
            name: "TURNING",
            on_enter: Some(turning_enter),
            on_exit: Some(turning_exit),
            on_update: turning_update,
        },
        StateDescriptor {
            id: PhotoboothState::Lowering,
            name: "LOWERING",
            on_enter: Some(lowering_enter),
            on_exit: None,
            on_update: lowering_update,
        },
    ]
}

// ---------------------------------------------------------------------------
// Module
// ---------------------------------------------------------------------------

pub struct Photobooth<P> {
    io: P,
    fsm: Fsm<PhotoboothState, PhotoboothContext, 4>,
    ctx: PhotoboothContext,
    upper: BinarySensor,
    lower: BinarySensor,
    applied: Option<PhotoboothOutputs>,
}

impl<P: PhotoboothIo> Photobooth<P> {
    /// Boots with the lift stopped and every LED lit until the first tick.
    pub fn new(io: P, config: PhotoboothConfig) -> Self {
        let level = config.limit_switch_level;
        let mut ctx = PhotoboothContext {
            clock: StateClock::default(),
            config,
            upper: false,
            lower: false,
            capture: CaptureSequence::default(),
            outputs: PhotoboothOutputs {
                lift: MotorDrive::Stopped,
                turn_step: false,
                leds: LedPattern::ALL,
            },
            turn_confirmed: false,
            completed: false,
        };
        let mut fsm = Fsm::new("photobooth", build_state_table(), PhotoboothState::Idle);
        fsm.start(&mut ctx, 0);
        let mut booth = Self {
            io,
            fsm,
            ctx,
            upper: BinarySensor::new("photobooth upper limit", level),
            lower: BinarySensor::new("photobooth lower limit", level),
            applied: None,
        };
        booth.apply_outputs();
        booth
    }

    /// The controller reports the photos are taken; start lowering now.
    pub fn confirm_capture(&mut self) {
        if self.state() == PhotoboothState::Turning {
            info!("photobooth: capture confirmed");
            self.ctx.turn_confirmed = true;
        }
    }

    pub fn state(&self) -> PhotoboothState {
        self.fsm.current_state()
    }

    pub fn outputs(&self) -> PhotoboothOutputs {
        self.ctx.outputs
    }

    pub fn capture(&self) -> &CaptureSequence {
        &self.ctx.capture
    }

    pub fn io(&self) -> &P {
        &self.io
    }

    fn sample_limits(&mut self) {
        match self.io.upper_limit_high() {
            Ok(high) => self.ctx.upper = self.upper.update(high).asserted,
            Err(e) => warn!("photobooth: upper limit read failed: {e}"),
        }
        match self.io.lower_limit_high() {
            Ok(high) => self.ctx.lower = self.lower.update(high).asserted,
            Err(e) => warn!("photobooth: lower limit read failed: {e}"),
        }
    }

    fn refresh_leds(&mut self) {
        self.ctx.outputs.leds = led_pattern(self.state(), self.ctx.capture.phase());
    }

    /// Write only the outputs that changed since the last successful write.
    fn write_changed(
        &mut self,
        prev: Option<PhotoboothOutputs>,
        out: PhotoboothOutputs,
    ) -> Result<(), GpioError> {
        if prev.map(|p| p.lift) != Some(out.lift) {
            self.io.drive_lift(out.lift)?;
        }
        if prev.map(|p| p.turn_step) != Some(out.turn_step) {
            self.io.set_turn_step(out.turn_step)?;
        }
        if prev.map(|p| p.leds) != Some(out.leds) {
            self.io.show_leds(out.leds)?;
        }
        Ok(())
    }

    fn apply_outputs(&mut self) {
        let out = self.ctx.outputs;
        match self.write_changed(self.applied, out) {
            Ok(()) => self.applied = Some(out),
            Err(e) => {
                warn!("photobooth: output write failed: {e}");
                self.applied = None;
            }
        }
    }
}

impl<P: PhotoboothIo> Lifecycle for Photobooth<P> {
    fn start(&mut self, now_ms: u64) {
        if !self.is_complete() {
            info!("photobooth: start ignored in {}", self.fsm.current_name());
            return;
        }
        info!("photobooth: start");
        self.fsm
            .force_transition(PhotoboothState::Rising, &mut self.ctx, now_ms);
        self.refresh_leds();
        self.apply_outputs();
    }

    fn poll(&mut self, now_ms: u64) -> Progress {
        self.sample_limits();
        self.ctx.completed = false;
        self.fsm.tick(&mut self.ctx, now_ms);
        self.refresh_leds();
        self.apply_outputs();

        if self.ctx.completed {
            Progress::Completed
        } else if self.is_complete() {
            Progress::Idle
        } else {
            Progress::Busy
        }
    }

    fn is_complete(&self) -> bool {
        self.state() == PhotoboothState::Idle
    }

    fn stop(&mut self, now_ms: u64) {
        info!("photobooth: stop");
        self.fsm
            .force_transition(PhotoboothState::Idle, &mut self.ctx, now_ms);
        self.refresh_leds();
        self.apply_outputs();
    }

    fn calibrate(&mut self) {
        info!("photobooth: calibrate; not implemented");
    }

    fn state_code(&self) -> u8 {
        self.state() as u8
    }
}
