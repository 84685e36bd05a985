//! Disc intake.
//!
//! Three rollers (intake, top, teeth) and an IR beam break across the
//! intake throat.
//!
//! ```text
//!           start (disc held)              start (no disc)
//!   IDLE ───────────────────▶ SEND   IDLE ────────────────▶ RECEIVE
//!                              │                               │
//!         dwell elapsed or     │                               │ beam broken
//!         confirm_send()       ▼                               ▼ (edge)
//!                           RECEIVE ─────────────────────────▶ IDLE + COMPLETE
//! ```
//!
//! The send dwell is a fallback upper bound; `confirm_send()` ends it as
//! soon as the controller knows the disc has left.  Receiving has no
//! timeout: without a beam-break edge the module stays busy.

use log::{info, warn};

use crate::app::ports::IntakeIo;
use crate::config::{IntakeConfig, SendPolicy};
use crate::drivers::motor::MotorDrive;
use crate::fsm::{Fsm, StateClock, StateDescriptor, StateId, Timed};
use crate::module::{Lifecycle, Progress};
use crate::sensors::{BinarySensor, SensorReading};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum IntakeState {
    Idle = 0,
    /// Pushing the held disc out onto the conveyor.
    Send = 1,
    /// Pulling a disc down from the top conveyor.
    Receive = 2,
}

impl StateId for IntakeState {
    fn index(self) -> usize {
        self as usize
    }
}

/// Roller commands for the current tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IntakeOutputs {
    pub intake: MotorDrive,
    pub top: MotorDrive,
    pub teeth: MotorDrive,
}

impl IntakeOutputs {
    pub fn all_stopped(&self) -> bool {
        !self.intake.is_running() && !self.top.is_running() && !self.teeth.is_running()
    }
}

/// Mutable state threaded through the intake handlers.
#[derive(Debug)]
pub struct IntakeContext {
    clock: StateClock,
    config: IntakeConfig,
    beam: SensorReading,
    outputs: IntakeOutputs,
    disc_present: bool,
    send_confirmed: bool,
    completed: bool,
}

impl Timed for IntakeContext {
    fn clock(&mut self) -> &mut StateClock {
        &mut self.clock
    }
}

// ---------------------------------------------------------------------------
// State handlers
// ---------------------------------------------------------------------------

fn idle_enter(ctx: &mut IntakeContext) {
    ctx.outputs = IntakeOutputs::default();
}

fn idle_update(ctx: &mut IntakeContext) -> Option<IntakeState> {
    ctx.outputs = IntakeOutputs::default();
    None
}

fn send_enter(ctx: &mut IntakeContext) {
    ctx.send_confirmed = false;
    ctx.outputs = IntakeOutputs {
        intake: MotorDrive::forward(ctx.config.motor_speed),
        ..IntakeOutputs::default()
    };
}

fn send_update(ctx: &mut IntakeContext) -> Option<IntakeState> {
    let timed_out = ctx.clock.elapsed_ms() > u64::from(ctx.config.send_dwell_ms);
    if ctx.send_confirmed || timed_out {
        ctx.disc_present = false;
        Some(IntakeState::Receive)
    } else {
        None
    }
}

fn receive_enter(ctx: &mut IntakeContext) {
    let speed = ctx.config.motor_speed;
    ctx.outputs = IntakeOutputs {
        intake: MotorDrive::Stopped,
        top: MotorDrive::forward(speed),
        teeth: MotorDrive::forward(speed),
    };
}

fn receive_update(ctx: &mut IntakeContext) -> Option<IntakeState> {
    if ctx.beam.just_asserted() {
        ctx.disc_present = true;
        ctx.completed = true;
        Some(IntakeState::Idle)
    } else {
        None
    }
}

fn build_state_table() -> [StateDescriptor<IntakeState, IntakeContext>; 3] {
    [
        StateDescriptor {
            id: IntakeState::Idle,
            name: "IDLE",
            on_enter: Some(idle_enter),
            on_exit: None,
            on_update: idle_update,
        },
        StateDescriptor {
            id: IntakeState::Send,
            name: "SEND",
            on_enter: Some(send_enter),
            on_exit: None,
            on_update: send_update,
        },
        StateDescriptor {
            id: IntakeState::Receive,
            name: "RECEIVE",
            on_enter: Some(receive_enter),
            on_exit: None,
            on_update: receive_update,
        },
    ]
}

// ---------------------------------------------------------------------------
// Module
// ---------------------------------------------------------------------------

pub struct Intake<P> {
    io: P,
    fsm: Fsm<IntakeState, IntakeContext, 3>,
    ctx: IntakeContext,
    beam: BinarySensor,
    /// Last outputs successfully written; `None` forces a rewrite.
    applied: Option<IntakeOutputs>,
}

impl<P: IntakeIo> Intake<P> {
    pub fn new(io: P, config: IntakeConfig) -> Self {
        let beam = BinarySensor::new("intake beam break", config.beam_break_level);
        let mut ctx = IntakeContext {
            clock: StateClock::default(),
            disc_present: config.disc_preloaded,
            config,
            beam: SensorReading::default(),
            outputs: IntakeOutputs::default(),
            send_confirmed: false,
            completed: false,
        };
        let mut fsm = Fsm::new("intake", build_state_table(), IntakeState::Idle);
        fsm.start(&mut ctx, 0);
        let mut intake = Self {
            io,
            fsm,
            ctx,
            beam,
            applied: None,
        };
        intake.apply_outputs();
        intake
    }

    /// The controller reports the disc has left; end the send phase now.
    pub fn confirm_send(&mut self) {
        if self.state() == IntakeState::Send {
            info!("intake: send confirmed");
            self.ctx.send_confirmed = true;
        }
    }

    pub fn state(&self) -> IntakeState {
        self.fsm.current_state()
    }

    pub fn disc_present(&self) -> bool {
        self.ctx.disc_present
    }

    pub fn outputs(&self) -> IntakeOutputs {
        self.ctx.outputs
    }

    pub fn io(&self) -> &P {
        &self.io
    }

    fn sample_beam(&mut self) {
        self.ctx.beam = match self.io.beam_break_high() {
            Ok(high) => self.beam.update(high),
            Err(e) => {
                warn!("intake: beam break read failed: {e}");
                SensorReading {
                    asserted: self.beam.is_asserted(),
                    edge: None,
                }
            }
        };
    }

    fn apply_outputs(&mut self) {
        let out = self.ctx.outputs;
        if self.applied == Some(out) {
            return;
        }
        let res = self
            .io
            .drive_intake_motor(out.intake)
            .and_then(|()| self.io.drive_top_motor(out.top))
            .and_then(|()| self.io.drive_teeth_motor(out.teeth));
        match res {
            Ok(()) => self.applied = Some(out),
            Err(e) => {
                warn!("intake: motor write failed: {e}");
                self.applied = None;
            }
        }
    }
}

impl<P: IntakeIo> Lifecycle for Intake<P> {
    fn start(&mut self, now_ms: u64) {
        if !self.is_complete() {
            info!("intake: start ignored in {}", self.fsm.current_name());
            return;
        }
        let send = self.ctx.disc_present || self.ctx.config.send_policy == SendPolicy::Always;
        let target = if send {
            IntakeState::Send
        } else {
            IntakeState::Receive
        };
        info!("intake: start (disc present: {})", self.ctx.disc_present);
        self.fsm.force_transition(target, &mut self.ctx, now_ms);
        self.apply_outputs();
    }

    fn poll(&mut self, now_ms: u64) -> Progress {
        self.sample_beam();
        self.ctx.completed = false;
        self.fsm.tick(&mut self.ctx, now_ms);
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
        self.state() == IntakeState::Idle
    }

    fn stop(&mut self, now_ms: u64) {
        info!("intake: stop");
        self.fsm.force_transition(IntakeState::Idle, &mut self.ctx, now_ms);
        self.ctx.outputs = IntakeOutputs::default();
        self.apply_outputs();
    }

    fn calibrate(&mut self) {
        info!("intake: calibrate; not implemented");
    }

    fn state_code(&self) -> u8 {
        self.state() as u8
    }
}
