//! Camera turntable on a stepper lift.
//!
//! ```text
//!   IDLE ──start──▶ RISING ──upper limit──▶ SPINNING ──dwell / confirm──▶ LOWERING
//!    ▲                                                                      │
//!    └──────────────────────── lower limit (COMPLETE) ◀─────────────────────┘
//! ```
//!
//! The lift stepper is pulsed from the tick loop while enabled.  Limit
//! switches are read as levels, and each is only consulted in the single
//! state it ends, so a switch held closed cannot fire twice.

use log::{info, warn};

use crate::app::ports::TurntableIo;
use crate::config::TurntableConfig;
use crate::drivers::motor::Direction;
use crate::fsm::{Fsm, StateClock, StateDescriptor, StateId, Timed};
use crate::module::{Lifecycle, Progress};
use crate::scheduler::Periodic;
use crate::sensors::BinarySensor;

const LIFT_UP: Direction = Direction::Forward;
const LIFT_DOWN: Direction = Direction::Reverse;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum TurntableState {
    Idle = 0,
    Rising = 1,
    Spinning = 2,
    Lowering = 3,
}

impl StateId for TurntableState {
    fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurntableOutputs {
    pub lift_enabled: bool,
    pub lift_direction: Direction,
    pub spin: bool,
}

impl Default for TurntableOutputs {
    fn default() -> Self {
        Self {
            lift_enabled: false,
            lift_direction: LIFT_UP,
            spin: false,
        }
    }
}

#[derive(Debug)]
pub struct TurntableContext {
    clock: StateClock,
    config: TurntableConfig,
    upper: bool,
    lower: bool,
    outputs: TurntableOutputs,
    spin_confirmed: bool,
    completed: bool,
}

impl Timed for TurntableContext {
    fn clock(&mut self) -> &mut StateClock {
        &mut self.clock
    }
}

// ---------------------------------------------------------------------------
// State handlers
// ---------------------------------------------------------------------------

fn idle_enter(ctx: &mut TurntableContext) {
    ctx.outputs.lift_enabled = false;
    ctx.outputs.spin = false;
}

fn idle_update(ctx: &mut TurntableContext) -> Option<TurntableState> {
    idle_enter(ctx);
    None
}

fn rising_enter(ctx: &mut TurntableContext) {
    ctx.outputs = TurntableOutputs {
        lift_enabled: true,
        lift_direction: LIFT_UP,
        spin: false,
    };
}

fn rising_update(ctx: &mut TurntableContext) -> Option<TurntableState> {
    ctx.upper.then_some(TurntableState::Spinning)
}

fn spinning_enter(ctx: &mut TurntableContext) {
    ctx.spin_confirmed = false;
    ctx.outputs.lift_enabled = false;
    ctx.outputs.spin = true;
}

fn spinning_update(ctx: &mut TurntableContext) -> Option<TurntableState> {
    let timed_out = ctx.clock.elapsed_ms() > u64::from(ctx.config.spin_dwell_ms);
    (ctx.spin_confirmed || timed_out).then_some(TurntableState::Lowering)
}

fn lowering_enter(ctx: &mut TurntableContext) {
    ctx.outputs.lift_direction = LIFT_DOWN;
    ctx.outputs.lift_enabled = true;
}

fn lowering_update(ctx: &mut TurntableContext) -> Option<TurntableState> {
    if ctx.lower {
        ctx.completed = true;
        Some(TurntableState::Idle)
    } else {
        None
    }
}

fn build_state_table() -> [StateDescriptor<TurntableState, TurntableContext>; 4] {
    [
        StateDescriptor {
            id: TurntableState::Idle,
            name: "IDLE",
            on_enter: Some(idle_enter),
            on_exit: None,
            on_update: idle_update,
        },
        StateDescriptor {
            id: TurntableState::Rising,
            name: "RISING",
            on_enter: Some(rising_enter),
            on_exit: None,
            on_update: rising_update,
        },
        StateDescriptor {
            id: TurntableState::Spinning,
            name: "SPINNING",
            on_enter: Some(spinning_enter),
            on_exit: None,
            on_update: spinning_update,
        },
        StateDescriptor {
            id: TurntableState::Lowering,
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

pub struct Turntable<P> {
    io: P,
    fsm: Fsm<TurntableState, TurntableContext, 4>,
    ctx: TurntableContext,
    upper: BinarySensor,
    lower: BinarySensor,
    step_timer: Periodic,
    applied: Option<TurntableOutputs>,
}

impl<P: TurntableIo> Turntable<P> {
    pub fn new(io: P, config: TurntableConfig) -> Self {
        let level = config.limit_switch_level;
        let step_timer = Periodic::starting_at(config.lift_step_interval_ms, 0);
        let mut ctx = TurntableContext {
            clock: StateClock::default(),
            config,
            upper: false,
            lower: false,
            outputs: TurntableOutputs::default(),
            spin_confirmed: false,
            completed: false,
        };
        let mut fsm = Fsm::new("turntable", build_state_table(), TurntableState::Idle);
        fsm.start(&mut ctx, 0);
        let mut table = Self {
            io,
            fsm,
            ctx,
            upper: BinarySensor::new("turntable upper limit", level),
            lower: BinarySensor::new("turntable lower limit", level),
            step_timer,
            applied: None,
        };
        table.apply_outputs(0);
        table
    }

    /// The controller reports picture taking is done; start lowering now.
    pub fn confirm_capture(&mut self) {
        if self.state() == TurntableState::Spinning {
            info!("turntable: capture confirmed");
            self.ctx.spin_confirmed = true;
        }
    }

    pub fn state(&self) -> TurntableState {
        self.fsm.current_state()
    }

    pub fn outputs(&self) -> TurntableOutputs {
        self.ctx.outputs
    }

    pub fn io(&self) -> &P {
        &self.io
    }

    fn sample_limits(&mut self) {
        match self.io.upper_limit_high() {
            Ok(high) => self.ctx.upper = self.upper.update(high).asserted,
            Err(e) => warn!("turntable: upper limit read failed: {e}"),
        }
        match self.io.lower_limit_high() {
            Ok(high) => self.ctx.lower = self.lower.update(high).asserted,
            Err(e) => warn!("turntable: lower limit read failed: {e}"),
        }
    }

    fn apply_outputs(&mut self, now_ms: u64) {
        let out = self.ctx.outputs;
        if self.applied != Some(out) {
            if out.lift_enabled && !self.applied.is_some_and(|a| a.lift_enabled) {
                self.step_timer.reset(now_ms);
            }
            let res = self
                .io
                .set_lift(out.lift_enabled, out.lift_direction)
                .and_then(|()| self.io.set_spin(out.spin));
            match res {
                Ok(()) => self.applied = Some(out),
                Err(e) => {
                    warn!("turntable: output write failed: {e}");
                    self.applied = None;
                }
            }
        }
    }

    fn pulse_lift(&mut self, now_ms: u64) {
        if self.ctx.outputs.lift_enabled && self.step_timer.poll(now_ms) {
            if let Err(e) = self.io.toggle_lift_step() {
                warn!("turntable: step write failed: {e}");
            }
        }
    }
}

impl<P: TurntableIo> Lifecycle for Turntable<P> {
    fn start(&mut self, now_ms: u64) {
        if !self.is_complete() {
            info!("turntable: start ignored in {}", self.fsm.current_name());
            return;
        }
        info!("turntable: start");
        self.fsm
            .force_transition(TurntableState::Rising, &mut self.ctx, now_ms);
        self.apply_outputs(now_ms);
    }

    fn poll(&mut self, now_ms: u64) -> Progress {
        self.sample_limits();
        self.ctx.completed = false;
        self.fsm.tick(&mut self.ctx, now_ms);
        self.apply_outputs(now_ms);
        self.pulse_lift(now_ms);

        if self.ctx.completed {
            Progress::Completed
        } else if self.is_complete() {
            Progress::Idle
        } else {
            Progress::Busy
        }
    }

    fn is_complete(&self) -> bool {
        self.state() == TurntableState::Idle
    }

    fn stop(&mut self, now_ms: u64) {
        info!("turntable: stop");
        self.fsm
            .force_transition(TurntableState::Idle, &mut self.ctx, now_ms);
        self.apply_outputs(now_ms);
    }

    fn calibrate(&mut self) {
        info!("turntable: calibrate; not implemented");
    }

    fn state_code(&self) -> u8 {
        self.state() as u8
    }
}
