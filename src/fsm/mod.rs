//! Function-pointer finite state machine engine.
//!
//! Classic embedded FSM pattern, generic over the state enumeration and
//! the context it mutates:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  StateTable<S, C>                                        │
//! │  ┌──────────┬───────────┬──────────┬───────────────────┐ │
//! │  │ S        │ on_enter  │ on_exit  │ on_update         │ │
//! │  ├──────────┼───────────┼──────────┼───────────────────┤ │
//! │  │ Idle     │ fn(ctx)   │ fn(ctx)  │ fn(ctx)->Option<S>│ │
//! │  │ Rising   │ fn(ctx)   │ fn(ctx)  │ fn(ctx)->Option<S>│ │
//! │  │ ...      │           │          │                   │ │
//! │  └──────────┴───────────┴──────────┴───────────────────┘ │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Each tick the engine stamps the current time into the context and calls
//! `on_update` for the **current** state.  If it returns `Some(next)`, the
//! engine runs `on_exit` for the current state, restarts the state clock,
//! then runs `on_enter` for the next.  Every subsystem (intake, turntable,
//! photobooth) builds its own table against its own context type.

use core::fmt::Debug;

use log::info;

// ---------------------------------------------------------------------------
// State identity
// ---------------------------------------------------------------------------

/// A closed enumeration of states usable as a table index.
pub trait StateId: Copy + Eq + Debug + 'static {
    /// Position of this state's row in the table.
    fn index(self) -> usize;
}

// ---------------------------------------------------------------------------
// Timing
// ---------------------------------------------------------------------------

/// Tick timestamp and state-entry timestamp, both in milliseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StateClock {
    pub now_ms: u64,
    pub entered_ms: u64,
}

impl StateClock {
    /// Milliseconds spent in the current state as of the current tick.
    pub fn elapsed_ms(&self) -> u64 {
        self.now_ms.saturating_sub(self.entered_ms)
    }
}

/// Contexts expose their state clock so the engine can maintain it.
pub trait Timed {
    fn clock(&mut self) -> &mut StateClock;
}

// ---------------------------------------------------------------------------
// Function-pointer type aliases
// ---------------------------------------------------------------------------

/// Signature for `on_enter` and `on_exit` actions.
/// These run exactly once on each state transition.
pub type StateActionFn<C> = fn(&mut C);

/// Signature for the per-tick update handler.
/// Returns `Some(next)` to trigger a transition, or `None` to stay.
pub type StateUpdateFn<S, C> = fn(&mut C) -> Option<S>;

// ---------------------------------------------------------------------------
// State descriptor (one row in the table)
// ---------------------------------------------------------------------------

/// Static descriptor for a single FSM state.
/// Stored in a fixed-size array, no heap, no `dyn`.
pub struct StateDescriptor<S, C> {
    pub id: S,
    pub name: &'static str,
    pub on_enter: Option<StateActionFn<C>>,
    pub on_exit: Option<StateActionFn<C>>,
    pub on_update: StateUpdateFn<S, C>,
}

// ---------------------------------------------------------------------------
// FSM engine
// ---------------------------------------------------------------------------

/// The finite state machine engine.
///
/// Owns the state table and the current-state pointer.  The context is
/// passed in on every call so the owning subsystem keeps it alongside its
/// I/O port.
pub struct Fsm<S: StateId, C: Timed, const N: usize> {
    /// Prefix for transition log lines.
    label: &'static str,
    /// Fixed-size table indexed by `S::index()`.
    table: [StateDescriptor<S, C>; N],
    /// Index of the currently active state.
    current: usize,
}

impl<S: StateId, C: Timed, const N: usize> Fsm<S, C, N> {
    /// Construct a new FSM with the given state table, starting in `initial`.
    ///
    /// Each row must sit at its own state's index.
    pub fn new(label: &'static str, table: [StateDescriptor<S, C>; N], initial: S) -> Self {
        debug_assert!(
            table.iter().enumerate().all(|(i, d)| d.id.index() == i),
            "{label}: state table out of order"
        );
        Self {
            label,
            table,
            current: initial.index(),
        }
    }

    /// Run the initial `on_enter` for the starting state.
    /// Call once after construction, before the first `tick()`.
    pub fn start(&mut self, ctx: &mut C, now_ms: u64) {
        info!("{}: starting in {}", self.label, self.table[self.current].name);
        let clock = ctx.clock();
        clock.now_ms = now_ms;
        clock.entered_ms = now_ms;
        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }

    /// Advance the FSM by one tick.
    ///
    /// 1. Stamp `now_ms` into the context clock.
    /// 2. Call `on_update` for the current state.
    /// 3. If it returns `Some(next)`, execute the transition:
    ///    `on_exit(current)` → update pointer → `on_enter(next)`.
    ///
    /// At most one transition happens per tick.
    pub fn tick(&mut self, ctx: &mut C, now_ms: u64) {
        ctx.clock().now_ms = now_ms;

        let next = (self.table[self.current].on_update)(ctx);

        if let Some(next_id) = next {
            self.transition(next_id, ctx);
        }
    }

    /// Force an immediate transition, bypassing `on_update`.
    /// Used for lifecycle commands (start, stop).  No-op if already in
    /// `next`.
    pub fn force_transition(&mut self, next: S, ctx: &mut C, now_ms: u64) {
        ctx.clock().now_ms = now_ms;
        if next.index() != self.current {
            self.transition(next, ctx);
        }
    }

    /// The current state's identity.
    pub fn current_state(&self) -> S {
        self.table[self.current].id
    }

    /// Human-readable name of the current state.
    pub fn current_name(&self) -> &'static str {
        self.table[self.current].name
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    fn transition(&mut self, next_id: S, ctx: &mut C) {
        let next_idx = next_id.index();

        info!(
            "{}: {} -> {}",
            self.label, self.table[self.current].name, self.table[next_idx].name
        );

        if let Some(exit) = self.table[self.current].on_exit {
            exit(ctx);
        }

        self.current = next_idx;
        let clock = ctx.clock();
        clock.entered_ms = clock.now_ms;

        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }
}
