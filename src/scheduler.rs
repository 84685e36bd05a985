//! Tick-driven cadence timers.
//!
//! Everything periodic in the node (heartbeat publication, stepper pulse
//! trains) runs off the main loop's `now_ms` rather than hardware timers.
//! A [`Periodic`] answers "is it time yet?" once per tick; nothing waits.
//!
//! ```text
//!   tick ──▶ Periodic::poll(now) ──▶ true  ──▶ publish / toggle step
//!                                 └─▶ false ──▶ skip
//! ```

/// Fires at most once per tick, whenever `interval_ms` has elapsed since
/// the last fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Periodic {
    interval_ms: u64,
    last_ms: u64,
}

impl Periodic {
    /// First fire is `interval_ms` after `now_ms`.
    pub fn starting_at(interval_ms: u32, now_ms: u64) -> Self {
        Self {
            interval_ms: u64::from(interval_ms.max(1)),
            last_ms: now_ms,
        }
    }

    /// `true` if the interval has elapsed; re-arms from `now_ms`.
    ///
    /// Late ticks do not accumulate a backlog: a loop that stalls for
    /// several intervals fires once and then resumes the normal cadence.
    pub fn poll(&mut self, now_ms: u64) -> bool {
        if now_ms.saturating_sub(self.last_ms) >= self.interval_ms {
            self.last_ms = now_ms;
            true
        } else {
            false
        }
    }

    /// Restart the interval from `now_ms`.
    pub fn reset(&mut self, now_ms: u64) {
        self.last_ms = now_ms;
    }

    pub fn interval_ms(&self) -> u64 {
        self.interval_ms
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
