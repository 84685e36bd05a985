//! Step-and-flash capture sweep.
//!
//! Walks the photobooth turntable through `views` stops of
//! `microsteps_per_view` steps each, flashing the LEDs after every stop.
//! Advances at most one phase per tick and never waits.
//!
//! ```text
//!   ┌─▶ STEP_HIGH ─▶ STEP_LOW ─┬─(more steps)─┘
//!   │                          └─(view done)──▶ FLASH ─┬─(more views)─▶ STEP_HIGH
//!   │                                                  └─(last view)──▶ DONE
//! ```

use crate::config::CaptureConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapturePhase {
    StepHigh,
    StepLow,
    Flash,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureSequence {
    view: u8,
    microstep: u8,
    phase: CapturePhase,
    phase_started_ms: u64,
}

impl Default for CaptureSequence {
    fn default() -> Self {
        Self {
            view: 0,
            microstep: 0,
            phase: CapturePhase::Done,
            phase_started_ms: 0,
        }
    }
}

impl CaptureSequence {
    /// Fresh sweep, first step pulse starting at `now_ms`.
    pub fn begin(now_ms: u64) -> Self {
        Self {
            view: 0,
            microstep: 0,
            phase: CapturePhase::StepHigh,
            phase_started_ms: now_ms,
        }
    }

    /// Move to the next phase if the current one has run its course.
    /// Returns the new phase when one was entered.
    pub fn advance(&mut self, now_ms: u64, cfg: &CaptureConfig) -> Option<CapturePhase> {
        let elapsed = now_ms.saturating_sub(self.phase_started_ms);
        let half = u64::from(cfg.step_half_period_ms);
        let next = match self.phase {
            CapturePhase::StepHigh if elapsed >= half => CapturePhase::StepLow,
            CapturePhase::StepLow if elapsed >= half => {
                self.microstep += 1;
                if self.microstep >= cfg.microsteps_per_view {
                    self.microstep = 0;
                    CapturePhase::Flash
                } else {
                    CapturePhase::StepHigh
                }
            }
            CapturePhase::Flash if elapsed >= u64::from(cfg.flash_ms) => {
                self.view += 1;
                if self.view >= cfg.views {
                    CapturePhase::Done
                } else {
                    CapturePhase::StepHigh
                }
            }
            _ => return None,
        };
        self.phase = next;
        self.phase_started_ms = now_ms;
        Some(next)
    }

    pub fn phase(&self) -> CapturePhase {
        self.phase
    }

    /// Level the turntable step line should sit at.
    pub fn step_high(&self) -> bool {
        self.phase == CapturePhase::StepHigh
    }

    pub fn is_flashing(&self) -> bool {
        self.phase == CapturePhase::Flash
    }

    pub fn is_done(&self) -> bool {
        self.phase == CapturePhase::Done
    }

    /// Views fully captured so far.
    pub fn view(&self) -> u8 {
        self.view
    }

    pub fn microstep(&self) -> u8 {
        self.microstep
    }
}
