//! Edge latch for digital sensors.
//!
//! Remembers the previous logical reading so the state machines can react
//! to a level *change* rather than a sustained level.

/// Direction of a logical level change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    /// Input went from released to asserted (beam broken, switch pressed).
    Asserted,
    /// Input went from asserted to released.
    Released,
}

/// Previous-reading latch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeLatch {
    previous: bool,
}

impl EdgeLatch {
    /// Seed the latch with a known prior reading.
    pub fn new(initial: bool) -> Self {
        Self { previous: initial }
    }

    /// Feed one reading; returns the edge if the level changed.
    pub fn update(&mut self, asserted: bool) -> Option<Edge> {
        let edge = match (self.previous, asserted) {
            (false, true) => Some(Edge::Asserted),
            (true, false) => Some(Edge::Released),
            _ => None,
        };
        self.previous = asserted;
        edge
    }

    /// Last reading fed to the latch.
    pub fn level(&self) -> bool {
        self.previous
    }
}
