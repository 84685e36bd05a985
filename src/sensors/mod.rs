//! Digital sensor inputs: beam breaks and limit switches.
//!
//! A [`BinarySensor`] turns a raw pin level into a logical reading using the
//! configured [`ActiveLevel`], and tracks edges across ticks.  Subsystems
//! sample every sensor once per tick, in every state, so the latch never
//! holds a stale level when a state starts watching for an edge.

pub mod edge;

use log::info;

use crate::config::ActiveLevel;
pub use edge::{Edge, EdgeLatch};

/// One tick's worth of a digital sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SensorReading {
    /// Logical level after polarity translation.
    pub asserted: bool,
    /// Level change since the previous sample, if any.
    pub edge: Option<Edge>,
}

impl SensorReading {
    pub fn just_asserted(&self) -> bool {
        self.edge == Some(Edge::Asserted)
    }
}

/// Polarity-aware, edge-tracking digital input.
#[derive(Debug, Clone)]
pub struct BinarySensor {
    name: &'static str,
    level: ActiveLevel,
    latch: EdgeLatch,
}

impl BinarySensor {
    /// The latch starts released, so an input already asserted at boot
    /// reports one `Asserted` edge on its first sample.
    pub fn new(name: &'static str, level: ActiveLevel) -> Self {
        Self {
            name,
            level,
            latch: EdgeLatch::new(false),
        }
    }

    /// Sample the raw pin level.  Logs every logical level change.
    pub fn update(&mut self, pin_high: bool) -> SensorReading {
        let asserted = self.level.is_asserted(pin_high);
        let edge = self.latch.update(asserted);
        if edge.is_some() {
            info!("{} changed state: {}", self.name, if asserted { "asserted" } else { "released" });
        }
        SensorReading { asserted, edge }
    }

    pub fn is_asserted(&self) -> bool {
        self.latch.level()
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}
