//! Outbound telemetry events.
//!
//! The [`NodeService`](super::service::NodeService) emits these through the
//! [`TelemetrySink`](super::ports::TelemetrySink) port.  Adapters on the
//! other side decide what to do with them: log to serial, or encode them
//! into frames for the controller link.

use heapless::Vec;
use serde::{Deserialize, Serialize};

use crate::module::registry::MAX_MODULES;
use crate::module::{ModuleName, ModuleStatus};

/// One module's published `(state, status)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleReport {
    pub module: ModuleName,
    pub state: u8,
    pub status: ModuleStatus,
}

/// Why a controller command was not applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RejectReason {
    UnknownModule,
    /// `start` arrived while the module was still running.
    Busy,
}

/// Structured events emitted by the node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeEvent {
    /// The tick loop has started.
    Started {
        node: ModuleName,
        modules: u8,
    },

    /// Periodic node-level status.
    Heartbeat {
        node: ModuleName,
        uptime_ms: u64,
        modules: Vec<ModuleReport, MAX_MODULES>,
    },

    /// Per-module status, every tick.
    ModuleReport(ModuleReport),

    /// A command could not be dispatched.
    CommandRejected {
        module: ModuleName,
        reason: RejectReason,
    },
}
