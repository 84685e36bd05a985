//! Application core: node orchestration, commands and telemetry, no I/O.
//!
//! Subsystems and the [`service::NodeService`] talk to hardware and to the
//! controller only through the **port traits** in [`ports`], so everything
//! here runs unchanged against simulated pins in host tests.

pub mod channels;
pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
