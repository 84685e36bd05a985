//! Node service, the cooperative tick loop core.
//!
//! [`NodeService`] owns the module registry and the heartbeat cadence.
//! It is hardware-agnostic: modules arrive as `&mut dyn Lifecycle`,
//! commands through the [`CommandQueue`], and everything outbound leaves
//! through a [`TelemetrySink`].
//!
//! ```text
//!  CommandQueue ──▶ ┌────────────────────────┐ ──▶ TelemetrySink
//!                   │      NodeService       │
//!                   │  Registry · Heartbeat  │
//!                   └───────────┬────────────┘
//!                               ▼
//!                 Intake · Turntable · Photobooth
//! ```
//!
//! One [`tick`](NodeService::tick):
//!   1. heartbeat, if the status interval has elapsed;
//!   2. drain every pending command;
//!   3. advance every module one step;
//!   4. publish each module's `(state, status)`.

use heapless::Vec;
use log::info;

use crate::config::NodeConfig;
use crate::error::RegistryError;
use crate::module::{DispatchOutcome, Lifecycle, ModuleHandle, ModuleName, ModuleRegistry};
use crate::scheduler::Periodic;

use super::channels::CommandQueue;
use super::commands::ModuleCommand;
use super::events::{ModuleReport, NodeEvent, RejectReason};
use super::ports::TelemetrySink;

// ───────────────────────────────────────────────────────────────
// NodeService
// ───────────────────────────────────────────────────────────────

pub struct NodeService<'a> {
    node: ModuleName,
    registry: ModuleRegistry<'a>,
    heartbeat: Periodic,
    started_ms: u64,
    tick_count: u64,
}

impl<'a> NodeService<'a> {
    /// Construct the service with an empty registry.
    ///
    /// Register modules, then call [`start`](Self::start).
    pub fn new(config: &NodeConfig) -> Self {
        Self {
            node: config.node_name.clone(),
            registry: ModuleRegistry::new(),
            heartbeat: Periodic::starting_at(config.status_interval_ms, 0),
            started_ms: 0,
            tick_count: 0,
        }
    }

    // ── Setup ─────────────────────────────────────────────────

    /// Register a module.  A rejected registration is logged by the
    /// registry; the node keeps running without that module.
    pub fn register(
        &mut self,
        name: &str,
        hooks: &'a mut dyn Lifecycle,
    ) -> Result<ModuleHandle, RegistryError> {
        self.registry.register(name, hooks)
    }

    /// Announce the node and arm the heartbeat.
    pub fn start(&mut self, now_ms: u64, sink: &mut impl TelemetrySink) {
        self.started_ms = now_ms;
        self.heartbeat.reset(now_ms);
        info!(
            "NodeService '{}' started with {} module(s)",
            self.node,
            self.registry.len()
        );
        sink.emit(&NodeEvent::Started {
            node: self.node.clone(),
            modules: self.registry.len() as u8,
        });
    }

    // ── Commands ──────────────────────────────────────────────

    /// Dispatch one command.  Unknown modules and busy starts are reported
    /// through the sink and otherwise ignored.
    pub fn handle_command(
        &mut self,
        cmd: &ModuleCommand,
        now_ms: u64,
        sink: &mut impl TelemetrySink,
    ) -> Option<DispatchOutcome> {
        let reason = match self.registry.dispatch(&cmd.module, cmd.kind, now_ms) {
            Ok(DispatchOutcome::IgnoredBusy) => RejectReason::Busy,
            Ok(outcome) => return Some(outcome),
            Err(_) => RejectReason::UnknownModule,
        };
        sink.emit(&NodeEvent::CommandRejected {
            module: cmd.module.clone(),
            reason,
        });
        (reason == RejectReason::Busy).then_some(DispatchOutcome::IgnoredBusy)
    }

    /// Dispatch every command waiting in `queue`.  Never waits.
    pub fn drain_commands(
        &mut self,
        queue: &CommandQueue,
        now_ms: u64,
        sink: &mut impl TelemetrySink,
    ) -> usize {
        let mut handled = 0;
        while let Ok(cmd) = queue.try_receive() {
            self.handle_command(&cmd, now_ms, sink);
            handled += 1;
        }
        handled
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one loop iteration.
    pub fn tick(&mut self, now_ms: u64, queue: &CommandQueue, sink: &mut impl TelemetrySink) {
        self.tick_count += 1;

        if self.heartbeat.poll(now_ms) {
            sink.emit(&self.heartbeat_event(now_ms));
        }

        self.drain_commands(queue, now_ms, sink);

        self.registry.tick(now_ms);

        for snap in self.registry.snapshots() {
            sink.emit(&NodeEvent::ModuleReport(ModuleReport {
                module: snap.name.clone(),
                state: snap.state,
                status: snap.status,
            }));
        }
    }

    /// Node-level status snapshot.
    pub fn heartbeat_event(&self, now_ms: u64) -> NodeEvent {
        let mut modules = Vec::new();
        for snap in self.registry.snapshots() {
            // Registry capacity equals the report capacity.
            let _ = modules.push(ModuleReport {
                module: snap.name.clone(),
                state: snap.state,
                status: snap.status,
            });
        }
        NodeEvent::Heartbeat {
            node: self.node.clone(),
            uptime_ms: now_ms.saturating_sub(self.started_ms),
            modules,
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn registry(&self) -> &ModuleRegistry<'a> {
        &self.registry
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn node_name(&self) -> &str {
        &self.node
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::channels::submit;
    use crate::app::commands::CommandKind;
    use crate::module::{ModuleStatus, Progress};

    /// Completes on the first poll after start.
    #[derive(Default)]
    struct OneShot {
        armed: bool,
    }

    impl Lifecycle for OneShot {
        fn start(&mut self, _now_ms: u64) {
            self.armed = true;
        }
        fn poll(&mut self, _now_ms: u64) -> Progress {
            if std::mem::take(&mut self.armed) {
                Progress::Completed
            } else {
                Progress::Idle
            }
        }
        fn is_complete(&self) -> bool {
            !self.armed
        }
        fn stop(&mut self, _now_ms: u64) {
            self.armed = false;
        }
        fn calibrate(&mut self) {}
        fn state_code(&self) -> u8 {
            u8::from(self.armed)
        }
    }

    #[derive(Default)]
    struct Recorder {
        events: std::vec::Vec<NodeEvent>,
    }

    impl TelemetrySink for Recorder {
        fn emit(&mut self, event: &NodeEvent) {
            self.events.push(event.clone());
        }
    }

    impl Recorder {
        fn heartbeats(&self) -> usize {
            self.events
                .iter()
                .filter(|e| matches!(e, NodeEvent::Heartbeat { .. }))
                .count()
        }

        fn last_status(&self) -> Option<ModuleStatus> {
            self.events.iter().rev().find_map(|e| match e {
                NodeEvent::ModuleReport(r) => Some(r.status),
                _ => None,
            })
        }
    }

    fn config() -> NodeConfig {
        NodeConfig::new("bench").unwrap()
    }

    #[test]
    fn start_announces_node() {
        let cfg = config();
        let mut m = OneShot::default();
        let mut svc = NodeService::new(&cfg);
        svc.register("intake", &mut m).unwrap();
        let mut sink = Recorder::default();
        svc.start(0, &mut sink);
        assert_eq!(
            sink.events[0],
            NodeEvent::Started {
                node: ModuleName::try_from("bench").unwrap(),
                modules: 1
            }
        );
    }

    #[test]
    fn heartbeat_every_status_interval() {
        let cfg = config();
        let mut svc = NodeService::new(&cfg);
        let queue = CommandQueue::new();
        let mut sink = Recorder::default();
        svc.start(0, &mut sink);
        for now in 1..=4_500 {
            svc.tick(now, &queue, &mut sink);
        }
        assert_eq!(sink.heartbeats(), 3);
        assert_eq!(svc.tick_count(), 4_500);
    }

    #[test]
    fn reports_carry_registered_names() {
        let cfg = config();
        let mut a = OneShot::default();
        let mut b = OneShot::default();
        let mut svc = NodeService::new(&cfg);
        svc.register("intake", &mut a).unwrap();
        svc.register("turntable", &mut b).unwrap();
        let queue = CommandQueue::new();
        let mut sink = Recorder::default();
        svc.start(0, &mut sink);
        svc.tick(1, &queue, &mut sink);

        let reported: std::vec::Vec<&str> = sink
            .events
            .iter()
            .filter_map(|e| match e {
                NodeEvent::ModuleReport(r) => Some(r.module.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(reported, ["intake", "turntable"]);

        let NodeEvent::Heartbeat { modules, .. } = svc.heartbeat_event(1) else {
            panic!("expected heartbeat");
        };
        let names: std::vec::Vec<&str> = modules.iter().map(|r| r.module.as_str()).collect();
        assert_eq!(names, ["intake", "turntable"]);
    }

    #[test]
    fn queued_command_runs_before_module_step() {
        let cfg = config();
        let mut m = OneShot::default();
        let mut svc = NodeService::new(&cfg);
        svc.register("intake", &mut m).unwrap();
        let queue = CommandQueue::new();
        let mut sink = Recorder::default();
        svc.start(0, &mut sink);

        submit(&queue, ModuleCommand::new("intake", CommandKind::Start).unwrap());
        svc.tick(1, &queue, &mut sink);
        // Started and completed within the same tick; COMPLETE published.
        assert_eq!(sink.last_status(), Some(ModuleStatus::Complete));
        svc.tick(2, &queue, &mut sink);
        assert_eq!(sink.last_status(), Some(ModuleStatus::Idle));
    }

    #[test]
    fn unknown_module_rejected_and_reported() {
        let cfg = config();
        let mut svc = NodeService::new(&cfg);
        let mut sink = Recorder::default();
        let cmd = ModuleCommand::new("nope", CommandKind::Stop).unwrap();
        assert_eq!(svc.handle_command(&cmd, 0, &mut sink), None);
        assert!(matches!(
            sink.events.last(),
            Some(NodeEvent::CommandRejected {
                reason: RejectReason::UnknownModule,
                ..
            })
        ));
    }

    #[test]
    fn busy_start_reported() {
        let cfg = config();
        let mut m = OneShot::default();
        let mut svc = NodeService::new(&cfg);
        svc.register("turntable", &mut m).unwrap();
        let mut sink = Recorder::default();
        let cmd = ModuleCommand::new("turntable", CommandKind::Start).unwrap();
        assert_eq!(
            svc.handle_command(&cmd, 0, &mut sink),
            Some(DispatchOutcome::Started)
        );
        assert_eq!(
            svc.handle_command(&cmd, 1, &mut sink),
            Some(DispatchOutcome::IgnoredBusy)
        );
        assert!(matches!(
            sink.events.last(),
            Some(NodeEvent::CommandRejected {
                reason: RejectReason::Busy,
                ..
            })
        ));
    }
}
