//! Log-based telemetry sink adapter.
//!
//! Implements [`TelemetrySink`] by writing node events to the `log` facade
//! (UART / USB-CDC via `esp_idf_logger` in production).  Per-tick module
//! reports go out at `debug` so they do not flood the console.

use log::{debug, info, warn};

use crate::app::events::{ModuleReport, NodeEvent};
use crate::app::ports::TelemetrySink;

/// Adapter that logs every [`NodeEvent`] to the serial console.
#[derive(Debug, Default)]
pub struct LogTelemetrySink;

impl LogTelemetrySink {
    pub fn new() -> Self {
        Self
    }
}

fn log_report(prefix: &str, r: &ModuleReport) {
    debug!(
        "{} | {} state={} status={:?}",
        prefix, r.module, r.state, r.status
    );
}

impl TelemetrySink for LogTelemetrySink {
    fn emit(&mut self, event: &NodeEvent) {
        match event {
            NodeEvent::Started { node, modules } => {
                info!("START | node={} modules={}", node, modules);
            }
            NodeEvent::Heartbeat {
                node,
                uptime_ms,
                modules,
            } => {
                info!(
                    "HBEAT | node={} uptime={}ms modules={}",
                    node,
                    uptime_ms,
                    modules.len()
                );
                for r in modules {
                    log_report("HBEAT", r);
                }
            }
            NodeEvent::ModuleReport(r) => log_report("MOD", r),
            NodeEvent::CommandRejected { module, reason } => {
                warn!("CMD | rejected for '{}': {:?}", module, reason);
            }
        }
    }
}
