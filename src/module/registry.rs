//! Fixed-capacity module registry.
//!
//! Holds borrowed [`Lifecycle`] objects under unique names, routes commands
//! to them, and keeps each module's published [`ModuleStatus`].  The
//! registry knows nothing about what the modules do.
//!
//! Status rules:
//!
//! ```text
//!   IDLE ──start──▶ RUNNING ──completion──▶ COMPLETE ──next tick──▶ IDLE
//!                      │                        │
//!                      └────────stop────────────┴──▶ IDLE
//! ```

use heapless::Vec;
use log::{info, warn};

use super::{Lifecycle, ModuleName, ModuleStatus, Progress};
use crate::app::commands::CommandKind;
use crate::error::RegistryError;

/// Maximum number of modules one node can host.
pub const MAX_MODULES: usize = 4;

/// Index of a registered module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModuleHandle(usize);

/// What a dispatched command actually did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    Started,
    Stopped,
    Calibrated,
    /// `start` arrived while a sequence was still running and was dropped.
    IgnoredBusy,
}

/// Published view of one module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModuleSnapshot<'r> {
    pub name: &'r ModuleName,
    pub state: u8,
    pub status: ModuleStatus,
}

struct Slot<'a> {
    name: ModuleName,
    hooks: &'a mut dyn Lifecycle,
    status: ModuleStatus,
}

pub struct ModuleRegistry<'a> {
    slots: Vec<Slot<'a>, MAX_MODULES>,
}

impl Default for ModuleRegistry<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> ModuleRegistry<'a> {
    pub fn new() -> Self {
        Self { slots: Vec::new() }
    }

    /// Register `hooks` under `name`.  Rejections are logged and returned;
    /// the caller is free to carry on without the module.
    pub fn register(
        &mut self,
        name: &str,
        hooks: &'a mut dyn Lifecycle,
    ) -> Result<ModuleHandle, RegistryError> {
        if self.find(name).is_some() {
            warn!("Registry: duplicate module '{}' rejected", name);
            return Err(RegistryError::DuplicateName);
        }
        let Ok(owned) = ModuleName::try_from(name) else {
            warn!("Registry: module name '{}' too long", name);
            return Err(RegistryError::NameTooLong);
        };
        let index = self.slots.len();
        self.slots
            .push(Slot {
                name: owned,
                hooks,
                status: ModuleStatus::Idle,
            })
            .map_err(|_| {
                warn!("Registry: no slot for '{}'", name);
                RegistryError::Full
            })?;
        info!("Registry: registered '{}' at slot {}", name, index);
        Ok(ModuleHandle(index))
    }

    /// Look up a module by name.
    pub fn handle(&self, name: &str) -> Option<ModuleHandle> {
        self.find(name).map(ModuleHandle)
    }

    /// Route a command to the named module.
    pub fn dispatch(
        &mut self,
        name: &str,
        kind: CommandKind,
        now_ms: u64,
    ) -> Result<DispatchOutcome, RegistryError> {
        let Some(index) = self.find(name) else {
            warn!("Registry: {:?} for unknown module '{}' ignored", kind, name);
            return Err(RegistryError::UnknownModule);
        };
        let slot = &mut self.slots[index];
        let outcome = match kind {
            CommandKind::Start if !slot.hooks.is_complete() => {
                info!("Registry: '{}' busy, start ignored", slot.name);
                DispatchOutcome::IgnoredBusy
            }
            CommandKind::Start => {
                info!("Registry: start '{}'", slot.name);
                slot.hooks.start(now_ms);
                slot.status = if slot.hooks.is_complete() {
                    ModuleStatus::Idle
                } else {
                    ModuleStatus::Running
                };
                DispatchOutcome::Started
            }
            CommandKind::Stop => {
                info!("Registry: stop '{}'", slot.name);
                slot.hooks.stop(now_ms);
                slot.status = ModuleStatus::Idle;
                DispatchOutcome::Stopped
            }
            CommandKind::Calibrate => {
                info!("Registry: calibrate '{}'", slot.name);
                slot.hooks.calibrate();
                DispatchOutcome::Calibrated
            }
        };
        Ok(outcome)
    }

    /// Current `(state, status)` of the named module.
    pub fn poll_status(&self, name: &str) -> Result<(u8, ModuleStatus), RegistryError> {
        self.find(name)
            .map(|i| {
                let slot = &self.slots[i];
                (slot.hooks.state_code(), slot.status)
            })
            .ok_or(RegistryError::UnknownModule)
    }

    /// Status of a module by handle.
    pub fn status(&self, handle: ModuleHandle) -> Option<ModuleStatus> {
        self.slots.get(handle.0).map(|s| s.status)
    }

    /// Advance every module by one tick and refresh its status.
    pub fn tick(&mut self, now_ms: u64) {
        for slot in &mut self.slots {
            slot.status = match slot.hooks.poll(now_ms) {
                Progress::Busy => ModuleStatus::Running,
                Progress::Completed => {
                    info!("Registry: '{}' complete", slot.name);
                    ModuleStatus::Complete
                }
                Progress::Idle => ModuleStatus::Idle,
            };
        }
    }

    /// Iterate `(name, state, status)` for every module, in registration order.
    pub fn snapshots(&self) -> impl Iterator<Item = ModuleSnapshot<'_>> + '_ {
        self.slots.iter().map(|s| ModuleSnapshot {
            name: &s.name,
            state: s.hooks.state_code(),
            status: s.status,
        })
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    fn find(&self, name: &str) -> Option<usize> {
        self.slots.iter().position(|s| s.name.as_str() == name)
    }
}
