//! Inbound command channel.
//!
//! Uses an `embassy-sync` bounded channel to bridge whatever transport
//! receives controller commands with the synchronous tick loop.  The loop
//! only ever calls `try_receive`, so it never waits on the transport.
//!
//! ```text
//! ┌──────────────┐ ModuleCommand ┌──────────────┐
//! │  Transport   │──────────────▶│  Tick loop   │
//! │  (any task)  │               │  (sync)      │
//! └──────────────┘               └──────────────┘
//! ```

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::{Channel, TrySendError};
use log::warn;

use super::commands::ModuleCommand;

/// Channel depth for inbound commands.
pub const CMD_DEPTH: usize = 8;

pub type CommandQueue = Channel<CriticalSectionRawMutex, ModuleCommand, CMD_DEPTH>;

/// Node-wide command channel: transport → tick loop.
pub static COMMAND_CHANNEL: CommandQueue = Channel::new();

/// Queue a command without blocking.  Returns `false` (and logs) when the
/// queue is full.
pub fn submit(queue: &CommandQueue, cmd: ModuleCommand) -> bool {
    match queue.try_send(cmd) {
        Ok(()) => true,
        Err(TrySendError::Full(cmd)) => {
            warn!("Command queue full, dropping {:?} for '{}'", cmd.kind, cmd.module);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::commands::CommandKind;

    #[test]
    fn bounded_depth() {
        let queue = CommandQueue::new();
        for _ in 0..CMD_DEPTH {
            assert!(submit(&queue, ModuleCommand::new("intake", CommandKind::Start).unwrap()));
        }
        assert!(!submit(&queue, ModuleCommand::new("intake", CommandKind::Stop).unwrap()));
        assert_eq!(queue.len(), CMD_DEPTH);
        assert_eq!(queue.try_receive().unwrap().kind, CommandKind::Start);
    }
}
