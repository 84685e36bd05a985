//! Inbound commands from the controller.
//!
//! The transport delivers text lines such as `"intake start"` or
//! `"photobooth/stop"`; [`ModuleCommand::parse`] turns them into a typed
//! command that the [`NodeService`](super::service::NodeService) routes to
//! the registry.

use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CommandError;
use crate::module::ModuleName;

/// Lifecycle verb.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommandKind {
    Start,
    Stop,
    Calibrate,
}

impl FromStr for CommandKind {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("start") {
            Ok(Self::Start)
        } else if s.eq_ignore_ascii_case("stop") {
            Ok(Self::Stop)
        } else if s.eq_ignore_ascii_case("calibrate") {
            Ok(Self::Calibrate)
        } else {
            Err(CommandError::UnknownVerb)
        }
    }
}

/// A verb addressed to one module by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleCommand {
    pub module: ModuleName,
    pub kind: CommandKind,
}

impl ModuleCommand {
    pub fn new(module: &str, kind: CommandKind) -> Result<Self, CommandError> {
        let module = ModuleName::try_from(module).map_err(|()| CommandError::NameTooLong)?;
        Ok(Self { module, kind })
    }

    /// Parse `"<module> <verb>"` or `"<module>/<verb>"`.
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let line = line.trim();
        let (module, verb) = line
            .split_once('/')
            .or_else(|| line.split_once(char::is_whitespace))
            .ok_or(CommandError::Malformed)?;
        let (module, verb) = (module.trim(), verb.trim());
        if module.is_empty() || verb.is_empty() {
            return Err(CommandError::Malformed);
        }
        Self::new(module, verb.parse()?)
    }
}
