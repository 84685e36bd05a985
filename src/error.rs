//! Unified error types for the module node firmware.
//!
//! A single `Error` enum that every subsystem can convert into, keeping the
//! tick loop's error handling uniform.  All variants are `Copy` so they can
//! be logged and passed back through the registry without allocation.
//!
//! None of these errors stop the loop: callers log them and carry on, so a
//! misbehaving subsystem degrades to "stuck, still reporting RUNNING".

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A digital or PWM pin operation failed.
    Gpio(GpioError),
    /// Module registration or dispatch was rejected.
    Registry(RegistryError),
    /// An inbound controller command could not be parsed.
    Command(CommandError),
    /// Configuration is invalid.
    Config(ConfigError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gpio(e) => write!(f, "gpio: {e}"),
            Self::Registry(e) => write!(f, "registry: {e}"),
            Self::Command(e) => write!(f, "command: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// GPIO errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpioError {
    /// Digital input read failed.
    ReadFailed,
    /// Digital output write failed.
    WriteFailed,
    /// PWM duty-cycle write failed.
    PwmFailed,
}

impl fmt::Display for GpioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadFailed => write!(f, "digital read failed"),
            Self::WriteFailed => write!(f, "digital write failed"),
            Self::PwmFailed => write!(f, "PWM write failed"),
        }
    }
}

impl From<GpioError> for Error {
    fn from(e: GpioError) -> Self {
        Self::Gpio(e)
    }
}

// ---------------------------------------------------------------------------
// Registry errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryError {
    /// A module with this name is already registered.
    DuplicateName,
    /// No free slot left in the registry.
    Full,
    /// Module name does not fit the fixed-size name buffer.
    NameTooLong,
    /// No module is registered under the addressed name.
    UnknownModule,
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateName => write!(f, "module name already registered"),
            Self::Full => write!(f, "registry full"),
            Self::NameTooLong => write!(f, "module name too long"),
            Self::UnknownModule => write!(f, "unknown module"),
        }
    }
}

impl From<RegistryError> for Error {
    fn from(e: RegistryError) -> Self {
        Self::Registry(e)
    }
}

// ---------------------------------------------------------------------------
// Command errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandError {
    /// The command line was empty or had no verb.
    Malformed,
    /// The verb is not one of start / stop / calibrate.
    UnknownVerb,
    /// The module name does not fit the fixed-size name buffer.
    NameTooLong,
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed => write!(f, "malformed command"),
            Self::UnknownVerb => write!(f, "unknown verb"),
            Self::NameTooLong => write!(f, "module name too long"),
        }
    }
}

impl From<CommandError> for Error {
    fn from(e: CommandError) -> Self {
        Self::Command(e)
    }
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

/// A configuration field failed range validation.
/// The `&'static str` names the field and the violated bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigError(pub &'static str);

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "validation failed: {}", self.0)
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}
