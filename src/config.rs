//! Node configuration parameters
//!
//! All tunable parameters for the module node: motor speeds, dwell timers,
//! sensor polarity and loop cadence.  Board variants are expressed as
//! presets rather than defaults; every sensor input must state its active
//! level explicitly.

use heapless::String;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Maximum length of a node or module name in bytes.
pub const NAME_CAPACITY: usize = 16;

// ---------------------------------------------------------------------------
// Sensor polarity
// ---------------------------------------------------------------------------

/// Electrical level at which a digital input counts as "asserted".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActiveLevel {
    High,
    Low,
}

impl ActiveLevel {
    /// Translate a raw pin reading into the logical asserted state.
    pub fn is_asserted(self, pin_high: bool) -> bool {
        match self {
            Self::High => pin_high,
            Self::Low => !pin_high,
        }
    }
}

// ---------------------------------------------------------------------------
// Intake
// ---------------------------------------------------------------------------

/// What `start()` does when no disc is held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SendPolicy {
    /// Send only when a disc is held; otherwise go straight to receiving.
    WhenDiscPresent,
    /// Always run the send phase first (SAMD board wiring).
    Always,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntakeConfig {
    /// Beam-break polarity.  Broken beam = asserted.
    pub beam_break_level: ActiveLevel,
    /// PWM speed (0-255) for the intake, top and teeth motors.
    pub motor_speed: u8,
    /// Upper bound on the send phase (milliseconds).
    pub send_dwell_ms: u32,
    pub send_policy: SendPolicy,
    /// Whether a disc is held at boot.
    pub disc_preloaded: bool,
}

impl IntakeConfig {
    pub fn new(beam_break_level: ActiveLevel) -> Self {
        Self {
            beam_break_level,
            motor_speed: 230,
            send_dwell_ms: 2000,
            send_policy: SendPolicy::WhenDiscPresent,
            disc_preloaded: false,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.motor_speed == 0 {
            return Err(ConfigError("intake.motor_speed must be > 0"));
        }
        if self.send_dwell_ms == 0 {
            return Err(ConfigError("intake.send_dwell_ms must be > 0"));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Turntable
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurntableConfig {
    /// Polarity shared by the upper and lower lift limit switches.
    pub limit_switch_level: ActiveLevel,
    /// How long the table spins at the top (milliseconds).
    pub spin_dwell_ms: u32,
    /// Lift stepper pulse half-period (milliseconds).
    pub lift_step_interval_ms: u32,
}

impl TurntableConfig {
    pub fn new(limit_switch_level: ActiveLevel) -> Self {
        Self {
            limit_switch_level,
            spin_dwell_ms: 2000,
            lift_step_interval_ms: 1,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.spin_dwell_ms == 0 {
            return Err(ConfigError("turntable.spin_dwell_ms must be > 0"));
        }
        if self.lift_step_interval_ms == 0 {
            return Err(ConfigError("turntable.lift_step_interval_ms must be > 0"));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Photobooth
// ---------------------------------------------------------------------------

/// Photo capture sweep: the turntable is stepped through a number of views
/// with a flash after each one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureConfig {
    pub views: u8,
    pub microsteps_per_view: u8,
    /// Duration of each step HIGH and each step LOW phase (milliseconds).
    pub step_half_period_ms: u32,
    /// LED flash duration after each view (milliseconds).
    pub flash_ms: u32,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            views: 8,
            microsteps_per_view: 25,
            step_half_period_ms: 300,
            flash_ms: 1000,
        }
    }
}

/// How the photobooth spends its time at the top of the lift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnMode {
    /// Fixed dwell with the turntable idle.
    Dwell { dwell_ms: u32 },
    /// Step-and-flash capture sweep.
    Capture(CaptureConfig),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoboothConfig {
    /// Polarity shared by the upper and lower lift limit switches.
    pub limit_switch_level: ActiveLevel,
    /// PWM speed (0-255) of the lift DC motor.
    pub lift_speed: u8,
    pub turn: TurnMode,
}

impl PhotoboothConfig {
    pub fn new(limit_switch_level: ActiveLevel, turn: TurnMode) -> Self {
        Self {
            limit_switch_level,
            lift_speed: 200,
            turn,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.lift_speed == 0 {
            return Err(ConfigError("photobooth.lift_speed must be > 0"));
        }
        match self.turn {
            TurnMode::Dwell { dwell_ms: 0 } => {
                Err(ConfigError("photobooth.turn.dwell_ms must be > 0"))
            }
            TurnMode::Capture(c) if c.views == 0 || c.microsteps_per_view == 0 => Err(
                ConfigError("photobooth.turn.capture needs at least one view and step"),
            ),
            TurnMode::Capture(c) if c.step_half_period_ms == 0 => Err(ConfigError(
                "photobooth.turn.capture.step_half_period_ms must be > 0",
            )),
            _ => Ok(()),
        }
    }
}

// ---------------------------------------------------------------------------
// Node
// ---------------------------------------------------------------------------

/// Core node configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Name reported in heartbeats.
    pub node_name: String<NAME_CAPACITY>,
    /// Heartbeat cadence (milliseconds).
    pub status_interval_ms: u32,
    /// Main loop period (milliseconds).
    pub tick_interval_ms: u32,
    pub intake: Option<IntakeConfig>,
    pub turntable: Option<TurntableConfig>,
    pub photobooth: Option<PhotoboothConfig>,
}

impl NodeConfig {
    /// An empty node with no subsystems fitted.
    pub fn new(node_name: &str) -> Result<Self, ConfigError> {
        let node_name = String::try_from(node_name)
            .map_err(|()| ConfigError("node_name longer than 16 bytes"))?;
        Ok(Self {
            node_name,
            status_interval_ms: 1500,
            tick_interval_ms: 1,
            intake: None,
            turntable: None,
            photobooth: None,
        })
    }

    /// Module A on the SAMD board: intake only, IR beam break pulls low
    /// when broken, always sends first.
    pub fn module_a_samd() -> Self {
        let mut intake = IntakeConfig::new(ActiveLevel::Low);
        intake.send_policy = SendPolicy::Always;
        Self {
            node_name: fixed_name("module_a"),
            status_interval_ms: 1500,
            tick_interval_ms: 1,
            intake: Some(intake),
            turntable: None,
            photobooth: None,
        }
    }

    /// Module A on the Nucleo board: intake plus the stepper turntable.
    /// Limit switches read high when pressed.
    pub fn module_a_nucleo() -> Self {
        Self {
            node_name: fixed_name("module_a"),
            status_interval_ms: 1500,
            tick_interval_ms: 1,
            intake: Some(IntakeConfig::new(ActiveLevel::Low)),
            turntable: Some(TurntableConfig::new(ActiveLevel::High)),
            photobooth: None,
        }
    }

    /// Module D: photobooth with pulled-up limit switches and the full
    /// capture sweep.
    pub fn module_d_photobooth() -> Self {
        Self {
            node_name: fixed_name("module_d"),
            status_interval_ms: 1500,
            tick_interval_ms: 1,
            intake: None,
            turntable: None,
            photobooth: Some(PhotoboothConfig::new(
                ActiveLevel::Low,
                TurnMode::Capture(CaptureConfig::default()),
            )),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_interval_ms == 0 {
            return Err(ConfigError("tick_interval_ms must be > 0"));
        }
        if self.status_interval_ms < self.tick_interval_ms {
            return Err(ConfigError("status_interval_ms must be >= tick_interval_ms"));
        }
        if let Some(c) = &self.intake {
            c.validate()?;
        }
        if let Some(c) = &self.turntable {
            c.validate()?;
        }
        if let Some(c) = &self.photobooth {
            c.validate()?;
        }
        Ok(())
    }
}

/// Preset names are short literals; truncate rather than fail.
fn fixed_name(name: &str) -> String<NAME_CAPACITY> {
    let mut out = String::new();
    for c in name.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}
