//! Disc node firmware, bring-up entry point.
//!
//! Wires ESP32-S3 peripherals into the subsystem adapters for the selected
//! board and runs the cooperative tick loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  IntakeHardware   TurntableHardware   PhotoboothHardware       │
//! │  LogTelemetrySink MonotonicClock      console command reader   │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │        NodeService (registry · heartbeat)              │    │
//! │  │  Intake FSM · Turntable FSM · Photobooth FSM           │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Pin map (ESP32-S3 carrier):
//!
//! | Board     | Role                         | GPIO            |
//! |-----------|------------------------------|-----------------|
//! | module_a  | beam break (pull-up)         | 4               |
//! |           | intake / top / teeth PWM     | 1 / 2 / 3       |
//! |           | intake / top / teeth DIR     | 5 / 6 / 7       |
//! |           | upper / lower limit          | 8 / 9           |
//! |           | lift STEP / DIR / EN         | 10 / 11 / 12    |
//! |           | spin enable                  | 13              |
//! | module_d  | upper / lower limit (pull-up)| 8 / 9           |
//! |           | lift PWM / DIR               | 1 / 5           |
//! |           | turn STEP / DIR              | 10 / 11         |
//! |           | LED blue / yellow / green    | 14 / 15 / 16    |
#![deny(unused_must_use)]

// ── Imports ───────────────────────────────────────────────────
use std::io::BufRead;
use std::time::Duration;

use anyhow::{Result, anyhow};
use esp_idf_svc::hal::delay::FreeRtos;
use esp_idf_svc::hal::gpio::{PinDriver, Pull};
use esp_idf_svc::hal::ledc::{LedcDriver, LedcTimerDriver, config::TimerConfig};
use esp_idf_svc::hal::peripherals::Peripherals;
use esp_idf_svc::hal::prelude::*;
use log::{info, warn};

use discnode::adapters::log_sink::LogTelemetrySink;
use discnode::adapters::time::MonotonicClock;
use discnode::app::channels::{COMMAND_CHANNEL, submit};
use discnode::app::commands::ModuleCommand;
use discnode::app::ports::Clock;
use discnode::app::service::NodeService;
use discnode::config::{ActiveLevel, NodeConfig};
use discnode::drivers::motor::DcMotor;

#[cfg(not(feature = "board-module-d"))]
use discnode::{
    adapters::hardware::{IntakeHardware, TurntableHardware},
    drivers::stepper::Stepper,
    subsystems::{Intake, Turntable},
};

#[cfg(feature = "board-module-d")]
use discnode::{
    adapters::hardware::PhotoboothHardware,
    drivers::status_led::{Led, LedBank},
    subsystems::Photobooth,
};

/// Motor PWM carrier frequency.
const PWM_FREQ_KHZ: u32 = 20;

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  discnode v{}                      ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Board configuration ────────────────────────────────
    #[cfg(feature = "board-module-d")]
    let config = NodeConfig::module_d_photobooth();
    #[cfg(not(feature = "board-module-d"))]
    let config = NodeConfig::module_a_nucleo();
    config.validate().map_err(discnode::Error::from)?;
    info!("Board preset '{}'", config.node_name);

    // ── 3. Console command reader ─────────────────────────────
    std::thread::Builder::new()
        .name("console".into())
        .stack_size(4096)
        .spawn(console_reader)?;

    // ── 4. Peripherals + subsystems, then the tick loop ───────
    let p = Peripherals::take()?;
    run_board(p, &config)
}

// ── Board wiring ──────────────────────────────────────────────

fn pwm_timer(
    timer: esp_idf_svc::hal::ledc::TIMER0,
) -> Result<LedcTimerDriver<'static, esp_idf_svc::hal::ledc::TIMER0>> {
    Ok(LedcTimerDriver::new(
        timer,
        &TimerConfig::default().frequency(PWM_FREQ_KHZ.kHz().into()),
    )?)
}

#[cfg(not(feature = "board-module-d"))]
fn run_board(p: Peripherals, config: &NodeConfig) -> Result<()> {
    let timer = pwm_timer(p.ledc.timer0)?;
    let intake_cfg = config
        .intake
        .clone()
        .ok_or_else(|| anyhow!("module_a preset without intake"))?;
    let turntable_cfg = config
        .turntable
        .clone()
        .ok_or_else(|| anyhow!("module_a preset without turntable"))?;

    let mut beam = PinDriver::input(p.pins.gpio4)?;
    beam.set_pull(Pull::Up)?;
    // Intake and top rollers run forward with their invert line low.
    let intake_motor = DcMotor::new(
        LedcDriver::new(p.ledc.channel0, &timer, p.pins.gpio1)?,
        PinDriver::output(p.pins.gpio5)?,
        ActiveLevel::Low,
    );
    let top_motor = DcMotor::new(
        LedcDriver::new(p.ledc.channel1, &timer, p.pins.gpio2)?,
        PinDriver::output(p.pins.gpio6)?,
        ActiveLevel::Low,
    );
    let teeth_motor = DcMotor::new(
        LedcDriver::new(p.ledc.channel2, &timer, p.pins.gpio3)?,
        PinDriver::output(p.pins.gpio7)?,
        ActiveLevel::High,
    );
    let mut intake = Intake::new(
        IntakeHardware::new(beam, intake_motor, top_motor, teeth_motor),
        intake_cfg,
    );

    // The lift carrier reverses its DIR line: low raises.
    let lift = Stepper::new(
        PinDriver::output(p.pins.gpio10)?,
        PinDriver::output(p.pins.gpio11)?,
        PinDriver::output(p.pins.gpio12)?,
        ActiveLevel::Low,
    );
    let mut turntable = Turntable::new(
        TurntableHardware::new(
            PinDriver::input(p.pins.gpio8)?,
            PinDriver::input(p.pins.gpio9)?,
            lift,
            PinDriver::output(p.pins.gpio13)?,
        ),
        turntable_cfg,
    );

    let mut service = NodeService::new(config);
    // Rejections are logged by the registry; the node runs without them.
    let _ = service.register("intake", &mut intake);
    let _ = service.register("turntable", &mut turntable);
    run_loop(config, &mut service)
}

#[cfg(feature = "board-module-d")]
fn run_board(p: Peripherals, config: &NodeConfig) -> Result<()> {
    let timer = pwm_timer(p.ledc.timer0)?;
    let booth_cfg = config
        .photobooth
        .clone()
        .ok_or_else(|| anyhow!("module_d preset without photobooth"))?;

    let mut upper = PinDriver::input(p.pins.gpio8)?;
    upper.set_pull(Pull::Up)?;
    let mut lower = PinDriver::input(p.pins.gpio9)?;
    lower.set_pull(Pull::Up)?;
    let lift = DcMotor::new(
        LedcDriver::new(p.ledc.channel0, &timer, p.pins.gpio1)?,
        PinDriver::output(p.pins.gpio5)?,
        ActiveLevel::High,
    );
    // Turn direction is fixed for the whole sweep.
    let mut turn_dir = PinDriver::output(p.pins.gpio11)?;
    turn_dir.set_high()?;

    let leds = LedBank::new(
        Led::new(PinDriver::output(p.pins.gpio14)?, ActiveLevel::High)
            .map_err(discnode::Error::from)?,
        Led::new(PinDriver::output(p.pins.gpio15)?, ActiveLevel::Low)
            .map_err(discnode::Error::from)?,
        Led::new(PinDriver::output(p.pins.gpio16)?, ActiveLevel::Low)
            .map_err(discnode::Error::from)?,
    );
    let mut photobooth = Photobooth::new(
        PhotoboothHardware::new(upper, lower, lift, PinDriver::output(p.pins.gpio10)?, leds),
        booth_cfg,
    );

    let mut service = NodeService::new(config);
    let _ = service.register("photobooth", &mut photobooth);
    run_loop(config, &mut service)
}

// ── Tick loop ─────────────────────────────────────────────────

fn run_loop(config: &NodeConfig, service: &mut NodeService<'_>) -> ! {
    let clock = MonotonicClock::new();
    let mut sink = LogTelemetrySink::new();

    service.start(clock.now_ms(), &mut sink);
    info!("Entering tick loop ({} ms)", config.tick_interval_ms);

    loop {
        service.tick(clock.now_ms(), &COMMAND_CHANNEL, &mut sink);
        FreeRtos::delay_ms(config.tick_interval_ms);
    }
}

// ── Console commands ──────────────────────────────────────────
//
// Lines such as `intake start` or `turntable/stop` typed on the serial
// console are parsed and queued for the tick loop.

fn console_reader() {
    let stdin = std::io::stdin();
    let mut line = String::new();
    loop {
        line.clear();
        match stdin.lock().read_line(&mut line) {
            Ok(0) | Err(_) => {
                std::thread::sleep(Duration::from_millis(50));
                continue;
            }
            Ok(_) => {}
        }
        if line.trim().is_empty() {
            continue;
        }
        match ModuleCommand::parse(&line) {
            Ok(cmd) => {
                submit(&COMMAND_CHANNEL, cmd);
            }
            Err(e) => warn!("console: '{}': {}", line.trim(), e),
        }
    }
}
