//! Integration tests: NodeService + subsystems + hardware adapters over
//! simulated pins.
//!
//! Commands go through the real [`CommandQueue`], telemetry through a
//! recording sink, and every assertion about actuators reads the simulated
//! GPIO level the adapter wrote.

use discnode::adapters::outbox::{FrameOutbox, decode_frame};
use discnode::app::channels::{CommandQueue, submit};
use discnode::app::commands::ModuleCommand;
use discnode::app::events::{NodeEvent, RejectReason};
use discnode::app::service::NodeService;
use discnode::config::{CaptureConfig, NodeConfig, TurnMode};
use discnode::module::ModuleStatus;
use discnode::subsystems::{Intake, IntakeState, Photobooth, PhotoboothState, Turntable, TurntableState};

use crate::mock_hw::{IntakeRig, PhotoboothRig, RecordingSink, TurntableRig};

fn command(line: &str) -> ModuleCommand {
    ModuleCommand::parse(line).unwrap()
}

fn run(
    svc: &mut NodeService<'_>,
    queue: &CommandQueue,
    sink: &mut RecordingSink,
    ticks: std::ops::RangeInclusive<u64>,
) {
    for now in ticks {
        svc.tick(now, queue, sink);
    }
}

// ── Intake ────────────────────────────────────────────────────

#[test]
fn intake_receives_then_sends_the_next_disc() {
    let cfg = NodeConfig::module_a_nucleo();
    let (rig, hw) = IntakeRig::new();
    let mut intake = Intake::new(hw, cfg.intake.clone().unwrap());
    let queue = CommandQueue::new();
    let mut sink = RecordingSink::default();
    let mut svc = NodeService::new(&cfg);
    svc.register("intake", &mut intake).unwrap();
    svc.start(0, &mut sink);
    assert!(rig.all_stopped());

    // Nothing loaded: straight to receive with the top roller pulling.
    submit(&queue, command("intake start"));
    svc.tick(1, &queue, &mut sink);
    assert_eq!(
        sink.last_report("intake").unwrap().state,
        IntakeState::Receive as u8
    );
    assert!(rig.top.forward());
    assert!(!rig.top.dir.level());
    assert!(rig.teeth.forward());
    assert!(rig.teeth.dir.level());
    assert!(!rig.intake.running());

    run(&mut svc, &queue, &mut sink, 2..=100);
    assert_eq!(sink.completions("intake"), 0);

    rig.break_beam();
    svc.tick(101, &queue, &mut sink);
    let report = sink.last_report("intake").unwrap();
    assert_eq!(report.state, IntakeState::Idle as u8);
    assert_eq!(report.status, ModuleStatus::Complete);
    assert!(rig.all_stopped());

    svc.tick(102, &queue, &mut sink);
    assert_eq!(sink.last_report("intake").unwrap().status, ModuleStatus::Idle);

    // A disc is on board now, so the next start sends it out first.
    submit(&queue, command("intake/START"));
    svc.tick(200, &queue, &mut sink);
    assert_eq!(
        sink.last_report("intake").unwrap().state,
        IntakeState::Send as u8
    );
    assert!(rig.intake.forward());
    assert!(!rig.intake.dir.level());
    assert!(!rig.top.running());

    run(&mut svc, &queue, &mut sink, 201..=2200);
    assert_eq!(
        sink.last_report("intake").unwrap().state,
        IntakeState::Send as u8
    );
    svc.tick(2201, &queue, &mut sink);
    assert_eq!(
        sink.last_report("intake").unwrap().state,
        IntakeState::Receive as u8
    );
    assert!(rig.top.forward());

    // Beam still blocked from the last disc: a held level is not an arrival.
    run(&mut svc, &queue, &mut sink, 2202..=2300);
    assert_eq!(sink.completions("intake"), 1);

    rig.clear_beam();
    svc.tick(2301, &queue, &mut sink);
    rig.break_beam();
    svc.tick(2302, &queue, &mut sink);
    assert_eq!(sink.completions("intake"), 2);
    assert!(rig.all_stopped());
}

// ── Turntable ─────────────────────────────────────────────────

#[test]
fn turntable_cycle_completes_once() {
    let cfg = NodeConfig::module_a_nucleo();
    let (rig, hw) = TurntableRig::new();
    let mut table = Turntable::new(hw, cfg.turntable.clone().unwrap());
    let queue = CommandQueue::new();
    let mut sink = RecordingSink::default();
    let mut svc = NodeService::new(&cfg);
    svc.register("turntable", &mut table).unwrap();
    svc.start(0, &mut sink);
    assert!(!rig.enable.level());
    assert!(!rig.spin.level());

    submit(&queue, command("turntable start"));
    svc.tick(10, &queue, &mut sink);
    assert_eq!(
        sink.last_report("turntable").unwrap().state,
        TurntableState::Rising as u8
    );
    assert!(rig.lift_raising());

    // One step edge per millisecond while the lift runs.
    let mut toggles = 0;
    let mut last = rig.step.level();
    for now in 11..=20 {
        svc.tick(now, &queue, &mut sink);
        if rig.step.level() != last {
            toggles += 1;
            last = rig.step.level();
        }
    }
    assert_eq!(toggles, 10);

    rig.upper.set(true);
    svc.tick(21, &queue, &mut sink);
    assert_eq!(
        sink.last_report("turntable").unwrap().state,
        TurntableState::Spinning as u8
    );
    assert!(rig.spin.level());
    assert!(!rig.enable.level());

    // Upper switch stays pressed: spinning still runs its full dwell.
    run(&mut svc, &queue, &mut sink, 22..=2021);
    assert_eq!(
        sink.last_report("turntable").unwrap().state,
        TurntableState::Spinning as u8
    );
    svc.tick(2022, &queue, &mut sink);
    assert_eq!(
        sink.last_report("turntable").unwrap().state,
        TurntableState::Lowering as u8
    );
    assert!(rig.lift_lowering());
    assert!(rig.spin.level());

    rig.upper.set(false);
    rig.lower.set(true);
    svc.tick(2023, &queue, &mut sink);
    let report = sink.last_report("turntable").unwrap();
    assert_eq!(report.state, TurntableState::Idle as u8);
    assert_eq!(report.status, ModuleStatus::Complete);
    assert!(!rig.enable.level());
    assert!(!rig.spin.level());

    // Lower switch held: no second completion.
    run(&mut svc, &queue, &mut sink, 2024..=2100);
    assert_eq!(sink.completions("turntable"), 1);
    assert_eq!(
        sink.last_report("turntable").unwrap().status,
        ModuleStatus::Idle
    );
}

#[test]
fn stop_command_parks_turntable() {
    let cfg = NodeConfig::module_a_nucleo();
    let (rig, hw) = TurntableRig::new();
    let mut table = Turntable::new(hw, cfg.turntable.clone().unwrap());
    let queue = CommandQueue::new();
    let mut sink = RecordingSink::default();
    let mut svc = NodeService::new(&cfg);
    svc.register("turntable", &mut table).unwrap();
    svc.start(0, &mut sink);

    submit(&queue, command("turntable start"));
    svc.tick(1, &queue, &mut sink);
    rig.upper.set(true);
    svc.tick(2, &queue, &mut sink);
    assert!(rig.spin.level());

    submit(&queue, command("turntable stop"));
    svc.tick(3, &queue, &mut sink);
    let report = sink.last_report("turntable").unwrap();
    assert_eq!(report.state, TurntableState::Idle as u8);
    assert_eq!(report.status, ModuleStatus::Idle);
    assert!(!rig.spin.level());
    assert!(!rig.enable.level());
    assert_eq!(sink.completions("turntable"), 0);
}

#[test]
fn stop_command_while_lowering_halts_the_lift() {
    let cfg = NodeConfig::module_a_nucleo();
    let (rig, hw) = TurntableRig::new();
    let mut table = Turntable::new(hw, cfg.turntable.clone().unwrap());
    let queue = CommandQueue::new();
    let mut sink = RecordingSink::default();
    let mut svc = NodeService::new(&cfg);
    svc.register("turntable", &mut table).unwrap();
    svc.start(0, &mut sink);

    submit(&queue, command("turntable start"));
    svc.tick(1, &queue, &mut sink);
    rig.upper.set(true);
    svc.tick(2, &queue, &mut sink);
    run(&mut svc, &queue, &mut sink, 3..=2003);
    assert_eq!(
        sink.last_report("turntable").unwrap().state,
        TurntableState::Lowering as u8
    );
    rig.upper.set(false);
    svc.tick(2004, &queue, &mut sink);
    assert!(rig.lift_lowering());

    submit(&queue, command("turntable stop"));
    svc.tick(2005, &queue, &mut sink);
    let report = sink.last_report("turntable").unwrap();
    assert_eq!(report.state, TurntableState::Idle as u8);
    assert_eq!(report.status, ModuleStatus::Idle);
    assert!(!rig.enable.level());
    assert!(!rig.spin.level());

    // Step line holds its level once the lift is parked.
    let step = rig.step.level();
    for now in 2006..=2050 {
        svc.tick(now, &queue, &mut sink);
        assert_eq!(rig.step.level(), step);
    }
    assert!(!rig.enable.level());
    assert_eq!(sink.completions("turntable"), 0);
}

// ── Commands ──────────────────────────────────────────────────

#[test]
fn busy_and_unknown_commands_are_rejected() {
    let cfg = NodeConfig::module_a_nucleo();
    let (_rig, hw) = TurntableRig::new();
    let mut table = Turntable::new(hw, cfg.turntable.clone().unwrap());
    let queue = CommandQueue::new();
    let mut sink = RecordingSink::default();
    let mut svc = NodeService::new(&cfg);
    svc.register("turntable", &mut table).unwrap();
    svc.start(0, &mut sink);

    submit(&queue, command("turntable start"));
    submit(&queue, command("turntable start"));
    submit(&queue, command("elevator start"));
    svc.tick(1, &queue, &mut sink);

    let rejected: Vec<_> = sink
        .events
        .iter()
        .filter_map(|e| match e {
            NodeEvent::CommandRejected { module, reason } => Some((module.as_str(), *reason)),
            _ => None,
        })
        .collect();
    assert_eq!(
        rejected,
        vec![
            ("turntable", RejectReason::Busy),
            ("elevator", RejectReason::UnknownModule),
        ]
    );
    // The running cycle was not restarted.
    assert_eq!(
        sink.last_report("turntable").unwrap().status,
        ModuleStatus::Running
    );
}

// ── Photobooth ────────────────────────────────────────────────

#[test]
fn photobooth_capture_sweep_drives_step_and_leds() {
    let cfg = NodeConfig::module_d_photobooth();
    let mut booth_cfg = cfg.photobooth.clone().unwrap();
    booth_cfg.turn = TurnMode::Capture(CaptureConfig {
        views: 2,
        microsteps_per_view: 2,
        step_half_period_ms: 5,
        flash_ms: 10,
    });
    let (rig, hw) = PhotoboothRig::new();
    let mut booth = Photobooth::new(hw, booth_cfg);
    // Boot pattern until the first tick.
    assert_eq!(rig.leds(), (true, true, true));

    let queue = CommandQueue::new();
    let mut sink = RecordingSink::default();
    let mut svc = NodeService::new(&cfg);
    svc.register("photobooth", &mut booth).unwrap();
    svc.start(0, &mut sink);
    svc.tick(1, &queue, &mut sink);
    assert_eq!(rig.leds(), (true, false, false));

    submit(&queue, command("photobooth start"));
    svc.tick(2, &queue, &mut sink);
    assert_eq!(rig.leds(), (false, true, false));
    assert!(rig.lift.forward());

    rig.press_upper();
    let mut step_rises = 0;
    let mut flashes = 0;
    let mut prev_step = rig.step.level();
    let mut prev_leds = rig.leds();
    let mut lowering_at = None;
    for now in 3..=200 {
        svc.tick(now, &queue, &mut sink);
        if rig.step.level() && !prev_step {
            step_rises += 1;
        }
        if rig.leds() == (true, true, true) && prev_leds != (true, true, true) {
            flashes += 1;
        }
        prev_step = rig.step.level();
        prev_leds = rig.leds();
        if sink.last_report("photobooth").unwrap().state == PhotoboothState::Lowering as u8 {
            lowering_at = Some(now);
            break;
        }
    }
    assert_eq!(step_rises, 4);
    assert_eq!(flashes, 2);
    // Two views of (2 x 10 ms steps + 10 ms flash) from t=3.
    assert_eq!(lowering_at, Some(63));
    assert!(rig.lift.reverse());
    assert!(!rig.step.level());
    assert_eq!(rig.leds(), (true, true, false));

    rig.press_lower();
    svc.tick(64, &queue, &mut sink);
    let report = sink.last_report("photobooth").unwrap();
    assert_eq!(report.state, PhotoboothState::Idle as u8);
    assert_eq!(report.status, ModuleStatus::Complete);
    assert!(!rig.lift.running());
    assert_eq!(rig.leds(), (true, false, false));
}

// ── Node telemetry ────────────────────────────────────────────

#[test]
fn heartbeat_carries_every_module() {
    let cfg = NodeConfig::module_a_nucleo();
    let (_irig, ihw) = IntakeRig::new();
    let (_trig, thw) = TurntableRig::new();
    let mut intake = Intake::new(ihw, cfg.intake.clone().unwrap());
    let mut table = Turntable::new(thw, cfg.turntable.clone().unwrap());
    let queue = CommandQueue::new();
    let mut sink = RecordingSink::default();
    let mut svc = NodeService::new(&cfg);
    svc.register("intake", &mut intake).unwrap();
    svc.register("turntable", &mut table).unwrap();
    svc.start(0, &mut sink);

    run(&mut svc, &queue, &mut sink, 1..=1500);
    let heartbeats: Vec<_> = sink
        .events
        .iter()
        .filter_map(|e| match e {
            NodeEvent::Heartbeat {
                node,
                uptime_ms,
                modules,
            } => Some((node.as_str(), *uptime_ms, modules.len())),
            _ => None,
        })
        .collect();
    assert_eq!(heartbeats, vec![("module_a", 1500, 2)]);
}

#[test]
fn framed_telemetry_decodes_on_the_controller_side() {
    let cfg = NodeConfig::module_a_nucleo();
    let (rig, hw) = IntakeRig::new();
    let mut intake = Intake::new(hw, cfg.intake.clone().unwrap());
    let queue = CommandQueue::new();
    let mut outbox: FrameOutbox<8> = FrameOutbox::new();
    let mut svc = NodeService::new(&cfg);
    svc.register("intake", &mut intake).unwrap();
    svc.start(0, &mut outbox);

    submit(&queue, command("intake start"));
    svc.tick(1, &queue, &mut outbox);
    rig.break_beam();
    svc.tick(2, &queue, &mut outbox);

    let mut decoded = Vec::new();
    while let Some(mut frame) = outbox.pop() {
        decoded.push(decode_frame(&mut frame).unwrap());
    }
    assert_eq!(decoded.len(), 3);
    assert!(matches!(decoded[0], NodeEvent::Started { modules: 1, .. }));
    match &decoded[2] {
        NodeEvent::ModuleReport(r) => {
            assert_eq!(r.module.as_str(), "intake");
            assert_eq!(r.status, ModuleStatus::Complete);
        }
        other => panic!("unexpected frame {other:?}"),
    }
}
