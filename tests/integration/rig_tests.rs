//! Loop-level scenarios: one `BrewRig` against the recording mock.

use brewrig::app::commands::RigCommand;
use brewrig::app::events::RigEvent;
use brewrig::app::ports::OutputLine;
use brewrig::config::RigConfig;
use brewrig::error::{Error, ScheduleError};
use brewrig::rig::{BrewRig, Step};
use brewrig::schedule::EventKind;

use crate::mock_hw::{MockHardware, RecordingSink};

/// Dispatch everything due at `now`, stopping at the first `Wait`.
fn drain_due(
    rig: &mut BrewRig,
    hw: &mut MockHardware,
    sink: &mut RecordingSink,
    now: f64,
) -> f64 {
    loop {
        match rig.poll(now, hw, sink).expect("poll failed") {
            Step::Dispatched(_) => {}
            Step::Wait { next_due } => return next_due,
        }
    }
}

#[test]
fn cold_start_commands_heat_within_one_cycle() {
    let config = RigConfig::default();
    let mut rig = BrewRig::new(&config, 0.0).unwrap();
    let mut hw = MockHardware::new(&config, 70.0);
    let mut sink = RecordingSink::default();

    // Before the first deadline nothing happens.
    let step = rig.poll(0.5, &mut hw, &mut sink).unwrap();
    assert_eq!(step, Step::Wait { next_due: 1.0 });
    assert!(hw.writes.is_empty());

    // First control cycle: tick, then the switch event it queued.
    drain_due(&mut rig, &mut hw, &mut sink, 1.0);
    assert_eq!(hw.writes, vec![(OutputLine::BoilElement, true)]);
    assert!(sink.events.contains(&RigEvent::Switched {
        line: OutputLine::BoilElement,
        on: true
    }));
}

#[test]
fn steady_error_commands_the_element_exactly_once() {
    let config = RigConfig::default();
    let mut rig = BrewRig::new(&config, 0.0).unwrap();
    let mut hw = MockHardware::new(&config, 70.0);
    let mut sink = RecordingSink::default();

    // Ten cycles with the kettle stuck cold: hysteresis must not
    // re-command an element that is already on.
    let mut now = 1.0;
    for _ in 0..10 {
        now = drain_due(&mut rig, &mut hw, &mut sink, now);
    }
    assert_eq!(hw.writes_to(OutputLine::BoilElement), 1);
}

#[test]
fn bus_fault_mid_run_does_not_disturb_the_element() {
    let config = RigConfig::default();
    let mut rig = BrewRig::new(&config, 0.0).unwrap();
    let mut hw = MockHardware::new(&config, 70.0);
    let mut sink = RecordingSink::default();

    let now = drain_due(&mut rig, &mut hw, &mut sink, 1.0);
    assert_eq!(hw.line_state(OutputLine::BoilElement), Some(true));

    hw.bus_faulted = true;
    let mut now = now;
    for _ in 0..3 {
        now = drain_due(&mut rig, &mut hw, &mut sink, now);
    }

    // Faulted reads hold the last filtered values: no switching churn.
    assert_eq!(hw.writes_to(OutputLine::BoilElement), 1);
    assert!(sink.count(|e| matches!(e, RigEvent::SensorFault { .. })) >= 3);

    // Reads coming back are picked up without any special recovery step.
    hw.bus_faulted = false;
    drain_due(&mut rig, &mut hw, &mut sink, now);
    assert!(rig.brewing().unwrap().boil_filtered().is_some());
}

#[test]
fn fermentation_cooling_cycle_round_trip() {
    let config = RigConfig {
        brewing_enabled: false,
        fermentation_enabled: true,
        ..RigConfig::default()
    };
    let mut rig = BrewRig::new(&config, 0.0).unwrap();
    let mut hw = MockHardware::new(&config, 70.0);
    hw.chamber_f = 70.0; // setpoint is 60: ten degrees too warm
    let mut sink = RecordingSink::default();

    let now = drain_due(&mut rig, &mut hw, &mut sink, 60.0);
    assert_eq!(hw.writes, vec![(OutputLine::Compressor, true)]);
    assert_eq!(now, 120.0, "one-minute cadence");

    // Pulled well under the band: the next cycle shuts the compressor off.
    hw.chamber_f = 50.0;
    drain_due(&mut rig, &mut hw, &mut sink, 120.0);
    assert_eq!(hw.line_state(OutputLine::Compressor), Some(false));
}

#[test]
fn fermentation_setpoint_locked_while_profile_loaded() {
    let config = RigConfig {
        fermentation_enabled: true,
        ..RigConfig::default()
    };
    let mut rig = BrewRig::new(&config, 0.0).unwrap();
    let mut sink = RecordingSink::default();

    let err = rig
        .handle_command(RigCommand::SetFermentationSetpoint(55.0), 0.0, &mut sink)
        .unwrap_err();
    assert_eq!(err, Error::SetpointLocked("fermentation"));
}

#[test]
fn empty_schedule_halts_the_loop() {
    let config = RigConfig {
        brewing_enabled: false,
        fermentation_enabled: false,
        ..RigConfig::default()
    };
    let mut rig = BrewRig::new(&config, 0.0).unwrap();
    let mut hw = MockHardware::new(&config, 70.0);
    let mut sink = RecordingSink::default();

    let err = rig.poll(0.0, &mut hw, &mut sink).unwrap_err();
    assert_eq!(err, Error::Schedule(ScheduleError::Empty));
    assert!(sink.events.contains(&RigEvent::ScheduleUnderrun));
}

#[test]
fn schedule_is_never_left_empty_by_a_controller() {
    let config = RigConfig {
        fermentation_enabled: true,
        ..RigConfig::default()
    };
    let mut rig = BrewRig::new(&config, 0.0).unwrap();
    let mut hw = MockHardware::new(&config, 70.0);
    let mut sink = RecordingSink::default();

    let mut now = 1.0;
    for _ in 0..200 {
        now = drain_due(&mut rig, &mut hw, &mut sink, now);
        assert!(!rig.schedule().is_empty());
        assert_eq!(
            rig.schedule()
                .iter()
                .filter(|e| e.kind == EventKind::ControlBrewing)
                .count(),
            1
        );
    }
}

#[test]
fn status_reports_both_controllers() {
    let config = RigConfig {
        fermentation_enabled: true,
        ..RigConfig::default()
    };
    let mut rig = BrewRig::new(&config, 0.0).unwrap();
    let mut hw = MockHardware::new(&config, 70.0);
    let mut sink = RecordingSink::default();
    drain_due(&mut rig, &mut hw, &mut sink, 60.0);

    let status = rig.status();
    assert!(status.boil_temp_f.is_some());
    assert!(status.chamber_temp_f.is_some());
    assert!(status.pending_events >= 2);

    let json = serde_json::to_string(&status).unwrap();
    assert!(json.contains("\"phase\":\"Heating\""));
}
