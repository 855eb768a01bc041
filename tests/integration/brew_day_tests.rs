//! Whole-brew-day scenario against the simulated thermal plant.
//!
//! Drives the rig exactly the way the `brewrig-sim` binary does, on
//! virtual time with permission prompts auto-granted, and then audits
//! the emitted event stream for the expected shape of a brew day.

use brewrig::adapters::sim::SimPlant;
use brewrig::app::commands::RigCommand;
use brewrig::app::events::RigEvent;
use brewrig::app::ports::OutputLine;
use brewrig::brewing::Phase;
use brewrig::config::{ProfileStep, RigConfig};
use brewrig::rig::{BrewRig, Step};

use crate::mock_hw::RecordingSink;

const HORIZON_SECS: f64 = 4.0 * 3600.0;

fn short_mash_config() -> RigConfig {
    let mut config = RigConfig::default();
    config.mash_profile.clear();
    config
        .mash_profile
        .push(ProfileStep { hold_secs: 60.0, target_f: 152.0 })
        .ok();
    config
        .mash_profile
        .push(ProfileStep { hold_secs: 60.0, target_f: 155.0 })
        .ok();
    config
}

#[test]
fn full_brew_day_runs_heating_to_rolling_boil() {
    let config = short_mash_config();
    let mut plant = SimPlant::new(&config, 70.0);
    let mut sink = RecordingSink::default();
    let mut rig = BrewRig::new(&config, 0.0).unwrap();

    let mut now = 0.0_f64;
    let mut reached_boil = false;
    while now < HORIZON_SECS {
        match rig.poll(now, &mut plant, &mut sink).unwrap() {
            Step::Dispatched(_) => {}
            Step::Wait { next_due } => {
                plant.step((next_due - now) as f32);
                now = next_due;
            }
        }
        if rig.brewing().is_some_and(|b| b.permission_pending()) {
            rig.handle_command(RigCommand::GrantPermission, now, &mut sink)
                .unwrap();
        }
        let boiling = rig.brewing().is_some_and(|b| {
            b.phase() == Phase::Boiling
                && b.boil_filtered().is_some_and(|t| t >= 212.0)
        });
        if boiling {
            reached_boil = true;
            break;
        }
    }
    assert!(reached_boil, "never reached a rolling boil (t+{now:.0}s)");

    // The phase machine must have walked the brew day in order.
    let transitions: Vec<_> = sink
        .events
        .iter()
        .filter_map(|e| match e {
            RigEvent::PhaseChanged { from, to } => Some((*from, *to)),
            _ => None,
        })
        .collect();
    assert_eq!(
        transitions,
        vec![
            (Phase::Heating, Phase::Holding),
            (Phase::Holding, Phase::Mashing),
            (Phase::Mashing, Phase::Boiling),
        ]
    );

    // Both profile steps ran, in order, and the profile completed.
    let steps: Vec<_> = sink
        .events
        .iter()
        .filter_map(|e| match e {
            RigEvent::MashStepStarted { step, .. } => Some(*step),
            _ => None,
        })
        .collect();
    assert_eq!(steps, vec![0, 1]);
    assert_eq!(sink.count(|e| matches!(e, RigEvent::MashProfileComplete)), 1);

    // The pump recirculated during the mash and was shut off for the boil.
    let pump_switches: Vec<_> = sink
        .events
        .iter()
        .filter_map(|e| match e {
            RigEvent::Switched { line: OutputLine::Pump1, on } => Some(*on),
            _ => None,
        })
        .collect();
    assert_eq!(pump_switches.first(), Some(&true));
    assert_eq!(pump_switches.last(), Some(&false));

    // Fermentation is disabled in this run: the compressor never moves.
    assert_eq!(
        sink.count(|e| matches!(
            e,
            RigEvent::Switched { line: OutputLine::Compressor, .. }
        )),
        0
    );
}

#[test]
fn brew_day_with_fermentation_holds_the_chamber() {
    let config = RigConfig {
        fermentation_enabled: true,
        ..short_mash_config()
    };
    let mut plant = SimPlant::new(&config, 70.0);
    let mut sink = RecordingSink::default();
    let mut rig = BrewRig::new(&config, 0.0).unwrap();

    // Half an hour of virtual time is dozens of fermentation cycles.
    let mut now = 0.0_f64;
    while now < 1800.0 {
        match rig.poll(now, &mut plant, &mut sink).unwrap() {
            Step::Dispatched(_) => {}
            Step::Wait { next_due } => {
                plant.step((next_due - now) as f32);
                now = next_due;
            }
        }
        if rig.brewing().is_some_and(|b| b.permission_pending()) {
            rig.handle_command(RigCommand::GrantPermission, now, &mut sink)
                .unwrap();
        }
    }

    // 70degF chamber vs a 60degF setpoint: the compressor came on and the
    // chamber is being pulled toward the band.
    assert!(
        sink.count(|e| matches!(
            e,
            RigEvent::Switched { line: OutputLine::Compressor, on: true }
        )) >= 1
    );
    let chamber = rig.fermentation().unwrap().chamber_filtered().unwrap();
    assert!(chamber < 70.0, "got {chamber}");
}
