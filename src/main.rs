//! brewrig-sim: a full brew day against the simulated plant.
//!
//! Runs the real control core on virtual time: every `Wait` from the
//! rig fast-forwards the clock and the thermal model to the next
//! deadline, so hours of mash pass in well under a minute of wall time.
//! Operator permission prompts are auto-granted, making this both a
//! demo and a smoke test of the whole phase machine.

#![deny(unused_must_use)]

use anyhow::{Context, bail};
use log::{error, info};

use brewrig::adapters::log_sink::LogEventSink;
use brewrig::adapters::sim::SimPlant;
use brewrig::app::commands::RigCommand;
use brewrig::brewing::Phase;
use brewrig::config::RigConfig;
use brewrig::rig::{BrewRig, Step};

const AMBIENT_F: f32 = 70.0;
/// Give up if the brew day has not reached a rolling boil by then.
const SIM_HORIZON_SECS: f64 = 6.0 * 3600.0;
const STATUS_PERIOD_SECS: f64 = 300.0;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = RigConfig {
        fermentation_enabled: true,
        ..RigConfig::default()
    };
    let mut plant = SimPlant::new(&config, AMBIENT_F);
    let mut sink = LogEventSink;
    let mut rig = BrewRig::new(&config, 0.0).context("rig bootstrap failed")?;

    let mut now = 0.0_f64;
    let mut next_status = 0.0_f64;
    info!("simulated brew day starting at {AMBIENT_F}degF ambient");

    while now < SIM_HORIZON_SECS {
        let step = match rig.poll(now, &mut plant, &mut sink) {
            Ok(step) => step,
            Err(e) => {
                // Scheduling faults are unrecoverable: de-energize
                // everything and halt instead of resuming with an
                // unknown next action.
                error!("control loop fault: {e}; halting with outputs off");
                rig.stop_controls(&mut plant);
                loop {
                    std::thread::sleep(std::time::Duration::from_secs(60));
                }
            }
        };

        match step {
            Step::Dispatched(_) => {}
            Step::Wait { next_due } => {
                // Fast-forward the plant to the deadline.
                plant.step((next_due - now) as f32);
                now = next_due;
            }
        }

        if rig.brewing().is_some_and(|b| b.permission_pending()) {
            info!("auto-granting operator permission");
            rig.handle_command(RigCommand::GrantPermission, now, &mut sink)?;
        }

        if now >= next_status {
            let status = rig.status();
            info!(
                "t+{:>6.0}s status {}",
                now,
                serde_json::to_string(&status).context("status serialization failed")?
            );
            next_status = now + STATUS_PERIOD_SECS;
        }

        // A rolling boil within the hysteresis band is the finish line.
        let boiling_done = rig.brewing().is_some_and(|b| {
            b.phase() == Phase::Boiling
                && b.boil_filtered()
                    .is_some_and(|t| t >= config.boil_temp_f - config.hysteresis_band_f)
        });
        if boiling_done {
            info!("reached a rolling boil at t+{now:.0}s; brew day complete");
            rig.stop_controls(&mut plant);
            return Ok(());
        }
    }

    rig.stop_controls(&mut plant);
    bail!("simulation horizon reached before the boil; check the plant model")
}
