//! The rig: event schedule, controllers, and the dispatch loop glue.
//!
//! `BrewRig` owns the [`EventBuffer`] and both controllers.  The caller
//! owns the actual loop: it calls [`BrewRig::poll`] with the current
//! wall time and either sleeps until the returned deadline or lets the
//! rig dispatch exactly one event.  Keeping the loop outside the struct
//! is what lets tests drive virtual time instead of a clock.

use log::{info, warn};
use serde::Serialize;

use crate::app::commands::RigCommand;
use crate::app::events::RigEvent;
use crate::app::ports::{AnalogPort, EventSink, OutputLine, SwitchPort};
use crate::brewing::{BrewingController, Phase};
use crate::config::RigConfig;
use crate::error::{Result, ScheduleError};
use crate::fermentation::FermentationController;
use crate::schedule::{EventBuffer, EventKind};

/// What one `poll` pass did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step {
    /// The earliest event was dispatched.
    Dispatched(EventKind),
    /// Nothing is due yet; the caller may sleep until `next_due`.
    Wait { next_due: f64 },
}

/// Live snapshot of the whole rig, for status reporting.
#[derive(Debug, Serialize)]
pub struct RigStatus {
    pub phase: Option<Phase>,
    pub boil_temp_f: Option<f32>,
    pub mash_temp_f: Option<f32>,
    pub boil_setpoint_f: Option<f32>,
    pub mash_setpoint_f: Option<f32>,
    pub element_on: bool,
    pub pump_on: bool,
    pub mash_time_left_secs: f64,
    pub setpoints_locked: bool,
    pub permission_pending: bool,
    pub chamber_temp_f: Option<f32>,
    pub chamber_setpoint_f: Option<f32>,
    pub compressor_on: bool,
    pub pending_events: usize,
}

pub struct BrewRig {
    schedule: EventBuffer,
    brewing: Option<BrewingController>,
    fermentation: Option<FermentationController>,
}

impl BrewRig {
    /// Build the rig and seed one trigger event per enabled controller,
    /// due one interval after `start_time`.
    pub fn new(config: &RigConfig, start_time: f64) -> Result<Self> {
        let mut schedule = EventBuffer::new();
        let brewing = if config.brewing_enabled {
            schedule.insert(
                EventKind::ControlBrewing,
                0,
                start_time + config.brewing_interval_secs,
            )?;
            Some(BrewingController::new(config))
        } else {
            None
        };
        let fermentation = if config.fermentation_enabled {
            schedule.insert(
                EventKind::ControlFermentation,
                0,
                start_time + config.fermentation_interval_secs,
            )?;
            Some(FermentationController::new(config))
        } else {
            None
        };
        info!(
            "rig up: brewing={}, fermentation={}, {} event(s) pending",
            config.brewing_enabled,
            config.fermentation_enabled,
            schedule.len()
        );
        Ok(Self {
            schedule,
            brewing,
            fermentation,
        })
    }

    /// One pass of the main loop.  Dispatches at most one event; an empty
    /// schedule is unrecoverable and the caller is expected to halt.
    pub fn poll(
        &mut self,
        now: f64,
        hw: &mut (impl AnalogPort + SwitchPort),
        sink: &mut impl EventSink,
    ) -> Result<Step> {
        let Some(next_due) = self.schedule.peek_next_time() else {
            sink.emit(&RigEvent::ScheduleUnderrun);
            return Err(ScheduleError::Empty.into());
        };
        if now < next_due {
            return Ok(Step::Wait { next_due });
        }

        let kind = self
            .schedule
            .peek_next_kind()
            .ok_or(ScheduleError::Empty)?;
        match kind {
            EventKind::ControlBrewing => match self.brewing.as_mut() {
                Some(ctl) => ctl.tick(&mut self.schedule, hw, sink)?,
                None => self.discard_orphan(kind),
            },
            EventKind::MashTempUpdate => match self.brewing.as_mut() {
                Some(ctl) => ctl.mash_temp_update(&mut self.schedule, sink)?,
                None => self.discard_orphan(kind),
            },
            EventKind::ControlFermentation => match self.fermentation.as_mut() {
                Some(ctl) => ctl.tick(&mut self.schedule, hw, sink)?,
                None => self.discard_orphan(kind),
            },
            EventKind::BoilElement => self.switch(kind, OutputLine::BoilElement, hw, sink)?,
            EventKind::Pump1 => self.switch(kind, OutputLine::Pump1, hw, sink)?,
            EventKind::Compressor => self.switch(kind, OutputLine::Compressor, hw, sink)?,
        }
        self.schedule.debug_dump();
        Ok(Step::Dispatched(kind))
    }

    /// One-shot actuator dispatch: pop the event, write the line, emit.
    /// Switch events never reschedule themselves.
    fn switch(
        &mut self,
        kind: EventKind,
        line: OutputLine,
        hw: &mut impl SwitchPort,
        sink: &mut impl EventSink,
    ) -> Result<()> {
        let event = self
            .schedule
            .remove_earliest()
            .ok_or(ScheduleError::Empty)?;
        // Head-of-queue mismatch is a dispatcher defect.
        debug_assert_eq!(event.kind, kind);
        let on = event.action != 0;
        info!("{line:?} -> {}", if on { "ON" } else { "OFF" });
        hw.write_line(line, on);
        sink.emit(&RigEvent::Switched { line, on });
        Ok(())
    }

    /// An event arrived for a controller that is disabled.  Drop it so
    /// the loop cannot spin on an undispatchable head.
    fn discard_orphan(&mut self, kind: EventKind) {
        warn!("discarding {kind:?} event: controller disabled");
        self.schedule.remove_earliest();
    }

    /// Apply an operator command between loop passes.
    pub fn handle_command(
        &mut self,
        command: RigCommand,
        now: f64,
        sink: &mut impl EventSink,
    ) -> Result<()> {
        match command {
            RigCommand::SetBoilSetpoint(temp_f) => {
                if let Some(ctl) = self.brewing.as_mut() {
                    ctl.set_boil_setpoint(temp_f)?;
                }
            }
            RigCommand::SetMashSetpoint(temp_f) => {
                if let Some(ctl) = self.brewing.as_mut() {
                    ctl.set_mash_setpoint(temp_f)?;
                }
            }
            RigCommand::SetFermentationSetpoint(temp_f) => {
                if let Some(ctl) = self.fermentation.as_mut() {
                    ctl.set_setpoint(temp_f)?;
                }
            }
            RigCommand::GrantPermission => {
                if let Some(ctl) = self.brewing.as_mut() {
                    ctl.grant_permission();
                }
            }
            RigCommand::ForcePhase(phase) => {
                if let Some(ctl) = self.brewing.as_mut() {
                    ctl.force_phase(phase, now, &mut self.schedule, sink)?;
                }
            }
        }
        Ok(())
    }

    /// Drive every output line to its safe (off) state.  Called on
    /// shutdown and after a fatal loop error.
    pub fn stop_controls(&mut self, hw: &mut impl SwitchPort) {
        info!("stopping controls: all outputs off");
        hw.write_line(OutputLine::BoilElement, false);
        hw.write_line(OutputLine::Pump1, false);
        hw.write_line(OutputLine::Compressor, false);
    }

    pub fn status(&self) -> RigStatus {
        RigStatus {
            phase: self.brewing.as_ref().map(BrewingController::phase),
            boil_temp_f: self.brewing.as_ref().and_then(BrewingController::boil_filtered),
            mash_temp_f: self.brewing.as_ref().and_then(BrewingController::mash_filtered),
            boil_setpoint_f: self.brewing.as_ref().map(BrewingController::boil_setpoint),
            mash_setpoint_f: self.brewing.as_ref().map(BrewingController::mash_setpoint),
            element_on: self
                .brewing
                .as_ref()
                .is_some_and(BrewingController::element_commanded),
            pump_on: self
                .brewing
                .as_ref()
                .is_some_and(BrewingController::pump_commanded),
            mash_time_left_secs: self
                .brewing
                .as_ref()
                .map_or(0.0, BrewingController::time_left_secs),
            setpoints_locked: self
                .brewing
                .as_ref()
                .is_some_and(BrewingController::setpoints_locked),
            permission_pending: self
                .brewing
                .as_ref()
                .is_some_and(BrewingController::permission_pending),
            chamber_temp_f: self
                .fermentation
                .as_ref()
                .and_then(FermentationController::chamber_filtered),
            chamber_setpoint_f: self
                .fermentation
                .as_ref()
                .map(FermentationController::setpoint),
            compressor_on: self
                .fermentation
                .as_ref()
                .is_some_and(FermentationController::compressor_commanded),
            pending_events: self.schedule.len(),
        }
    }

    pub fn schedule(&self) -> &EventBuffer {
        &self.schedule
    }

    pub fn brewing(&self) -> Option<&BrewingController> {
        self.brewing.as_ref()
    }

    pub fn fermentation(&self) -> Option<&FermentationController> {
        self.fermentation.as_ref()
    }
}
