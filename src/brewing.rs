//! Brewing controller: mash and boil side of the rig.
//!
//! Runs on every `ControlBrewing` event: re-arms its own trigger, reads and
//! filters the kettle and mash-tun RTDs, walks the brew-day phase machine,
//! then makes element/pump switching decisions against a ±hysteresis band.
//! Switching decisions become `BoilElement`/`Pump1` events due immediately;
//! the actuator dispatch, not this controller, performs the output write.
//!
//! Phase advancement across operator-involved boundaries (dough-in, start
//! of boil) uses a two-phase handshake: the controller raises
//! `request_permission`, the command layer grants it, and the advance
//! happens on the next tick.

use log::{info, warn};

use crate::app::events::RigEvent;
use crate::app::ports::{AnalogPort, EventSink};
use crate::config::{MAX_PROFILE_STEPS, ProfileStep, RigConfig};
use crate::control::lag::FirstOrderLag;
use crate::error::{Error, Result, ScheduleError};
use crate::schedule::{EventBuffer, EventKind};
use crate::sensors::rtd::RtdSensor;

/// Brew-day phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[repr(u8)]
pub enum Phase {
    /// Element drives the kettle to strike temperature; pump off.
    Heating = 0,
    /// Hold strike while the operator doughs in; waits on permission.
    Holding = 1,
    /// Recirculating mash; setpoints follow the mash profile.
    Mashing = 2,
    /// Rolling boil; pump off.  Terminal.
    Boiling = 3,
}

/// The mash/boil controller.  Created once at startup, ticked by the main
/// loop for the life of the process.
pub struct BrewingController {
    interval_secs: f64,
    band_f: f32,
    strike_temp_f: f32,
    mashout_temp_f: f32,
    boil_temp_f: f32,

    boil_rtd: RtdSensor,
    mash_rtd: RtdSensor,
    boil_filter: FirstOrderLag,
    mash_filter: FirstOrderLag,

    phase: Phase,
    boil_setpoint_f: f32,
    mash_setpoint_f: f32,
    /// Setpoint locks: while a control cycle owns a setpoint (the mash
    /// profile during `Mashing`), external writes are rejected.
    boil_setpoint_locked: bool,
    mash_setpoint_locked: bool,

    /// Commanded actuator states; the switch events carry these out.
    element_on: bool,
    pump_on: bool,

    /// Two-phase handshake for phase advancement.
    request_permission: bool,
    grant_permission: bool,

    mash_profile: heapless::Vec<ProfileStep, MAX_PROFILE_STEPS>,
    mash_profile_done: bool,
    /// Wall time at which the mash profile will have run out.
    mash_end_time: Option<f64>,
    /// Seconds of mash remaining (0 outside `Mashing`).
    time_left_secs: f64,
}

impl BrewingController {
    pub fn new(config: &RigConfig) -> Self {
        let mash_setpoint_f = config
            .mash_profile
            .first()
            .map_or(config.strike_temp_f, |s| s.target_f);
        Self {
            interval_secs: config.brewing_interval_secs,
            band_f: config.hysteresis_band_f,
            strike_temp_f: config.strike_temp_f,
            mashout_temp_f: config.mashout_temp_f,
            boil_temp_f: config.boil_temp_f,

            boil_rtd: RtdSensor::new(config.boil_rtd),
            mash_rtd: RtdSensor::new(config.mash_rtd),
            boil_filter: FirstOrderLag::new(config.brewing_filter_tau_secs),
            mash_filter: FirstOrderLag::new(config.brewing_filter_tau_secs),

            phase: Phase::Heating,
            boil_setpoint_f: config.strike_temp_f,
            mash_setpoint_f,
            boil_setpoint_locked: false,
            mash_setpoint_locked: false,

            element_on: false,
            pump_on: false,

            request_permission: false,
            grant_permission: false,

            mash_profile: config.mash_profile.clone(),
            mash_profile_done: false,
            mash_end_time: None,
            time_left_secs: 0.0,
        }
    }

    // ── Periodic tick (ControlBrewing dispatch) ───────────────

    /// One control cycle.  The head of `schedule` must be this
    /// controller's own `ControlBrewing` event; its due-time is the
    /// control time for every decision made in this cycle.
    pub fn tick(
        &mut self,
        schedule: &mut EventBuffer,
        bus: &mut impl AnalogPort,
        sink: &mut impl EventSink,
    ) -> Result<()> {
        let own = schedule.remove_earliest().ok_or(ScheduleError::Empty)?;
        debug_assert_eq!(own.kind, EventKind::ControlBrewing);
        let ctrl_time = own.due_time;

        // Re-arm first: the controller must keep running at a steady
        // cadence no matter what the rest of the cycle decides.
        schedule.insert(EventKind::ControlBrewing, 0, ctrl_time + self.interval_secs)?;

        self.read_temperatures(bus, sink);
        self.run_phase(ctrl_time, schedule, sink)?;
        self.regulate(ctrl_time, schedule)?;

        Ok(())
    }

    fn read_temperatures(&mut self, bus: &mut impl AnalogPort, sink: &mut impl EventSink) {
        let dt = self.interval_secs as f32;
        match self.boil_rtd.read(bus) {
            Ok(raw) => {
                self.boil_filter.update(raw, dt);
            }
            Err(e) => {
                warn!("boil RTD read failed ({e}); holding last value");
                sink.emit(&RigEvent::SensorFault {
                    channel: self.boil_rtd.channel(),
                });
            }
        }
        match self.mash_rtd.read(bus) {
            Ok(raw) => {
                self.mash_filter.update(raw, dt);
            }
            Err(e) => {
                warn!("mash RTD read failed ({e}); holding last value");
                sink.emit(&RigEvent::SensorFault {
                    channel: self.mash_rtd.channel(),
                });
            }
        }
    }

    fn run_phase(
        &mut self,
        ctrl_time: f64,
        schedule: &mut EventBuffer,
        sink: &mut impl EventSink,
    ) -> Result<()> {
        match self.phase {
            Phase::Heating => {
                if self.take_grant() {
                    self.advance(Phase::Holding, ctrl_time, schedule, sink)?;
                } else if self
                    .boil_filter
                    .value()
                    .is_some_and(|t| t >= self.strike_temp_f)
                {
                    self.request(sink);
                }
            }
            Phase::Holding => {
                if self.take_grant() {
                    self.advance(Phase::Mashing, ctrl_time, schedule, sink)?;
                } else {
                    self.request(sink);
                }
            }
            Phase::Mashing => {
                // The kettle is the mash's heat source; its setpoint
                // tracks whatever the profile currently asks for.
                self.boil_setpoint_f = self.mash_setpoint_f;
                self.time_left_secs = self
                    .mash_end_time
                    .map_or(0.0, |end| (end - ctrl_time).max(0.0));
                if self.mash_profile_done {
                    if self.take_grant() {
                        self.advance(Phase::Boiling, ctrl_time, schedule, sink)?;
                    } else {
                        self.request(sink);
                    }
                }
            }
            Phase::Boiling => {}
        }
        Ok(())
    }

    /// Hysteresis switching.  A transition inserts a switch event due at
    /// the control time (immediate dispatch on the next loop pass); when
    /// the commanded state already matches, nothing is inserted.
    fn regulate(&mut self, ctrl_time: f64, schedule: &mut EventBuffer) -> Result<()> {
        // Boil element: heating convention: positive error (too cold)
        // switches the element on.
        if let Some(boil_f) = self.boil_filter.value() {
            let err = self.boil_setpoint_f - boil_f;
            if err > self.band_f && !self.element_on {
                schedule.insert(EventKind::BoilElement, 1, ctrl_time)?;
                self.element_on = true;
            } else if err < -self.band_f && self.element_on {
                schedule.insert(EventKind::BoilElement, 0, ctrl_time)?;
                self.element_on = false;
            }
        }

        // Pump: recirculates the mash through the kettle coil, so it only
        // ever runs during Mashing, driven by mash-temperature hysteresis.
        let pump_desired = if self.phase == Phase::Mashing {
            match self.mash_filter.value() {
                Some(mash_f) => {
                    let err = self.mash_setpoint_f - mash_f;
                    if err > self.band_f {
                        true
                    } else if err < -self.band_f {
                        false
                    } else {
                        self.pump_on
                    }
                }
                None => self.pump_on,
            }
        } else {
            false
        };
        if pump_desired != self.pump_on {
            schedule.insert(EventKind::Pump1, i32::from(pump_desired), ctrl_time)?;
            self.pump_on = pump_desired;
        }

        Ok(())
    }

    // ── Mash profile stepping (MashTempUpdate dispatch) ───────

    /// Apply one mash profile step.  The head of `schedule` must be a
    /// `MashTempUpdate` event whose action is the step index; past the
    /// last step the profile is complete.
    pub fn mash_temp_update(
        &mut self,
        schedule: &mut EventBuffer,
        sink: &mut impl EventSink,
    ) -> Result<()> {
        let own = schedule.remove_earliest().ok_or(ScheduleError::Empty)?;
        debug_assert_eq!(own.kind, EventKind::MashTempUpdate);

        let step = own.action.max(0) as usize;
        if let Some(s) = self.mash_profile.get(step).copied() {
            info!(
                "mash profile step {}: {:.1}degF for {:.0}s",
                step, s.target_f, s.hold_secs
            );
            self.mash_setpoint_f = s.target_f;
            sink.emit(&RigEvent::MashStepStarted {
                step,
                target_f: s.target_f,
            });
            schedule.insert(
                EventKind::MashTempUpdate,
                (step + 1) as i32,
                own.due_time + s.hold_secs,
            )?;
        } else {
            info!("mash profile complete; ramping to mash-out");
            // Mash-out: raise the grain bed to arrest conversion while
            // the operator vorlaufs and sparges.
            self.mash_setpoint_f = self.mashout_temp_f;
            self.mash_profile_done = true;
            sink.emit(&RigEvent::MashProfileComplete);
        }
        Ok(())
    }

    // ── Phase transitions ─────────────────────────────────────

    fn advance(
        &mut self,
        to: Phase,
        ctrl_time: f64,
        schedule: &mut EventBuffer,
        sink: &mut impl EventSink,
    ) -> Result<()> {
        let from = self.phase;
        info!("brewing phase {from:?} -> {to:?}");
        // Leaving Mashing orphans the profile walker chain; purge it so
        // a stale step can never fire in another phase or duplicate the
        // fresh chain on a later Mashing entry.
        if from == Phase::Mashing {
            let dropped = schedule.remove_all(EventKind::MashTempUpdate);
            if dropped > 0 {
                warn!("dropped {dropped} pending mash profile step(s)");
            }
        }
        self.phase = to;
        match to {
            Phase::Heating => {
                self.boil_setpoint_f = self.strike_temp_f;
                self.boil_setpoint_locked = false;
                self.mash_setpoint_locked = false;
            }
            Phase::Holding => {}
            Phase::Mashing => {
                // The profile owns both setpoints from here until boil.
                self.boil_setpoint_locked = true;
                self.mash_setpoint_locked = true;
                self.mash_profile_done = false;
                let total: f64 = self.mash_profile.iter().map(|s| s.hold_secs).sum();
                self.mash_end_time = Some(ctrl_time + total);
                schedule.insert(EventKind::MashTempUpdate, 0, ctrl_time)?;
            }
            Phase::Boiling => {
                self.boil_setpoint_locked = false;
                self.mash_setpoint_locked = false;
                self.boil_setpoint_f = self.boil_temp_f;
                self.time_left_secs = 0.0;
            }
        }
        sink.emit(&RigEvent::PhaseChanged { from, to });
        Ok(())
    }

    /// Force the phase machine into `to` (operator override).
    pub fn force_phase(
        &mut self,
        to: Phase,
        now: f64,
        schedule: &mut EventBuffer,
        sink: &mut impl EventSink,
    ) -> Result<()> {
        if to == self.phase {
            return Ok(());
        }
        self.request_permission = false;
        self.grant_permission = false;
        self.advance(to, now, schedule, sink)
    }

    // ── Permission handshake ──────────────────────────────────

    fn request(&mut self, sink: &mut impl EventSink) {
        if !self.request_permission {
            self.request_permission = true;
            sink.emit(&RigEvent::PermissionRequested(self.phase));
        }
    }

    fn take_grant(&mut self) -> bool {
        if self.request_permission && self.grant_permission {
            self.request_permission = false;
            self.grant_permission = false;
            true
        } else {
            false
        }
    }

    /// Grant a pending permission request.  A grant with no request
    /// pending is remembered until one is raised.
    pub fn grant_permission(&mut self) {
        self.grant_permission = true;
    }

    // ── Setpoint writes (rejected while locked) ──────────────

    pub fn set_boil_setpoint(&mut self, temp_f: f32) -> Result<()> {
        if self.boil_setpoint_locked {
            warn!("rejected boil setpoint write ({temp_f:.1}degF): locked");
            return Err(Error::SetpointLocked("boil"));
        }
        self.boil_setpoint_f = temp_f;
        Ok(())
    }

    pub fn set_mash_setpoint(&mut self, temp_f: f32) -> Result<()> {
        if self.mash_setpoint_locked {
            warn!("rejected mash setpoint write ({temp_f:.1}degF): locked");
            return Err(Error::SetpointLocked("mash"));
        }
        self.mash_setpoint_f = temp_f;
        Ok(())
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn boil_filtered(&self) -> Option<f32> {
        self.boil_filter.value()
    }

    pub fn mash_filtered(&self) -> Option<f32> {
        self.mash_filter.value()
    }

    pub fn boil_setpoint(&self) -> f32 {
        self.boil_setpoint_f
    }

    pub fn mash_setpoint(&self) -> f32 {
        self.mash_setpoint_f
    }

    pub fn element_commanded(&self) -> bool {
        self.element_on
    }

    pub fn pump_commanded(&self) -> bool {
        self.pump_on
    }

    pub fn permission_pending(&self) -> bool {
        self.request_permission
    }

    /// True while the mash profile owns the setpoints.
    pub fn setpoints_locked(&self) -> bool {
        self.boil_setpoint_locked || self.mash_setpoint_locked
    }

    pub fn time_left_secs(&self) -> f64 {
        self.time_left_secs
    }
}
