//! Fermentation chamber controller.
//!
//! Same shape as the brewing controller but cooling-side: the compressor
//! pulls the chamber DOWN, so a chamber that is too warm (negative error
//! under the setpoint-minus-measured convention) switches the compressor
//! on, and too-cold switches it off.  Ticks at a minute cadence instead
//! of a second.

use log::warn;

use crate::app::events::RigEvent;
use crate::app::ports::{AnalogPort, EventSink};
use crate::config::{FermentStep, MAX_PROFILE_STEPS, RigConfig};
use crate::control::lag::FirstOrderLag;
use crate::error::{Error, Result, ScheduleError};
use crate::schedule::{EventBuffer, EventKind};
use crate::sensors::rtd::RtdSensor;

pub struct FermentationController {
    interval_secs: f64,
    band_f: f32,

    chamber_rtd: RtdSensor,
    chamber_filter: FirstOrderLag,

    setpoint_f: f32,
    compressor_on: bool,

    /// Optional multi-day schedule: each step's offset is seconds from
    /// the first tick.  Empty means the fixed setpoint applies forever.
    profile: heapless::Vec<FermentStep, MAX_PROFILE_STEPS>,
    start_time: Option<f64>,
}

impl FermentationController {
    pub fn new(config: &RigConfig) -> Self {
        let setpoint_f = config
            .fermentation_profile
            .first()
            .map_or(60.0, |s| s.target_f);
        Self {
            interval_secs: config.fermentation_interval_secs,
            band_f: config.hysteresis_band_f,
            chamber_rtd: RtdSensor::new(config.chamber_rtd),
            chamber_filter: FirstOrderLag::new(config.fermentation_filter_tau_secs),
            setpoint_f,
            compressor_on: false,
            profile: config.fermentation_profile.clone(),
            start_time: None,
        }
    }

    /// One control cycle.  The head of `schedule` must be this
    /// controller's own `ControlFermentation` event.
    pub fn tick(
        &mut self,
        schedule: &mut EventBuffer,
        bus: &mut impl AnalogPort,
        sink: &mut impl EventSink,
    ) -> Result<()> {
        let own = schedule.remove_earliest().ok_or(ScheduleError::Empty)?;
        debug_assert_eq!(own.kind, EventKind::ControlFermentation);
        let ctrl_time = own.due_time;

        schedule.insert(
            EventKind::ControlFermentation,
            0,
            ctrl_time + self.interval_secs,
        )?;

        let start = *self.start_time.get_or_insert(ctrl_time);

        let dt = self.interval_secs as f32;
        match self.chamber_rtd.read(bus) {
            Ok(raw) => {
                self.chamber_filter.update(raw, dt);
            }
            Err(e) => {
                warn!("chamber RTD read failed ({e}); holding last value");
                sink.emit(&RigEvent::SensorFault {
                    channel: self.chamber_rtd.channel(),
                });
            }
        }

        // The profile wins over any manually written setpoint: the last
        // step whose offset has elapsed is the active one.
        let elapsed = ctrl_time - start;
        if let Some(step) = self
            .profile
            .iter()
            .filter(|s| s.offset_secs <= elapsed)
            .last()
        {
            self.setpoint_f = step.target_f;
        }

        if let Some(chamber_f) = self.chamber_filter.value() {
            let err = self.setpoint_f - chamber_f;
            // Cooling convention: too warm (err below the band) turns the
            // compressor on, too cold turns it off.
            if err < -self.band_f && !self.compressor_on {
                schedule.insert(EventKind::Compressor, 1, ctrl_time)?;
                self.compressor_on = true;
            } else if err > self.band_f && self.compressor_on {
                schedule.insert(EventKind::Compressor, 0, ctrl_time)?;
                self.compressor_on = false;
            }
        }

        Ok(())
    }

    /// Manual setpoint write.  Rejected while a fermentation profile is
    /// loaded, since the profile would stomp it on the next tick anyway.
    pub fn set_setpoint(&mut self, temp_f: f32) -> Result<()> {
        if !self.profile.is_empty() {
            warn!("rejected fermentation setpoint write ({temp_f:.1}degF): profile active");
            return Err(Error::SetpointLocked("fermentation"));
        }
        self.setpoint_f = temp_f;
        Ok(())
    }

    pub fn setpoint(&self) -> f32 {
        self.setpoint_f
    }

    pub fn chamber_filtered(&self) -> Option<f32> {
        self.chamber_filter.value()
    }

    pub fn compressor_commanded(&self) -> bool {
        self.compressor_on
    }
}
