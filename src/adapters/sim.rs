//! Simulated plant: a crude thermal model of the two kettles and the
//! fermentation chamber, wired up as both ports so the whole rig runs
//! against it with no hardware attached.
//!
//! The model is first-order everywhere: the element adds heat at a fixed
//! rate, every vessel bleeds toward ambient, the pump drags the mash tun
//! toward the kettle, and the compressor pulls the chamber down.  Numbers
//! are tuned for a watchable accelerated brew day, not for physics.

use crate::app::ports::{AnalogPort, OutputLine, SwitchPort};
use crate::config::RigConfig;
use crate::sensors::rtd::RtdCalibration;

/// Element heat input, degF per second.
const HEAT_RATE: f32 = 0.8;
/// Fractional loss toward ambient, per second.
const LOSS_RATE: f32 = 0.0008;
/// Fractional pull of the mash toward the kettle while recirculating.
const RECIRC_RATE: f32 = 0.05;
/// Compressor cooling, degF per second.
const COOL_RATE: f32 = 0.05;

pub struct SimPlant {
    boil_cal: RtdCalibration,
    mash_cal: RtdCalibration,
    chamber_cal: RtdCalibration,

    pub boil_f: f32,
    pub mash_f: f32,
    pub chamber_f: f32,
    ambient_f: f32,

    element_on: bool,
    pump_on: bool,
    compressor_on: bool,
}

impl SimPlant {
    /// All vessels start at ambient.
    pub fn new(config: &RigConfig, ambient_f: f32) -> Self {
        Self {
            boil_cal: config.boil_rtd,
            mash_cal: config.mash_rtd,
            chamber_cal: config.chamber_rtd,
            boil_f: ambient_f,
            mash_f: ambient_f,
            chamber_f: ambient_f,
            ambient_f,
            element_on: false,
            pump_on: false,
            compressor_on: false,
        }
    }

    /// Advance the model by `dt` seconds.
    pub fn step(&mut self, dt: f32) {
        if self.element_on {
            self.boil_f += HEAT_RATE * dt;
        }
        if self.pump_on {
            self.mash_f += (self.boil_f - self.mash_f) * RECIRC_RATE * dt;
        }
        if self.compressor_on {
            self.chamber_f -= COOL_RATE * dt;
        }
        self.boil_f += (self.ambient_f - self.boil_f) * LOSS_RATE * dt;
        self.mash_f += (self.ambient_f - self.mash_f) * LOSS_RATE * dt;
        self.chamber_f += (self.ambient_f - self.chamber_f) * LOSS_RATE * dt;
    }

    pub fn element_on(&self) -> bool {
        self.element_on
    }

    pub fn pump_on(&self) -> bool {
        self.pump_on
    }

    pub fn compressor_on(&self) -> bool {
        self.compressor_on
    }
}

impl AnalogPort for SimPlant {
    fn read_raw(&mut self, channel: u8) -> i32 {
        if channel == self.boil_cal.channel {
            self.boil_cal.counts_for(self.boil_f)
        } else if channel == self.mash_cal.channel {
            self.mash_cal.counts_for(self.mash_f)
        } else if channel == self.chamber_cal.channel {
            self.chamber_cal.counts_for(self.chamber_f)
        } else {
            -1
        }
    }
}

impl SwitchPort for SimPlant {
    fn write_line(&mut self, line: OutputLine, on: bool) {
        match line {
            OutputLine::BoilElement => self.element_on = on,
            OutputLine::Pump1 => self.pump_on = on,
            OutputLine::Compressor => self.compressor_on = on,
        }
    }
}
