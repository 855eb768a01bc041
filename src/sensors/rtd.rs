//! PT100 RTD sensor behind the analog bridge.
//!
//! The RTD sits in a constant-current bridge read through a differential
//! amplifier by the 10-bit ADC on the bus bridge.  The conversion chain
//! (amplifier scaling, divider offset, 1 kΩ / 5 V current source, then a
//! per-sensor linear correction) reproduces the bench calibration of the
//! rig's measurement boards.
//!
//! Stateless aside from the calibration constants; filtering belongs to
//! the controllers.

use crate::app::ports::AnalogPort;
use crate::error::SensorError;

/// Amplifier gain seen by the ADC (15/270 resistor network).
const AMP_SCALE: f32 = 15.0 / 270.0;
/// Bridge divider offset: 5 V across a 10/(100+10) kΩ divider.
const BRIDGE_OFFSET_V: f32 = 5.0 * (10.0 / 110.0);
/// RTD excitation transfer: R = 200·V / (1 − V/5).
const EXCITATION_GAIN: f32 = 200.0;
const EXCITATION_FEEDBACK: f32 = 0.2;
/// Plausible converted range (°F); outside it the reading is rejected.
const PLAUSIBLE_F: core::ops::RangeInclusive<f32> = -40.0..=400.0;

const ADC_FULL_SCALE: f32 = 1024.0;

/// Calibration constants for one RTD channel.  Immutable after
/// construction.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RtdCalibration {
    /// Analog bus channel the sensor is wired to.
    pub channel: u8,
    /// RTD temperature coefficient (Ω/°C), 0.385 for PT100.
    pub alpha: f32,
    /// Resistance at 0 °C (Ω), 100 for PT100.
    pub zero_r: f32,
    /// ADC reference voltage.
    pub a_ref: f32,
    /// Linear correction slope from bench calibration.
    pub k: f32,
    /// Linear correction offset from bench calibration.
    pub c: f32,
}

impl RtdCalibration {
    pub const fn new(channel: u8, alpha: f32, zero_r: f32, a_ref: f32, k: f32, c: f32) -> Self {
        Self {
            channel,
            alpha,
            zero_r,
            a_ref,
            k,
            c,
        }
    }

    /// Convert raw ADC counts to calibrated °F.
    fn counts_to_f(&self, counts: f32) -> f32 {
        let v_diff = self.a_ref * (counts / ADC_FULL_SCALE);
        let v_rtd = v_diff * AMP_SCALE + BRIDGE_OFFSET_V;
        let r_rtd = (EXCITATION_GAIN * v_rtd) / (1.0 - EXCITATION_FEEDBACK * v_rtd);
        let temp_c = (r_rtd - self.zero_r) / self.alpha;
        let temp_f = temp_c * (9.0 / 5.0) + 32.0;
        temp_f * self.k + self.c
    }

    /// Inverse of the conversion chain: the ADC counts that would produce
    /// `temp_f`.  Used by the simulated plant and by tests to inject
    /// temperatures through the real conversion math.
    pub fn counts_for(&self, temp_f: f32) -> i32 {
        let uncorrected = (temp_f - self.c) / self.k;
        let temp_c = (uncorrected - 32.0) * (5.0 / 9.0);
        let r_rtd = self.zero_r + self.alpha * temp_c;
        let v_rtd = r_rtd / (EXCITATION_GAIN + EXCITATION_FEEDBACK * r_rtd);
        let v_diff = (v_rtd - BRIDGE_OFFSET_V) / AMP_SCALE;
        let counts = v_diff / self.a_ref * ADC_FULL_SCALE;
        counts.round() as i32
    }
}

/// One RTD channel bound to its calibration.
#[derive(Debug, Clone, Copy)]
pub struct RtdSensor {
    cal: RtdCalibration,
}

impl RtdSensor {
    pub fn new(cal: RtdCalibration) -> Self {
        Self { cal }
    }

    pub fn channel(&self) -> u8 {
        self.cal.channel
    }

    /// Read and convert one sample.  A negative raw count is the bus
    /// bridge's fault sentinel and becomes [`SensorError::BusFault`];
    /// implausible conversions become [`SensorError::OutOfRange`].
    pub fn read(&self, bus: &mut impl AnalogPort) -> Result<f32, SensorError> {
        let counts = bus.read_raw(self.cal.channel);
        if counts < 0 {
            return Err(SensorError::BusFault);
        }
        let temp_f = self.cal.counts_to_f(counts as f32);
        if !PLAUSIBLE_F.contains(&temp_f) {
            return Err(SensorError::OutOfRange);
        }
        Ok(temp_f)
    }
}
