//! System configuration parameters
//!
//! All tunable parameters for the brewing rig: control cadences, hysteresis
//! band, filter time constants, recipe temperatures, temperature profiles
//! and per-channel RTD calibration.

use serde::{Deserialize, Serialize};

use crate::sensors::rtd::RtdCalibration;

/// Maximum steps in a mash or fermentation temperature profile.
pub const MAX_PROFILE_STEPS: usize = 8;

/// One step of the mash temperature profile: hold `target_f` for
/// `hold_secs`, then advance to the next step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProfileStep {
    pub hold_secs: f64,
    pub target_f: f32,
}

/// One step of the fermentation profile: from `offset_secs` after
/// fermentation start, hold `target_f`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FermentStep {
    pub offset_secs: f64,
    pub target_f: f32,
}

/// Core rig configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RigConfig {
    // --- Process enables ---
    /// Run the mash/boil brewing controller.
    pub brewing_enabled: bool,
    /// Run the fermentation chamber controller.
    pub fermentation_enabled: bool,

    // --- Control cadence ---
    /// Brewing controller re-trigger interval (seconds).
    pub brewing_interval_secs: f64,
    /// Fermentation controller re-trigger interval (seconds).
    pub fermentation_interval_secs: f64,

    // --- Regulation ---
    /// Hysteresis dead-band half-width (°F): no switching while the error
    /// is within ±band.
    pub hysteresis_band_f: f32,
    /// First-order lag filter time constant for kettle/mash RTDs (seconds).
    pub brewing_filter_tau_secs: f32,
    /// First-order lag filter time constant for the chamber RTD (seconds).
    pub fermentation_filter_tau_secs: f32,

    // --- Recipe temperatures (°F) ---
    /// Strike water temperature for dough-in.
    pub strike_temp_f: f32,
    /// Mash-out temperature.
    pub mashout_temp_f: f32,
    /// Rolling boil setpoint.
    pub boil_temp_f: f32,

    // --- Temperature profiles ---
    /// Mash infusion steps, walked by `MashTempUpdate` events.
    pub mash_profile: heapless::Vec<ProfileStep, MAX_PROFILE_STEPS>,
    /// Fermentation chamber targets by elapsed time.
    pub fermentation_profile: heapless::Vec<FermentStep, MAX_PROFILE_STEPS>,

    // --- RTD calibration ---
    pub boil_rtd: RtdCalibration,
    pub mash_rtd: RtdCalibration,
    pub chamber_rtd: RtdCalibration,
}

impl Default for RigConfig {
    fn default() -> Self {
        let mut mash_profile = heapless::Vec::new();
        // Single-infusion with a mash-out step-up.
        mash_profile
            .push(ProfileStep {
                hold_secs: 45.0 * 60.0,
                target_f: 152.0,
            })
            .ok();
        mash_profile
            .push(ProfileStep {
                hold_secs: 15.0 * 60.0,
                target_f: 155.0,
            })
            .ok();

        let mut fermentation_profile = heapless::Vec::new();
        fermentation_profile
            .push(FermentStep {
                offset_secs: 0.0,
                target_f: 60.0,
            })
            .ok();

        Self {
            brewing_enabled: true,
            fermentation_enabled: false,

            brewing_interval_secs: 1.0,
            fermentation_interval_secs: 60.0,

            hysteresis_band_f: 5.0,
            brewing_filter_tau_secs: 10.0,
            fermentation_filter_tau_secs: 60.0,

            strike_temp_f: 162.0,
            mashout_temp_f: 170.0,
            boil_temp_f: 217.0,

            mash_profile,
            fermentation_profile,

            boil_rtd: RtdCalibration::new(0, 0.385, 100.0, 5.0, 0.94, -16.0),
            mash_rtd: RtdCalibration::new(1, 0.385, 100.0, 5.0, 0.94, -9.0),
            chamber_rtd: RtdCalibration::new(2, 0.385, 100.0, 5.0, 1.0, 0.0),
        }
    }
}
