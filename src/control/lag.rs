//! First-order exponential lag filter.
//!
//! The discrete recurrence `filtered += (raw - filtered) * (dt / tau)` is
//! the same smoothing both controllers apply to their RTD readings before
//! the hysteresis comparison, so a single noisy sample cannot chatter an
//! element or the compressor.

/// First-order lag with time constant `tau` (seconds).
#[derive(Debug, Clone, Copy)]
pub struct FirstOrderLag {
    tau: f32,
    value: Option<f32>,
}

impl FirstOrderLag {
    pub fn new(tau: f32) -> Self {
        Self { tau, value: None }
    }

    /// Feed one sample taken `dt` seconds after the previous one.
    /// The first sample seeds the filter state directly.
    pub fn update(&mut self, raw: f32, dt: f32) -> f32 {
        let next = match self.value {
            None => raw,
            Some(filtered) => filtered + (raw - filtered) * (dt / self.tau),
        };
        self.value = Some(next);
        next
    }

    /// Last filtered value, if any sample has been seen.
    pub fn value(&self) -> Option<f32> {
        self.value
    }
}
