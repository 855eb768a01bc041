//! Unified error types for the rig controller.
//!
//! A single `Error` enum that every subsystem converts into, keeping the
//! main loop's error handling uniform.  All variants are `Copy` so they can
//! be passed around the control loop without allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible operation in the controller funnels into this type.
///
/// Sensor faults are deliberately absent: the controllers absorb a
/// [`SensorError`] at the read site (warn, emit, hold the last good
/// value) rather than bubbling it up and stalling the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The event schedule violated an invariant.
    Schedule(ScheduleError),
    /// A setpoint write was rejected because a control cycle owns it.
    SetpointLocked(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Schedule(e) => write!(f, "schedule: {e}"),
            Self::SetpointLocked(which) => write!(f, "{which} setpoint is locked"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// The analog bus signalled a fault (negative raw count).
    BusFault,
    /// Converted temperature is outside the physically plausible range.
    OutOfRange,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BusFault => write!(f, "analog bus fault"),
            Self::OutOfRange => write!(f, "reading out of range"),
        }
    }
}

// ---------------------------------------------------------------------------
// Schedule errors
// ---------------------------------------------------------------------------

/// Schedule faults are fatal by policy: the loop halts rather than keep
/// actuating with an unknown next action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleError {
    /// The buffer was empty at the top of the main loop: some component
    /// failed to reinsert its follow-up event.
    Empty,
    /// The fixed-capacity buffer overflowed.
    Full,
}

impl fmt::Display for ScheduleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "event buffer empty at top of loop"),
            Self::Full => write!(f, "event buffer full"),
        }
    }
}

impl From<ScheduleError> for Error {
    fn from(e: ScheduleError) -> Self {
        Self::Schedule(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
