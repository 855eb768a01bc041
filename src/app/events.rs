//! Structured notifications emitted by the control core.
//!
//! These are observations, not commands: the rig has already acted by the
//! time one is emitted.  Adapters route them to the log or a monitoring
//! layer via [`EventSink`](super::ports::EventSink).

use crate::app::ports::OutputLine;
use crate::brewing::Phase;

/// One notification from the control core.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RigEvent {
    /// The brewing phase machine advanced.
    PhaseChanged { from: Phase, to: Phase },
    /// A phase is waiting on operator permission to advance.
    PermissionRequested(Phase),
    /// A mash profile step became active.
    MashStepStarted { step: usize, target_f: f32 },
    /// The mash profile ran to completion.
    MashProfileComplete,
    /// An output line was switched.
    Switched { line: OutputLine, on: bool },
    /// A sensor read failed; the controller held its last good value.
    SensorFault { channel: u8 },
    /// The schedule was empty at the top of the loop; fatal by policy.
    ScheduleUnderrun,
}
