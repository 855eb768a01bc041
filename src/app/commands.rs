//! External commands into the control loop.
//!
//! The monitoring/UI layer sends messages that the loop applies between
//! polls, so there is exactly one mutator of controller state at any
//! time.

use crate::brewing::Phase;

/// A command from the operator/monitoring layer, handled between polls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RigCommand {
    /// Set the boil kettle setpoint (°F).  Rejected while locked.
    SetBoilSetpoint(f32),
    /// Set the mash setpoint (°F).  Rejected while the profile owns it.
    SetMashSetpoint(f32),
    /// Set the fermentation chamber setpoint (°F).  Only effective when
    /// the fermentation profile is empty.
    SetFermentationSetpoint(f32),
    /// Grant the pending phase-advance permission request.
    GrantPermission,
    /// Force the brewing phase machine into a specific phase.
    ForcePhase(Phase),
}
