//! Event sink that routes rig notifications to the `log` facade.

use log::{error, info, warn};

use crate::app::events::RigEvent;
use crate::app::ports::EventSink;

#[derive(Default)]
pub struct LogEventSink;

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &RigEvent) {
        match *event {
            RigEvent::PhaseChanged { from, to } => {
                info!("phase changed: {from:?} -> {to:?}");
            }
            RigEvent::PermissionRequested(phase) => {
                info!("waiting on operator permission to leave {phase:?}");
            }
            RigEvent::MashStepStarted { step, target_f } => {
                info!("mash step {step} active at {target_f:.1}degF");
            }
            RigEvent::MashProfileComplete => info!("mash profile complete"),
            RigEvent::Switched { line, on } => {
                info!("switched {line:?} {}", if on { "on" } else { "off" });
            }
            RigEvent::SensorFault { channel } => {
                warn!("sensor fault on channel {channel}");
            }
            RigEvent::ScheduleUnderrun => error!("event schedule underrun"),
        }
    }
}
