//! The event buffer: the rig's single timeline of future actions.
//!
//! Every future action on the rig (controller re-triggers, mash profile
//! steps, actuator switches) lives in one ordered schedule that the main
//! loop consumes one event at a time:
//!
//! ```text
//! ┌───────────────┐   peek / pop    ┌───────────────┐
//! │  EventBuffer   │ ─────────────▶ │   Main Loop    │
//! │ (due-time sort)│ ◀───────────── │  (dispatcher)  │
//! └───────────────┘    reinsert     └───────────────┘
//!          ▲                                │
//!          └── controllers re-schedule ─────┘
//! ```
//!
//! The buffer is a single persistent fixed-capacity container
//! ([`heapless::Vec`]); empty is a legitimate state, not a null handle.
//! An ordered list (not a heap) is deliberate: at most a handful of events
//! are ever pending, and strict temporal ordering with stable FIFO ties is
//! the property that matters.

use crate::error::ScheduleError;
use log::debug;

/// Maximum number of pending events.  The steady state is one control
/// event per enabled controller plus at most one switch per actuator,
/// so 16 leaves generous headroom.
pub const EVENT_CAPACITY: usize = 16;

/// The six kinds of scheduled action the rig knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum EventKind {
    /// Brewing controller re-trigger.
    ControlBrewing = 0,
    /// Boil element switch command.
    BoilElement = 1,
    /// Wort recirculation pump switch command.
    Pump1 = 2,
    /// Mash temperature profile step.
    MashTempUpdate = 3,
    /// Fermentation controller re-trigger.
    ControlFermentation = 4,
    /// Fermentation chamber compressor switch command.
    Compressor = 5,
}

/// A scheduled future action.
///
/// `action` carries either an actuator command (`0` = off, `1` = on) or,
/// for [`EventKind::MashTempUpdate`], the profile step index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Event {
    pub kind: EventKind,
    pub action: i32,
    /// Due time in seconds on the rig clock.
    pub due_time: f64,
}

/// Ordered schedule of all pending events.
///
/// Invariant: events are kept in non-decreasing `due_time` order, and
/// entries with equal due-times stay in insertion order (stable ties).
#[derive(Debug, Default)]
pub struct EventBuffer {
    events: heapless::Vec<Event, EVENT_CAPACITY>,
}

impl EventBuffer {
    pub fn new() -> Self {
        Self {
            events: heapless::Vec::new(),
        }
    }

    /// Insert an event, keeping the buffer sorted ascending by due-time.
    /// A new entry with a due-time equal to existing entries goes after
    /// them (FIFO tie-break).
    pub fn insert(
        &mut self,
        kind: EventKind,
        action: i32,
        due_time: f64,
    ) -> Result<(), ScheduleError> {
        let idx = self.events.partition_point(|e| e.due_time <= due_time);
        self.events
            .insert(
                idx,
                Event {
                    kind,
                    action,
                    due_time,
                },
            )
            .map_err(|_| ScheduleError::Full)
    }

    /// Due-time of the earliest pending event, if any.
    pub fn peek_next_time(&self) -> Option<f64> {
        self.events.first().map(|e| e.due_time)
    }

    /// Kind of the earliest pending event, if any.
    pub fn peek_next_kind(&self) -> Option<EventKind> {
        self.events.first().map(|e| e.kind)
    }

    /// Action payload of the earliest pending event, if any.
    pub fn peek_next_action(&self) -> Option<i32> {
        self.events.first().map(|e| e.action)
    }

    /// Remove and return the earliest event.  Returns `None` on an empty
    /// buffer; consuming the last event is an expected, transient state;
    /// the dispatch that consumed it is responsible for reinserting a
    /// follow-up before the next main-loop check.
    pub fn remove_earliest(&mut self) -> Option<Event> {
        if self.events.is_empty() {
            None
        } else {
            Some(self.events.remove(0))
        }
    }

    /// Remove every pending event of `kind`, returning how many were
    /// dropped.  Ordering of the remaining events is unchanged.
    pub fn remove_all(&mut self, kind: EventKind) -> usize {
        let before = self.events.len();
        self.events.retain(|e| e.kind != kind);
        before - self.events.len()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Pending events in due-time order.
    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.events.iter()
    }

    /// Log an ordered listing of all pending events.  No side effects;
    /// a no-op unless debug logging is enabled.
    pub fn debug_dump(&self) {
        debug!("schedule: {} pending", self.events.len());
        for (i, e) in self.events.iter().enumerate() {
            debug!(
                "  [{}] {:?} action={} due={:.3}s",
                i, e.kind, e.action, e.due_time
            );
        }
    }
}
