//! Port traits: the boundary between control logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ BrewRig (domain)
//! ```
//!
//! Driven adapters (the analog bus, the relay outputs, event sinks)
//! implement these traits.  [`BrewRig`](crate::rig::BrewRig) consumes them
//! via generics at the `poll` call site, so the control core never touches
//! hardware directly and the whole loop runs against mocks in tests.

// ───────────────────────────────────────────────────────────────
// Analog bus port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: raw analog counts from the sensor bus.
pub trait AnalogPort {
    /// Read the raw 10-bit count on `channel`.  A negative value signals
    /// a bus fault (the sentinel convention of the analog bridge).
    fn read_raw(&mut self, channel: u8) -> i32;
}

// ───────────────────────────────────────────────────────────────
// Switch port (driven adapter: domain → actuators)
// ───────────────────────────────────────────────────────────────

/// The rig's three switched output lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputLine {
    /// Boil kettle heating element (via SSR).
    BoilElement,
    /// Wort recirculation pump.
    Pump1,
    /// Fermentation chamber compressor.
    Compressor,
}

/// Write-side port: the domain calls this to command actuators.
/// Writes are assumed to succeed; there is no failure path to model.
pub trait SwitchPort {
    fn write_line(&mut self, line: OutputLine, on: bool);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / monitoring)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`RigEvent`](super::events::RigEvent)s
/// through this port.  Adapters decide where they go (serial log, a
/// monitoring socket, a test recorder).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::RigEvent);
}
