//! Relay board driver over `embedded-hal` digital output pins.
//!
//! Maps the rig's three [`OutputLine`]s onto GPIO-driven relays (SSR for
//! the element, mechanical relays for pump and compressor).  Boards wired
//! active-low are handled here so the control core only ever thinks in
//! logical on/off.

use embedded_hal::digital::{OutputPin, PinState};
use log::warn;

use crate::app::ports::{OutputLine, SwitchPort};

pub struct RelayBoard<P: OutputPin> {
    element: P,
    pump: P,
    compressor: P,
    active_low: bool,
}

impl<P: OutputPin> RelayBoard<P> {
    pub fn new(element: P, pump: P, compressor: P, active_low: bool) -> Self {
        Self {
            element,
            pump,
            compressor,
            active_low,
        }
    }

    fn level(&self, on: bool) -> PinState {
        PinState::from(on != self.active_low)
    }
}

impl<P: OutputPin> SwitchPort for RelayBoard<P> {
    fn write_line(&mut self, line: OutputLine, on: bool) {
        let level = self.level(on);
        let pin = match line {
            OutputLine::BoilElement => &mut self.element,
            OutputLine::Pump1 => &mut self.pump,
            OutputLine::Compressor => &mut self.compressor,
        };
        // A failed write is retried naturally by a later control cycle.
        if pin.set_state(level).is_err() {
            warn!("relay write failed: {line:?} -> {on}");
        }
    }
}
