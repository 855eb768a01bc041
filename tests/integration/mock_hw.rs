//! Mock hardware for integration tests.
//!
//! One struct plays both ports: analog reads answer with RTD counts for
//! whatever vessel temperatures the test has staged, and every switch
//! write is recorded so tests can assert on the full command history.

use brewrig::app::events::RigEvent;
use brewrig::app::ports::{AnalogPort, EventSink, OutputLine, SwitchPort};
use brewrig::config::RigConfig;
use brewrig::sensors::rtd::RtdCalibration;

// ── MockHardware ──────────────────────────────────────────────

pub struct MockHardware {
    boil_cal: RtdCalibration,
    mash_cal: RtdCalibration,
    chamber_cal: RtdCalibration,
    pub boil_f: f32,
    pub mash_f: f32,
    pub chamber_f: f32,
    /// When set, every analog read returns the bus-fault sentinel.
    pub bus_faulted: bool,
    pub writes: Vec<(OutputLine, bool)>,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new(config: &RigConfig, ambient_f: f32) -> Self {
        Self {
            boil_cal: config.boil_rtd,
            mash_cal: config.mash_rtd,
            chamber_cal: config.chamber_rtd,
            boil_f: ambient_f,
            mash_f: ambient_f,
            chamber_f: ambient_f,
            bus_faulted: false,
            writes: Vec::new(),
        }
    }

    /// Last commanded state of `line`, if it was ever written.
    pub fn line_state(&self, line: OutputLine) -> Option<bool> {
        self.writes
            .iter()
            .rev()
            .find_map(|&(l, on)| (l == line).then_some(on))
    }

    pub fn writes_to(&self, line: OutputLine) -> usize {
        self.writes.iter().filter(|&&(l, _)| l == line).count()
    }
}

impl AnalogPort for MockHardware {
    fn read_raw(&mut self, channel: u8) -> i32 {
        if self.bus_faulted {
            return -1;
        }
        if channel == self.boil_cal.channel {
            self.boil_cal.counts_for(self.boil_f)
        } else if channel == self.mash_cal.channel {
            self.mash_cal.counts_for(self.mash_f)
        } else if channel == self.chamber_cal.channel {
            self.chamber_cal.counts_for(self.chamber_f)
        } else {
            -1
        }
    }
}

impl SwitchPort for MockHardware {
    fn write_line(&mut self, line: OutputLine, on: bool) {
        self.writes.push((line, on));
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<RigEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn count(&self, pred: impl Fn(&RigEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &RigEvent) {
        self.events.push(*event);
    }
}
