//! Sensor subsystem: RTD conversion behind the analog bus port.

pub mod rtd;
