//! Application-layer seams: port traits, structured events, and the
//! command surface of the control loop.

pub mod commands;
pub mod events;
pub mod ports;
