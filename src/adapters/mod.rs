//! Adapters that implement the port traits for concrete backends.

pub mod log_sink;
pub mod sim;
