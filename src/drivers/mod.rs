//! Hardware drivers behind the port traits.

pub mod relay;
