//! BrewRig control library.
//!
//! A single-loop controller for a small home brewing rig: one ordered
//! event schedule, a brewing (mash/boil) controller, a fermentation
//! chamber controller, and one-shot actuator dispatch.  All control
//! logic is pure and host-testable; hardware sits behind the port
//! traits in [`app::ports`].

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod brewing;
pub mod config;
pub mod control;
pub mod drivers;
pub mod error;
pub mod fermentation;
pub mod rig;
pub mod schedule;
pub mod sensors;

pub use error::{Error, Result};
