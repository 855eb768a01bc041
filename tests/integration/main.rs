//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises the rig through its
//! public API against mock adapters.  Everything runs on the host with
//! virtual time; no hardware or sleeping involved.

mod brew_day_tests;
mod mock_hw;
mod rig_tests;
