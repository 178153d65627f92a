//! Harness driver implementations.
//!
//! - [`simulation`] - Cycle-stepped behavioral model of the device under test
//!
//! # Adding New Drivers
//!
//! 1. Create a new submodule under `drivers/`
//! 2. Implement the `HarnessDriver` trait from `pwm_common::harness::driver`
//! 3. Add its factory to [`BUILTIN_DRIVERS`]

pub mod simulation;

use pwm_common::harness::driver::DriverFactory;

/// Drivers every registry starts with, by harness name.
pub const BUILTIN_DRIVERS: &[(&str, DriverFactory)] =
    &[(simulation::DRIVER_NAME, simulation::create_driver)];
