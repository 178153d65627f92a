//! Simulation driver module.
//!
//! A deterministic, cycle-stepped model of the device under test: two 32-bit
//! timers with PWM outputs, a GPIO pad bank, the management GPIO monitor line,
//! and a scripted firmware model that performs the readiness handshake.

mod config;
mod driver;
mod firmware;
mod pads;
mod timer;

pub use config::{DRIVER_NAME, FirmwareConfig, SimulationConfig, StuckPad, TimerWiring};
pub use driver::SimulationDriver;
pub use firmware::{FirmwareModel, FirmwareOp};
pub use pads::{PadBank, PadMode};
pub use timer::{CountDirection, CtrlFlags, PwmFlags, Tmr32, TIMER0_BASE, TIMER1_BASE};

use pwm_common::harness::driver::HarnessDriver;

/// Factory function to create a simulation driver instance.
pub fn create_driver() -> Box<dyn HarnessDriver> {
    Box::new(SimulationDriver::new())
}
