//! # PWM Bench Simulation
//!
//! Harness drivers for the PWM verification core. Drivers implement the
//! `HarnessDriver` trait defined in `pwm_common::harness::driver`.
//!
//! # Module Structure
//!
//! - [`driver_registry`] - Driver factory registration
//! - [`drivers`] - Harness driver implementations
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                       SimulationDriver                        │
//! │  ┌──────────────┐   register   ┌──────────┐   PWM0/PWM1      │
//! │  │ FirmwareModel│─────writes──►│  Tmr32   │──────────┐       │
//! │  └──────┬───────┘              └──────────┘          ▼       │
//! │         │ mgmt GPIO / pad modes              ┌────────────┐  │
//! │         └───────────────────────────────────►│  PadBank   │  │
//! │                                              └────────────┘  │
//! └───────────────────────────────────────────────────────────────┘
//! ```

#![deny(missing_docs)]

pub mod driver_registry;
pub mod drivers;

pub use crate::driver_registry::DriverRegistry;
pub use crate::drivers::simulation::SimulationDriver;
