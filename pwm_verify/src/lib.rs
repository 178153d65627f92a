//! # PWM Verification Core
//!
//! Checks that a timer peripheral drives two PWM outputs with a sane duty
//! cycle once its firmware reports it is configured.
//!
//! # Module Structure
//!
//! - [`sync`] - Readiness synchronizer (handshake pulses on the monitor line)
//! - [`sampler`] - Fixed-window sampling of two pads
//! - [`classify`] - Toggle and duty-band checks, verdicts
//! - [`state`] - Run phase state machine
//! - [`runner`] - `VerificationRun` and `run_bench`
//! - [`report`] - Report sinks
//! - [`error`] - `VerifyError`
//!
//! # Example
//!
//! ```rust,no_run
//! use pwm_common::prelude::*;
//! use pwm_sim::DriverRegistry;
//! use pwm_verify::report::TracingSink;
//! use pwm_verify::runner::run_bench;
//! use std::path::Path;
//!
//! let config = BenchConfig::load(Path::new("config/timer0.toml")).unwrap();
//! let verdict = run_bench(&config, &DriverRegistry::with_builtin(), TracingSink).unwrap();
//! println!("{}", verdict.tag());
//! ```

#![deny(missing_docs)]

pub mod classify;
pub mod error;
pub mod report;
pub mod runner;
pub mod sampler;
pub mod state;
pub mod sync;

pub use crate::classify::{ChannelVerdict, RunVerdict, classify};
pub use crate::error::VerifyError;
pub use crate::report::{MemorySink, ReportSink, TracingSink};
pub use crate::runner::{VerificationRun, run_bench};
pub use crate::sampler::{DutySampler, SampleTally};
pub use crate::sync::ReadinessSynchronizer;
