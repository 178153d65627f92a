//! PWM Bench Common Library
//!
//! Shared constants, configuration loading and the harness contract used by
//! the simulation driver (`pwm_sim`) and the verification core (`pwm_verify`).
//!
//! # Module Structure
//!
//! - [`consts`] - Reference thresholds, pad counts and default cycle budgets
//! - [`config`] - Configuration loading traits and types
//! - [`harness`] - Harness driver trait, signal types and bench configuration
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust
//! use pwm_common::prelude::*;
//! use pwm_common::harness::types::Level;
//! ```

pub mod config;
pub mod consts;
pub mod harness;
pub mod prelude;
