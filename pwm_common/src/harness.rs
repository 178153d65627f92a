//! Simulation harness contract.
//!
//! The verification core only talks to the device under test through the
//! [`driver::HarnessDriver`] trait. Signal types and the TOML configuration
//! model live next to it.

pub mod config;
pub mod driver;
pub mod types;
