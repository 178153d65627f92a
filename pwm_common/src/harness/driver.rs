//! Harness driver trait and error types.
//!
//! This module defines:
//! - `HarnessDriver` trait - Interface the verification core drives
//! - `HarnessError` enum - Error types for harness operations
//! - `DriverFactory` type alias - Factory function type

use crate::harness::config::HarnessConfig;
use crate::harness::types::{Level, PadId};
use thiserror::Error;

/// Error types for harness operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HarnessError {
    /// Driver initialization failed
    #[error("Initialization failed: {0}")]
    InitFailed(String),

    /// Driver-specific configuration was rejected
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// An operation was attempted before `init()`
    #[error("Harness not initialized")]
    NotInitialized,

    /// Pad index outside the device's pad bank
    #[error("Invalid pad: {0}")]
    InvalidPad(u8),

    /// The global cycle budget ran out
    #[error("Timeout after {elapsed} cycles (budget {budget})")]
    Timeout {
        /// Configured cycle budget
        budget: u64,
        /// Cycles elapsed when the budget was exceeded
        elapsed: u64,
    },

    /// Driver not found
    #[error("Driver not found: {0}")]
    DriverNotFound(String),

    /// A second driver was registered under an existing name
    #[error("Driver already registered: {0}")]
    DuplicateDriver(String),

    /// Bus access to an unmapped or invalid address
    #[error("Bus error at {address:#010x}")]
    Bus {
        /// Faulting address
        address: u32,
    },
}

/// Factory function type for creating driver instances.
pub type DriverFactory = fn() -> Box<dyn HarnessDriver>;

/// Interface to the simulated device under test.
///
/// Every blocking call suspends the caller until the simulated environment
/// reaches the requested point. Drivers enforce the global cycle budget from
/// `HarnessConfig::timeout_cycles`; no caller keeps its own timeout.
///
/// # Lifecycle
///
/// 1. `init()` - Called once before anything else
/// 2. `release_control_line()` - Lets the firmware start executing
/// 3. `wait_level()` / `advance_clock()` / `read_signal()` - The run itself
/// 4. `shutdown()` - Called when the run is over
pub trait HarnessDriver: Send {
    /// Returns the driver's unique identifier (e.g., "simulation").
    fn name(&self) -> &'static str;

    /// Returns the driver's semantic version.
    fn version(&self) -> &'static str;

    /// Initialize the driver from the harness configuration.
    ///
    /// Drivers read their own table from `config.driver_config[name]`.
    fn init(&mut self, config: &HarnessConfig) -> Result<(), HarnessError>;

    /// Release the chip-select / control line so the firmware starts.
    fn release_control_line(&mut self) -> Result<(), HarnessError>;

    /// Suspend until `cycles` clock edges have elapsed. No edge is skipped.
    fn advance_clock(&mut self, cycles: u32) -> Result<(), HarnessError>;

    /// Read pads `lsb..=msb` at the current instant as an integer, `lsb` at bit 0.
    fn monitor_pads(&self, msb: PadId, lsb: PadId) -> Result<u64, HarnessError>;

    /// Read a single pad.
    fn read_signal(&self, pad: PadId) -> Result<Level, HarnessError> {
        Ok(Level::from_sample(self.monitor_pads(pad, pad)?))
    }

    /// Suspend until the management monitor line equals `level`.
    fn wait_level(&mut self, level: Level) -> Result<(), HarnessError>;

    /// Clock edges elapsed since `init()`.
    fn cycle_count(&self) -> u64;

    /// Release driver resources.
    fn shutdown(&mut self) -> Result<(), HarnessError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestDriver {
        pads: u64,
    }

    impl HarnessDriver for TestDriver {
        fn name(&self) -> &'static str {
            "test"
        }

        fn version(&self) -> &'static str {
            "0.1.0"
        }

        fn init(&mut self, _config: &HarnessConfig) -> Result<(), HarnessError> {
            Ok(())
        }

        fn release_control_line(&mut self) -> Result<(), HarnessError> {
            Ok(())
        }

        fn advance_clock(&mut self, _cycles: u32) -> Result<(), HarnessError> {
            Ok(())
        }

        fn monitor_pads(&self, msb: PadId, lsb: PadId) -> Result<u64, HarnessError> {
            let width = u32::from(msb.0 - lsb.0) + 1;
            Ok((self.pads >> lsb.0) & ((1u64 << width) - 1))
        }

        fn wait_level(&mut self, _level: Level) -> Result<(), HarnessError> {
            Ok(())
        }

        fn cycle_count(&self) -> u64 {
            0
        }

        fn shutdown(&mut self) -> Result<(), HarnessError> {
            Ok(())
        }
    }

    #[test]
    fn test_read_signal_uses_single_pad_slice() {
        let driver = TestDriver { pads: 0b0110_0000 };
        assert_eq!(driver.read_signal(PadId(5)).unwrap(), Level::High);
        assert_eq!(driver.read_signal(PadId(6)).unwrap(), Level::High);
        assert_eq!(driver.read_signal(PadId(7)).unwrap(), Level::Low);
        assert_eq!(driver.monitor_pads(PadId(6), PadId(5)).unwrap(), 0b11);
    }

    #[test]
    fn test_harness_error_display() {
        let err = HarnessError::Timeout {
            budget: 500_000,
            elapsed: 500_001,
        };
        assert!(err.to_string().contains("500000"));

        let err = HarnessError::Bus {
            address: 0x3000_0044,
        };
        assert_eq!(err.to_string(), "Bus error at 0x30000044");

        let err = HarnessError::DriverNotFound("jtag".to_string());
        assert!(err.to_string().contains("jtag"));

        let err = HarnessError::DuplicateDriver("simulation".to_string());
        assert_eq!(err.to_string(), "Driver already registered: simulation");
    }
}
