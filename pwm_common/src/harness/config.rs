//! Bench configuration types.
//!
//! - `BenchConfig` - Whole bench file (`[shared]`, `[verify]`, `[harness]`)
//! - `VerifyConfig` - Milestones, windows, channels and thresholds
//! - `Thresholds` - Toggle minimum and duty-cycle band
//! - `HarnessConfig` - Driver selection, cycle budget, per-driver tables
//!
//! # TOML Example
//!
//! ```toml
//! [shared]
//! bench_name = "timer0_basic_test"
//!
//! [verify]
//! label = "Timer0"
//! sample_cycles = 5000
//! channels = [
//!     { name = "PWM0", pad = 5 },
//!     { name = "PWM1", pad = 6 },
//! ]
//!
//! [verify.thresholds]
//! toggle_min = 100
//! duty_low = 10.0
//! duty_high = 90.0
//!
//! [harness]
//! driver = "simulation"
//! timeout_cycles = 500000
//! ```

use crate::config::{ConfigError, SharedConfig};
use crate::consts::{
    DEFAULT_CONFIGURED_PULSES, DEFAULT_DRIVER, DEFAULT_DUTY_HIGH, DEFAULT_DUTY_LOW,
    DEFAULT_READY_PULSES, DEFAULT_SAMPLE_CYCLES, DEFAULT_SETTLE_CYCLES, DEFAULT_TIMEOUT_CYCLES,
    DEFAULT_TOGGLE_MIN,
};
use crate::harness::types::PadId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

fn default_ready_pulses() -> u32 {
    DEFAULT_READY_PULSES
}

fn default_configured_pulses() -> u32 {
    DEFAULT_CONFIGURED_PULSES
}

fn default_settle_cycles() -> u32 {
    DEFAULT_SETTLE_CYCLES
}

fn default_sample_cycles() -> u32 {
    DEFAULT_SAMPLE_CYCLES
}

fn default_toggle_min() -> u32 {
    DEFAULT_TOGGLE_MIN
}

fn default_duty_low() -> f64 {
    DEFAULT_DUTY_LOW
}

fn default_duty_high() -> f64 {
    DEFAULT_DUTY_HIGH
}

fn default_driver() -> String {
    DEFAULT_DRIVER.to_string()
}

fn default_timeout_cycles() -> u64 {
    DEFAULT_TIMEOUT_CYCLES
}

/// Whole bench configuration file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchConfig {
    /// Bench name and log level.
    pub shared: SharedConfig,
    /// What to verify.
    pub verify: VerifyConfig,
    /// Which harness to verify it on.
    #[serde(default)]
    pub harness: HarnessConfig,
}

impl BenchConfig {
    /// Validate every section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;
        self.verify.validate()?;
        self.harness.validate()?;

        // Waiting, settling and sampling must all fit inside the budget.
        let minimum = u64::from(self.verify.settle_cycles) + u64::from(self.verify.sample_cycles);
        if minimum >= self.harness.timeout_cycles {
            return Err(ConfigError::ValidationError(format!(
                "timeout_cycles ({}) must exceed settle_cycles + sample_cycles ({})",
                self.harness.timeout_cycles, minimum
            )));
        }
        Ok(())
    }
}

/// One observed PWM output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelConfig {
    /// Name used in log lines (e.g. "PWM0").
    pub name: String,
    /// Pad the output is routed to.
    pub pad: PadId,
}

/// Pass/fail thresholds of the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    /// Both levels need strictly more samples than this to count as toggling.
    #[serde(default = "default_toggle_min")]
    pub toggle_min: u32,
    /// Lower duty bound in percent (exclusive).
    #[serde(default = "default_duty_low")]
    pub duty_low: f64,
    /// Upper duty bound in percent (exclusive).
    #[serde(default = "default_duty_high")]
    pub duty_high: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            toggle_min: DEFAULT_TOGGLE_MIN,
            duty_low: DEFAULT_DUTY_LOW,
            duty_high: DEFAULT_DUTY_HIGH,
        }
    }
}

impl Thresholds {
    /// Validate the duty band.
    ///
    /// # Validation Rules
    /// 1. Both bounds are finite and inside `[0, 100]`
    /// 2. `duty_low < duty_high`
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [("duty_low", self.duty_low), ("duty_high", self.duty_high)] {
            if !value.is_finite() || !(0.0..=100.0).contains(&value) {
                return Err(ConfigError::ValidationError(format!(
                    "{name} must be within 0..=100, got {value}"
                )));
            }
        }
        if self.duty_low >= self.duty_high {
            return Err(ConfigError::ValidationError(format!(
                "duty_low ({}) must be below duty_high ({})",
                self.duty_low, self.duty_high
            )));
        }
        Ok(())
    }
}

/// Verification run parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyConfig {
    /// Peripheral label used in milestone and check lines (e.g. "Timer0").
    pub label: String,

    /// Pulses announcing that the firmware has booted.
    #[serde(default = "default_ready_pulses")]
    pub ready_pulses: u32,

    /// Pulses announcing that the peripheral is configured.
    #[serde(default = "default_configured_pulses")]
    pub configured_pulses: u32,

    /// Cycles to skip between the configured milestone and sampling.
    #[serde(default = "default_settle_cycles")]
    pub settle_cycles: u32,

    /// Observation window in cycles. Must be positive.
    #[serde(default = "default_sample_cycles")]
    pub sample_cycles: u32,

    /// The two observed outputs.
    pub channels: [ChannelConfig; 2],

    /// Classifier thresholds.
    #[serde(default)]
    pub thresholds: Thresholds,
}

impl VerifyConfig {
    /// Validate the run parameters.
    ///
    /// # Validation Rules
    /// 1. `label` is not blank
    /// 2. `sample_cycles` > 0
    /// 3. Both channel pads exist and differ, names differ
    /// 4. Thresholds are valid
    ///
    /// A window too short to see both levels past `toggle_min` is accepted;
    /// such a run classifies its channels as not toggling.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.label.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "label cannot be empty".to_string(),
            ));
        }

        if self.sample_cycles == 0 {
            return Err(ConfigError::ValidationError(
                "sample_cycles must be greater than 0".to_string(),
            ));
        }

        for channel in &self.channels {
            if !channel.pad.is_valid() {
                return Err(ConfigError::ValidationError(format!(
                    "channel {} uses nonexistent pad {}",
                    channel.name, channel.pad.0
                )));
            }
        }

        let [first, second] = &self.channels;
        if first.pad == second.pad {
            return Err(ConfigError::ValidationError(format!(
                "channels {} and {} share {}",
                first.name, second.name, first.pad
            )));
        }
        if first.name == second.name {
            return Err(ConfigError::ValidationError(format!(
                "duplicate channel name: {}",
                first.name
            )));
        }

        self.thresholds.validate()?;

        Ok(())
    }
}

/// Harness selection and budget.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarnessConfig {
    /// Driver to load from the registry.
    #[serde(default = "default_driver")]
    pub driver: String,

    /// Global cycle budget; exceeding it aborts the run.
    #[serde(default = "default_timeout_cycles")]
    pub timeout_cycles: u64,

    /// Per-driver configuration sections.
    /// Key = driver name, Value = driver-specific TOML table.
    #[serde(default)]
    pub driver_config: HashMap<String, toml::Value>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            driver: default_driver(),
            timeout_cycles: DEFAULT_TIMEOUT_CYCLES,
            driver_config: HashMap::new(),
        }
    }
}

impl HarnessConfig {
    /// Validate the harness section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.driver.is_empty() {
            return Err(ConfigError::ValidationError(
                "driver cannot be empty".to_string(),
            ));
        }
        if self.timeout_cycles == 0 {
            return Err(ConfigError::ValidationError(
                "timeout_cycles must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}
