//! Bench-wide constants.
//!
//! Reference values of the timer PWM check. Every threshold here is only a
//! default; the bench configuration may override it.

/// Number of GPIO pads exposed by the device under test.
pub const PAD_COUNT: u8 = 38;

/// Default observation window, in clock cycles.
pub const DEFAULT_SAMPLE_CYCLES: u32 = 5000;

/// Default number of cycles to let the timer settle before sampling.
pub const DEFAULT_SETTLE_CYCLES: u32 = 10_000;

/// Minimum samples at each level (exclusive) for a signal to count as toggling.
pub const DEFAULT_TOGGLE_MIN: u32 = 100;

/// Lower duty-cycle bound in percent (exclusive).
pub const DEFAULT_DUTY_LOW: f64 = 10.0;

/// Upper duty-cycle bound in percent (exclusive).
pub const DEFAULT_DUTY_HIGH: f64 = 90.0;

/// Global cycle budget enforced by the harness.
pub const DEFAULT_TIMEOUT_CYCLES: u64 = 500_000;

/// Handshake pulses sent by the firmware once it has booted.
pub const DEFAULT_READY_PULSES: u32 = 1;

/// Handshake pulses sent by the firmware once the timer is configured.
pub const DEFAULT_CONFIGURED_PULSES: u32 = 1;

/// Default harness driver name.
pub const DEFAULT_DRIVER: &str = "simulation";

/// Default bench configuration file.
pub const DEFAULT_CONFIG_PATH: &str = "config/timer0.toml";
