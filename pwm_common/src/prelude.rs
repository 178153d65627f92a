//! Prelude module for common re-exports.
//!
//! ```rust
//! use pwm_common::prelude::*;
//! ```

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{ConfigError, ConfigLoader, LogLevel, SharedConfig};
pub use crate::harness::config::{BenchConfig, HarnessConfig, Thresholds, VerifyConfig};

// ─── Harness ────────────────────────────────────────────────────────
pub use crate::harness::driver::{HarnessDriver, HarnessError};
pub use crate::harness::types::{Level, PadId};

// ─── Constants ──────────────────────────────────────────────────────
pub use crate::consts::{DEFAULT_SAMPLE_CYCLES, PAD_COUNT};
