//! Error type of the verification core.

use pwm_common::config::ConfigError;
use pwm_common::harness::driver::HarnessError;
use thiserror::Error;

/// Errors that abort a verification run before a verdict exists.
///
/// A failed classification is not an error; it is a `RunVerdict` whose
/// `passed()` is `false`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum VerifyError {
    /// The bench configuration was rejected.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The harness failed, including the global cycle budget running out.
    #[error("Harness error: {0}")]
    Harness(#[from] HarnessError),

    /// An observation window of zero cycles was requested.
    #[error("Observation window must be at least one cycle")]
    EmptyWindow,

    /// The run was driven out of order.
    #[error("Invalid phase transition: {0}")]
    Transition(&'static str),
}
