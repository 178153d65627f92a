//! Duty-cycle classification and verdicts.
//!
//! Classification is a pure function of a tally and the thresholds. Both
//! comparisons are strict: a signal with exactly `toggle_min` samples at one
//! level is not toggling, and a duty of exactly `duty_low` or `duty_high` is
//! out of range.

use crate::sampler::SampleTally;
use pwm_common::harness::config::Thresholds;
use pwm_common::harness::types::PadId;

/// Outcome of classifying one tally.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    /// High samples as a percentage of all samples.
    pub duty: f64,
    /// Both levels seen more than `toggle_min` times.
    pub toggling: bool,
    /// `duty_low < duty < duty_high`.
    pub in_range: bool,
}

impl Classification {
    /// Both checks passed.
    pub fn passed(&self) -> bool {
        self.toggling && self.in_range
    }
}

/// Classify one tally.
///
/// An empty tally has a duty of 0 and is neither toggling nor in range.
pub fn classify(tally: SampleTally, thresholds: &Thresholds) -> Classification {
    let duty = tally.duty_percent().unwrap_or(0.0);
    Classification {
        duty,
        toggling: tally.high_count > thresholds.toggle_min
            && tally.low_count > thresholds.toggle_min,
        in_range: tally.total() > 0 && thresholds.duty_low < duty && duty < thresholds.duty_high,
    }
}

/// Verdict for one observed output.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelVerdict {
    /// Channel name, e.g. "PWM0".
    pub name: String,
    /// Pad it was sampled on.
    pub pad: PadId,
    /// Raw counts.
    pub tally: SampleTally,
    /// Duty cycle in percent.
    pub duty: f64,
    /// Toggle check result.
    pub toggling: bool,
    /// Duty band check result.
    pub in_range: bool,
}

impl ChannelVerdict {
    /// Classify `tally` and attach the channel identity.
    pub fn new(
        name: impl Into<String>,
        pad: PadId,
        tally: SampleTally,
        thresholds: &Thresholds,
    ) -> Self {
        let Classification {
            duty,
            toggling,
            in_range,
        } = classify(tally, thresholds);
        Self {
            name: name.into(),
            pad,
            tally,
            duty,
            toggling,
            in_range,
        }
    }

    /// Toggling and in range.
    pub fn passed(&self) -> bool {
        self.toggling && self.in_range
    }
}

/// Verdict of a whole run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunVerdict {
    /// Bench name from `[shared]`.
    pub test_name: String,
    /// Both channels, in configuration order.
    pub channels: [ChannelVerdict; 2],
}

impl RunVerdict {
    /// Every channel passed.
    pub fn passed(&self) -> bool {
        self.channels.iter().all(ChannelVerdict::passed)
    }

    /// `"PASS"` or `"FAIL"`.
    pub fn tag(&self) -> &'static str {
        pass_tag(self.passed())
    }
}

pub(crate) fn pass_tag(passed: bool) -> &'static str {
    if passed { "PASS" } else { "FAIL" }
}
