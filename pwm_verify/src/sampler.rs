//! Fixed-window duty-cycle sampler.

use crate::error::VerifyError;
use pwm_common::harness::driver::{HarnessDriver, HarnessError};
use pwm_common::harness::types::{Level, PadId};
use std::num::NonZeroU32;
use tracing::debug;

/// High and low sample counts of one signal over one window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SampleTally {
    /// Samples that read `1`.
    pub high_count: u32,
    /// Samples that read anything else.
    pub low_count: u32,
}

impl SampleTally {
    /// Tally with the given counts.
    pub const fn new(high_count: u32, low_count: u32) -> Self {
        Self {
            high_count,
            low_count,
        }
    }

    /// Count one sample.
    pub fn record(&mut self, level: Level) {
        match level {
            Level::High => self.high_count += 1,
            Level::Low => self.low_count += 1,
        }
    }

    /// Samples counted.
    pub const fn total(&self) -> u32 {
        self.high_count + self.low_count
    }

    /// Percentage of high samples, `None` for an empty tally.
    pub fn duty_percent(&self) -> Option<f64> {
        match self.total() {
            0 => None,
            total => Some(100.0 * f64::from(self.high_count) / f64::from(total)),
        }
    }
}

/// Samples two pads once per clock cycle for a fixed number of cycles.
#[derive(Debug, Clone, Copy)]
pub struct DutySampler {
    window: NonZeroU32,
}

impl DutySampler {
    /// Sampler over `window` cycles.
    ///
    /// # Errors
    /// `VerifyError::EmptyWindow` if `window` is zero.
    pub fn new(window: u32) -> Result<Self, VerifyError> {
        NonZeroU32::new(window)
            .map(|window| Self { window })
            .ok_or(VerifyError::EmptyWindow)
    }

    /// Window length in cycles.
    pub fn window(&self) -> u32 {
        self.window.get()
    }

    /// Advance one cycle, then read both pads from that cycle's state;
    /// repeat for the whole window.
    ///
    /// Each returned tally totals exactly `window()` samples.
    pub fn sample<D>(
        &self,
        driver: &mut D,
        pads: [PadId; 2],
    ) -> Result<[SampleTally; 2], HarnessError>
    where
        D: HarnessDriver + ?Sized,
    {
        let mut tallies = [SampleTally::default(); 2];
        let start = driver.cycle_count();

        for _ in 0..self.window.get() {
            driver.advance_clock(1)?;
            for (tally, pad) in tallies.iter_mut().zip(pads) {
                tally.record(driver.read_signal(pad)?);
            }
        }

        debug!(
            "Sampled {} and {} over cycles {}..{}",
            pads[0],
            pads[1],
            start,
            driver.cycle_count()
        );
        debug_assert!(tallies.iter().all(|t| t.total() == self.window.get()));
        Ok(tallies)
    }
}
