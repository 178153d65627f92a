//! Readiness synchronizer.
//!
//! The firmware announces each milestone by pulsing the management monitor
//! line: high, then low. A milestone is reached once the expected number of
//! complete pulses has been observed. There is no local timeout; a firmware
//! that never pulses runs the harness out of its cycle budget.

use crate::report::ReportSink;
use pwm_common::harness::driver::{HarnessDriver, HarnessError};
use pwm_common::harness::types::Level;

/// Counts handshake pulses across the milestones of one run.
#[derive(Debug, Default)]
pub struct ReadinessSynchronizer {
    pulses_seen: u32,
}

impl ReadinessSynchronizer {
    /// Fresh synchronizer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Block until `pulse_count` complete pulses have been seen, then report
    /// `label`.
    ///
    /// A count of zero reports immediately without touching the harness.
    ///
    /// # Errors
    /// Any harness error, in particular `HarnessError::Timeout`, is returned
    /// unchanged and nothing is reported.
    pub fn await_milestone<D, S>(
        &mut self,
        driver: &mut D,
        sink: &mut S,
        pulse_count: u32,
        label: &str,
    ) -> Result<(), HarnessError>
    where
        D: HarnessDriver + ?Sized,
        S: ReportSink + ?Sized,
    {
        for _ in 0..pulse_count {
            driver.wait_level(Level::High)?;
            driver.wait_level(Level::Low)?;
            self.pulses_seen += 1;
        }
        sink.info(label.to_string());
        Ok(())
    }

    /// Complete pulses observed so far.
    pub fn pulses_seen(&self) -> u32 {
        self.pulses_seen
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::MemorySink;
    use pwm_common::harness::config::HarnessConfig;
    use pwm_common::harness::types::PadId;

    /// Records every call; `wait_level` fails once `fail_after` waits happened.
    #[derive(Default)]
    struct RecordingDriver {
        calls: Vec<String>,
        fail_after: Option<usize>,
    }

    impl HarnessDriver for RecordingDriver {
        fn name(&self) -> &'static str {
            "recording"
        }

        fn version(&self) -> &'static str {
            "0.0.0"
        }

        fn init(&mut self, _config: &HarnessConfig) -> Result<(), HarnessError> {
            self.calls.push("init".to_string());
            Ok(())
        }

        fn release_control_line(&mut self) -> Result<(), HarnessError> {
            self.calls.push("release".to_string());
            Ok(())
        }

        fn advance_clock(&mut self, cycles: u32) -> Result<(), HarnessError> {
            self.calls.push(format!("advance {cycles}"));
            Ok(())
        }

        fn monitor_pads(&self, _msb: PadId, _lsb: PadId) -> Result<u64, HarnessError> {
            Ok(0)
        }

        fn wait_level(&mut self, level: Level) -> Result<(), HarnessError> {
            if self.fail_after == Some(self.calls.len()) {
                return Err(HarnessError::Timeout {
                    budget: 10,
                    elapsed: 10,
                });
            }
            self.calls.push(format!("wait {level}"));
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
    fn zero_pulses_touch_nothing() {
        let mut driver = RecordingDriver::default();
        let mut sink = MemorySink::new();
        let mut sync = ReadinessSynchronizer::new();

        sync.await_milestone(&mut driver, &mut sink, 0, "firmware ready")
            .unwrap();

        assert!(driver.calls.is_empty());
        assert_eq!(sink.messages(), vec!["firmware ready"]);
        assert_eq!(sync.pulses_seen(), 0);
    }

    #[test]
    fn waits_high_then_low_per_pulse() {
        let mut driver = RecordingDriver::default();
        let mut sink = MemorySink::new();
        let mut sync = ReadinessSynchronizer::new();

        sync.await_milestone(&mut driver, &mut sink, 2, "Timer0 configured")
            .unwrap();

        assert_eq!(driver.calls, vec!["wait 1", "wait 0", "wait 1", "wait 0"]);
        assert_eq!(sync.pulses_seen(), 2);
        assert_eq!(sink.messages(), vec!["Timer0 configured"]);
    }

    #[test]
    fn timeout_propagates_without_report() {
        let mut driver = RecordingDriver {
            fail_after: Some(1),
            ..RecordingDriver::default()
        };
        let mut sink = MemorySink::new();
        let mut sync = ReadinessSynchronizer::new();

        let result = sync.await_milestone(&mut driver, &mut sink, 1, "firmware ready");

        assert!(matches!(result, Err(HarnessError::Timeout { .. })));
        assert!(sink.records().is_empty());
        assert_eq!(sync.pulses_seen(), 0);
    }
}
