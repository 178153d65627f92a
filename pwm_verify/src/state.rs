//! Run phases.
//!
//! `WaitingReady → WaitingConfigured → Sampling → Classified`. Every phase
//! is entered exactly once and in this order; `Classified` is terminal.

use std::fmt;

/// Phase of a verification run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunPhase {
    /// Waiting for the firmware-ready pulses.
    #[default]
    WaitingReady,
    /// Waiting for the peripheral-configured pulses.
    WaitingConfigured,
    /// Settling and sampling the outputs.
    Sampling,
    /// Verdict computed.
    Classified,
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunPhase::WaitingReady => "WaitingReady",
            RunPhase::WaitingConfigured => "WaitingConfigured",
            RunPhase::Sampling => "Sampling",
            RunPhase::Classified => "Classified",
        };
        f.write_str(name)
    }
}

/// Event that moves a run forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunEvent {
    /// Firmware-ready milestone reached.
    ReadyObserved,
    /// Peripheral-configured milestone reached.
    ConfiguredObserved,
    /// Observation window finished.
    SamplingComplete,
}

/// Result of a transition attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionResult {
    /// Transition succeeded, new phase.
    Ok(RunPhase),
    /// Transition rejected, reason.
    Rejected(&'static str),
}

/// Holds the current phase of one run.
#[derive(Debug, Clone, Default)]
pub struct RunStateMachine {
    phase: RunPhase,
}

impl RunStateMachine {
    /// Start in `WaitingReady`.
    pub const fn new() -> Self {
        Self {
            phase: RunPhase::WaitingReady,
        }
    }

    /// Current phase.
    #[inline]
    pub const fn phase(&self) -> RunPhase {
        self.phase
    }

    /// `true` once the verdict exists.
    #[inline]
    pub const fn is_terminal(&self) -> bool {
        matches!(self.phase, RunPhase::Classified)
    }

    /// Attempt a transition.
    pub fn handle_event(&mut self, event: RunEvent) -> TransitionResult {
        use RunEvent::*;
        use RunPhase::*;

        let next = match (self.phase, event) {
            (WaitingReady, ReadyObserved) => WaitingConfigured,
            (WaitingConfigured, ConfiguredObserved) => Sampling,
            (Sampling, SamplingComplete) => Classified,
            (Classified, _) => return TransitionResult::Rejected("run already classified"),
            (_, ReadyObserved) => {
                return TransitionResult::Rejected("ready milestone already observed");
            }
            (WaitingReady, ConfiguredObserved) => {
                return TransitionResult::Rejected("configured before firmware ready");
            }
            (_, ConfiguredObserved) => {
                return TransitionResult::Rejected("configured milestone already observed");
            }
            (_, SamplingComplete) => {
                return TransitionResult::Rejected("sampling completed before configuration");
            }
        };

        self.phase = next;
        TransitionResult::Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn happy_path() {
        let mut sm = RunStateMachine::new();
        assert_eq!(sm.phase(), RunPhase::WaitingReady);
        assert_eq!(
            sm.handle_event(RunEvent::ReadyObserved),
            TransitionResult::Ok(RunPhase::WaitingConfigured)
        );
        assert_eq!(
            sm.handle_event(RunEvent::ConfiguredObserved),
            TransitionResult::Ok(RunPhase::Sampling)
        );
        assert_eq!(
            sm.handle_event(RunEvent::SamplingComplete),
            TransitionResult::Ok(RunPhase::Classified)
        );
        assert!(sm.is_terminal());
    }

    #[test]
    fn no_skipping() {
        let mut sm = RunStateMachine::new();
        assert!(matches!(
            sm.handle_event(RunEvent::ConfiguredObserved),
            TransitionResult::Rejected(_)
        ));
        assert!(matches!(
            sm.handle_event(RunEvent::SamplingComplete),
            TransitionResult::Rejected(_)
        ));
        assert_eq!(sm.phase(), RunPhase::WaitingReady);
    }

    #[test]
    fn no_reversal() {
        let mut sm = RunStateMachine::new();
        sm.handle_event(RunEvent::ReadyObserved);
        sm.handle_event(RunEvent::ConfiguredObserved);
        assert!(matches!(
            sm.handle_event(RunEvent::ReadyObserved),
            TransitionResult::Rejected(_)
        ));
        assert_eq!(sm.phase(), RunPhase::Sampling);
    }

    #[test]
    fn classified_is_terminal() {
        let mut sm = RunStateMachine::new();
        for event in [
            RunEvent::ReadyObserved,
            RunEvent::ConfiguredObserved,
            RunEvent::SamplingComplete,
        ] {
            sm.handle_event(event);
        }
        for event in [
            RunEvent::ReadyObserved,
            RunEvent::ConfiguredObserved,
            RunEvent::SamplingComplete,
        ] {
            assert_eq!(
                sm.handle_event(event),
                TransitionResult::Rejected("run already classified")
            );
        }
        assert_eq!(sm.phase(), RunPhase::Classified);
    }
}
