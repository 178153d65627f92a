//! Verification run orchestration.
//!
//! A run releases the firmware, waits for the ready and configured
//! milestones, lets the timer settle, samples both channels for one window
//! and classifies them. Harness failures abort the run with no verdict; a
//! failed classification still produces a full verdict.

use crate::classify::{ChannelVerdict, RunVerdict, pass_tag};
use crate::error::VerifyError;
use crate::report::ReportSink;
use crate::sampler::DutySampler;
use crate::state::{RunEvent, RunPhase, RunStateMachine, TransitionResult};
use crate::sync::ReadinessSynchronizer;
use pwm_common::harness::config::BenchConfig;
use pwm_common::harness::driver::HarnessDriver;
use pwm_sim::DriverRegistry;
use tracing::{debug, info, warn};

/// Milestone reported once the firmware has booted.
pub const READY_MILESTONE: &str = "firmware ready";

/// One verification run over a validated bench configuration.
pub struct VerificationRun<'a, S: ReportSink> {
    config: &'a BenchConfig,
    sink: S,
    machine: RunStateMachine,
    sync: ReadinessSynchronizer,
    sampler: DutySampler,
    executed: bool,
}

impl<'a, S: ReportSink> VerificationRun<'a, S> {
    /// Validate `config` and prepare a run reporting to `sink`.
    ///
    /// # Errors
    /// `VerifyError::Config` if validation fails, `VerifyError::EmptyWindow`
    /// for a zero-cycle window.
    pub fn new(config: &'a BenchConfig, sink: S) -> Result<Self, VerifyError> {
        let sampler = DutySampler::new(config.verify.sample_cycles)?;
        config.validate()?;

        let toggle_min = u64::from(config.verify.thresholds.toggle_min);
        if u64::from(sampler.window()) <= 2 * toggle_min + 1 {
            warn!(
                "A {}-cycle window cannot hold more than {} samples at both levels; \
                 the toggle checks will fail",
                sampler.window(),
                toggle_min
            );
        }

        Ok(Self {
            config,
            sink,
            machine: RunStateMachine::new(),
            sync: ReadinessSynchronizer::new(),
            sampler,
            executed: false,
        })
    }

    /// Current phase.
    pub fn phase(&self) -> RunPhase {
        self.machine.phase()
    }

    /// The report sink.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Give the sink back.
    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Execute the run against an initialized driver.
    ///
    /// Returns the verdict whether it passed or not. A run executes once,
    /// whatever the outcome; a second call is rejected without touching the
    /// driver.
    ///
    /// # Errors
    /// `VerifyError::Harness` if the harness fails or its cycle budget runs
    /// out, `VerifyError::Transition` on reuse.
    pub fn execute<D>(&mut self, driver: &mut D) -> Result<RunVerdict, VerifyError>
    where
        D: HarnessDriver + ?Sized,
    {
        if self.executed {
            return Err(VerifyError::Transition("run already executed"));
        }
        self.executed = true;

        match self.drive(driver) {
            Ok(verdict) => Ok(verdict),
            Err(VerifyError::Harness(err)) => {
                self.sink.error(format!(
                    "{} aborted in {}: {}",
                    self.config.shared.bench_name,
                    self.machine.phase(),
                    err
                ));
                Err(VerifyError::Harness(err))
            }
            Err(err) => Err(err),
        }
    }

    fn drive<D>(&mut self, driver: &mut D) -> Result<RunVerdict, VerifyError>
    where
        D: HarnessDriver + ?Sized,
    {
        let config = self.config;
        let verify = &config.verify;
        let bench = &config.shared.bench_name;

        self.sink.info(format!("Starting {bench}"));
        driver.release_control_line()?;

        self.sync
            .await_milestone(driver, &mut self.sink, verify.ready_pulses, READY_MILESTONE)?;
        self.advance(RunEvent::ReadyObserved)?;

        self.sink
            .info(format!("Waiting for {} PWM configuration", verify.label));
        let configured = format!("{} configured", verify.label);
        self.sync
            .await_milestone(driver, &mut self.sink, verify.configured_pulses, &configured)?;
        self.advance(RunEvent::ConfiguredObserved)?;

        if verify.settle_cycles > 0 {
            debug!("Settling for {} cycles", verify.settle_cycles);
            driver.advance_clock(verify.settle_cycles)?;
        }

        let [first, second] = &verify.channels;
        self.sink.info(format!(
            "Monitoring {} ({}) and {} ({}) for {} cycles",
            first.pad,
            first.name,
            second.pad,
            second.name,
            self.sampler.window()
        ));
        let [tally0, tally1] = self.sampler.sample(driver, [first.pad, second.pad])?;
        self.advance(RunEvent::SamplingComplete)?;

        let thresholds = &verify.thresholds;
        let verdict = RunVerdict {
            test_name: bench.clone(),
            channels: [
                ChannelVerdict::new(first.name.as_str(), first.pad, tally0, thresholds),
                ChannelVerdict::new(second.name.as_str(), second.pad, tally1, thresholds),
            ],
        };

        self.report(&verdict);
        info!(
            "Run finished at cycle {} with {} handshake pulses",
            driver.cycle_count(),
            self.sync.pulses_seen()
        );
        Ok(verdict)
    }

    fn advance(&mut self, event: RunEvent) -> Result<RunPhase, VerifyError> {
        match self.machine.handle_event(event) {
            TransitionResult::Ok(phase) => {
                debug!("Run phase -> {}", phase);
                Ok(phase)
            }
            TransitionResult::Rejected(reason) => Err(VerifyError::Transition(reason)),
        }
    }

    /// Counts first, then the toggle checks, then the range checks, then the
    /// summary.
    fn report(&mut self, verdict: &RunVerdict) {
        let config = self.config;
        let label = &config.verify.label;
        let thresholds = &config.verify.thresholds;

        for channel in &verdict.channels {
            self.sink.info(format!(
                "{label} {} ({}): {} high, {} low, duty={:.2}%",
                channel.name,
                channel.pad,
                channel.tally.high_count,
                channel.tally.low_count,
                channel.duty
            ));
        }

        for channel in &verdict.channels {
            if channel.toggling {
                self.sink
                    .info(format!("{label} {} is toggling - PASS", channel.name));
            } else {
                self.sink.error(format!(
                    "{label} {} is NOT toggling - FAIL (need more than {} samples at each level)",
                    channel.name, thresholds.toggle_min
                ));
            }
        }

        for channel in &verdict.channels {
            if channel.in_range {
                self.sink.info(format!(
                    "{label} {} duty cycle {:.2}% is within range - PASS",
                    channel.name, channel.duty
                ));
            } else {
                self.sink.error(format!(
                    "{label} {} duty cycle {:.2}% is out of range ({}%..{}%) - FAIL",
                    channel.name, channel.duty, thresholds.duty_low, thresholds.duty_high
                ));
            }
        }

        let summary = format!("{} complete - {}", verdict.test_name, pass_tag(verdict.passed()));
        if verdict.passed() {
            self.sink.info(summary);
        } else {
            self.sink.error(summary);
        }
    }
}

/// Open the configured harness, run the bench on it and shut it down.
///
/// The driver is shut down whether or not the run succeeded. A run error
/// takes precedence over a shutdown error.
pub fn run_bench<S: ReportSink>(
    config: &BenchConfig,
    registry: &DriverRegistry,
    sink: S,
) -> Result<RunVerdict, VerifyError> {
    let mut run = VerificationRun::new(config, sink)?;
    let mut driver = registry.open(&config.harness)?;

    let result = run.execute(driver.as_mut());
    let shutdown = driver.shutdown();
    if let (Err(_), Err(shutdown_err)) = (&result, &shutdown) {
        warn!("Shutdown after failed run also failed: {}", shutdown_err);
    }
    let verdict = result?;
    shutdown?;
    Ok(verdict)
}
