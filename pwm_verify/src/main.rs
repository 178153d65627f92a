//! # PWM Verify Binary
//!
//! Runs one timer PWM verification bench and exits 0 on PASS, 1 otherwise.
//!
//! # Usage
//!
//! ```bash
//! # Timer 0 on the simulation driver
//! pwm_verify --config config/timer0.toml
//!
//! # Timer 1, shorter window, debug logging
//! pwm_verify --config config/timer1.toml --sample-cycles 2000 -v
//!
//! # JSON logs
//! pwm_verify --json
//! ```

#![deny(warnings)]

use clap::Parser;
use pwm_common::config::{ConfigLoader, LogLevel};
use pwm_common::consts::DEFAULT_CONFIG_PATH;
use pwm_common::harness::config::BenchConfig;
use pwm_sim::DriverRegistry;
use pwm_verify::report::TracingSink;
use pwm_verify::runner::run_bench;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{Level, error, info};
use tracing_subscriber::EnvFilter;

/// PWM Verify - timer PWM duty-cycle verification
#[derive(Parser, Debug)]
#[command(name = "pwm_verify")]
#[command(version)]
#[command(about = "Verify timer PWM outputs toggle with a duty cycle inside the configured band")]
#[command(long_about = None)]
struct Args {
    /// Path to the bench configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Harness driver to use (overrides harness.driver)
    #[arg(short, long)]
    driver: Option<String>,

    /// Observation window in cycles (overrides verify.sample_cycles)
    #[arg(long, value_name = "CYCLES")]
    sample_cycles: Option<u32>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();
    let config = BenchConfig::load(&args.config);

    // The config's log level applies unless --verbose asks for more.
    let level = config
        .as_ref()
        .map(|c| c.shared.log_level)
        .unwrap_or_default();
    setup_tracing(&args, level);

    let outcome = config
        .map_err(|e| -> Box<dyn std::error::Error> {
            format!("{}: {}", args.config.display(), e).into()
        })
        .and_then(|config| run(&args, config));

    match outcome {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("Verification failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args, mut config: BenchConfig) -> Result<bool, Box<dyn std::error::Error>> {
    info!("PWM Verify v{} starting...", env!("CARGO_PKG_VERSION"));

    if let Some(driver) = &args.driver {
        info!("Driver from CLI: {}", driver);
        config.harness.driver = driver.clone();
    }
    if let Some(cycles) = args.sample_cycles {
        info!("Observation window from CLI: {} cycles", cycles);
        config.verify.sample_cycles = cycles;
    }

    let registry = DriverRegistry::with_builtin();
    info!("Available drivers: {:?}", registry.names());

    let verdict = run_bench(&config, &registry, TracingSink)?;
    Ok(verdict.passed())
}

/// Setup tracing subscriber based on CLI arguments.
fn setup_tracing(args: &Args, configured: LogLevel) {
    let level = if args.verbose {
        Level::DEBUG
    } else {
        match configured {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
