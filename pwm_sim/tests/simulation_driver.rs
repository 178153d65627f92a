//! Simulation driver driven through the registry, the way the verification
//! binary uses it.

use pwm_common::harness::config::HarnessConfig;
use pwm_common::harness::driver::{HarnessDriver, HarnessError};
use pwm_common::harness::types::{Level, PadId};
use pwm_sim::DriverRegistry;

fn harness(simulation_table: &str, timeout_cycles: u64) -> HarnessConfig {
    let table = toml::from_str::<toml::Table>(simulation_table).unwrap();
    let mut config = HarnessConfig {
        timeout_cycles,
        ..HarnessConfig::default()
    };
    config
        .driver_config
        .insert("simulation".to_string(), toml::Value::Table(table));
    config
}

fn boot(driver: &mut dyn HarnessDriver, pulses: u32) {
    driver.release_control_line().unwrap();
    for _ in 0..pulses {
        driver.wait_level(Level::High).unwrap();
        driver.wait_level(Level::Low).unwrap();
    }
}

fn high_counts(driver: &mut dyn HarnessDriver, pads: [PadId; 2], cycles: u32) -> [u32; 2] {
    let mut highs = [0; 2];
    for _ in 0..cycles {
        driver.advance_clock(1).unwrap();
        for (count, pad) in highs.iter_mut().zip(pads) {
            *count += u32::from(driver.read_signal(pad).unwrap().is_high());
        }
    }
    highs
}

#[test]
fn timer1_down_counting_on_pads_8_and_9() {
    let registry = DriverRegistry::with_builtin();
    let mut driver = registry
        .open(&harness(
            r#"
[firmware]
timer = 1
compare_x = 30
compare_y = 70
direction = "down"
pullup_pads = [10]
"#,
            100_000,
        ))
        .unwrap();

    boot(driver.as_mut(), 2);
    driver.advance_clock(1000).unwrap();

    let highs = high_counts(driver.as_mut(), [PadId(8), PadId(9)], 1000);
    assert_eq!(highs, [300, 700]);

    // Timer 0 was never configured.
    assert_eq!(high_counts(driver.as_mut(), [PadId(5), PadId(6)], 200), [0, 0]);
    driver.shutdown().unwrap();
}

#[test]
fn prescaler_stretches_period() {
    let registry = DriverRegistry::with_builtin();
    let mut driver = registry
        .open(&harness("[firmware]\nprescaler = 1\n", 100_000))
        .unwrap();

    boot(driver.as_mut(), 2);
    let highs = high_counts(driver.as_mut(), [PadId(5), PadId(6)], 2000);
    assert_eq!(highs, [1000, 500]);
}

#[test]
fn missing_configured_pulse_exhausts_budget() {
    let registry = DriverRegistry::with_builtin();
    let mut driver = registry
        .open(&harness("[firmware]\nconfigured_pulses = 0\n", 20_000))
        .unwrap();

    boot(driver.as_mut(), 1);
    let err = driver.wait_level(Level::High).unwrap_err();
    assert_eq!(
        err,
        HarnessError::Timeout {
            budget: 20_000,
            elapsed: 20_000
        }
    );
    assert_eq!(driver.cycle_count(), 20_000);
}

#[test]
fn bad_simulation_table_fails_init() {
    let registry = DriverRegistry::with_builtin();
    let err = registry
        .open(&harness("boot_cycles = \"soon\"\n", 1000))
        .err()
        .unwrap();
    assert!(matches!(err, HarnessError::ConfigError(_)));
}
