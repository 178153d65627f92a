//! Harness driver lookup.
//!
//! A bench names its driver in `[harness] driver = "..."`. The registry maps
//! that name to a factory and [`DriverRegistry::open`] hands back a driver
//! already initialized from the bench's `[harness]` section, so callers never
//! hold an uninitialized harness.

use crate::drivers::BUILTIN_DRIVERS;
use pwm_common::harness::config::HarnessConfig;
use pwm_common::harness::driver::{DriverFactory, HarnessDriver, HarnessError};
use std::collections::BTreeMap;
use tracing::{info, warn};

/// Harness drivers known to a bench run, by name.
#[derive(Clone)]
pub struct DriverRegistry {
    factories: BTreeMap<&'static str, DriverFactory>,
}

impl DriverRegistry {
    /// Registry without any driver.
    pub fn empty() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// Registry holding every built-in driver.
    pub fn with_builtin() -> Self {
        Self {
            factories: BUILTIN_DRIVERS.iter().copied().collect(),
        }
    }

    /// Add a driver under `name`.
    ///
    /// # Errors
    /// `HarnessError::DuplicateDriver` if `name` is taken; the existing
    /// driver stays registered.
    pub fn register(
        &mut self,
        name: &'static str,
        factory: DriverFactory,
    ) -> Result<(), HarnessError> {
        if self.factories.contains_key(name) {
            return Err(HarnessError::DuplicateDriver(name.to_string()));
        }
        self.factories.insert(name, factory);
        Ok(())
    }

    /// Registered names in order.
    pub fn names(&self) -> Vec<&'static str> {
        self.factories.keys().copied().collect()
    }

    /// Build the driver named by `config.driver` and initialize it with
    /// `config`.
    ///
    /// A driver whose `init` fails is shut down before the error is returned.
    ///
    /// # Errors
    /// `HarnessError::DriverNotFound` listing the registered names, or the
    /// driver's own `init` error.
    pub fn open(&self, config: &HarnessConfig) -> Result<Box<dyn HarnessDriver>, HarnessError> {
        let factory = self.factories.get(config.driver.as_str()).ok_or_else(|| {
            HarnessError::DriverNotFound(format!(
                "{} (available: {})",
                config.driver,
                self.names().join(", ")
            ))
        })?;

        let mut driver = factory();
        info!(
            "Opening harness '{}' v{} with a budget of {} cycles",
            driver.name(),
            driver.version(),
            config.timeout_cycles
        );
        if let Err(err) = driver.init(config) {
            if let Err(shutdown_err) = driver.shutdown() {
                warn!("Shutdown after failed init also failed: {}", shutdown_err);
            }
            return Err(err);
        }
        Ok(driver)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pwm_common::harness::types::{Level, PadId};
    use std::sync::atomic::{AtomicUsize, Ordering};

    static REJECTING_SHUTDOWNS: AtomicUsize = AtomicUsize::new(0);

    /// Rejects every configuration whose budget is below 1000 cycles.
    struct RejectingDriver {
        initialized: bool,
    }

    impl HarnessDriver for RejectingDriver {
        fn name(&self) -> &'static str {
            "rejecting"
        }

        fn version(&self) -> &'static str {
            "0.1.0"
        }

        fn init(&mut self, config: &HarnessConfig) -> Result<(), HarnessError> {
            if config.timeout_cycles < 1000 {
                return Err(HarnessError::InitFailed("budget too small".to_string()));
            }
            self.initialized = true;
            Ok(())
        }

        fn release_control_line(&mut self) -> Result<(), HarnessError> {
            Ok(())
        }

        fn advance_clock(&mut self, _cycles: u32) -> Result<(), HarnessError> {
            Ok(())
        }

        fn monitor_pads(&self, _msb: PadId, _lsb: PadId) -> Result<u64, HarnessError> {
            if self.initialized {
                Ok(0)
            } else {
                Err(HarnessError::NotInitialized)
            }
        }

        fn wait_level(&mut self, _level: Level) -> Result<(), HarnessError> {
            Ok(())
        }

        fn cycle_count(&self) -> u64 {
            0
        }

        fn shutdown(&mut self) -> Result<(), HarnessError> {
            REJECTING_SHUTDOWNS.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn create_rejecting_driver() -> Box<dyn HarnessDriver> {
        Box::new(RejectingDriver { initialized: false })
    }

    fn harness(driver: &str, timeout_cycles: u64) -> HarnessConfig {
        HarnessConfig {
            driver: driver.to_string(),
            timeout_cycles,
            ..HarnessConfig::default()
        }
    }

    #[test]
    fn builtin_registry_opens_simulation() {
        let reg = DriverRegistry::with_builtin();
        assert_eq!(reg.names(), vec!["simulation"]);

        let driver = reg.open(&HarnessConfig::default()).unwrap();
        assert_eq!(driver.name(), "simulation");
        assert_eq!(driver.read_signal(PadId(5)), Ok(Level::Low));
    }

    #[test]
    fn duplicate_name_is_an_error() {
        let mut reg = DriverRegistry::with_builtin();
        let err = reg
            .register("simulation", create_rejecting_driver)
            .unwrap_err();
        assert_eq!(err, HarnessError::DuplicateDriver("simulation".to_string()));

        // The original factory is untouched.
        let driver = reg.open(&HarnessConfig::default()).unwrap();
        assert_eq!(driver.name(), "simulation");
    }

    #[test]
    fn unknown_driver_lists_available() {
        let mut reg = DriverRegistry::with_builtin();
        reg.register("rejecting", create_rejecting_driver).unwrap();

        let err = reg.open(&harness("jtag", 500_000)).err().unwrap();
        assert_eq!(
            err,
            HarnessError::DriverNotFound("jtag (available: rejecting, simulation)".to_string())
        );
    }

    #[test]
    fn empty_registry_opens_nothing() {
        let reg = DriverRegistry::empty();
        assert!(reg.names().is_empty());
        assert!(matches!(
            reg.open(&HarnessConfig::default()),
            Err(HarnessError::DriverNotFound(_))
        ));
    }

    #[test]
    fn failed_init_is_returned_and_shut_down() {
        let mut reg = DriverRegistry::empty();
        reg.register("rejecting", create_rejecting_driver).unwrap();

        let before = REJECTING_SHUTDOWNS.load(Ordering::SeqCst);
        let err = reg.open(&harness("rejecting", 10)).err().unwrap();
        assert!(matches!(err, HarnessError::InitFailed(_)));
        assert_eq!(REJECTING_SHUTDOWNS.load(Ordering::SeqCst), before + 1);

        let driver = reg.open(&harness("rejecting", 1000)).unwrap();
        assert_eq!(driver.read_signal(PadId(0)), Ok(Level::Low));
    }
}
