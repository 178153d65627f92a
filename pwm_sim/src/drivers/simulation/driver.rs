//! Simulation driver implementation.
//!
//! The `SimulationDriver` implements the `HarnessDriver` trait on top of a
//! cycle-stepped model: on every clock edge the firmware runs first, then the
//! timers count, then the pads are recomputed from the timer outputs. Reads
//! always observe the state after the most recent edge.

use super::config::{DRIVER_NAME, SimulationConfig};
use super::firmware::{FirmwareModel, FirmwareOp};
use super::pads::PadBank;
use super::timer::Tmr32;
use pwm_common::harness::config::HarnessConfig;
use pwm_common::harness::driver::{HarnessDriver, HarnessError};
use pwm_common::harness::types::{Level, PadId};
use tracing::{debug, info, trace, warn};

/// A timer and the pads its outputs drive.
struct RoutedTimer {
    timer: Tmr32,
    pwm0_pad: PadId,
    pwm1_pad: PadId,
}

/// Everything that only exists after `init()`.
struct Device {
    timers: Vec<RoutedTimer>,
    pads: PadBank,
    firmware: FirmwareModel,
    mgmt_gpio: Level,
}

/// Simulation driver implementing the HarnessDriver trait.
pub struct SimulationDriver {
    /// Driver name
    name: &'static str,
    /// Driver version
    version: &'static str,
    /// Model state, `None` until `init()`
    device: Option<Device>,
    /// Clock edges since `init()`
    cycles: u64,
    /// Global cycle budget
    budget: u64,
}

impl SimulationDriver {
    /// Create a new, uninitialized simulation driver.
    pub fn new() -> Self {
        Self {
            name: DRIVER_NAME,
            version: env!("CARGO_PKG_VERSION"),
            device: None,
            cycles: 0,
            budget: 0,
        }
    }

    /// Initialize from an already-parsed simulation config.
    pub fn init_with(&mut self, sim: &SimulationConfig, budget: u64) -> Result<(), HarnessError> {
        sim.validate()?;

        let timers = sim
            .timers
            .iter()
            .map(|w| RoutedTimer {
                timer: Tmr32::new(w.base),
                pwm0_pad: w.pwm0_pad,
                pwm1_pad: w.pwm1_pad,
            })
            .collect::<Vec<_>>();

        let mut pads = PadBank::new();
        for stuck in &sim.stuck_pads {
            pads.force(stuck.pad, stuck.level)?;
            warn!("Fault injection: {} stuck at {}", stuck.pad, stuck.level);
        }

        let firmware = FirmwareModel::timer_pwm_example(sim);

        info!(
            "Simulation device: {} timers, {} firmware ops, boot {} cycles, budget {} cycles",
            timers.len(),
            firmware.program().len(),
            sim.boot_cycles,
            budget
        );

        self.device = Some(Device {
            timers,
            pads,
            firmware,
            mgmt_gpio: Level::Low,
        });
        self.cycles = 0;
        self.budget = budget;
        Ok(())
    }

    fn device(&self) -> Result<&Device, HarnessError> {
        self.device.as_ref().ok_or(HarnessError::NotInitialized)
    }

    /// Current level of the management GPIO.
    pub fn monitor_level(&self) -> Result<Level, HarnessError> {
        Ok(self.device()?.mgmt_gpio)
    }

    /// `true` once the firmware has reached its final spin loop.
    pub fn firmware_halted(&self) -> Result<bool, HarnessError> {
        Ok(self.device()?.firmware.is_halted())
    }

    /// Register read on the simulated bus.
    pub fn read_register(&self, address: u32) -> Result<u32, HarnessError> {
        let device = self.device()?;
        device
            .timers
            .iter()
            .find(|t| t.timer.decodes(address))
            .ok_or(HarnessError::Bus { address })?
            .timer
            .read(address & 0xFFFF)
    }

    /// One clock edge.
    fn step(&mut self) -> Result<(), HarnessError> {
        if self.cycles >= self.budget {
            return Err(HarnessError::Timeout {
                budget: self.budget,
                elapsed: self.cycles,
            });
        }
        let device = self.device.as_mut().ok_or(HarnessError::NotInitialized)?;
        self.cycles += 1;

        if let Some(op) = device.firmware.tick() {
            device.execute(op)?;
        }

        for routed in &mut device.timers {
            routed.timer.tick();
            device.pads.drive_user(routed.pwm0_pad, routed.timer.pwm0())?;
            device.pads.drive_user(routed.pwm1_pad, routed.timer.pwm1())?;
        }
        Ok(())
    }
}

impl Device {
    fn execute(&mut self, op: FirmwareOp) -> Result<(), HarnessError> {
        match op {
            FirmwareOp::Delay(_) | FirmwareOp::Halt => {}
            FirmwareOp::ConfigurePad { pad, mode } => self.pads.configure(pad, mode)?,
            FirmwareOp::LoadPadConfigs => self.pads.load_configs(),
            FirmwareOp::EnableUserInterface => self.pads.enable_user_interface(),
            FirmwareOp::MgmtGpio(level) => {
                if self.mgmt_gpio != level {
                    trace!("Management GPIO -> {}", level);
                }
                self.mgmt_gpio = level;
            }
            FirmwareOp::WriteRegister { address, value } => {
                self.timers
                    .iter_mut()
                    .find(|t| t.timer.decodes(address))
                    .ok_or(HarnessError::Bus { address })?
                    .timer
                    .write(address & 0xFFFF, value)?;
            }
        }
        Ok(())
    }
}

impl Default for SimulationDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl HarnessDriver for SimulationDriver {
    fn name(&self) -> &'static str {
        self.name
    }

    fn version(&self) -> &'static str {
        self.version
    }

    fn init(&mut self, config: &HarnessConfig) -> Result<(), HarnessError> {
        let sim = SimulationConfig::from_harness(config)?;
        self.init_with(&sim, config.timeout_cycles)
    }

    fn release_control_line(&mut self) -> Result<(), HarnessError> {
        let device = self.device.as_mut().ok_or(HarnessError::NotInitialized)?;
        if !device.firmware.is_held() {
            warn!("Control line already released");
            return Ok(());
        }
        device.firmware.release();
        debug!("Control line released at cycle {}", self.cycles);
        Ok(())
    }

    fn advance_clock(&mut self, cycles: u32) -> Result<(), HarnessError> {
        self.device()?;
        for _ in 0..cycles {
            self.step()?;
        }
        Ok(())
    }

    fn monitor_pads(&self, msb: PadId, lsb: PadId) -> Result<u64, HarnessError> {
        self.device()?.pads.monitor(msb, lsb)
    }

    fn wait_level(&mut self, level: Level) -> Result<(), HarnessError> {
        while self.device()?.mgmt_gpio != level {
            self.step()?;
        }
        trace!("Monitor reached {} at cycle {}", level, self.cycles);
        Ok(())
    }

    fn cycle_count(&self) -> u64 {
        self.cycles
    }

    fn shutdown(&mut self) -> Result<(), HarnessError> {
        info!("Shutting down simulation driver after {} cycles", self.cycles);
        self.device = None;
        Ok(())
    }
}
