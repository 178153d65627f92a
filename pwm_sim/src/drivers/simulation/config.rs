//! Simulation driver configuration.
//!
//! Read from the `[harness.driver_config.simulation]` table of the bench
//! file. Every field has a default, so an absent table yields the stock
//! two-timer device running the example PWM firmware on timer 0.
//!
//! ```toml
//! [harness.driver_config.simulation]
//! boot_cycles = 2000
//! op_cycles = 20
//!
//! [harness.driver_config.simulation.firmware]
//! timer = 1
//! compare_x = 30
//! compare_y = 70
//! pullup_pads = [10]
//! ```

use super::timer::{CountDirection, TIMER0_BASE, TIMER1_BASE};
use pwm_common::harness::config::HarnessConfig;
use pwm_common::harness::driver::HarnessError;
use pwm_common::harness::types::{Level, PadId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Key of this driver's table in `HarnessConfig::driver_config`.
pub const DRIVER_NAME: &str = "simulation";

fn default_boot_cycles() -> u32 {
    2000
}

fn default_op_cycles() -> u32 {
    20
}

fn default_timers() -> Vec<TimerWiring> {
    vec![
        TimerWiring {
            base: TIMER0_BASE,
            pwm0_pad: PadId(5),
            pwm1_pad: PadId(6),
        },
        TimerWiring {
            base: TIMER1_BASE,
            pwm0_pad: PadId(8),
            pwm1_pad: PadId(9),
        },
    ]
}

fn default_reload() -> u32 {
    99
}

fn default_compare_x() -> u32 {
    50
}

fn default_compare_y() -> u32 {
    25
}

fn default_pulses() -> u32 {
    1
}

fn default_true() -> bool {
    true
}

/// Device and firmware model parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Cycles between releasing the control line and the first firmware op.
    #[serde(default = "default_boot_cycles")]
    pub boot_cycles: u32,

    /// Cycles each firmware op takes (also the width of a handshake pulse).
    #[serde(default = "default_op_cycles")]
    pub op_cycles: u32,

    /// Timers on the bus and the pads their PWM outputs are routed to.
    #[serde(default = "default_timers")]
    pub timers: Vec<TimerWiring>,

    /// What the firmware does.
    #[serde(default)]
    pub firmware: FirmwareConfig,

    /// Pads forced to a fixed level (fault injection).
    #[serde(default)]
    pub stuck_pads: Vec<StuckPad>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            boot_cycles: default_boot_cycles(),
            op_cycles: default_op_cycles(),
            timers: default_timers(),
            firmware: FirmwareConfig::default(),
            stuck_pads: Vec::new(),
        }
    }
}

/// Bus placement and pad routing of one timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerWiring {
    /// Base address (64 KiB aligned).
    pub base: u32,
    /// Pad carrying PWM0.
    pub pwm0_pad: PadId,
    /// Pad carrying PWM1.
    pub pwm1_pad: PadId,
}

/// Parameters of the example PWM firmware.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirmwareConfig {
    /// Index into `SimulationConfig::timers` of the timer to configure.
    #[serde(default)]
    pub timer: usize,
    /// RELOAD register value.
    #[serde(default = "default_reload")]
    pub reload: u32,
    /// PR register value.
    #[serde(default)]
    pub prescaler: u32,
    /// CMPX register value.
    #[serde(default = "default_compare_x")]
    pub compare_x: u32,
    /// CMPY register value.
    #[serde(default = "default_compare_y")]
    pub compare_y: u32,
    /// Counting direction.
    #[serde(default)]
    pub direction: CountDirection,
    /// Enable PWM0.
    #[serde(default = "default_true")]
    pub pwm0_enabled: bool,
    /// Enable PWM1.
    #[serde(default = "default_true")]
    pub pwm1_enabled: bool,
    /// Extra pads configured as pulled-up inputs.
    #[serde(default)]
    pub pullup_pads: Vec<PadId>,
    /// Pulses sent once the firmware has booted.
    #[serde(default = "default_pulses")]
    pub ready_pulses: u32,
    /// Pulses sent once the timer is running.
    #[serde(default = "default_pulses")]
    pub configured_pulses: u32,
}

impl Default for FirmwareConfig {
    fn default() -> Self {
        Self {
            timer: 0,
            reload: default_reload(),
            prescaler: 0,
            compare_x: default_compare_x(),
            compare_y: default_compare_y(),
            direction: CountDirection::Up,
            pwm0_enabled: true,
            pwm1_enabled: true,
            pullup_pads: Vec::new(),
            ready_pulses: default_pulses(),
            configured_pulses: default_pulses(),
        }
    }
}

/// A pad held at a fixed level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StuckPad {
    /// Affected pad.
    pub pad: PadId,
    /// Level it is stuck at.
    pub level: Level,
}

impl SimulationConfig {
    /// Extract and validate this driver's table from the harness config.
    ///
    /// # Errors
    /// Returns `HarnessError::ConfigError` if the table does not deserialize
    /// or fails validation.
    pub fn from_harness(config: &HarnessConfig) -> Result<Self, HarnessError> {
        let sim = match config.driver_config.get(DRIVER_NAME) {
            Some(table) => table.clone().try_into::<SimulationConfig>().map_err(|e| {
                HarnessError::ConfigError(format!("invalid [{DRIVER_NAME}] table: {e}"))
            })?,
            None => SimulationConfig::default(),
        };
        sim.validate()?;
        Ok(sim)
    }

    /// Wiring of the timer the firmware configures.
    pub fn firmware_timer(&self) -> Option<&TimerWiring> {
        self.timers.get(self.firmware.timer)
    }

    /// Validate the model parameters.
    ///
    /// # Validation Rules
    /// 1. `op_cycles` > 0
    /// 2. At least one timer, bases 64 KiB aligned and distinct
    /// 3. Every referenced pad exists; no pad carries two PWM outputs
    /// 4. `firmware.timer` names an existing timer
    pub fn validate(&self) -> Result<(), HarnessError> {
        if self.op_cycles == 0 {
            return Err(HarnessError::ConfigError(
                "op_cycles must be greater than 0".to_string(),
            ));
        }

        if self.timers.is_empty() {
            return Err(HarnessError::ConfigError(
                "at least one timer is required".to_string(),
            ));
        }

        let mut bases = HashSet::new();
        let mut routed = HashSet::new();
        for wiring in &self.timers {
            if wiring.base & 0xFFFF != 0 {
                return Err(HarnessError::ConfigError(format!(
                    "timer base {:#010x} is not 64 KiB aligned",
                    wiring.base
                )));
            }
            if !bases.insert(wiring.base) {
                return Err(HarnessError::ConfigError(format!(
                    "duplicate timer base {:#010x}",
                    wiring.base
                )));
            }
            for pad in [wiring.pwm0_pad, wiring.pwm1_pad] {
                if !pad.is_valid() {
                    return Err(HarnessError::InvalidPad(pad.0));
                }
                if !routed.insert(pad) {
                    return Err(HarnessError::ConfigError(format!(
                        "{pad} is routed to more than one PWM output"
                    )));
                }
            }
        }

        if self.firmware_timer().is_none() {
            return Err(HarnessError::ConfigError(format!(
                "firmware.timer = {} but only {} timers exist",
                self.firmware.timer,
                self.timers.len()
            )));
        }

        let extra = self.firmware.pullup_pads.iter();
        let stuck = self.stuck_pads.iter().map(|s| &s.pad);
        if let Some(pad) = extra.chain(stuck).find(|p| !p.is_valid()) {
            return Err(HarnessError::InvalidPad(pad.0));
        }

        Ok(())
    }
}
