//! GPIO pad bank.
//!
//! Pad modes are staged by the firmware and only take effect on
//! [`PadBank::load_configs`]. User-project outputs reach a pad only when the
//! pad is a user output and the user interface has been enabled.

use pwm_common::consts::PAD_COUNT;
use pwm_common::harness::driver::HarnessError;
use pwm_common::harness::types::{Level, PadId};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

const PADS: usize = PAD_COUNT as usize;

/// Pad function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PadMode {
    /// Not driven; reads 0.
    #[default]
    Unconfigured,
    /// Driven by the user project.
    UserOutput,
    /// Input with pull-up; reads 1.
    InputPullup,
}

/// The device's GPIO pads.
#[derive(Debug, Clone)]
pub struct PadBank {
    staged: [PadMode; PADS],
    active: [PadMode; PADS],
    user_outputs: [bool; PADS],
    stuck: [Option<Level>; PADS],
    user_interface: bool,
}

impl Default for PadBank {
    fn default() -> Self {
        Self::new()
    }
}

impl PadBank {
    /// All pads unconfigured, user interface disabled.
    pub fn new() -> Self {
        Self {
            staged: [PadMode::Unconfigured; PADS],
            active: [PadMode::Unconfigured; PADS],
            user_outputs: [false; PADS],
            stuck: [None; PADS],
            user_interface: false,
        }
    }

    fn check(pad: PadId) -> Result<usize, HarnessError> {
        if pad.is_valid() {
            Ok(pad.index())
        } else {
            Err(HarnessError::InvalidPad(pad.0))
        }
    }

    /// Stage a pad mode; applied by [`PadBank::load_configs`].
    pub fn configure(&mut self, pad: PadId, mode: PadMode) -> Result<(), HarnessError> {
        let idx = Self::check(pad)?;
        self.staged[idx] = mode;
        Ok(())
    }

    /// Apply every staged pad mode.
    pub fn load_configs(&mut self) {
        self.active = self.staged;
        debug!(
            "Pad configs loaded: {} user outputs, {} pull-up inputs",
            self.active
                .iter()
                .filter(|m| **m == PadMode::UserOutput)
                .count(),
            self.active
                .iter()
                .filter(|m| **m == PadMode::InputPullup)
                .count()
        );
    }

    /// Connect the user project to the pads.
    pub fn enable_user_interface(&mut self) {
        self.user_interface = true;
        debug!("User interface enabled");
    }

    /// Active mode of a pad.
    pub fn mode(&self, pad: PadId) -> Result<PadMode, HarnessError> {
        Ok(self.active[Self::check(pad)?])
    }

    /// Drive a user-project output.
    pub fn drive_user(&mut self, pad: PadId, high: bool) -> Result<(), HarnessError> {
        let idx = Self::check(pad)?;
        if self.user_outputs[idx] != high {
            trace!("User output {} -> {}", pad, Level::from(high));
        }
        self.user_outputs[idx] = high;
        Ok(())
    }

    /// Force a pad to a fixed level regardless of its driver.
    pub fn force(&mut self, pad: PadId, level: Level) -> Result<(), HarnessError> {
        let idx = Self::check(pad)?;
        self.stuck[idx] = Some(level);
        debug!("{} forced to {}", pad, level);
        Ok(())
    }

    /// Level seen on a pad right now.
    pub fn level(&self, pad: PadId) -> Result<Level, HarnessError> {
        let idx = Self::check(pad)?;
        Ok(self.level_at(idx))
    }

    fn level_at(&self, idx: usize) -> Level {
        if let Some(level) = self.stuck[idx] {
            return level;
        }
        let high = match self.active[idx] {
            PadMode::Unconfigured => false,
            PadMode::UserOutput => self.user_interface && self.user_outputs[idx],
            PadMode::InputPullup => true,
        };
        Level::from(high)
    }

    /// Pads `lsb..=msb` packed into an integer, `lsb` at bit 0.
    pub fn monitor(&self, msb: PadId, lsb: PadId) -> Result<u64, HarnessError> {
        let hi = Self::check(msb)?;
        let lo = Self::check(lsb)?;
        if hi < lo {
            return Err(HarnessError::InvalidPad(msb.0));
        }
        Ok((lo..=hi)
            .rev()
            .fold(0u64, |acc, idx| (acc << 1) | self.level_at(idx).bit()))
    }
}
