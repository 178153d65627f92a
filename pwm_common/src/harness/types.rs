//! Signal types shared by harness drivers and the verification core.
//!
//! - `Level` - Logic level of a digital line
//! - `PadId` - Index of a GPIO pad on the device under test

use crate::consts::PAD_COUNT;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Logic level of a digital line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    /// Logical 0.
    #[default]
    Low,
    /// Logical 1.
    High,
}

impl Level {
    /// Interpret a monitored value. Only an exact `1` reads as high.
    #[inline]
    pub const fn from_sample(value: u64) -> Self {
        if value == 1 { Level::High } else { Level::Low }
    }

    /// `true` for [`Level::High`].
    #[inline]
    pub const fn is_high(self) -> bool {
        matches!(self, Level::High)
    }

    /// Numeric value of the level (0 or 1).
    #[inline]
    pub const fn bit(self) -> u64 {
        match self {
            Level::Low => 0,
            Level::High => 1,
        }
    }
}

impl From<bool> for Level {
    fn from(value: bool) -> Self {
        if value { Level::High } else { Level::Low }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Level::Low => "0",
            Level::High => "1",
        })
    }
}

/// Index of a GPIO pad (`0..PAD_COUNT`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PadId(pub u8);

impl PadId {
    /// Checked constructor.
    pub const fn new(index: u8) -> Option<Self> {
        if index < PAD_COUNT { Some(Self(index)) } else { None }
    }

    /// Pad index as usize, for bank lookups.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// `true` if the pad exists on the device.
    #[inline]
    pub const fn is_valid(self) -> bool {
        self.0 < PAD_COUNT
    }
}

impl fmt::Display for PadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GPIO {}", self.0)
    }
}
