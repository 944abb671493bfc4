//! Per-machine scheduling and bus settings.
//!
//! Every driver ships a default [`MachineConfig`]; a frontend may overlay a
//! TOML document on top of it to tune interleave or enable the watchdog:
//!
//! ```toml
//! slices_per_frame = 100
//! watchdog_frames = 16
//! ```

use serde::{Deserialize, Serialize};

use crate::core::error::SettingsError;

/// Value returned for reads that no map entry claims.
pub const DEFAULT_OPEN_BUS: u8 = 0xFF;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MachineConfig {
    /// Number of round-robin slices per video frame. Each CPU runs
    /// `cycles_per_frame / slices_per_frame` cycles per slice.
    pub slices_per_frame: u32,
    /// Interleave used for frames in which a CPU requested a boost
    /// (e.g. right after a main -> sound command).
    pub boost_slices_per_frame: u32,
    /// Open-bus value for unmapped reads.
    pub open_bus: u8,
    /// Frames without a watchdog write before the machine is reset.
    /// `None` leaves watchdog writes as no-ops.
    pub watchdog_frames: Option<u32>,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            slices_per_frame: 1,
            boost_slices_per_frame: 1,
            open_bus: DEFAULT_OPEN_BUS,
            watchdog_frames: None,
        }
    }
}

/// Keys a TOML overlay may set; absent keys keep the driver default.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct Overrides {
    slices_per_frame: Option<u32>,
    boost_slices_per_frame: Option<u32>,
    open_bus: Option<u8>,
    watchdog_frames: Option<u32>,
}

impl MachineConfig {
    /// Parse a complete config (missing keys take the generic defaults).
    pub fn from_toml_str(text: &str) -> Result<Self, SettingsError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Overlay the keys present in `text` on top of `self`.
    pub fn apply_toml(&self, text: &str) -> Result<Self, SettingsError> {
        let overrides: Overrides = toml::from_str(text)?;
        let mut config = self.clone();
        if let Some(v) = overrides.slices_per_frame {
            config.slices_per_frame = v;
        }
        if let Some(v) = overrides.boost_slices_per_frame {
            config.boost_slices_per_frame = v;
        }
        if let Some(v) = overrides.open_bus {
            config.open_bus = v;
        }
        if let Some(v) = overrides.watchdog_frames {
            config.watchdog_frames = Some(v);
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.slices_per_frame == 0 {
            return Err(SettingsError::Zero {
                field: "slices_per_frame",
            });
        }
        if self.boost_slices_per_frame == 0 {
            return Err(SettingsError::Zero {
                field: "boost_slices_per_frame",
            });
        }
        if self.watchdog_frames == Some(0) {
            return Err(SettingsError::Zero {
                field: "watchdog_frames",
            });
        }
        Ok(())
    }
}
