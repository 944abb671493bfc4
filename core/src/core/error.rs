use thiserror::Error;

use crate::core::bus::Access;

/// Machine-definition errors, detected while a system is being assembled.
///
/// These always indicate a bug in a driver's tables (or a ROM image of the
/// wrong size) and abort machine construction. Nothing that happens while
/// the emulated program runs is reported through this type.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("cpu {cpu}: invalid address range {start:#06X}-{end:#06X}")]
    InvalidRange { cpu: usize, start: u32, end: u32 },

    #[error(
        "cpu {cpu}: {access} range {start:#06X}-{end:#06X} overlaps {other_start:#06X}-{other_end:#06X}"
    )]
    OverlappingRange {
        cpu: usize,
        access: Access,
        start: u32,
        end: u32,
        other_start: u32,
        other_end: u32,
    },

    #[error("unknown region '{0}'")]
    UnknownRegion(String),

    #[error(
        "cpu {cpu}: range {start:#06X}-{end:#06X} needs {needed} bytes from offset {offset:#X} of region '{region}' ({available} bytes)"
    )]
    RegionTooSmall {
        cpu: usize,
        start: u32,
        end: u32,
        region: String,
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("region '{region}': expected {expected} bytes, got {actual}")]
    RegionSizeMismatch {
        region: String,
        expected: usize,
        actual: usize,
    },

    #[error("shared window '{name}': {expected} bytes, but cpu {cpu} maps {actual}")]
    SharedWindowMismatch {
        name: String,
        cpu: usize,
        expected: usize,
        actual: usize,
    },

    #[error(
        "bank '{name}': {count} pages of {page_size:#X} bytes from {base:#X} exceed region size {region_len:#X}"
    )]
    BankExceedsRegion {
        name: String,
        base: usize,
        page_size: usize,
        count: usize,
        region_len: usize,
    },

    #[error("cpu {cpu}: bank '{name}' window {start:#06X}-{end:#06X} is larger than its {page_size:#X}-byte page")]
    BankWindowTooLarge {
        cpu: usize,
        name: String,
        start: u32,
        end: u32,
        page_size: usize,
    },

    #[error("bank '{name}': bank {bank} out of range (0..{count})")]
    BankOutOfRange {
        name: String,
        bank: usize,
        count: usize,
    },

    #[error("no cpu {0} on this machine")]
    UnknownCpu(usize),

    #[error("duplicate name '{0}'")]
    DuplicateName(String),
}

/// Errors from parsing or validating a [`MachineConfig`](crate::core::config::MachineConfig).
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("invalid machine settings: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },
}
