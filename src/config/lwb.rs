//! Generator configuration snapshot.
//!
//! Every derived constant is a function of one [`LwbConfig`]. Array fields
//! are indexed like `modulations`; their alignment is checked when the
//! Gloria model is built, the scalar fields by [`LwbConfig::validate`].
//!
//! # Example
//!
//! ```
//! use lwb_constgen::config::LwbConfig;
//!
//! let config = LwbConfig::from_json(r#"{"modulations": [5, 9]}"#).unwrap();
//! assert_eq!(config.modulations, vec![5, 9]);
//! assert!(config.validate().is_ok());
//! ```

use super::latency::RadioLatencies;
use crate::emit::ElementType;
use crate::gloria::FloodPolicy;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::fs;
use std::path::Path;

/// Firmware high-speed timer frequency (8 MHz).
pub const DEFAULT_TIMER_FREQUENCY_HZ: u64 = 8_000_000;

/// Sync every 2^29 ticks (~67.1 s).
pub const DEFAULT_SYNC_PERIOD: u64 = 1 << 29;

/// 256 schedule units per sync period.
pub const DEFAULT_SCHEDULE_GRANULARITY: u64 = DEFAULT_SYNC_PERIOD / 256;

/// Largest number of entries a byte-wide count can describe.
pub const MAX_MODULATIONS: usize = u8::MAX as usize;

/// Configuration snapshot for one generation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LwbConfig {
    /// Radio modulation ids used by the bus, in LWB modulation order.
    pub modulations: Vec<u8>,
    /// Available transmit power levels in dBm.
    pub powers: Vec<i8>,
    /// Default power level per modulation, as an index into `powers`.
    pub gloria_default_power_levels: Vec<u8>,
    /// Gloria retransmissions per node and modulation.
    pub gloria_retransmission_counts: Vec<u8>,
    /// Maximum hop count per modulation.
    pub gloria_hop_counts: Vec<u8>,
    /// Data slots per round and modulation.
    pub slot_counts: Vec<u8>,
    /// Timer ticks per second.
    pub timer_frequency_hz: u64,
    /// Sync period in ticks.
    pub sync_period: u64,
    /// Schedule granularity in ticks.
    pub schedule_granularity: u64,
    /// Gloria header length in bytes.
    pub gloria_header_length: u8,
    /// Contention request bytes following the header.
    pub contention_field_length: u8,
    /// Bytes per slot schedule entry.
    pub slot_schedule_item_length: u8,
    /// Bytes per round schedule entry.
    pub round_schedule_item_length: u8,
    /// Round schedule entries reserved per modulation.
    pub round_schedule_items_per_modulation: u8,
    /// How retransmissions and hops combine into a flood duration.
    pub flood_policy: FloodPolicy,
    /// Platform latencies around each flood.
    pub latencies: RadioLatencies,
    /// Element type of the emitted slot time tables.
    pub slot_time_type: ElementType,
}

impl Default for LwbConfig {
    fn default() -> Self {
        Self {
            modulations: vec![3, 5, 7, 9],
            powers: vec![10, 22],
            gloria_default_power_levels: vec![1, 0, 0, 0],
            gloria_retransmission_counts: vec![1, 2, 2, 2],
            gloria_hop_counts: vec![1, 2, 3, 3],
            slot_counts: vec![4, 6, 16, 32],
            timer_frequency_hz: DEFAULT_TIMER_FREQUENCY_HZ,
            sync_period: DEFAULT_SYNC_PERIOD,
            schedule_granularity: DEFAULT_SCHEDULE_GRANULARITY,
            gloria_header_length: 8,
            contention_field_length: 4,
            slot_schedule_item_length: 3,
            round_schedule_item_length: 4,
            round_schedule_items_per_modulation: 2,
            flood_policy: FloodPolicy::default(),
            latencies: RadioLatencies::default(),
            slot_time_type: ElementType::U32,
        }
    }
}

impl LwbConfig {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::InvalidFormat(e.to_string()))
    }

    /// Load a JSON configuration file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path).map_err(|e| ConfigError::Unreadable {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let config = Self::from_json(&json)?;
        log::debug!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::InvalidFormat(e.to_string()))
    }

    /// SHA-256 of the canonical JSON encoding, as lowercase hex.
    ///
    /// Stamped into both artifacts so a mismatched pair can be spotted.
    pub fn fingerprint(&self) -> Result<String, ConfigError> {
        let canonical =
            serde_json::to_vec(self).map_err(|e| ConfigError::InvalidFormat(e.to_string()))?;
        let digest = Sha256::digest(&canonical);
        Ok(digest.iter().map(|b| format!("{:02x}", b)).collect())
    }

    /// Number of LWB modulations.
    pub fn mod_count(&self) -> usize {
        self.modulations.len()
    }

    /// Validate the scalar fields.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timer_frequency_hz == 0 {
            return Err(ConfigError::ZeroTimerFrequency);
        }
        if self.schedule_granularity == 0 {
            return Err(ConfigError::ZeroGranularity);
        }
        if self.sync_period < self.schedule_granularity {
            return Err(ConfigError::SyncPeriodTooShort {
                sync_period: self.sync_period,
                granularity: self.schedule_granularity,
            });
        }
        if self.sync_period % self.schedule_granularity != 0 {
            log::warn!(
                "Sync period {} is not a multiple of the schedule granularity {}",
                self.sync_period,
                self.schedule_granularity
            );
        }
        if self.modulations.is_empty() {
            return Err(ConfigError::EmptyModulations);
        }
        if self.modulations.len() > MAX_MODULATIONS {
            return Err(ConfigError::TooMany {
                field: "modulations",
                len: self.modulations.len(),
                max: MAX_MODULATIONS,
            });
        }
        if self.powers.is_empty() {
            return Err(ConfigError::EmptyPowers);
        }
        if self.powers.len() > MAX_MODULATIONS {
            return Err(ConfigError::TooMany {
                field: "powers",
                len: self.powers.len(),
                max: MAX_MODULATIONS,
            });
        }
        Ok(())
    }
}

/// Errors in the configuration snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// No modulation configured.
    EmptyModulations,
    /// No power level configured.
    EmptyPowers,
    /// A list exceeds what a byte-wide index can address.
    TooMany {
        field: &'static str,
        len: usize,
        max: usize,
    },
    /// Modulation id not in the radio catalogue.
    UnknownModulation { index: usize, id: u8 },
    /// Modulation listed twice.
    DuplicateModulation { index: usize, id: u8 },
    /// A per-modulation array is not aligned with `modulations`.
    LengthMismatch {
        field: &'static str,
        expected: usize,
        actual: usize,
    },
    /// Default power level does not reference a configured power.
    PowerLevelOutOfRange {
        modulation: usize,
        level: u8,
        available: usize,
    },
    /// A flood must cover at least one hop.
    ZeroHops { modulation: usize },
    /// A flood must transmit at least once.
    ZeroRetransmissions { modulation: usize },
    /// Timer frequency is zero.
    ZeroTimerFrequency,
    /// Schedule granularity is zero.
    ZeroGranularity,
    /// Sync period shorter than one schedule unit.
    SyncPeriodTooShort { sync_period: u64, granularity: u64 },
    /// Invalid JSON.
    InvalidFormat(String),
    /// Configuration file could not be read.
    Unreadable { path: String, reason: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyModulations => write!(f, "at least one modulation is required"),
            Self::EmptyPowers => write!(f, "at least one power level is required"),
            Self::TooMany { field, len, max } => {
                write!(f, "{} has {} entries (max {})", field, len, max)
            }
            Self::UnknownModulation { index, id } => {
                write!(f, "modulation {}: unknown radio modulation id {}", index, id)
            }
            Self::DuplicateModulation { index, id } => {
                write!(f, "modulation {}: radio modulation id {} listed twice", index, id)
            }
            Self::LengthMismatch {
                field,
                expected,
                actual,
            } => write!(
                f,
                "{} has {} entries but {} modulations are configured",
                field, actual, expected
            ),
            Self::PowerLevelOutOfRange {
                modulation,
                level,
                available,
            } => write!(
                f,
                "modulation {}: power level {} out of range ({} powers configured)",
                modulation, level, available
            ),
            Self::ZeroHops { modulation } => {
                write!(f, "modulation {}: hop count must be at least 1", modulation)
            }
            Self::ZeroRetransmissions { modulation } => write!(
                f,
                "modulation {}: retransmission count must be at least 1",
                modulation
            ),
            Self::ZeroTimerFrequency => write!(f, "timer frequency must not be zero"),
            Self::ZeroGranularity => write!(f, "schedule granularity must not be zero"),
            Self::SyncPeriodTooShort {
                sync_period,
                granularity,
            } => write!(
                f,
                "sync period {} is shorter than the schedule granularity {}",
                sync_period, granularity
            ),
            Self::InvalidFormat(msg) => write!(f, "invalid configuration: {}", msg),
            Self::Unreadable { path, reason } => write!(f, "cannot read {}: {}", path, reason),
        }
    }
}

impl std::error::Error for ConfigError {}
