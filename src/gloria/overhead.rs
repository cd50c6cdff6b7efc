//! Per-modulation Gloria parameters.
//!
//! The model is the validated form of the modulation-indexed configuration
//! arrays. All alignment checks happen once in [`GloriaModel::new`]; lookups
//! afterwards are infallible for indices below [`GloriaModel::mod_count`].

use super::flood::{flood_duration, FloodPolicy};
use crate::config::{ConfigError, LwbConfig, RadioLatencies};
use crate::radio::{Modulation, TimingModel};
use std::collections::HashSet;
use std::time::Duration;

/// Gloria settings of one modulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GloriaParams {
    /// Index into the configured power levels.
    pub power_level: u8,
    /// Retransmissions per node.
    pub retransmissions: u8,
    /// Maximum hop count.
    pub hops: u8,
}

/// Validated modulation set with its Gloria parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct GloriaModel {
    modulations: Vec<Modulation>,
    params: Vec<GloriaParams>,
    slot_counts: Vec<u8>,
    powers: Vec<i8>,
    policy: FloodPolicy,
    latencies: RadioLatencies,
}

fn check_aligned<T>(field: &'static str, values: &[T], expected: usize) -> Result<(), ConfigError> {
    if values.len() != expected {
        return Err(ConfigError::LengthMismatch {
            field,
            expected,
            actual: values.len(),
        });
    }
    Ok(())
}

impl GloriaModel {
    /// Validate the configuration and build the model.
    ///
    /// Fails on any array not aligned with `modulations`, before any
    /// timing is computed.
    pub fn new(config: &LwbConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let count = config.mod_count();
        check_aligned("gloria_default_power_levels", &config.gloria_default_power_levels, count)?;
        check_aligned("gloria_retransmission_counts", &config.gloria_retransmission_counts, count)?;
        check_aligned("gloria_hop_counts", &config.gloria_hop_counts, count)?;
        check_aligned("slot_counts", &config.slot_counts, count)?;

        let mut seen = HashSet::new();
        let mut modulations = Vec::with_capacity(count);
        for (index, &id) in config.modulations.iter().enumerate() {
            let modulation = Modulation::from_index(id)
                .ok_or(ConfigError::UnknownModulation { index, id })?;
            if !seen.insert(modulation) {
                return Err(ConfigError::DuplicateModulation { index, id });
            }
            modulations.push(modulation);
        }

        let mut params = Vec::with_capacity(count);
        for modulation in 0..count {
            let power_level = config.gloria_default_power_levels[modulation];
            let retransmissions = config.gloria_retransmission_counts[modulation];
            let hops = config.gloria_hop_counts[modulation];

            if power_level as usize >= config.powers.len() {
                return Err(ConfigError::PowerLevelOutOfRange {
                    modulation,
                    level: power_level,
                    available: config.powers.len(),
                });
            }
            if retransmissions == 0 {
                return Err(ConfigError::ZeroRetransmissions { modulation });
            }
            if hops == 0 {
                return Err(ConfigError::ZeroHops { modulation });
            }

            params.push(GloriaParams {
                power_level,
                retransmissions,
                hops,
            });
        }

        log::debug!(
            "Gloria model: {} modulations, {:?} flood policy",
            count,
            config.flood_policy
        );

        Ok(Self {
            modulations,
            params,
            slot_counts: config.slot_counts.clone(),
            powers: config.powers.clone(),
            policy: config.flood_policy,
            latencies: config.latencies,
        })
    }

    /// Number of LWB modulations (`LWB_MOD_COUNT`).
    pub fn mod_count(&self) -> usize {
        self.modulations.len()
    }

    /// LWB modulations in index order.
    pub fn modulations(&self) -> &[Modulation] {
        &self.modulations
    }

    /// Gloria parameters in modulation order.
    pub fn params(&self) -> &[GloriaParams] {
        &self.params
    }

    /// Gloria parameters of modulation `m`.
    pub fn overhead(&self, m: usize) -> Option<GloriaParams> {
        self.params.get(m).copied()
    }

    /// Configured power levels in dBm.
    pub fn powers(&self) -> &[i8] {
        &self.powers
    }

    /// Default transmit power of modulation `m` in dBm.
    pub fn default_power_dbm(&self, m: usize) -> Option<i8> {
        let params = self.overhead(m)?;
        self.powers.get(params.power_level as usize).copied()
    }

    /// Data slots per round in modulation order.
    pub fn slot_counts(&self) -> &[u8] {
        &self.slot_counts
    }

    /// Flood combination rule.
    pub fn policy(&self) -> FloodPolicy {
        self.policy
    }

    /// Transmission steps of one flood on modulation `m`.
    pub fn transmission_steps(&self, m: usize) -> Option<u32> {
        Some(self.policy.transmission_steps(&self.overhead(m)?))
    }

    /// Duration of one flood of a `bytes`-byte frame on modulation `m`.
    ///
    /// Returns `None` for an invalid index or on overflow.
    pub fn flood_time<T: TimingModel + ?Sized>(
        &self,
        timing: &T,
        m: usize,
        bytes: usize,
    ) -> Option<Duration> {
        let modulation = *self.modulations.get(m)?;
        let steps = self.transmission_steps(m)?;
        flood_duration(timing.on_air(modulation, bytes), steps, &self.latencies)
    }
}
