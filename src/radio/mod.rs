//! Physical layer timing.
//!
//! This module contains:
//! - [`airtime`]: Time-on-air calculation for LoRa and FSK packets
//! - [`modulation`]: The SX1262 modulation catalogue
//!
//! The rest of the crate only sees the [`TimingModel`] trait, so a different
//! radio (or a fixed-rate model in tests) can be swapped in.

mod airtime;
mod modulation;

pub use airtime::{calculate_airtime, calculate_fsk_airtime, FskParams, LoRaParams};
pub use modulation::{ModemParams, Modulation};

use std::time::Duration;

/// Pure on-air duration function of the physical layer.
pub trait TimingModel {
    /// Time a frame carrying `byte_count` bytes occupies the channel.
    fn on_air(&self, modulation: Modulation, byte_count: usize) -> Duration;
}

/// SX1262 timing as configured by the flora radio driver.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sx1262Timing;

impl TimingModel for Sx1262Timing {
    fn on_air(&self, modulation: Modulation, byte_count: usize) -> Duration {
        match modulation.params() {
            ModemParams::LoRa(params) => calculate_airtime(byte_count, &params),
            ModemParams::Fsk(params) => calculate_fsk_airtime(byte_count, &params),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sx1262_dispatches_by_modem() {
        let timing = Sx1262Timing;
        // 2 + 3 + 1 + 8 + 2 = 16 bytes at 125 kbit/s = 1.024 ms
        assert_eq!(
            timing.on_air(Modulation::Fsk125k, 8),
            Duration::from_micros(1_024)
        );
        assert!(timing.on_air(Modulation::Sf9, 8) > timing.on_air(Modulation::Sf7, 8));
    }

    #[test]
    fn test_fsk_faster_than_lora() {
        let timing = Sx1262Timing;
        assert!(timing.on_air(Modulation::Fsk200k, 64) < timing.on_air(Modulation::Sf5, 64));
    }
}
