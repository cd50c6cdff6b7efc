//! Flood duration model.
//!
//! A Gloria flood is a sequence of equally long transmission steps: in each
//! step a frame is sent (or received and relayed), followed by the radio
//! turnaround and a guard interval. The whole flood is bracketed by a fixed
//! setup cost (wake-up, payload handling, sleep).
//!
//! How many steps a flood needs is the [`FloodPolicy`].

use super::GloriaParams;
use crate::config::RadioLatencies;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Rule combining retransmission and hop counts into transmission steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FloodPolicy {
    /// `2 * retransmissions + hops - 1` steps.
    ///
    /// Every node retransmits `retransmissions` times, each transmission
    /// paired with a receive step; the last hop only receives. Bounds the
    /// completion time of a flood over `hops` hops.
    #[default]
    Gloria,
    /// `hops + retransmissions` steps: one relay per hop, then the
    /// retransmissions back to back.
    Serial,
}

impl FloodPolicy {
    /// Number of transmission steps a flood occupies.
    ///
    /// `params.hops` must be at least 1.
    pub fn transmission_steps(self, params: &GloriaParams) -> u32 {
        let retransmissions = params.retransmissions as u32;
        let hops = params.hops as u32;
        match self {
            Self::Gloria => 2 * retransmissions + hops.saturating_sub(1),
            Self::Serial => hops + retransmissions,
        }
    }
}

/// Duration of a flood with `steps` steps of a frame lasting `on_air`.
///
/// Returns `None` if the result overflows.
pub fn flood_duration(on_air: Duration, steps: u32, latencies: &RadioLatencies) -> Option<Duration> {
    let step = on_air
        .checked_add(latencies.turnaround()?)?
        .checked_add(latencies.guard())?;
    step.checked_mul(steps)?.checked_add(latencies.flood_setup()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(retransmissions: u8, hops: u8) -> GloriaParams {
        GloriaParams {
            power_level: 0,
            retransmissions,
            hops,
        }
    }

    #[test]
    fn test_gloria_steps() {
        assert_eq!(FloodPolicy::Gloria.transmission_steps(&params(1, 1)), 2);
        assert_eq!(FloodPolicy::Gloria.transmission_steps(&params(2, 3)), 6);
    }

    #[test]
    fn test_serial_steps() {
        assert_eq!(FloodPolicy::Serial.transmission_steps(&params(1, 1)), 2);
        assert_eq!(FloodPolicy::Serial.transmission_steps(&params(2, 3)), 5);
    }

    #[test]
    fn test_gloria_never_below_serial() {
        for retransmissions in 1..=4 {
            for hops in 1..=8 {
                let p = params(retransmissions, hops);
                assert!(
                    FloodPolicy::Gloria.transmission_steps(&p)
                        >= FloodPolicy::Serial.transmission_steps(&p)
                );
            }
        }
    }

    #[test]
    fn test_default_policy() {
        assert_eq!(FloodPolicy::default(), FloodPolicy::Gloria);
    }

    #[test]
    fn test_flood_duration_pure_airtime() {
        let duration = flood_duration(Duration::from_micros(300), 6, &RadioLatencies::zero());
        assert_eq!(duration, Some(Duration::from_micros(1_800)));
    }

    #[test]
    fn test_flood_duration_with_latencies() {
        let latencies = RadioLatencies {
            guard_ns: 1_000,
            sleep_ns: 5_000,
            ..RadioLatencies::zero()
        };
        // 2 * (10 us + 1 us guard) + 5 us setup
        let duration = flood_duration(Duration::from_micros(10), 2, &latencies);
        assert_eq!(duration, Some(Duration::from_micros(27)));
    }

    #[test]
    fn test_flood_duration_latency_overflow() {
        let latencies = RadioLatencies {
            wakeup_ns: u64::MAX,
            sleep_ns: 1,
            ..RadioLatencies::zero()
        };
        assert_eq!(flood_duration(Duration::from_micros(10), 2, &latencies), None);
    }

    #[test]
    fn test_flood_duration_overflow() {
        let duration = flood_duration(Duration::MAX, 2, &RadioLatencies::zero());
        assert_eq!(duration, None);
    }
}
