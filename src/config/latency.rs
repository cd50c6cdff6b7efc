//! MCU and radio latencies around a Gloria flood.
//!
//! Defaults are the STM32L4 + SX1262 measurements of the flora platform,
//! each taken as mean plus two standard deviations and rounded up to whole
//! nanoseconds.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Fixed latencies added to every flood on top of the airtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RadioLatencies {
    /// Wake-up from low-power mode, including radio wake-up.
    pub wakeup_ns: u64,
    /// Writing the payload into the radio buffer.
    pub payload_set_ns: u64,
    /// Reading the payload out of the radio buffer.
    pub payload_get_ns: u64,
    /// Radio configuration for transmission.
    pub tx_setup_ns: u64,
    /// Radio configuration for reception.
    pub rx_setup_ns: u64,
    /// TX-done interrupt handling.
    pub tx_irq_ns: u64,
    /// RX-done interrupt handling, status and buffer read.
    pub rx_irq_ns: u64,
    /// Frequency synthesizer transition before the first transmission.
    pub fs_transition_ns: u64,
    /// Entering low-power mode after the flood.
    pub sleep_ns: u64,
    /// Idle guard between two consecutive transmissions.
    pub guard_ns: u64,
}

impl Default for RadioLatencies {
    fn default() -> Self {
        Self {
            wakeup_ns: 522_545,
            payload_set_ns: 535_173,
            payload_get_ns: 532_003,
            tx_setup_ns: 725_336,
            rx_setup_ns: 664_591,
            tx_irq_ns: 60_177,
            rx_irq_ns: 353_893,
            fs_transition_ns: 85_403,
            sleep_ns: 18_951,
            guard_ns: 50_000,
        }
    }
}

impl RadioLatencies {
    /// No latencies at all: floods take exactly their airtime.
    pub const fn zero() -> Self {
        Self {
            wakeup_ns: 0,
            payload_set_ns: 0,
            payload_get_ns: 0,
            tx_setup_ns: 0,
            rx_setup_ns: 0,
            tx_irq_ns: 0,
            rx_irq_ns: 0,
            fs_transition_ns: 0,
            sleep_ns: 0,
            guard_ns: 0,
        }
    }

    /// One-off cost of a flood: wake-up, payload handling, first radio
    /// setup and going back to sleep.
    ///
    /// Returns `None` if the sum overflows.
    pub fn flood_setup(&self) -> Option<Duration> {
        let nanos = self
            .wakeup_ns
            .checked_add(self.payload_set_ns)?
            .checked_add(self.tx_setup_ns.max(self.rx_setup_ns))?
            .checked_add(self.fs_transition_ns)?
            .checked_add(self.payload_get_ns)?
            .checked_add(self.sleep_ns)?;
        Some(Duration::from_nanos(nanos))
    }

    /// Worst-case switch between receiving and retransmitting (or back).
    ///
    /// Returns `None` if the sum overflows.
    pub fn turnaround(&self) -> Option<Duration> {
        let rx_to_tx = self.rx_irq_ns.checked_add(self.tx_setup_ns)?;
        let tx_to_rx = self.tx_irq_ns.checked_add(self.rx_setup_ns)?;
        Some(Duration::from_nanos(rx_to_tx.max(tx_to_rx)))
    }

    /// Guard interval between transmissions.
    pub fn guard(&self) -> Duration {
        Duration::from_nanos(self.guard_ns)
    }
}
