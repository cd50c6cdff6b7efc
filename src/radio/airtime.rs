//! Time-on-air calculation for SX1262 packets.
//!
//! LoRa uses the formula from the Semtech SX1262 datasheet (Section 6.1.4),
//! FSK counts every byte on the wire (preamble, sync word, length byte,
//! payload and CRC) at the configured bit rate.
//!
//! All arithmetic is integer nanoseconds so the results are exact and
//! reproducible across hosts.
//!
//! # Example
//!
//! ```
//! use lwb_constgen::radio::{calculate_airtime, LoRaParams};
//!
//! let params = LoRaParams::default();
//! let airtime = calculate_airtime(50, &params);
//! println!("50-byte packet takes {:?}", airtime);
//! ```

use std::time::Duration;

const NANOS_PER_SEC: u64 = 1_000_000_000;

/// LoRa modulation parameters for airtime calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoRaParams {
    /// Spreading factor (5-12)
    pub spreading_factor: u8,
    /// Bandwidth in Hz (125000, 250000 or 500000)
    pub bandwidth_hz: u32,
    /// Coding rate denominator (5-8 for 4/5 to 4/8)
    pub coding_rate: u8,
    /// Preamble length in symbols
    pub preamble_symbols: u8,
    /// Whether explicit header mode is used
    pub explicit_header: bool,
    /// Whether CRC is enabled
    pub crc_enabled: bool,
}

impl Default for LoRaParams {
    /// SF7 at 125 kHz with the short Gloria preamble.
    fn default() -> Self {
        Self {
            spreading_factor: 7,
            bandwidth_hz: 125_000,
            coding_rate: 5, // 4/5
            preamble_symbols: 3,
            explicit_header: true,
            crc_enabled: true,
        }
    }
}

impl LoRaParams {
    /// Check if low data rate optimization should be enabled.
    ///
    /// Required when symbol time exceeds 16ms (SF11/SF12 at 125kHz).
    pub fn low_data_rate_optimize(&self) -> bool {
        self.symbol_duration_ns() > 16_000_000
    }

    /// Symbol duration in nanoseconds (`2^SF / BW`).
    pub fn symbol_duration_ns(&self) -> u64 {
        let bw = self.bandwidth_hz as u64;
        if bw == 0 {
            return 0;
        }
        (1u64 << self.spreading_factor) * NANOS_PER_SEC / bw
    }

    /// Preamble duration including the sync word and SFD.
    ///
    /// SF5 and SF6 use 6.25 extra symbols, all other spreading factors 4.25.
    pub fn preamble_duration(&self) -> Duration {
        let extra_quarters = if self.spreading_factor <= 6 { 25 } else { 17 };
        let quarters = 4 * self.preamble_symbols as u64 + extra_quarters;
        Duration::from_nanos(quarters * self.symbol_duration_ns() / 4)
    }

    /// Number of payload symbols for a payload of `payload_bytes`.
    pub fn payload_symbols(&self, payload_bytes: usize) -> u64 {
        let sf = self.spreading_factor as i64;
        let de = if self.low_data_rate_optimize() { 1 } else { 0 };
        let h = if self.explicit_header { 0 } else { 1 };
        let crc_bits = if self.crc_enabled { 16 } else { 0 };

        // 8*PL - 4*SF + 28 + 16*CRC - 20*H
        let numerator = 8 * payload_bytes as i64 - 4 * sf + 28 + crc_bits - 20 * h;
        // 4 * (SF - 2*DE)
        let denominator = 4 * (sf - 2 * de);

        if denominator <= 0 || numerator <= 0 {
            return 8;
        }
        let blocks = (numerator + denominator - 1) / denominator;
        8 + blocks as u64 * self.coding_rate as u64
    }
}

/// FSK modulation parameters for airtime calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FskParams {
    /// Bit rate in bit/s
    pub bitrate: u32,
    /// Preamble length in bytes
    pub preamble_bytes: u8,
    /// Sync word length in bytes
    pub sync_word_bytes: u8,
    /// Whether a length byte is transmitted
    pub explicit_header: bool,
    /// Whether a 2-byte CRC is appended
    pub crc_enabled: bool,
}

impl FskParams {
    /// Number of bytes on the wire for a payload of `payload_bytes`.
    pub fn frame_bytes(&self, payload_bytes: usize) -> u64 {
        self.preamble_bytes as u64
            + self.sync_word_bytes as u64
            + u64::from(self.explicit_header)
            + payload_bytes as u64
            + if self.crc_enabled { 2 } else { 0 }
    }
}

/// Calculate LoRa packet airtime.
///
/// Uses the formula from Semtech SX1262 datasheet (Section 6.1.4).
/// Returns zero for a zero bandwidth.
pub fn calculate_airtime(payload_bytes: usize, params: &LoRaParams) -> Duration {
    let t_sym_ns = params.symbol_duration_ns();
    if t_sym_ns == 0 {
        return Duration::ZERO;
    }
    let t_payload_ns = params.payload_symbols(payload_bytes) * t_sym_ns;
    params.preamble_duration() + Duration::from_nanos(t_payload_ns)
}

/// Calculate FSK packet airtime, rounded up to whole nanoseconds.
///
/// Returns zero for a zero bit rate.
pub fn calculate_fsk_airtime(payload_bytes: usize, params: &FskParams) -> Duration {
    let bitrate = params.bitrate as u64;
    if bitrate == 0 {
        return Duration::ZERO;
    }
    let bits = 8 * params.frame_bytes(payload_bytes);
    Duration::from_nanos((bits * NANOS_PER_SEC).div_ceil(bitrate))
}
