//! Slot timing tables.
//!
//! For every modulation and every payload length `0..=255` the table holds
//! the length of a data slot in timer ticks, rounded up to the schedule
//! granularity. Two variants are built: a plain slot carrying one flood of
//! `payload + header` bytes, and an acknowledged slot that is followed by a
//! header-only acknowledgement flood.
//!
//! Payload lengths whose frame would exceed 255 bytes are still filled in by
//! extrapolating the airtime model, so every row stays monotonic and fully
//! populated.

use crate::config::LwbConfig;
use crate::emit::ElementType;
use crate::gloria::GloriaModel;
use crate::radio::TimingModel;
use std::fmt;
use std::time::Duration;

/// Entries per table row, one per payload length.
pub const PAYLOAD_LENGTHS: usize = 256;

/// Longest frame the radio can carry, header included.
pub const MAX_FRAME_LENGTH: usize = 255;

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// One table row, indexed by payload length.
pub type SlotRow = [u64; PAYLOAD_LENGTHS];

/// A derived value cannot be represented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RangeError {
    /// Arithmetic overflow while computing a slot.
    SlotOverflow { modulation: usize, payload: usize },
    /// A slot time does not fit the configured element type.
    SlotTooLarge {
        modulation: usize,
        payload: usize,
        ticks: u64,
        element_type: ElementType,
    },
    /// A fixed frame is longer than the radio allows.
    FrameTooLong {
        frame: &'static str,
        modulation: Option<usize>,
        length: u64,
        max: usize,
    },
    /// The schedule slots alone already fill the sync period.
    NoRoomForData {
        modulation: usize,
        schedule_ticks: u64,
        sync_period: u64,
    },
    /// Not even an empty data slot fits the remaining round time.
    NoPayloadFits { modulation: usize, budget: u64 },
}

impl fmt::Display for RangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SlotOverflow {
                modulation,
                payload,
            } => write!(
                f,
                "slot time overflows for modulation {} at payload {}",
                modulation, payload
            ),
            Self::SlotTooLarge {
                modulation,
                payload,
                ticks,
                element_type,
            } => write!(
                f,
                "slot time {} ticks (modulation {}, payload {}) does not fit {}",
                ticks, modulation, payload, element_type
            ),
            Self::FrameTooLong {
                frame,
                modulation: Some(m),
                length,
                max,
            } => write!(
                f,
                "{} frame of modulation {} is {} bytes, limit is {}",
                frame, m, length, max
            ),
            Self::FrameTooLong {
                frame,
                modulation: None,
                length,
                max,
            } => write!(f, "{} is {} bytes, limit is {}", frame, length, max),
            Self::NoRoomForData {
                modulation,
                schedule_ticks,
                sync_period,
            } => write!(
                f,
                "schedule slots of modulation {} take {} ticks, sync period is {}",
                modulation, schedule_ticks, sync_period
            ),
            Self::NoPayloadFits { modulation, budget } => write!(
                f,
                "no data slot of modulation {} fits the remaining {} ticks",
                modulation, budget
            ),
        }
    }
}

impl std::error::Error for RangeError {}

/// Convert a duration to timer ticks, rounding up.
pub fn duration_to_ticks(duration: Duration, timer_frequency_hz: u64) -> Option<u64> {
    let scaled = duration.as_nanos().checked_mul(timer_frequency_hz as u128)?;
    u64::try_from(scaled.div_ceil(NANOS_PER_SEC)).ok()
}

/// Round `ticks` up to a multiple of `granularity`.
pub fn round_up_to_granularity(ticks: u64, granularity: u64) -> Option<u64> {
    ticks.div_ceil(granularity).checked_mul(granularity)
}

/// Slot times of every modulation and payload length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotTimingTable {
    element_type: ElementType,
    granularity: u64,
    slot_times: Vec<SlotRow>,
    slot_acked_times: Vec<SlotRow>,
}

/// Ticks-and-range conversion shared by every cell.
struct Quantizer {
    timer_frequency_hz: u64,
    granularity: u64,
    element_type: ElementType,
}

impl Quantizer {
    fn ticks(&self, duration: Duration, modulation: usize, payload: usize) -> Result<u64, RangeError> {
        let ticks = duration_to_ticks(duration, self.timer_frequency_hz)
            .and_then(|t| round_up_to_granularity(t, self.granularity))
            .ok_or(RangeError::SlotOverflow {
                modulation,
                payload,
            })?;
        let fits = i64::try_from(ticks).is_ok_and(|t| self.element_type.fits(t));
        if !fits {
            return Err(RangeError::SlotTooLarge {
                modulation,
                payload,
                ticks,
                element_type: self.element_type,
            });
        }
        Ok(ticks)
    }
}

impl SlotTimingTable {
    /// Build both tables.
    ///
    /// `model` must have been built from `config`, which guarantees the
    /// scalar fields used here are validated.
    pub fn build<T: TimingModel + ?Sized>(
        config: &LwbConfig,
        model: &GloriaModel,
        timing: &T,
    ) -> Result<Self, RangeError> {
        let header = config.gloria_header_length as usize;
        let quantizer = Quantizer {
            timer_frequency_hz: config.timer_frequency_hz,
            granularity: config.schedule_granularity,
            element_type: config.slot_time_type,
        };

        let mut slot_times = Vec::with_capacity(model.mod_count());
        let mut slot_acked_times = Vec::with_capacity(model.mod_count());

        for m in 0..model.mod_count() {
            let ack = model
                .flood_time(timing, m, header)
                .ok_or(RangeError::SlotOverflow {
                    modulation: m,
                    payload: 0,
                })?;

            let mut plain = [0u64; PAYLOAD_LENGTHS];
            let mut acked = [0u64; PAYLOAD_LENGTHS];
            let mut previous = (0u64, 0u64);

            for payload in 0..PAYLOAD_LENGTHS {
                let overflow = RangeError::SlotOverflow {
                    modulation: m,
                    payload,
                };
                let flood = model
                    .flood_time(timing, m, payload + header)
                    .ok_or(overflow.clone())?;
                let with_ack = flood.checked_add(ack).ok_or(overflow)?;

                let mut slot = quantizer.ticks(flood, m, payload)?;
                let mut slot_acked = quantizer.ticks(with_ack, m, payload)?;

                // A timing model that is not monotonic in frame length must
                // not shrink a longer slot.
                if slot < previous.0 || slot_acked < previous.1 {
                    log::warn!(
                        "Slot time of modulation {} decreases at payload {}, holding previous value",
                        m,
                        payload
                    );
                    slot = slot.max(previous.0);
                    slot_acked = slot_acked.max(previous.1);
                }

                plain[payload] = slot;
                acked[payload] = slot_acked;
                previous = (slot, slot_acked);
            }

            log::debug!(
                "Modulation {} ({}): slot {}..{} ticks, acked {}..{} ticks",
                m,
                model.modulations()[m],
                plain[0],
                plain[PAYLOAD_LENGTHS - 1],
                acked[0],
                acked[PAYLOAD_LENGTHS - 1]
            );

            slot_times.push(plain);
            slot_acked_times.push(acked);
        }

        Ok(Self {
            element_type: config.slot_time_type,
            granularity: config.schedule_granularity,
            slot_times,
            slot_acked_times,
        })
    }

    pub fn mod_count(&self) -> usize {
        self.slot_times.len()
    }

    pub fn element_type(&self) -> ElementType {
        self.element_type
    }

    pub fn granularity(&self) -> u64 {
        self.granularity
    }

    /// Plain slot rows in modulation order.
    pub fn slot_times(&self) -> &[SlotRow] {
        &self.slot_times
    }

    /// Acknowledged slot rows in modulation order.
    pub fn slot_acked_times(&self) -> &[SlotRow] {
        &self.slot_acked_times
    }

    pub fn slot_time(&self, m: usize, payload: usize) -> Option<u64> {
        self.slot_times.get(m)?.get(payload).copied()
    }

    pub fn slot_acked_time(&self, m: usize, payload: usize) -> Option<u64> {
        self.slot_acked_times.get(m)?.get(payload).copied()
    }

    /// Largest payload `<= max_payload` whose plain slot fits `budget` ticks.
    ///
    /// Relies on rows being monotonic.
    pub fn largest_payload_within(&self, m: usize, max_payload: usize, budget: u64) -> Option<usize> {
        let row = self.slot_times.get(m)?;
        let candidates = &row[..=max_payload.min(PAYLOAD_LENGTHS - 1)];
        candidates
            .partition_point(|&ticks| ticks <= budget)
            .checked_sub(1)
    }
}
