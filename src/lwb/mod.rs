//! LWB round timing.
//!
//! This module contains:
//! - [`slot_table`]: Slot durations for every modulation and payload length
//! - [`constants`]: Fixed slots, schedule sizes and the data payload limit

mod constants;
mod slot_table;

pub use constants::ProtocolConstants;
pub use slot_table::{
    duration_to_ticks, round_up_to_granularity, RangeError, SlotRow, SlotTimingTable,
    MAX_FRAME_LENGTH, PAYLOAD_LENGTHS,
};
