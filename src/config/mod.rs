//! Generator configuration.
//!
//! # Components
//!
//! - [`lwb`] - The configuration snapshot, JSON loading and scalar validation
//! - [`latency`] - Platform latencies added around each flood

mod latency;
mod lwb;

pub use latency::RadioLatencies;
pub use lwb::{
    ConfigError, LwbConfig, DEFAULT_SCHEDULE_GRANULARITY, DEFAULT_SYNC_PERIOD,
    DEFAULT_TIMER_FREQUENCY_HZ, MAX_MODULATIONS,
};
