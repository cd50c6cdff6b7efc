//! Gloria flooding overhead.
//!
//! This module contains:
//! - [`overhead`]: Validated per-modulation power, retransmission and hop settings
//! - [`flood`]: The flood duration model and its combination policy

mod flood;
mod overhead;

pub use flood::{flood_duration, FloodPolicy};
pub use overhead::{GloriaModel, GloriaParams};
