//! LWB protocol-constant generator.
//!
//! Derives the timing and sizing constants of a Low-power Wireless Bus
//! running on Gloria floods, and emits them as a matching C header/source
//! pair for the firmware build.
//!
//! # Example
//!
//! ```
//! use lwb_constgen::{generate, LwbConfig, Sx1262Timing};
//!
//! let generated = generate(&LwbConfig::default(), &Sx1262Timing).unwrap();
//! assert!(generated.pair.header.contains("LWB_MAX_DATA_PAYLOAD"));
//! ```

pub mod config;
pub mod emit;
pub mod generator;
pub mod gloria;
pub mod lwb;
pub mod radio;

// Re-export commonly used items
pub use config::{ConfigError, LwbConfig, RadioLatencies};
pub use emit::{ArtifactPair, ConsistencyError, ElementType};
pub use generator::{generate, generate_to, GenerateError, Generated};
pub use gloria::{FloodPolicy, GloriaModel};
pub use lwb::{ProtocolConstants, RangeError, SlotTimingTable};
pub use radio::{Modulation, Sx1262Timing, TimingModel};
