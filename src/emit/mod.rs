//! Consistency emitter.
//!
//! This module contains:
//! - [`artifact`]: Symbols, declaration/definition manifests and the consistency check
//! - [`symbols`]: Collection of all constants into one artifact set
//! - [`render`]: C header and source rendering
//! - [`writer`]: Verified, all-or-nothing file output
//! - [`format`]: Human-readable comment helpers

mod artifact;
mod format;
mod render;
mod symbols;
mod writer;

pub use artifact::{
    check_consistency, ArraySymbol, ArtifactSet, ConsistencyError, Declaration, Define,
    Definition, ElementType, Shape,
};
pub use format::{human_frequency, human_power, human_time};
pub use render::{
    render, render_header, render_source, ArtifactPair, HEADER_FILE_NAME, SOURCE_FILE_NAME,
};
pub use symbols::collect;
pub use writer::{write_pair, WrittenPair};
