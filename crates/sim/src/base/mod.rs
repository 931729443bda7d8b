//! Base types shared across the kernel.
//!
//! This module provides ancestry segments, the flat arena used for
//! population storage, and the per-population trait context supplied by the
//! trait layer.

pub mod arena;
mod context;
mod segment;

pub use arena::FlatArena;
pub use context::PopulationContext;
pub use segment::{AncestryId, Position, Segment};
