//! Purpose: Define the stable public Rust API boundary for camparams.
//! Exports: Store, codec, capability, and error types needed by camera sources and the CLI.
//! Role: Public, additive-only surface over `core`.
//! Invariants: New items are added here rather than by widening `core` paths in callers.

pub use crate::core::caps::{
    CapabilityRecord, Dimension, MemoryKind, PREVIEW_FRAME_RATE, PREVIEW_SIZE_VALUES,
};
pub use crate::core::codec::{ParameterMap, parse, serialize};
#[doc(hidden)]
pub use crate::core::error::to_exit_code;
pub use crate::core::error::{Error, ErrorKind};
pub use crate::core::store::{ParamState, ParameterStore};
