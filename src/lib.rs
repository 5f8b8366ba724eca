//! Purpose: Camera HAL parameter store shared by the `camparams` CLI and camera sources.
//! Exports: `api` (stable surface), `core` (codec, store, capability projection, errors).
//! Role: Library crate root; the CLI binary only goes through `api`.
//! Invariants: Core parameter operations never fail; malformed input degrades to omission.
//! Invariants: Core modules take diagnostics as explicit inputs rather than hidden state.
pub mod api;
pub mod core;
