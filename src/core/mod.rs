// Core modules implementing the parameter codec, store, capability projection, and errors.
pub mod caps;
pub mod codec;
pub mod error;
pub mod numeric;
pub mod store;
