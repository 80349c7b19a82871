//! Type aliases for the shared-ownership patterns used across FieldKit.

pub mod aliases;

pub use aliases::*;
