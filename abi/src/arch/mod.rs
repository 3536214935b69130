//! Architecture-specific definitions.
//!
//! These are plain constants and value types, so they are built on every
//! host; only the instruction wrappers in `hwpinit-lib` are target-gated.

pub mod x86_64;

pub use x86_64::*;
