//! Privileged CPU instruction wrappers.
//!
//! One function per instruction. Everything above this module reaches the
//! hardware through [`crate::platform::Platform`].

pub mod cpuid;
pub mod msr;

pub use cpuid::*;
pub use msr::*;
