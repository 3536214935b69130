//! hwpinit shared hardware definitions
//!
//! Pure data shared between the instruction wrappers in `hwpinit-lib` and the
//! configuration logic in `hwpinit-boot`: CPUID leaf numbers and feature bits,
//! MSR addresses, and the bitfield layouts of the power-management MSRs.
//! Nothing in this crate touches hardware.

#![no_std]
#![forbid(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod arch;

pub use arch::x86_64::cpuid::CpuidLeaf;
pub use arch::x86_64::msr::{HwpEpb, HwpEpp, InvalidPreference, Msr, MsrField};
