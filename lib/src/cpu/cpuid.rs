//! CPUID instruction wrapper.
//!
//! Leaf numbers and feature bits live in `hwpinit_abi::arch::x86_64::cpuid`.

pub use hwpinit_abi::arch::x86_64::cpuid::*;

/// Execute CPUID with the given leaf (subleaf defaults to 0).
/// Returns (eax, ebx, ecx, edx).
///
/// No validation: leaves above the reported maximum return whatever the
/// processor returns for them.
#[inline(always)]
#[allow(unused_unsafe)]
pub fn cpuid(leaf: u32) -> (u32, u32, u32, u32) {
    let res = unsafe { core::arch::x86_64::__cpuid_count(leaf, 0) };
    (res.eax, res.ebx, res.ecx, res.edx)
}
