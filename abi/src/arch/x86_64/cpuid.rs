//! CPU identification via the CPUID instruction.
//!
//! This module provides the register tuple returned by one CPUID query and
//! the leaf numbers, bit positions and field layouts consulted during
//! power-management configuration.

// =============================================================================
// CPUID Result
// =============================================================================

/// The four output registers of a single CPUID query.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CpuidLeaf {
    pub eax: u32,
    pub ebx: u32,
    pub ecx: u32,
    pub edx: u32,
}

impl CpuidLeaf {
    #[inline]
    pub const fn new(eax: u32, ebx: u32, ecx: u32, edx: u32) -> Self {
        Self { eax, ebx, ecx, edx }
    }

    /// All-zero leaf, the value of every slot that was never queried.
    pub const ZERO: Self = Self::new(0, 0, 0, 0);
}

impl From<(u32, u32, u32, u32)> for CpuidLeaf {
    #[inline]
    fn from((eax, ebx, ecx, edx): (u32, u32, u32, u32)) -> Self {
        Self::new(eax, ebx, ecx, edx)
    }
}

// =============================================================================
// CPUID Leaf Numbers
// =============================================================================

/// Maximum basic leaf (EAX) and vendor signature (EBX, EDX, ECX).
pub const CPUID_LEAF_VENDOR: u32 = 0x00;

/// Basic CPU information: family/model/stepping signature and feature flags.
pub const CPUID_LEAF_FEATURES: u32 = 0x01;

/// Thermal and power management leaf.
pub const CPUID_LEAF_THERMAL_POWER: u32 = 0x06;

// =============================================================================
// Vendor Signature
// =============================================================================

/// Length of the vendor signature spread over leaf 0 EBX, EDX, ECX.
pub const CPUID_VENDOR_STRING_LENGTH: usize = 12;

/// Signature reported by Intel processors.
pub const CPUID_VENDOR_INTEL: &[u8; CPUID_VENDOR_STRING_LENGTH] = b"GenuineIntel";

// =============================================================================
// CPUID Leaf 1 - EAX Version Information
// =============================================================================

pub const CPUID_MODEL_ID_SHIFT: u32 = 4;
pub const CPUID_MODEL_ID_MASK: u32 = 0xf;
pub const CPUID_FAMILY_ID_SHIFT: u32 = 8;
pub const CPUID_FAMILY_ID_MASK: u32 = 0xf;
pub const CPUID_EXT_MODEL_ID_SHIFT: u32 = 16;
pub const CPUID_EXT_MODEL_ID_MASK: u32 = 0xf;
pub const CPUID_EXT_FAMILY_ID_SHIFT: u32 = 20;
pub const CPUID_EXT_FAMILY_ID_MASK: u32 = 0xff;

/// Base family value that enables the extended-family byte.
pub const CPUID_FAMILY_EXTENDED: u32 = 0xf;

/// Initial APIC ID lives in EBX bits 31:24 of leaf 1.
pub const CPUID_APIC_ID_SHIFT: u32 = 24;

// =============================================================================
// CPUID Leaf 6 - EAX Thermal and Power Management Flags
// =============================================================================

/// HWP base registers (IA32_PM_ENABLE, IA32_HWP_CAPABILITIES, ...).
pub const CPUID_PM_EAX_HWP: u32 = 1 << 7;

/// IA32_HWP_INTERRUPT MSR is supported.
pub const CPUID_PM_EAX_HWP_NOTIFICATION: u32 = 1 << 8;

/// Energy performance preference field of IA32_HWP_REQUEST is supported.
pub const CPUID_PM_EAX_HWP_ENERGY_PERF_PREF: u32 = 1 << 10;

// =============================================================================
// CPUID Leaf 6 - ECX Thermal and Power Management Flags
// =============================================================================

/// Hardware coordination feedback capability (IA32_MPERF / IA32_APERF).
pub const CPUID_PM_ECX_HW_COORD_FEEDBACK: u32 = 1 << 0;

/// IA32_ENERGY_PERF_BIAS MSR is supported.
pub const CPUID_PM_ECX_ENERGY_PERF_BIAS: u32 = 1 << 3;
