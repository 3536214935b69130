//! CPUID capability snapshot.
//!
//! Captured once at the start of the configuration pass and never touched
//! again. Every query is a pure function of the captured leaves: vendor,
//! family/model classification and the leaf 6 power-management capability
//! bits.
//!
//! # Invariant
//!
//! Only leaves `0..=max_leaf` (clamped to [`CPUID_SNAPSHOT_LEAVES`]` - 1`)
//! are populated. Every other slot is zero and no query reads it as feature
//! data: each predicate checks `max_leaf` before looking at its leaf.

use core::fmt;

use hwpinit_abi::CpuidLeaf;
use hwpinit_abi::arch::x86_64::cpuid::{
    CPUID_APIC_ID_SHIFT, CPUID_EXT_FAMILY_ID_MASK, CPUID_EXT_FAMILY_ID_SHIFT,
    CPUID_EXT_MODEL_ID_MASK, CPUID_EXT_MODEL_ID_SHIFT, CPUID_FAMILY_EXTENDED,
    CPUID_FAMILY_ID_MASK, CPUID_FAMILY_ID_SHIFT, CPUID_LEAF_FEATURES, CPUID_LEAF_THERMAL_POWER,
    CPUID_LEAF_VENDOR, CPUID_MODEL_ID_MASK, CPUID_MODEL_ID_SHIFT, CPUID_PM_EAX_HWP,
    CPUID_PM_EAX_HWP_ENERGY_PERF_PREF, CPUID_PM_EAX_HWP_NOTIFICATION,
    CPUID_PM_ECX_ENERGY_PERF_BIAS, CPUID_PM_ECX_HW_COORD_FEEDBACK, CPUID_VENDOR_INTEL,
    CPUID_VENDOR_STRING_LENGTH,
};
use hwpinit_lib::Platform;

/// Number of basic leaves the snapshot can hold (leaves 0 through 7).
pub const CPUID_SNAPSHOT_LEAVES: usize = 8;

/// Family id returned when leaf 1 is not available.
pub const FAMILY_ID_UNKNOWN: u32 = u32::MAX;

/// Composite (extended << 4 | base) model id of Kaby Lake desktop parts.
pub const MODEL_ID_KABY_LAKE_DESKTOP: u32 = 0x9e;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Vendor {
    Intel,
    Unknown,
}

impl Vendor {
    /// The word printed on the diagnostic channel.
    pub const fn name(self) -> &'static str {
        match self {
            Vendor::Intel => "Intel",
            Vendor::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Vendor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Model {
    KabyLakeDesktop,
    Unknown,
}

impl Model {
    pub const fn from_id(model_id: u32) -> Self {
        match model_id {
            MODEL_ID_KABY_LAKE_DESKTOP => Model::KabyLakeDesktop,
            _ => Model::Unknown,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CpuidSnapshot {
    leaves: [CpuidLeaf; CPUID_SNAPSHOT_LEAVES],
}

impl CpuidSnapshot {
    /// Query leaf 0, then leaves 1 through the reported maximum, stopping at
    /// the snapshot capacity.
    pub fn capture<P: Platform + ?Sized>(platform: &P) -> Self {
        let mut leaves = [CpuidLeaf::ZERO; CPUID_SNAPSHOT_LEAVES];
        leaves[0] = platform.cpuid(CPUID_LEAF_VENDOR);
        let mut idx = 1u32;
        while idx <= leaves[0].eax && (idx as usize) < CPUID_SNAPSHOT_LEAVES {
            leaves[idx as usize] = platform.cpuid(idx);
            idx += 1;
        }
        Self { leaves }
    }

    /// Build a snapshot from previously captured leaves. Slots past the
    /// maximum reported in `leaves[0].eax` are cleared.
    pub fn from_raw(mut leaves: [CpuidLeaf; CPUID_SNAPSHOT_LEAVES]) -> Self {
        let populated = Self::populated_len(leaves[0].eax);
        for leaf in leaves.iter_mut().skip(populated) {
            *leaf = CpuidLeaf::ZERO;
        }
        Self { leaves }
    }

    #[inline]
    fn populated_len(max_leaf: u32) -> usize {
        (max_leaf as usize).saturating_add(1).min(CPUID_SNAPSHOT_LEAVES)
    }

    /// Highest basic leaf the processor reports (leaf 0 EAX), unclamped.
    #[inline]
    pub fn max_leaf(&self) -> u32 {
        self.leaves[0].eax
    }

    /// Captured leaf `idx`, or `None` if it was never queried.
    pub fn leaf(&self, idx: u32) -> Option<CpuidLeaf> {
        if (idx as usize) < Self::populated_len(self.max_leaf()) {
            Some(self.leaves[idx as usize])
        } else {
            None
        }
    }

    #[inline]
    fn has_leaf(&self, idx: u32) -> bool {
        self.max_leaf() >= idx
    }

    // =========================================================================
    // Vendor / family / model
    // =========================================================================

    /// Vendor signature bytes in EBX, EDX, ECX order, least significant
    /// byte of each register first.
    pub fn vendor_bytes(&self) -> [u8; CPUID_VENDOR_STRING_LENGTH] {
        let leaf0 = &self.leaves[0];
        let mut bytes = [0u8; CPUID_VENDOR_STRING_LENGTH];
        for (chunk, reg) in bytes.chunks_exact_mut(4).zip([leaf0.ebx, leaf0.edx, leaf0.ecx]) {
            chunk.copy_from_slice(&reg.to_le_bytes());
        }
        bytes
    }

    /// `Intel` only on an exact match of all twelve signature bytes.
    pub fn vendor(&self) -> Vendor {
        if &self.vendor_bytes() == CPUID_VENDOR_INTEL {
            Vendor::Intel
        } else {
            Vendor::Unknown
        }
    }

    /// Base family, plus the extended family byte when the base is 0xf.
    pub fn family_id(&self) -> u32 {
        if !self.has_leaf(CPUID_LEAF_FEATURES) {
            return FAMILY_ID_UNKNOWN;
        }
        let eax = self.leaves[CPUID_LEAF_FEATURES as usize].eax;
        let mut family_id = (eax >> CPUID_FAMILY_ID_SHIFT) & CPUID_FAMILY_ID_MASK;
        if family_id == CPUID_FAMILY_EXTENDED {
            family_id += (eax >> CPUID_EXT_FAMILY_ID_SHIFT) & CPUID_EXT_FAMILY_ID_MASK;
        }
        family_id
    }

    /// Composite model id. The extended model nibble only counts for
    /// families 6 and 15.
    pub fn model_id(&self) -> Option<u32> {
        if !self.has_leaf(CPUID_LEAF_FEATURES) {
            return None;
        }
        let eax = self.leaves[CPUID_LEAF_FEATURES as usize].eax;
        let mut model_id = (eax >> CPUID_MODEL_ID_SHIFT) & CPUID_MODEL_ID_MASK;
        let family_id = self.family_id();
        if family_id == 6 || family_id == 15 {
            model_id += ((eax >> CPUID_EXT_MODEL_ID_SHIFT) & CPUID_EXT_MODEL_ID_MASK) << 4;
        }
        Some(model_id)
    }

    pub fn model(&self) -> Model {
        match self.model_id() {
            Some(model_id) => Model::from_id(model_id),
            None => Model::Unknown,
        }
    }

    /// Initial APIC ID of the processor running the pass.
    pub fn apic_id(&self) -> Option<u8> {
        if !self.has_leaf(CPUID_LEAF_FEATURES) {
            return None;
        }
        Some((self.leaves[CPUID_LEAF_FEATURES as usize].ebx >> CPUID_APIC_ID_SHIFT) as u8)
    }

    // =========================================================================
    // Leaf 6 power-management capabilities
    // =========================================================================

    #[inline]
    fn power_eax(&self, bit: u32) -> bool {
        self.has_leaf(CPUID_LEAF_THERMAL_POWER)
            && self.leaves[CPUID_LEAF_THERMAL_POWER as usize].eax & bit != 0
    }

    #[inline]
    fn power_ecx(&self, bit: u32) -> bool {
        self.has_leaf(CPUID_LEAF_THERMAL_POWER)
            && self.leaves[CPUID_LEAF_THERMAL_POWER as usize].ecx & bit != 0
    }

    /// Hardware P-states (leaf 6 EAX bit 7).
    pub fn hwp(&self) -> bool {
        self.power_eax(CPUID_PM_EAX_HWP)
    }

    /// HWP notification interrupts (leaf 6 EAX bit 8).
    pub fn hwp_notification(&self) -> bool {
        self.power_eax(CPUID_PM_EAX_HWP_NOTIFICATION)
    }

    /// HWP energy performance preference (leaf 6 EAX bit 10).
    pub fn hwp_energy_perf_pref(&self) -> bool {
        self.power_eax(CPUID_PM_EAX_HWP_ENERGY_PERF_PREF)
    }

    /// Hardware coordination feedback, i.e. MPERF/APERF (leaf 6 ECX bit 0).
    pub fn hardware_coordination_feedback_cap(&self) -> bool {
        self.power_ecx(CPUID_PM_ECX_HW_COORD_FEEDBACK)
    }

    /// IA32_ENERGY_PERF_BIAS (leaf 6 ECX bit 3).
    pub fn hwp_energy_perf_bias(&self) -> bool {
        self.power_ecx(CPUID_PM_ECX_ENERGY_PERF_BIAS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake_platform::{FakePlatform, intel_leaf0, leaf1};

    fn snapshot(leaves: &[CpuidLeaf]) -> CpuidSnapshot {
        CpuidSnapshot::capture(&FakePlatform::new(leaves))
    }

    fn all_power_bits() -> CpuidLeaf {
        CpuidLeaf::new(
            CPUID_PM_EAX_HWP | CPUID_PM_EAX_HWP_NOTIFICATION | CPUID_PM_EAX_HWP_ENERGY_PERF_PREF,
            0,
            CPUID_PM_ECX_HW_COORD_FEEDBACK | CPUID_PM_ECX_ENERGY_PERF_BIAS,
            0,
        )
    }

    fn power_predicates(s: &CpuidSnapshot) -> [bool; 5] {
        [
            s.hwp(),
            s.hwp_notification(),
            s.hwp_energy_perf_pref(),
            s.hardware_coordination_feedback_cap(),
            s.hwp_energy_perf_bias(),
        ]
    }

    #[test]
    fn capture_stops_at_reported_max() {
        let platform = FakePlatform::new(&[
            intel_leaf0(2),
            leaf1(6, 0xe, 0, 9),
            CpuidLeaf::new(2, 2, 2, 2),
            CpuidLeaf::new(3, 3, 3, 3),
        ]);
        let s = CpuidSnapshot::capture(&platform);
        assert_eq!(platform.cpuid_queries(), [0, 1, 2]);
        assert_eq!(s.leaf(2), Some(CpuidLeaf::new(2, 2, 2, 2)));
        assert_eq!(s.leaf(3), None);
    }

    #[test]
    fn capture_clamps_to_capacity() {
        let platform = FakePlatform::new(&[intel_leaf0(0x16)]);
        let s = CpuidSnapshot::capture(&platform);
        assert_eq!(platform.cpuid_queries(), [0, 1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(s.max_leaf(), 0x16);
        assert!(s.leaf(7).is_some());
        assert_eq!(s.leaf(8), None);
    }

    #[test]
    fn from_raw_clears_unreported_leaves() {
        let mut raw = [CpuidLeaf::new(9, 9, 9, 9); CPUID_SNAPSHOT_LEAVES];
        raw[0] = intel_leaf0(1);
        let s = CpuidSnapshot::from_raw(raw);
        assert_eq!(s.leaf(1), Some(CpuidLeaf::new(9, 9, 9, 9)));
        assert_eq!(s.leaf(2), None);
        assert!(!s.hwp());
    }

    #[test]
    fn power_predicates_need_leaf_six() {
        let mut leaves = [CpuidLeaf::ZERO; 7];
        leaves[6] = all_power_bits();

        leaves[0] = intel_leaf0(5);
        assert_eq!(power_predicates(&snapshot(&leaves)), [false; 5]);

        leaves[0] = intel_leaf0(6);
        assert_eq!(power_predicates(&snapshot(&leaves)), [true; 5]);
    }

    #[test]
    fn power_predicates_read_single_bits() {
        let mut leaves = [CpuidLeaf::ZERO; 7];
        leaves[0] = intel_leaf0(6);

        leaves[6] = CpuidLeaf::new(CPUID_PM_EAX_HWP_NOTIFICATION, 0, 0, 0);
        assert_eq!(
            power_predicates(&snapshot(&leaves)),
            [false, true, false, false, false]
        );

        leaves[6] = CpuidLeaf::new(0, 0, CPUID_PM_ECX_ENERGY_PERF_BIAS, 0);
        assert_eq!(
            power_predicates(&snapshot(&leaves)),
            [false, false, false, false, true]
        );

        // Same bit positions in the wrong register do not count.
        leaves[6] = CpuidLeaf::new(CPUID_PM_ECX_HW_COORD_FEEDBACK, !0, 0, !0);
        assert_eq!(power_predicates(&snapshot(&leaves)), [false; 5]);
    }

    #[test]
    fn family_and_model_unknown_without_leaf_one() {
        let s = snapshot(&[intel_leaf0(0), leaf1(6, 0xe, 0, 9)]);
        assert_eq!(s.family_id(), FAMILY_ID_UNKNOWN);
        assert_eq!(s.model(), Model::Unknown);
        assert_eq!(s.model_id(), None);
        assert_eq!(s.apic_id(), None);

        let s = snapshot(&[intel_leaf0(1), leaf1(6, 0xe, 0, 9)]);
        assert_eq!(s.family_id(), 6);
        assert_eq!(s.model(), Model::KabyLakeDesktop);
    }

    #[test]
    fn vendor_requires_exact_signature() {
        let good = intel_leaf0(1);
        assert_eq!(snapshot(&[good]).vendor(), Vendor::Intel);
        assert_eq!(&snapshot(&[good]).vendor_bytes(), b"GenuineIntel");

        for byte in 0..CPUID_VENDOR_STRING_LENGTH {
            let mut leaf = good;
            let flip = 1u32 << ((byte % 4) * 8);
            match byte / 4 {
                0 => leaf.ebx ^= flip,
                1 => leaf.edx ^= flip,
                _ => leaf.ecx ^= flip,
            }
            assert_eq!(snapshot(&[leaf]).vendor(), Vendor::Unknown, "byte {}", byte);
        }
    }

    #[test]
    fn vendor_register_order_matters() {
        let good = intel_leaf0(1);
        let swapped = CpuidLeaf::new(good.eax, good.ebx, good.edx, good.ecx);
        assert_eq!(snapshot(&[swapped]).vendor(), Vendor::Unknown);
    }

    #[test]
    fn family_widening_only_for_base_fifteen() {
        for ext in [0u32, 1, 0x20, 0xff] {
            let s = snapshot(&[intel_leaf0(1), leaf1(15, 0, ext, 0)]);
            assert_eq!(s.family_id(), 15 + ext);
        }
        for base in [0u32, 5, 6, 14] {
            let s = snapshot(&[intel_leaf0(1), leaf1(base, 0, 0xab, 0)]);
            assert_eq!(s.family_id(), base);
        }
    }

    #[test]
    fn model_widening_only_for_family_six_and_fifteen() {
        let s = snapshot(&[intel_leaf0(1), leaf1(6, 0xe, 0, 9)]);
        assert_eq!(s.model_id(), Some(0x9e));

        let s = snapshot(&[intel_leaf0(1), leaf1(15, 0xe, 0, 9)]);
        assert_eq!(s.model_id(), Some(0x9e));

        // Family 15 + extended byte 1 = 16: no widening.
        let s = snapshot(&[intel_leaf0(1), leaf1(15, 0xe, 1, 9)]);
        assert_eq!(s.model_id(), Some(0xe));

        let s = snapshot(&[intel_leaf0(1), leaf1(5, 0xe, 0, 9)]);
        assert_eq!(s.model_id(), Some(0xe));
        assert_eq!(s.model(), Model::Unknown);
    }

    #[test]
    fn apic_id_from_leaf_one() {
        let mut l1 = leaf1(6, 0xe, 0, 9);
        l1.ebx = 0x0300_0800;
        let s = snapshot(&[intel_leaf0(1), l1]);
        assert_eq!(s.apic_id(), Some(3));
    }
}
