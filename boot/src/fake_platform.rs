//! Simulated processor for host tests: a CPUID table, an MSR register file
//! and a capture of everything sent to the diagnostic port.

use core::cell::RefCell;
use std::collections::BTreeMap;
use std::string::String;
use std::vec::Vec;

use hwpinit_abi::{CpuidLeaf, Msr};
use hwpinit_lib::Platform;

pub struct FakePlatform {
    cpuid: Vec<CpuidLeaf>,
    msrs: RefCell<BTreeMap<u32, u64>>,
    cpuid_queries: RefCell<Vec<u32>>,
    msr_writes: RefCell<Vec<(Msr, u64)>>,
    diag: RefCell<Vec<u8>>,
}

impl FakePlatform {
    /// `leaves[i]` answers CPUID leaf `i`; anything past the table reads as
    /// zero. No MSRs exist until added with [`Self::with_msr`].
    pub fn new(leaves: &[CpuidLeaf]) -> Self {
        Self {
            cpuid: leaves.to_vec(),
            msrs: RefCell::new(BTreeMap::new()),
            cpuid_queries: RefCell::new(Vec::new()),
            msr_writes: RefCell::new(Vec::new()),
            diag: RefCell::new(Vec::new()),
        }
    }

    pub fn with_msr(self, msr: Msr, value: u64) -> Self {
        self.msrs.borrow_mut().insert(msr.address(), value);
        self
    }

    /// All five power MSRs, each holding `value`.
    pub fn with_power_msrs(self, value: u64) -> Self {
        [
            Msr::POWER_CTL,
            Msr::ENERGY_PERF_BIAS,
            Msr::PM_ENABLE,
            Msr::HWP_INTERRUPT,
            Msr::HWP_REQUEST,
        ]
        .into_iter()
        .fold(self, |platform, msr| platform.with_msr(msr, value))
    }

    pub fn msr(&self, msr: Msr) -> u64 {
        self.msrs.borrow()[&msr.address()]
    }

    pub fn cpuid_queries(&self) -> Vec<u32> {
        self.cpuid_queries.borrow().clone()
    }

    pub fn msr_writes(&self) -> Vec<(Msr, u64)> {
        self.msr_writes.borrow().clone()
    }

    pub fn diag_output(&self) -> String {
        String::from_utf8(self.diag.borrow().clone()).unwrap()
    }
}

impl Platform for FakePlatform {
    fn cpuid(&self, leaf: u32) -> CpuidLeaf {
        self.cpuid_queries.borrow_mut().push(leaf);
        self.cpuid.get(leaf as usize).copied().unwrap_or_default()
    }

    fn read_msr(&self, msr: Msr) -> u64 {
        match self.msrs.borrow().get(&msr.address()) {
            Some(&value) => value,
            None => panic!("#GP: rdmsr of unsupported {} ({:#x})", msr.name(), msr.address()),
        }
    }

    fn write_msr(&self, msr: Msr, value: u64) {
        let mut msrs = self.msrs.borrow_mut();
        match msrs.get_mut(&msr.address()) {
            Some(slot) => *slot = value,
            None => panic!("#GP: wrmsr of unsupported {} ({:#x})", msr.name(), msr.address()),
        }
        self.msr_writes.borrow_mut().push((msr, value));
    }

    fn diag_putc(&self, byte: u8) {
        self.diag.borrow_mut().push(byte);
    }
}

// ---------------------------------------------------------------------------
// Leaf builders
// ---------------------------------------------------------------------------

/// Leaf 0 of a GenuineIntel part reporting `max_leaf`.
pub fn intel_leaf0(max_leaf: u32) -> CpuidLeaf {
    vendor_leaf0(max_leaf, b"GenuineIntel")
}

pub fn vendor_leaf0(max_leaf: u32, vendor: &[u8; 12]) -> CpuidLeaf {
    let reg = |i: usize| u32::from_le_bytes([vendor[i], vendor[i + 1], vendor[i + 2], vendor[i + 3]]);
    CpuidLeaf::new(max_leaf, reg(0), reg(8), reg(4))
}

/// Leaf 1 with the given version fields.
pub fn leaf1(family: u32, model: u32, ext_family: u32, ext_model: u32) -> CpuidLeaf {
    let eax = (ext_family << 20) | (ext_model << 16) | (family << 8) | (model << 4);
    CpuidLeaf::new(eax, 0, 0, 0)
}
