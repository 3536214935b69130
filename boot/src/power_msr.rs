//! Power-management MSR accessor.
//!
//! Every setter is a read-modify-write of the whole 64-bit register: read,
//! replace one documented field, write all 64 bits back. Bits outside the
//! field are preserved exactly. Faults are not detected; callers establish
//! support through the matching CPUID capability before calling.

use hwpinit_abi::arch::x86_64::msr::{
    ENERGY_PERF_BIAS_HINT, HWP_INTERRUPT_ENABLES, HWP_REQUEST_EPP, PM_ENABLE_HWP, POWER_CTL_EEO,
};
use hwpinit_abi::{HwpEpb, HwpEpp, Msr, MsrField};
use hwpinit_lib::{Platform, klog_debug};

pub struct PowerMsrs<'p, P: Platform + ?Sized> {
    platform: &'p P,
}

impl<'p, P: Platform + ?Sized> PowerMsrs<'p, P> {
    pub fn new(platform: &'p P) -> Self {
        Self { platform }
    }

    #[inline]
    pub fn read(&self, msr: Msr) -> u64 {
        self.platform.read_msr(msr)
    }

    /// Low 32 bits of the register.
    #[inline]
    pub fn read_low(&self, msr: Msr) -> u32 {
        self.read(msr) as u32
    }

    #[inline]
    pub fn write(&self, msr: Msr, value: u64) {
        self.platform.write_msr(msr, value)
    }

    pub fn read_field(&self, msr: Msr, field: MsrField) -> u64 {
        field.extract(self.read(msr))
    }

    pub fn update_field(&self, msr: Msr, field: MsrField, value: u64) {
        let old = self.read(msr);
        let new = field.insert(old, value);
        self.write(msr, new);
        klog_debug!("{}: {:#018x} -> {:#018x}", msr.name(), old, new);
    }

    /// IA32_POWER_CTL energy efficiency optimization bit.
    pub fn set_energy_efficiency_optimization(&self, on: bool) {
        self.update_field(Msr::POWER_CTL, POWER_CTL_EEO, on as u64);
    }

    /// All IA32_HWP_INTERRUPT notification enables on or off together.
    pub fn set_hwp_notification_irqs(&self, on: bool) {
        let value = if on { HWP_INTERRUPT_ENABLES.mask } else { 0 };
        self.update_field(Msr::HWP_INTERRUPT, HWP_INTERRUPT_ENABLES, value);
    }

    /// IA32_PM_ENABLE. Hardware ignores clearing once HWP is enabled.
    pub fn set_hardware_pstates(&self, on: bool) {
        self.update_field(Msr::PM_ENABLE, PM_ENABLE_HWP, on as u64);
    }

    pub fn set_hwp_energy_perf_pref(&self, epp: HwpEpp) {
        self.update_field(Msr::HWP_REQUEST, HWP_REQUEST_EPP, epp.code() as u64);
    }

    pub fn set_hwp_energy_perf_bias(&self, epb: HwpEpb) {
        self.update_field(Msr::ENERGY_PERF_BIAS, ENERGY_PERF_BIAS_HINT, epb.code() as u64);
    }
}
