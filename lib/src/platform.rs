//! The narrow boundary between configuration logic and privileged
//! instructions.
//!
//! Boot code is written against [`Platform`]; [`Hardware`] executes the real
//! instructions, and tests substitute a simulated register file.

use hwpinit_abi::{CpuidLeaf, Msr};

/// One method per privileged operation the boot configuration needs.
pub trait Platform {
    /// CPUID with `leaf` in EAX and subleaf 0.
    fn cpuid(&self, leaf: u32) -> CpuidLeaf;

    /// RDMSR.
    fn read_msr(&self, msr: Msr) -> u64;

    /// WRMSR of the full 64-bit value.
    fn write_msr(&self, msr: Msr, value: u64);

    /// Transmit one byte on the diagnostic port.
    fn diag_putc(&self, byte: u8);
}

/// The processor this code is running on.
#[cfg(target_arch = "x86_64")]
#[derive(Clone, Copy, Debug)]
pub struct Hardware {
    diag_port: crate::io::Port<u8>,
    wait_for_thr_empty: bool,
}

#[cfg(target_arch = "x86_64")]
impl Hardware {
    pub const fn new(diag_port: u16, wait_for_thr_empty: bool) -> Self {
        Self {
            diag_port: crate::io::Port::new(diag_port),
            wait_for_thr_empty,
        }
    }
}

#[cfg(target_arch = "x86_64")]
impl Platform for Hardware {
    #[inline]
    fn cpuid(&self, leaf: u32) -> CpuidLeaf {
        crate::cpu::cpuid(leaf).into()
    }

    #[inline]
    fn read_msr(&self, msr: Msr) -> u64 {
        crate::cpu::read_msr(msr)
    }

    #[inline]
    fn write_msr(&self, msr: Msr, value: u64) {
        crate::cpu::write_msr(msr, value)
    }

    #[inline]
    fn diag_putc(&self, byte: u8) {
        unsafe { crate::ports::serial_putc(self.diag_port, byte, self.wait_for_thr_empty) }
    }
}
