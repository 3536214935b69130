//! Model-Specific Register (MSR) addresses and power-management field layouts.
//!
//! MSRs are accessed via RDMSR/WRMSR instructions using a 32-bit address.
//! The `Msr` newtype prevents accidentally using an MSR address where a port
//! number or other value is expected, and `MsrField` describes the single
//! bitfield of each power register that boot code rewrites.

/// Model-Specific Register address.
///
/// # Example
///
/// ```ignore
/// use hwpinit_abi::arch::x86_64::Msr;
///
/// let pm_enable = read_msr(Msr::PM_ENABLE);
/// // read_msr(0x770);  // Compile error: expected Msr, found integer
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Msr(pub u32);

impl Msr {
    // =========================================================================
    // IA32 architectural power MSRs
    // =========================================================================

    /// Energy/performance bias hint (IA32_ENERGY_PERF_BIAS).
    pub const ENERGY_PERF_BIAS: Self = Self(0x1B0);

    /// Power control (MSR_POWER_CTL), holds the energy efficiency
    /// optimization bit.
    pub const POWER_CTL: Self = Self(0x1FC);

    // =========================================================================
    // Hardware P-state (HWP) MSRs
    // =========================================================================

    /// HWP enable (IA32_PM_ENABLE). Once set, only a reset clears it.
    pub const PM_ENABLE: Self = Self(0x770);

    /// HWP notification interrupt enables (IA32_HWP_INTERRUPT).
    pub const HWP_INTERRUPT: Self = Self(0x773);

    /// HWP performance request (IA32_HWP_REQUEST).
    pub const HWP_REQUEST: Self = Self(0x774);

    // =========================================================================
    // Methods
    // =========================================================================

    /// Returns the raw MSR address for use with RDMSR/WRMSR.
    #[inline]
    pub const fn address(self) -> u32 {
        self.0
    }

    /// Creates a new MSR from a raw address.
    #[inline]
    pub const fn new(address: u32) -> Self {
        Self(address)
    }

    /// Short register name used in log output.
    pub const fn name(self) -> &'static str {
        match self {
            Self::ENERGY_PERF_BIAS => "IA32_ENERGY_PERF_BIAS",
            Self::POWER_CTL => "IA32_POWER_CTL",
            Self::PM_ENABLE => "IA32_PM_ENABLE",
            Self::HWP_INTERRUPT => "IA32_HWP_INTERRUPT",
            Self::HWP_REQUEST => "IA32_HWP_REQUEST",
            _ => "MSR",
        }
    }
}

// =============================================================================
// Field layouts
// =============================================================================

/// One bitfield inside a 64-bit MSR: `mask` is right-aligned, `shift` is
/// the position of its least significant bit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MsrField {
    pub shift: u32,
    pub mask: u64,
}

impl MsrField {
    #[inline]
    pub const fn new(shift: u32, mask: u64) -> Self {
        Self { shift, mask }
    }

    /// Field value held in `raw`.
    #[inline]
    pub const fn extract(self, raw: u64) -> u64 {
        (raw >> self.shift) & self.mask
    }

    /// `raw` with the field replaced by `value` (truncated to the field
    /// width). Every bit outside the field is returned unchanged.
    #[inline]
    pub const fn insert(self, raw: u64, value: u64) -> u64 {
        (raw & !(self.mask << self.shift)) | ((value & self.mask) << self.shift)
    }
}

/// IA32_POWER_CTL bit 20: energy efficiency optimization.
pub const POWER_CTL_EEO: MsrField = MsrField::new(20, 0x1);

/// IA32_ENERGY_PERF_BIAS bits 3:0.
pub const ENERGY_PERF_BIAS_HINT: MsrField = MsrField::new(0, 0xf);

/// IA32_PM_ENABLE bit 0: HWP enable.
pub const PM_ENABLE_HWP: MsrField = MsrField::new(0, 0x1);

/// IA32_HWP_INTERRUPT bits 6:0: every notification enable (guaranteed
/// performance change, excursion to minimum, highest change, PECI override
/// and the later additions). Clearing the field silences all of them.
pub const HWP_INTERRUPT_ENABLES: MsrField = MsrField::new(0, 0x7f);

/// IA32_HWP_REQUEST bits 31:24: energy performance preference.
pub const HWP_REQUEST_EPP: MsrField = MsrField::new(24, 0xff);

// =============================================================================
// Preference levels
// =============================================================================

/// Raw preference code that names none of the levels below.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InvalidPreference(pub u8);

/// Energy performance preference written into IA32_HWP_REQUEST.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum HwpEpp {
    Performance = 0,
    Balanced = 127,
    PowerSaving = 255,
}

impl HwpEpp {
    #[inline]
    pub const fn code(self) -> u8 {
        self as u8
    }

    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Performance),
            127 => Some(Self::Balanced),
            255 => Some(Self::PowerSaving),
            _ => None,
        }
    }
}

impl TryFrom<u8> for HwpEpp {
    type Error = InvalidPreference;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Self::from_code(code).ok_or(InvalidPreference(code))
    }
}

/// Energy performance bias written into IA32_ENERGY_PERF_BIAS.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum HwpEpb {
    Performance = 0,
    Balanced = 7,
    PowerSaving = 15,
}

impl HwpEpb {
    #[inline]
    pub const fn code(self) -> u8 {
        self as u8
    }

    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Performance),
            7 => Some(Self::Balanced),
            15 => Some(Self::PowerSaving),
            _ => None,
        }
    }
}

impl TryFrom<u8> for HwpEpb {
    type Error = InvalidPreference;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Self::from_code(code).ok_or(InvalidPreference(code))
    }
}
