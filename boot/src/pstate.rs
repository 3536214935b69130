//! Boot-time hardware P-state configuration.
//!
//! Runs once on the boot processor before interrupts or scheduling exist:
//!
//! 1. Kaby Lake desktop parts with hardware coordination feedback get the
//!    energy efficiency optimization bit of IA32_POWER_CTL cleared.
//! 2. With HWP: notification interrupts off (if the MSR exists), HWP on,
//!    EPP and EPB set to the configured preference (if supported).
//! 3. The vendor name goes out on the diagnostic port, followed by `!` if
//!    anything was written.
//!
//! Steps 1 and 2 are independent, and so are the sub-steps of 2. Nothing
//! is rolled back.

use core::fmt;

use bitflags::bitflags;
use hwpinit_abi::{HwpEpb, HwpEpp};
use hwpinit_lib::{Platform, klog_debug, klog_info};
use spin::Once;

use crate::config::PstateConfig;
use crate::cpuid_snapshot::{CpuidSnapshot, Model, Vendor};
use crate::diag::DiagChannel;
use crate::error::{PstateError, PstateResult};
use crate::power_msr::PowerMsrs;

/// Line sent after the vendor name when at least one MSR was written.
pub const DIAG_CHANGED_SENTINEL: &str = "!";

bitflags! {
    /// Configuration writes performed during the pass.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct PstateActions: u8 {
        const EEO_DISABLED     = 1 << 0;
        const HWP_ENABLED      = 1 << 1;
        const HWP_IRQ_DISABLED = 1 << 2;
        const HWP_EPP_SET      = 1 << 3;
        const HWP_EPB_SET      = 1 << 4;
    }
}

/// Outcome of one configuration pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PstateReport {
    pub vendor: Vendor,
    pub family_id: u32,
    pub model: Model,
    pub apic_id: Option<u8>,
    pub actions: PstateActions,
    pub epp: HwpEpp,
    pub epb: HwpEpb,
}

impl PstateReport {
    #[inline]
    pub fn any_action(&self) -> bool {
        !self.actions.is_empty()
    }

    /// The structured trace line, e.g. `HWP config for core 0x2: hwp=1`.
    pub fn trace_line(&self) -> TraceLine<'_> {
        TraceLine(self)
    }
}

/// Renders the changed settings as ` eeo=0 hwp=1 hwp_irq=0 hwp_epp=0 hwp_epb=0`,
/// listing only what was actually written.
impl fmt::Display for PstateReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.actions.contains(PstateActions::EEO_DISABLED) {
            f.write_str(" eeo=0")?;
        }
        if self.actions.contains(PstateActions::HWP_ENABLED) {
            f.write_str(" hwp=1")?;
        }
        if self.actions.contains(PstateActions::HWP_IRQ_DISABLED) {
            f.write_str(" hwp_irq=0")?;
        }
        if self.actions.contains(PstateActions::HWP_EPP_SET) {
            write!(f, " hwp_epp={}", self.epp.code())?;
        }
        if self.actions.contains(PstateActions::HWP_EPB_SET) {
            write!(f, " hwp_epb={}", self.epb.code())?;
        }
        Ok(())
    }
}

pub struct TraceLine<'r>(&'r PstateReport);

impl fmt::Display for TraceLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.apic_id {
            Some(id) => write!(f, "HWP config for core {:#x}:{}", id, self.0),
            None => write!(f, "HWP config for core ?:{}", self.0),
        }
    }
}

/// Run the configuration pass against `platform`.
///
/// Always returns; unsupported features are skipped, not reported as errors.
pub fn configure_hardware_pstates<P: Platform + ?Sized>(
    platform: &P,
    config: &PstateConfig,
) -> PstateReport {
    let cpuid = CpuidSnapshot::capture(platform);
    let msrs = PowerMsrs::new(platform);
    let mut actions = PstateActions::empty();

    let vendor = cpuid.vendor();
    let family_id = cpuid.family_id();
    let model = cpuid.model();
    klog_debug!(
        "pstate: vendor={} family={:#x} model={:?} max_leaf={:#x}",
        vendor,
        family_id,
        model,
        cpuid.max_leaf()
    );

    if vendor == Vendor::Intel
        && family_id == 6
        && model == Model::KabyLakeDesktop
        && cpuid.hardware_coordination_feedback_cap()
    {
        msrs.set_energy_efficiency_optimization(false);
        actions |= PstateActions::EEO_DISABLED;
    }

    if cpuid.hwp() {
        if cpuid.hwp_notification() {
            msrs.set_hwp_notification_irqs(false);
            actions |= PstateActions::HWP_IRQ_DISABLED;
        }

        msrs.set_hardware_pstates(true);
        actions |= PstateActions::HWP_ENABLED;

        if cpuid.hwp_energy_perf_pref() {
            msrs.set_hwp_energy_perf_pref(config.epp);
            actions |= PstateActions::HWP_EPP_SET;
        }
        if cpuid.hwp_energy_perf_bias() {
            msrs.set_hwp_energy_perf_bias(config.epb);
            actions |= PstateActions::HWP_EPB_SET;
        }
    } else {
        klog_debug!("pstate: no HWP support");
    }

    let report = PstateReport {
        vendor,
        family_id,
        model,
        apic_id: cpuid.apic_id(),
        actions,
        epp: config.epp,
        epb: config.epb,
    };

    let diag = DiagChannel::new(platform);
    diag.write_line(vendor.name());
    if report.any_action() {
        diag.write_line(DIAG_CHANGED_SENTINEL);
    }

    if config.trace && report.any_action() {
        klog_info!("{}", report.trace_line());
    }

    report
}

/// Makes sure the pass runs at most once.
pub struct PstateOnce {
    report: Once<PstateReport>,
}

impl PstateOnce {
    pub const fn new() -> Self {
        Self { report: Once::new() }
    }

    /// Run the pass the first time; every later call leaves the hardware
    /// alone and fails with `AlreadyConfigured`.
    pub fn configure<P: Platform + ?Sized>(
        &self,
        platform: &P,
        config: &PstateConfig,
    ) -> PstateResult<PstateReport> {
        let mut ran = false;
        let report = self.report.call_once(|| {
            ran = true;
            configure_hardware_pstates(platform, config)
        });
        if ran {
            Ok(*report)
        } else {
            Err(PstateError::AlreadyConfigured)
        }
    }

    pub fn report(&self) -> Option<PstateReport> {
        self.report.get().copied()
    }
}

impl Default for PstateOnce {
    fn default() -> Self {
        Self::new()
    }
}

static PSTATE_ONCE: PstateOnce = PstateOnce::new();

/// Configure this boot's P-states, once.
pub fn configure<P: Platform + ?Sized>(
    platform: &P,
    config: &PstateConfig,
) -> PstateResult<PstateReport> {
    PSTATE_ONCE.configure(platform, config)
}

/// Report of the pass, if it has run.
pub fn last_report() -> Option<PstateReport> {
    PSTATE_ONCE.report()
}
