#![no_std]

#[cfg(test)]
extern crate std;

pub mod config;
pub mod cpuid_snapshot;
pub mod diag;
pub mod error;
#[cfg(target_arch = "x86_64")]
pub mod ffi_boundary;
pub mod power_msr;
pub mod pstate;

#[cfg(test)]
mod fake_platform;

pub use config::{DiagTarget, PstateConfig};
pub use cpuid_snapshot::{CpuidSnapshot, FAMILY_ID_UNKNOWN, Model, Vendor};
pub use error::{PstateError, PstateResult};
#[cfg(target_arch = "x86_64")]
pub use ffi_boundary::hwpinit_entry;
pub use power_msr::PowerMsrs;
pub use pstate::{
    PstateActions, PstateOnce, PstateReport, configure, configure_hardware_pstates, last_report,
};

/// Configure hardware P-states on the running processor.
///
/// Sets up early logging on the configured diagnostic UART, then runs the
/// pass once. A repeated call is logged and otherwise ignored; this always
/// returns to the caller.
#[cfg(target_arch = "x86_64")]
pub fn boot_configure(config: &PstateConfig) {
    use hwpinit_lib::klog::{klog_init, klog_set_level, klog_set_port};
    use hwpinit_lib::{Hardware, klog_warn};

    klog_init();
    klog_set_level(config.log_level);
    klog_set_port(config.diag_port.port(), config.wait_for_thr_empty);

    let hardware = Hardware::new(config.diag_port.port(), config.wait_for_thr_empty);
    if let Err(err) = configure(&hardware, config) {
        klog_warn!("pstate: {}", err);
    }
}
