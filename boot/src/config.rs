use hwpinit_abi::{HwpEpb, HwpEpp};
use hwpinit_lib::KlogLevel;
use hwpinit_lib::ports::{COM1_BASE, T490_UART_BASE, X201_UART_BASE};

use crate::error::PstateResult;

const DEFAULT_DIAG_TARGET: DiagTarget = DiagTarget::T490;
const DEFAULT_WAIT_FOR_THR_EMPTY: bool = false;
const DEFAULT_TRACE: bool = cfg!(feature = "trace");
const DEFAULT_LOG_LEVEL: KlogLevel = KlogLevel::Info;
const DEFAULT_EPP: HwpEpp = HwpEpp::Performance;
const DEFAULT_EPB: HwpEpb = HwpEpb::Performance;

/// Which UART carries the diagnostic bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DiagTarget {
    T490,
    X201,
    Com1,
    Custom(u16),
}

impl DiagTarget {
    pub const fn port(self) -> u16 {
        match self {
            DiagTarget::T490 => T490_UART_BASE,
            DiagTarget::X201 => X201_UART_BASE,
            DiagTarget::Com1 => COM1_BASE,
            DiagTarget::Custom(port) => port,
        }
    }
}

/// Everything the configuration pass needs to know about its surroundings.
/// Passed in explicitly; there are no global switches.
#[derive(Clone, Copy, Debug)]
pub struct PstateConfig {
    pub diag_port: DiagTarget,
    /// Poll the UART line status before every byte.
    pub wait_for_thr_empty: bool,
    /// Emit the structured "HWP config for core" line through klog.
    pub trace: bool,
    pub log_level: KlogLevel,
    pub epp: HwpEpp,
    pub epb: HwpEpb,
}

impl Default for PstateConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl PstateConfig {
    pub const fn new() -> Self {
        Self {
            diag_port: DEFAULT_DIAG_TARGET,
            wait_for_thr_empty: DEFAULT_WAIT_FOR_THR_EMPTY,
            trace: DEFAULT_TRACE,
            log_level: DEFAULT_LOG_LEVEL,
            epp: DEFAULT_EPP,
            epb: DEFAULT_EPB,
        }
    }

    pub const fn with_diag_port(mut self, diag_port: DiagTarget) -> Self {
        self.diag_port = diag_port;
        self
    }

    pub const fn with_wait_for_thr_empty(mut self, wait: bool) -> Self {
        self.wait_for_thr_empty = wait;
        self
    }

    pub const fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }

    pub const fn with_log_level(mut self, level: KlogLevel) -> Self {
        self.log_level = level;
        self
    }

    pub const fn with_epp(mut self, epp: HwpEpp) -> Self {
        self.epp = epp;
        self
    }

    pub const fn with_epb(mut self, epb: HwpEpb) -> Self {
        self.epb = epb;
        self
    }

    /// Set the preference from a raw IA32_HWP_REQUEST EPP code.
    pub fn with_epp_code(self, code: u8) -> PstateResult<Self> {
        Ok(self.with_epp(HwpEpp::try_from(code)?))
    }

    /// Set the bias from a raw IA32_ENERGY_PERF_BIAS code.
    pub fn with_epb_code(self, code: u8) -> PstateResult<Self> {
        Ok(self.with_epb(HwpEpb::try_from(code)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PstateError;

    #[test]
    fn defaults_match_t490_performance() {
        let cfg = PstateConfig::default();
        assert_eq!(cfg.diag_port, DiagTarget::T490);
        assert_eq!(cfg.diag_port.port(), 0x3060);
        assert!(!cfg.wait_for_thr_empty);
        assert_eq!(cfg.trace, cfg!(feature = "trace"));
        assert_eq!(cfg.log_level, KlogLevel::Info);
        assert_eq!(cfg.epp, HwpEpp::Performance);
        assert_eq!(cfg.epb, HwpEpb::Performance);
    }

    #[test]
    fn diag_target_ports() {
        assert_eq!(DiagTarget::X201.port(), 0x1808);
        assert_eq!(DiagTarget::Com1.port(), 0x3f8);
        assert_eq!(DiagTarget::Custom(0x2f8).port(), 0x2f8);
    }

    #[test]
    fn preference_codes_are_checked() {
        let cfg = PstateConfig::new().with_epp_code(127).unwrap();
        assert_eq!(cfg.epp, HwpEpp::Balanced);
        let cfg = cfg.with_epb_code(15).unwrap();
        assert_eq!(cfg.epb, HwpEpb::PowerSaving);

        assert_eq!(
            PstateConfig::new().with_epb_code(8).unwrap_err(),
            PstateError::InvalidPreference { code: 8 }
        );
        assert_eq!(
            PstateConfig::new().with_epp_code(1).unwrap_err(),
            PstateError::InvalidPreference { code: 1 }
        );
    }
}
