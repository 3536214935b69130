//! Error type for the boot-time P-state configuration.
//!
//! Hardware faults are not modelled here; a missing capability is not an
//! error either, it just skips the matching step.

use core::fmt;

use hwpinit_abi::InvalidPreference;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PstateError {
    /// The configuration pass already ran on this boot.
    AlreadyConfigured,
    /// A raw EPP/EPB code that is not one of the named preference levels.
    InvalidPreference { code: u8 },
}

impl fmt::Display for PstateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyConfigured => write!(f, "hardware P-states already configured"),
            Self::InvalidPreference { code } => {
                write!(f, "no preference level with code {}", code)
            }
        }
    }
}

impl From<InvalidPreference> for PstateError {
    fn from(err: InvalidPreference) -> Self {
        Self::InvalidPreference { code: err.0 }
    }
}

/// Convenience result type for configuration operations.
pub type PstateResult<T = ()> = Result<T, PstateError>;
