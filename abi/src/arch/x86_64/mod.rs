pub mod cpuid;
pub mod msr;

pub use cpuid::CpuidLeaf;
pub use msr::{HwpEpb, HwpEpp, InvalidPreference, Msr, MsrField};
