//! FFI Boundary Layer
//!
//! Only the entry called by the earlier-stage bootstrap code needs
//! `extern "C"` linkage. Rust callers use [`crate::boot_configure`].

/// Entry point called once by the bootstrap code, after the processor is in
/// protected or long mode. Uses the default configuration.
#[unsafe(no_mangle)]
pub extern "C" fn hwpinit_entry() {
    crate::boot_configure(&crate::PstateConfig::default());
}
