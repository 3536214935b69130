//! Boot logging.
//!
//! All log output funnels through a single **backend** function pointer.
//! Until one is registered, the early backend writes straight to the
//! diagnostic UART selected with [`klog_set_port`] via raw port I/O. With no
//! port selected, lines are dropped.
//!
//! # Backend contract
//!
//! The backend receives the pre-formatted arguments for a **single log line**
//! and is responsible for appending a trailing newline after the text.
//!
//! # Registration
//!
//! ```ignore
//! hwpinit_lib::klog::klog_register_backend(my_backend_fn);
//! ```

use core::fmt;
use core::sync::atomic::{AtomicBool, AtomicPtr, AtomicU8, AtomicU16, Ordering};

// ---------------------------------------------------------------------------
// Log levels
// ---------------------------------------------------------------------------

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KlogLevel {
    Error = 0,
    Warn = 1,
    Info = 2,
    Debug = 3,
    Trace = 4,
}

impl KlogLevel {
    fn from_raw(raw: u8) -> Self {
        match raw {
            0 => KlogLevel::Error,
            1 => KlogLevel::Warn,
            2 => KlogLevel::Info,
            3 => KlogLevel::Debug,
            _ => KlogLevel::Trace,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            KlogLevel::Error => "error",
            KlogLevel::Warn => "warn",
            KlogLevel::Info => "info",
            KlogLevel::Debug => "debug",
            KlogLevel::Trace => "trace",
        }
    }
}

impl fmt::Display for KlogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

static CURRENT_LEVEL: AtomicU8 = AtomicU8::new(KlogLevel::Info as u8);

#[inline(always)]
fn is_enabled(level: KlogLevel) -> bool {
    level as u8 <= CURRENT_LEVEL.load(Ordering::Relaxed)
}

// ---------------------------------------------------------------------------
// Backend dispatch
// ---------------------------------------------------------------------------

/// Signature of a klog backend.
pub type KlogBackend = fn(fmt::Arguments<'_>);

/// Stored as a raw pointer; `null` means "use early-boot fallback".
static BACKEND: AtomicPtr<()> = AtomicPtr::new(core::ptr::null_mut());

/// UART base used by the early backend; 0 disables it.
static EARLY_PORT: AtomicU16 = AtomicU16::new(0);
static EARLY_WAIT: AtomicBool = AtomicBool::new(false);

#[cfg(target_arch = "x86_64")]
fn early_backend(args: fmt::Arguments<'_>) {
    use crate::io::Port;
    use crate::ports::serial_write_bytes;

    let port = EARLY_PORT.load(Ordering::Relaxed);
    if port == 0 {
        return;
    }
    let base = Port::<u8>::new(port);
    let wait = EARLY_WAIT.load(Ordering::Relaxed);

    struct EarlyWriter {
        base: Port<u8>,
        wait: bool,
    }

    impl fmt::Write for EarlyWriter {
        fn write_str(&mut self, s: &str) -> fmt::Result {
            unsafe { serial_write_bytes(self.base, s.as_bytes(), self.wait) };
            Ok(())
        }
    }

    let _ = fmt::write(&mut EarlyWriter { base, wait }, args);
    unsafe { serial_write_bytes(base, b"\n", wait) };
}

#[cfg(not(target_arch = "x86_64"))]
fn early_backend(_args: fmt::Arguments<'_>) {}

/// Dispatch a log line through the active backend.
#[inline]
fn dispatch(args: fmt::Arguments<'_>) {
    let ptr = BACKEND.load(Ordering::Acquire);
    if ptr.is_null() {
        early_backend(args);
    } else {
        // SAFETY: `klog_register_backend` only stores valid `KlogBackend` fn
        // pointers, which are the same size as `*mut ()`.
        let backend: KlogBackend = unsafe { core::mem::transmute(ptr) };
        backend(args);
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Register a backend that replaces the early UART fallback.
pub fn klog_register_backend(backend: KlogBackend) {
    BACKEND.store(backend as *mut (), Ordering::Release);
}

/// Point the early backend at a UART base; `0` silences it.
pub fn klog_set_port(port: u16, wait_for_thr_empty: bool) {
    EARLY_WAIT.store(wait_for_thr_empty, Ordering::Relaxed);
    EARLY_PORT.store(port, Ordering::Relaxed);
}

/// Initialise klog (sets default level). Called once before configuration.
pub fn klog_init() {
    CURRENT_LEVEL.store(KlogLevel::Info as u8, Ordering::Relaxed);
}

pub fn klog_set_level(level: KlogLevel) {
    CURRENT_LEVEL.store(level as u8, Ordering::Relaxed);
}

pub fn klog_get_level() -> KlogLevel {
    KlogLevel::from_raw(CURRENT_LEVEL.load(Ordering::Relaxed))
}

/// Emit a formatted log line at the given level.
///
/// The backend appends a trailing newline, callers should **not** include
/// one in their format string.
pub fn log_args(level: KlogLevel, args: fmt::Arguments<'_>) {
    if !is_enabled(level) {
        return;
    }
    dispatch(args);
}

// ---------------------------------------------------------------------------
// Macros
// ---------------------------------------------------------------------------

#[macro_export]
macro_rules! klog_error {
    ($($arg:tt)*) => {
        $crate::klog::log_args($crate::klog::KlogLevel::Error, ::core::format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! klog_warn {
    ($($arg:tt)*) => {
        $crate::klog::log_args($crate::klog::KlogLevel::Warn, ::core::format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! klog_info {
    ($($arg:tt)*) => {
        $crate::klog::log_args($crate::klog::KlogLevel::Info, ::core::format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! klog_debug {
    ($($arg:tt)*) => {
        $crate::klog::log_args($crate::klog::KlogLevel::Debug, ::core::format_args!($($arg)*))
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::string::String;
    use std::sync::Mutex;
    use std::vec::Vec;

    static CAPTURED: Mutex<Vec<String>> = Mutex::new(Vec::new());

    fn capture(args: fmt::Arguments<'_>) {
        CAPTURED.lock().unwrap().push(std::format!("{}", args));
    }

    #[test]
    fn level_filter_and_backend_dispatch() {
        klog_register_backend(capture);
        klog_set_level(KlogLevel::Info);
        assert_eq!(klog_get_level(), KlogLevel::Info);

        crate::klog_info!("kept {}", 1);
        crate::klog_debug!("dropped {}", 2);
        crate::klog_error!("kept {}", 3);

        klog_set_level(KlogLevel::Trace);
        crate::klog_debug!("kept {}", 4);

        klog_init();
        assert_eq!(klog_get_level(), KlogLevel::Info);

        let lines = CAPTURED.lock().unwrap().clone();
        assert_eq!(lines, ["kept 1", "kept 3", "kept 4"]);
    }

    #[test]
    fn level_names() {
        assert_eq!(KlogLevel::Warn.as_str(), "warn");
        assert_eq!(KlogLevel::from_raw(9), KlogLevel::Trace);
    }
}
