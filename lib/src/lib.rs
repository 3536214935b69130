#![no_std]
#![allow(unsafe_op_in_unsafe_fn)]

#[cfg(test)]
extern crate std;

#[cfg(target_arch = "x86_64")]
pub mod cpu;

#[cfg(target_arch = "x86_64")]
pub mod io;
pub mod klog;
pub mod platform;
pub mod ports;

pub use klog::{KlogLevel, klog_get_level, klog_init, klog_register_backend, klog_set_level};
#[cfg(target_arch = "x86_64")]
pub use platform::Hardware;
pub use platform::Platform;
