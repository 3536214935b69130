//! Diagnostic channel: plain bytes to the platform's diagnostic port.
//!
//! No buffering, flow control or newline translation. Each byte goes out
//! through one `Platform::diag_putc` call.

use core::fmt;

use hwpinit_lib::Platform;

pub struct DiagChannel<'p, P: Platform + ?Sized> {
    platform: &'p P,
}

impl<'p, P: Platform + ?Sized> DiagChannel<'p, P> {
    pub fn new(platform: &'p P) -> Self {
        Self { platform }
    }

    #[inline]
    pub fn putc(&self, byte: u8) {
        self.platform.diag_putc(byte);
    }

    pub fn write_bytes(&self, bytes: &[u8]) {
        for &b in bytes {
            self.putc(b);
        }
    }

    pub fn write_line(&self, line: &str) {
        self.write_bytes(line.as_bytes());
        self.putc(b'\n');
    }
}

impl<P: Platform + ?Sized> fmt::Write for DiagChannel<'_, P> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.write_bytes(s.as_bytes());
        Ok(())
    }
}
