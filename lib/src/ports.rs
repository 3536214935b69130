//! Fixed I/O port addresses and the raw UART transmit primitive.

// ---------------------------------------------------------------------------
// Diagnostic UART bases
// ---------------------------------------------------------------------------

/// Standard COM1, also what QEMU and the Macho boards expose.
pub const COM1_BASE: u16 = 0x3F8;

/// ThinkPad X201 AMT serial-over-LAN UART.
pub const X201_UART_BASE: u16 = 0x1808;

/// ThinkPad T490 AMT serial-over-LAN UART.
pub const T490_UART_BASE: u16 = 0x3060;

// ---------------------------------------------------------------------------
// 16550 register layout
// ---------------------------------------------------------------------------

pub const UART_REG_THR: u16 = 0;
pub const UART_REG_LSR: u16 = 5;

pub const UART_LSR_TX_EMPTY: u8 = 0x20;

// ---------------------------------------------------------------------------
// Low-level serial I/O primitives
// ---------------------------------------------------------------------------
//
// Every path that puts a byte on the diagnostic UART funnels through here:
// the early klog backend and the `Hardware` platform's `diag_putc`.
// There is no buffering and no acknowledgment.

/// Write one byte to a UART.
///
/// With `wait` set, polls the Line Status Register until the transmit
/// holding register is empty first. Without it the byte is written
/// immediately; AMT serial-over-LAN UARTs accept writes without the poll.
///
/// # Safety
///
/// Port I/O. Caller must ensure `base` refers to an 8250/16550-compatible
/// UART and that nothing else drives it concurrently.
#[cfg(target_arch = "x86_64")]
#[inline(always)]
pub unsafe fn serial_putc(base: crate::io::Port<u8>, byte: u8, wait: bool) {
    let lsr = base.offset(UART_REG_LSR);
    let thr = base.offset(UART_REG_THR);
    if wait {
        while (lsr.read() & UART_LSR_TX_EMPTY) == 0 {
            core::hint::spin_loop();
        }
    }
    thr.write(byte);
}

/// Write a byte slice to a UART, byte for byte. Newlines are not
/// translated.
///
/// # Safety
///
/// Same requirements as [`serial_putc`].
#[cfg(target_arch = "x86_64")]
#[inline]
pub unsafe fn serial_write_bytes(base: crate::io::Port<u8>, bytes: &[u8], wait: bool) {
    for &b in bytes {
        serial_putc(base, b, wait);
    }
}
