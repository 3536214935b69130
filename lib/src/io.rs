//! Typed x86 I/O port handle.

use core::marker::PhantomData;

use x86_64::instructions::port::{PortRead, PortWrite};

/// An I/O port address carrying the width of the value moved through it.
#[derive(Debug)]
#[repr(transparent)]
pub struct Port<T> {
    port: u16,
    _width: PhantomData<T>,
}

impl<T> Clone for Port<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Port<T> {}

impl<T> Port<T> {
    #[inline]
    pub const fn new(port: u16) -> Self {
        Self {
            port,
            _width: PhantomData,
        }
    }

    #[inline]
    pub const fn address(&self) -> u16 {
        self.port
    }

    /// Register `offset` bytes above this port, e.g. a UART line status
    /// register relative to its base.
    #[inline]
    pub const fn offset(&self, offset: u16) -> Self {
        Self::new(self.port.wrapping_add(offset))
    }
}

impl<T: PortRead> Port<T> {
    /// # Safety
    ///
    /// Port I/O can have arbitrary side effects on the device behind it.
    #[inline(always)]
    pub unsafe fn read(&self) -> T {
        T::read_from_port(self.port)
    }
}

impl<T: PortWrite> Port<T> {
    /// # Safety
    ///
    /// Port I/O can have arbitrary side effects on the device behind it.
    #[inline(always)]
    pub unsafe fn write(&self, value: T) {
        T::write_to_port(self.port, value)
    }
}
