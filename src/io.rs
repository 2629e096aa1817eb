//! Peripheral register traits.
//!
//! Channels never touch hardware directly.  The interrupt half of a channel
//! reads or writes one data register, and the transmit and sampling channels
//! additionally flip one control bit.  These traits are that whole surface.
//!
//! # Possible implementations
//!
//! - On the target: [`Register`] and [`RegisterBit`], volatile accesses to
//!   memory-mapped registers
//! - On a host: test doubles that record writes and replay reads, used to
//!   drive the channels without hardware
//!
//! # Register access atomicity
//!
//! Data registers are accessed once per interrupt, from one context, so
//! they need no synchronisation.  [`RegisterBit`] performs a read-modify-write
//! of a control register.  Where another context modifies other bits of the
//! same register, that context must not preempt the read-modify-write, or the
//! caller must mask interrupts around it.

// Copyright (C) 2025 Piers Finlayson <piers@piers.rocks>
//
// MIT License

use crate::ring::Unit;

/// Peripheral register a unit is read from, such as a receive data register
/// or an ADC result register.
pub trait SourceRegister<T: Unit> {
    /// Read one unit.  Reading may clear the peripheral's "data ready" state.
    fn read_register(&mut self) -> T;
}

/// Peripheral register a unit is written to, such as a transmit data
/// register.
pub trait SinkRegister<T: Unit> {
    /// Write one unit.  Writing typically starts the hardware sending it.
    fn write_register(&mut self, value: T);
}

/// Enable bit of an interrupt source.
///
/// Used by the transmit channel to gate its transmit-ready interrupt.  The
/// foreground half arms it and the interrupt half disarms it, so methods take
/// `&self` and both halves hold a shared reference.
pub trait InterruptSource {
    /// Arm the interrupt source.
    fn enable_interrupt(&self);

    /// Disarm the interrupt source.
    fn disable_interrupt(&self);

    /// Whether the interrupt source is armed.
    fn is_interrupt_enabled(&self) -> bool;
}

/// Control bit that starts a single ADC conversion.
pub trait Trigger {
    /// Start a conversion.  The conversion-complete interrupt fires later.
    fn trigger(&mut self);
}

/// Memory-mapped data register of width `T`, accessed with volatile reads and
/// writes.
pub struct Register<T: Unit> {
    addr: *mut T,
}

impl<T: Unit> Register<T> {
    /// Create a new register handle.
    ///
    /// ```rust,ignore
    /// // ATmega328P USART0 data register
    /// let udr0 = unsafe { Register::<u8>::new(0xC6) };
    /// ```
    ///
    /// # Safety
    /// `addr` must be the address of a readable and writable register of
    /// width `T`, valid for as long as this handle is used.
    pub const unsafe fn new(addr: usize) -> Self {
        Self {
            addr: addr as *mut T,
        }
    }
}

impl<T: Unit> SourceRegister<T> for Register<T> {
    #[inline]
    fn read_register(&mut self) -> T {
        unsafe { core::ptr::read_volatile(self.addr) }
    }
}

impl<T: Unit> SinkRegister<T> for Register<T> {
    #[inline]
    fn write_register(&mut self, value: T) {
        unsafe { core::ptr::write_volatile(self.addr, value) }
    }
}

// A register handle is just an address, and `new()` requires it stays valid
unsafe impl<T: Unit> Send for Register<T> {}

/// Single bit of a memory-mapped 8-bit control register.
pub struct RegisterBit {
    addr: *mut u8,
    mask: u8,
}

impl RegisterBit {
    /// Create a new register bit handle.
    ///
    /// ```rust,ignore
    /// // ATmega328P UCSR0B.UDRIE0, the USART0 data register empty interrupt
    /// static UDRIE0: RegisterBit = unsafe { RegisterBit::new(0xC1, 5) };
    /// ```
    ///
    /// # Safety
    /// `addr` must be the address of a readable and writable 8-bit register,
    /// valid for the lifetime of this handle, and `bit` must be below 8.
    pub const unsafe fn new(addr: usize, bit: u8) -> Self {
        Self {
            addr: addr as *mut u8,
            mask: 1 << bit,
        }
    }

    fn set(&self) {
        unsafe {
            let value = core::ptr::read_volatile(self.addr);
            core::ptr::write_volatile(self.addr, value | self.mask);
        }
    }

    fn clear(&self) {
        unsafe {
            let value = core::ptr::read_volatile(self.addr);
            core::ptr::write_volatile(self.addr, value & !self.mask);
        }
    }

    fn is_set(&self) -> bool {
        unsafe { core::ptr::read_volatile(self.addr) & self.mask != 0 }
    }
}

impl InterruptSource for RegisterBit {
    #[inline]
    fn enable_interrupt(&self) {
        self.set()
    }

    #[inline]
    fn disable_interrupt(&self) {
        self.clear()
    }

    #[inline]
    fn is_interrupt_enabled(&self) -> bool {
        self.is_set()
    }
}

impl Trigger for RegisterBit {
    #[inline]
    fn trigger(&mut self) {
        self.set()
    }
}

// Shared between foreground and interrupt context by design of the gate, see
// the module documentation for the read-modify-write caveat
unsafe impl Send for RegisterBit {}
unsafe impl Sync for RegisterBit {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_reads_and_writes_through() {
        let mut backing: u16 = 0x0123;
        let mut reg = unsafe { Register::<u16>::new(&mut backing as *mut u16 as usize) };

        assert_eq!(reg.read_register(), 0x0123);
        reg.write_register(0x03FF);
        assert_eq!(reg.read_register(), 0x03FF);
    }

    #[test]
    fn register_bit_preserves_other_bits() {
        let mut backing: u8 = 0b1001_0001;
        let mut bit = unsafe { RegisterBit::new(&mut backing as *mut u8 as usize, 5) };

        assert!(!bit.is_interrupt_enabled());
        bit.enable_interrupt();
        assert!(bit.is_interrupt_enabled());
        bit.disable_interrupt();
        assert!(!bit.is_interrupt_enabled());

        bit.trigger();
        assert!(bit.is_interrupt_enabled());
        drop(bit);
        assert_eq!(backing, 0b1011_0001);
    }
}
