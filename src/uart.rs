//! Full duplex UART built from two channels:
//! - Receive channel: the receive interrupt produces, the foreground reads
//! - Transmit channel: the foreground writes, the transmit-ready interrupt
//!   sends
//!
//! The two channels are independent.  Bytes are in order within each
//! direction, with no ordering between directions.
//!
//! On an AVR USART the receive and transmit halves share one data register
//! (reads return received bytes, writes start a transmission), so the same
//! address is usually passed as both registers.
//!
//! ```rust,ignore
//! use isr_ring::config::atmega328p::{UCSR0B, UDR0, UDRIE0};
//! use isr_ring::io::{Register, RegisterBit};
//! use isr_ring::uart::Usart;
//!
//! static UDRIE: RegisterBit = unsafe { RegisterBit::new(UCSR0B, UDRIE0) };
//! static mut USART: Usart<8, 8> = Usart::new();
//!
//! let usart = unsafe { &mut *core::ptr::addr_of_mut!(USART) };
//! let parts = usart.split(
//!     unsafe { Register::new(UDR0) },
//!     unsafe { Register::new(UDR0) },
//!     &UDRIE,
//! );
//! // Move parts.rx_interrupt and parts.tx_interrupt to where the USART_RX and
//! // USART_UDRE vectors can reach them, then use parts.reader / parts.writer.
//! ```

// Copyright (C) 2025 Piers Finlayson <piers@piers.rocks>
//
// MIT License

#[allow(unused_imports)]
use log::{debug, error, info, trace, warn};

use crate::channel::{RxChannel, RxInterrupt, RxReader, TxChannel, TxInterrupt, TxWriter};
use crate::io::{InterruptSource, SinkRegister, SourceRegister};

/// A UART's receive and transmit channels, with `RX` and `TX` byte slots.
pub struct Usart<const RX: usize, const TX: usize> {
    rx: RxChannel<u8, RX>,
    tx: TxChannel<u8, TX>,
}

/// The four halves of a split [`Usart`].
pub struct UsartParts<'a, R, W, G, const RX: usize, const TX: usize>
where
    R: SourceRegister<u8>,
    W: SinkRegister<u8>,
    G: InterruptSource,
{
    /// Foreground receive half
    pub reader: RxReader<'a, u8, RX>,
    /// Foreground transmit half
    pub writer: TxWriter<'a, G, u8, TX>,
    /// Receive interrupt half, for the receive-complete vector
    pub rx_interrupt: RxInterrupt<'a, R, u8, RX>,
    /// Transmit interrupt half, for the data-register-empty vector
    pub tx_interrupt: TxInterrupt<'a, W, G, u8, TX>,
}

impl<const RX: usize, const TX: usize> Usart<RX, TX> {
    /// Create a new UART with both rings empty.  `const`, so it can be a
    /// `static`.
    pub const fn new() -> Self {
        Self {
            rx: RxChannel::new(),
            tx: TxChannel::new(),
        }
    }

    /// Receive and transmit ring capacities.
    pub const fn capacities(&self) -> (usize, usize) {
        (RX, TX)
    }

    /// Flush both rings, disarm the transmit-ready interrupt, and split the
    /// UART into its foreground and interrupt halves.
    ///
    /// Arguments:
    /// - `rx_register` - Data register the receive interrupt reads
    /// - `tx_register` - Data register the transmit interrupt writes
    /// - `tx_gate` - Transmit-ready interrupt enable
    pub fn split<'a, R, W, G>(
        &'a mut self,
        rx_register: R,
        tx_register: W,
        tx_gate: &'a G,
    ) -> UsartParts<'a, R, W, G, RX, TX>
    where
        R: SourceRegister<u8>,
        W: SinkRegister<u8>,
        G: InterruptSource,
    {
        let (reader, rx_interrupt) = self.rx.split(rx_register);
        let (writer, tx_interrupt) = self.tx.split(tx_register, tx_gate);

        debug!("Created USART, rx capacity {RX}, tx capacity {TX}");

        UsartParts {
            reader,
            writer,
            rx_interrupt,
            tx_interrupt,
        }
    }
}

impl<const RX: usize, const TX: usize> Default for Usart<RX, TX> {
    fn default() -> Self {
        Self::new()
    }
}
