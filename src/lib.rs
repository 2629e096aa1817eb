//! Interrupt-driven ring buffer channels for bare-metal peripheral drivers.
//!
//! This crate provides the buffering core of interrupt-driven UART and ADC
//! drivers on small microcontrollers (it was designed against the ATmega328P,
//! but nothing here is AVR specific).  A hardware interrupt moves one unit
//! between a peripheral register and a ring buffer, while foreground code
//! consumes or produces units on the other side of that ring.  There is no OS,
//! no locks, and no compare-and-swap: each ring index has exactly one writer.
//!
//! `no_std`.  Requires `alloc` for the async traits only.
//!
//! ## Architecture
//!
//! Every channel is a single [`ring::RingBuffer`] with two indices:
//! - **head** - index of the most recently written slot, owned by the producer
//! - **tail** - index of the most recently read slot, owned by the consumer
//!
//! The producer writes a slot, then publishes it by advancing `head`.  The
//! consumer observes `head != tail`, reads the next slot, then advances `tail`.
//! Splitting a ring hands out one [`ring::Producer`] and one
//! [`ring::Consumer`], so the single writer rule is enforced by ownership
//! rather than convention.
//!
//! Three channel types are built on the ring:
//!
//! | Channel | Producer | Consumer |
//! |---|---|---|
//! | [`channel::RxChannel`] | receive interrupt | foreground read |
//! | [`channel::TxChannel`] | foreground write | transmit-ready interrupt |
//! | [`channel::SampleChannel`] | conversion-complete interrupt | foreground read |
//!
//! Each channel splits into a foreground half and an interrupt half.  The
//! interrupt halves implement one trait per hardware event
//! ([`channel::ReceiveInterrupt`], [`channel::TransmitInterrupt`],
//! [`channel::ConversionInterrupt`]), which the application calls from its
//! interrupt vectors.
//!
//! The transmit channel gates its own interrupt source: a write arms it, and
//! the interrupt disarms it once there is nothing left to send.  This is the
//! backpressure mechanism that stops the transmit-ready interrupt from firing
//! forever on an idle line.
//!
//! ## Overflow policy
//!
//! - Receive and sampling rings never refuse a unit.  If the foreground falls
//!   behind, the interrupt wraps `head` over unread data and it is lost.
//! - Transmit writes wait for a free slot instead, so no queued output is lost.
//!
//! ## Portability
//!
//! The lock-free property relies on each index being a single atomically
//! accessed byte, and on there being exactly one producer and one consumer
//! context per ring.  Indices are `AtomicU8`, which limits capacity to 256.
//! Porting the scheme to a target where this does not hold, or sharing a
//! half between more than one context, needs explicit synchronisation.
//!
//! The forever-blocking foreground calls spin until the other context makes
//! progress.  A peripheral that never interrupts hangs them.  Use the `try_*`
//! or `*_within` variants, or the async wrappers, where that matters.
//!
//! ## Modules
//!
//! - [`ring`] - The generic single-producer single-consumer ring buffer
//! - [`channel`] - Receive, transmit and sampling channels, and the
//!   interrupt event traits
//! - [`uart`] - A full duplex UART built from one receive and one transmit
//!   channel
//! - [`io`] - Peripheral register traits, and volatile MMIO implementations
//! - [`config`] - Default capacities and ADC resolution
//!
//! ## Getting Started
//!
//! ```rust,ignore
//! use isr_ring::channel::{ReceiveInterrupt, TransmitInterrupt};
//! use isr_ring::uart::Usart;
//!
//! static mut USART: Usart<8, 8> = Usart::new();
//!
//! // At initialization, split the UART into foreground and interrupt halves,
//! // store the interrupt halves where the vectors can reach them, and call
//! // `on_receive_ready()` / `on_transmit_ready()` from the vectors.
//! let mut parts = unsafe { (*core::ptr::addr_of_mut!(USART)).split(udr_in, udr_out, &UDRIE) };
//! parts.writer.write(b'H');
//! let byte = parts.reader.read_blocking();
//! ```
//!
//! ## Features
//!
//! Default features:
//! - `async` - Enable the async foreground wrappers in [`channel::futures`],
//!   which require `alloc`.
//!
//! Compile with `--no-default-features` for targets without an allocator.

// Copyright (C) 2025 Piers Finlayson <piers@piers.rocks>
//
// MIT License

#![cfg_attr(not(test), no_std)]

#[cfg(feature = "async")]
extern crate alloc;

pub mod channel;
pub mod config;
pub mod io;
pub mod ring;
pub mod uart;

/// Channel errors
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Error {
    /// No data available
    NoData,
    /// Buffer full, no space to queue the unit
    Busy,
    /// Wait budget exhausted
    Timeout,
}

/// Type to represent the result of a channel operation
pub type Result<T> = core::result::Result<T, Error>;
