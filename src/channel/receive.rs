//! Receive channel - the interrupt produces, the foreground consumes.
//!
//! State of the channel as seen by the foreground:
//!
//! ```text
//! IDLE --(receive interrupt)--> DATA_BUFFERED --(read)--> IDLE or DATA_BUFFERED
//! ```
//!
//! The receive interrupt never waits and never refuses a unit.  If the
//! foreground falls behind by a whole ring, unread units are overwritten.

// Copyright (C) 2025 Piers Finlayson <piers@piers.rocks>
//
// MIT License

#[allow(unused_imports)]
use log::{debug, error, info, trace, warn};

use crate::channel::{ReceiveInterrupt, TryRead, Wait, poll_within};
use crate::io::SourceRegister;
use crate::ring::{Consumer, Producer, RingBuffer, Unit};
use crate::{Error, Result};

/// Receive channel, holding the ring shared by its two halves.
pub struct RxChannel<T: Unit, const N: usize> {
    ring: RingBuffer<T, N>,
}

impl<T: Unit, const N: usize> RxChannel<T, N> {
    /// Create a new, empty channel.  `const`, so it can be a `static`.
    pub const fn new() -> Self {
        Self {
            ring: RingBuffer::new(),
        }
    }

    /// Number of slots in the ring.  At most `capacity() - 1` units can be
    /// pending at once.
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Flush the channel and split it into its foreground and interrupt
    /// halves.
    ///
    /// Arguments:
    /// - `register` - The peripheral register the interrupt reads received
    ///   units from
    pub fn split<R: SourceRegister<T>>(
        &mut self,
        register: R,
    ) -> (RxReader<'_, T, N>, RxInterrupt<'_, R, T, N>) {
        let (producer, consumer) = self.ring.split();
        debug!("Created receive channel, capacity {N}");
        (
            RxReader { consumer },
            RxInterrupt { producer, register },
        )
    }
}

impl<T: Unit, const N: usize> Default for RxChannel<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Foreground half of a receive channel.
pub struct RxReader<'a, T: Unit, const N: usize> {
    consumer: Consumer<'a, T, N>,
}

impl<T: Unit, const N: usize> RxReader<'_, T, N> {
    /// Take the oldest received unit, spinning until one arrives.
    ///
    /// Interrupts must be enabled, or this never returns.  It also never
    /// returns if the peripheral stops receiving; see
    /// [`Self::read_within()`] for a bounded wait.
    pub fn read_blocking(&mut self) -> T {
        self.consumer.consume()
    }

    /// Take the oldest received unit, spinning for at most `wait`.
    ///
    /// Returns [`Error::Timeout`] if nothing arrived in time.
    pub fn read_within(&mut self, wait: Wait) -> Result<T> {
        poll_within(wait, Error::NoData, || self.try_read())
    }

    /// Whether there are no unread units.
    pub fn is_empty(&self) -> bool {
        self.consumer.is_empty()
    }

    /// Number of unread units.
    pub fn len(&self) -> usize {
        self.consumer.len()
    }
}

impl<T: Unit, const N: usize> TryRead<T> for RxReader<'_, T, N> {
    fn try_read(&mut self) -> Result<T> {
        self.consumer.try_consume().ok_or(Error::NoData)
    }
}

/// Interrupt half of a receive channel.
pub struct RxInterrupt<'a, R: SourceRegister<T>, T: Unit, const N: usize> {
    producer: Producer<'a, T, N>,
    register: R,
}

impl<R: SourceRegister<T>, T: Unit, const N: usize> RxInterrupt<'_, R, T, N> {
    /// The receive register this half reads from.
    pub fn register(&self) -> &R {
        &self.register
    }

    /// Mutable access to the receive register.
    pub fn register_mut(&mut self) -> &mut R {
        &mut self.register
    }

    /// Whether the next received unit will overwrite unread data.
    pub fn would_overrun(&self) -> bool {
        self.producer.is_full()
    }
}

impl<R: SourceRegister<T>, T: Unit, const N: usize> ReceiveInterrupt for RxInterrupt<'_, R, T, N> {
    fn on_receive_ready(&mut self) {
        // Always read, as reading is what clears the peripheral's interrupt
        let value = self.register.read_register();

        if self.producer.is_full() {
            warn!("Receive overrun, unread data overwritten");
        }
        self.producer.produce(value);
    }
}
