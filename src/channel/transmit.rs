//! Transmit channel - the foreground produces, the interrupt consumes.
//!
//! The transmit-ready interrupt fires whenever the peripheral can accept
//! another unit, which on an idle line is all the time.  The channel therefore
//! gates that interrupt source:
//!
//! ```text
//! DISABLED (idle) --(write)--> ENABLED --(interrupt finds ring empty)--> DISABLED
//! ```
//!
//! A write queues the unit and arms the interrupt.  Each interrupt sends one
//! unit, which re-triggers the interrupt once the hardware has finished with
//! it.  When the interrupt finds nothing to send it disarms itself rather than
//! spinning.
//!
//! Unlike the receive channel, writes never overwrite queued units: they wait
//! for the interrupt to free a slot.
//!
//! The interrupt half relies on running to completion.  If the foreground
//! could run between its emptiness check and disarming the gate, a unit
//! written in that window would sit in the ring with the interrupt disarmed
//! until the next write.

// Copyright (C) 2025 Piers Finlayson <piers@piers.rocks>
//
// MIT License

#[allow(unused_imports)]
use log::{debug, error, info, trace, warn};

use crate::channel::{TransmitInterrupt, TryWrite, Wait, poll_within};
use crate::io::{InterruptSource, SinkRegister};
use crate::ring::{Consumer, Producer, RingBuffer, Unit};
use crate::{Error, Result};

/// Transmit channel, holding the ring shared by its two halves.
pub struct TxChannel<T: Unit, const N: usize> {
    ring: RingBuffer<T, N>,
}

impl<T: Unit, const N: usize> TxChannel<T, N> {
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

    /// Flush the channel, disarm the transmit-ready interrupt, and split the
    /// channel into its foreground and interrupt halves.
    ///
    /// Arguments:
    /// - `register` - The peripheral register the interrupt writes units to
    /// - `gate` - The transmit-ready interrupt enable, shared by both halves
    pub fn split<'a, W: SinkRegister<T>, G: InterruptSource>(
        &'a mut self,
        register: W,
        gate: &'a G,
    ) -> (TxWriter<'a, G, T, N>, TxInterrupt<'a, W, G, T, N>) {
        gate.disable_interrupt();
        let (producer, consumer) = self.ring.split();
        debug!("Created transmit channel, capacity {N}");
        (
            TxWriter { producer, gate },
            TxInterrupt {
                consumer,
                register,
                gate,
            },
        )
    }
}

impl<T: Unit, const N: usize> Default for TxChannel<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Foreground half of a transmit channel.
pub struct TxWriter<'a, G: InterruptSource, T: Unit, const N: usize> {
    producer: Producer<'a, T, N>,
    gate: &'a G,
}

impl<G: InterruptSource, T: Unit, const N: usize> TxWriter<'_, G, T, N> {
    /// Queue a unit for transmission, spinning while the ring is full.
    ///
    /// Interrupts must be enabled, or a full ring never drains and this never
    /// returns.  See [`Self::write_within()`] for a bounded wait.
    pub fn write(&mut self, value: T) {
        while self.producer.is_full() {
            core::hint::spin_loop();
        }
        self.queue(value);
    }

    /// Queue a unit for transmission, spinning for at most `wait` while the
    /// ring is full.
    ///
    /// Returns [`Error::Timeout`] if no slot was freed in time, in which case
    /// the unit was not queued.
    pub fn write_within(&mut self, value: T, wait: Wait) -> Result<()> {
        poll_within(wait, Error::Busy, || self.try_write(value))
    }

    /// Spin until the interrupt has handed every queued unit to the
    /// peripheral.
    ///
    /// The peripheral may still be shifting out the last unit.
    pub fn flush(&mut self) {
        while !self.producer.is_empty() {
            core::hint::spin_loop();
        }
    }

    /// As [`Self::flush()`], giving up after `wait` with [`Error::Timeout`].
    pub fn flush_within(&mut self, wait: Wait) -> Result<()> {
        poll_within(wait, Error::Busy, || {
            if self.producer.is_empty() {
                Ok(())
            } else {
                Err(Error::Busy)
            }
        })
    }

    /// Whether a write now would have to wait.
    pub fn is_full(&self) -> bool {
        self.producer.is_full()
    }

    /// Whether every queued unit has been handed to the peripheral.
    pub fn is_empty(&self) -> bool {
        self.producer.is_empty()
    }

    /// Number of queued units.
    pub fn len(&self) -> usize {
        self.producer.len()
    }

    fn queue(&mut self, value: T) {
        self.producer.produce(value);

        // Unconditionally, as the interrupt may have disarmed itself since the
        // last write
        self.gate.enable_interrupt();
    }
}

impl<G: InterruptSource, T: Unit, const N: usize> TryWrite<T> for TxWriter<'_, G, T, N> {
    fn try_write(&mut self, value: T) -> Result<()> {
        if self.producer.is_full() {
            return Err(Error::Busy);
        }
        self.queue(value);
        Ok(())
    }
}

/// Interrupt half of a transmit channel.
pub struct TxInterrupt<'a, W: SinkRegister<T>, G: InterruptSource, T: Unit, const N: usize> {
    consumer: Consumer<'a, T, N>,
    register: W,
    gate: &'a G,
}

impl<W: SinkRegister<T>, G: InterruptSource, T: Unit, const N: usize> TxInterrupt<'_, W, G, T, N> {
    /// The transmit register this half writes to.
    pub fn register(&self) -> &W {
        &self.register
    }

    /// Mutable access to the transmit register.
    pub fn register_mut(&mut self) -> &mut W {
        &mut self.register
    }
}

impl<W: SinkRegister<T>, G: InterruptSource, T: Unit, const N: usize> TransmitInterrupt
    for TxInterrupt<'_, W, G, T, N>
{
    fn on_transmit_ready(&mut self) {
        match self.consumer.try_consume() {
            Some(value) => self.register.write_register(value),
            None => {
                self.gate.disable_interrupt();
                trace!("Transmit ring drained, interrupt disarmed");
            }
        }
    }
}
