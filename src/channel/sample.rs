//! Sampling channel - ADC conversion results, one per request.
//!
//! The foreground starts a conversion, the conversion-complete interrupt
//! queues the result, and the foreground reads it, blocking as the receive
//! channel does.  Nothing is ever sent to the peripheral through the ring,
//! so there is no transmit side.
//!
//! Results may be 8-bit (left adjusted, high byte only) or 10-bit (in a
//! `u16`), chosen by the unit type.  See [`crate::config::AdcMode`].
//!
//! [`Status`] mirrors whether a requested conversion has completed.  It is
//! set by [`Sampler::start_conversion()`] and cleared by the interrupt, so
//! unlike the ring indices it has two writers.  It is informational: reads
//! are driven by the ring, never by the status.

// Copyright (C) 2025 Piers Finlayson <piers@piers.rocks>
//
// MIT License

#[allow(unused_imports)]
use log::{debug, error, info, trace, warn};

use core::sync::atomic::{AtomicBool, Ordering};

use crate::channel::{ConversionInterrupt, TryRead, Wait, poll_within};
use crate::config::AdcMode;
use crate::io::{SourceRegister, Trigger};
use crate::ring::{Consumer, Producer, RingBuffer, Unit};
use crate::{Error, Result};

/// Conversion status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// No conversion in progress, the last requested result is queued
    Ready,
    /// Conversion requested, result not yet queued
    Pending,
}

/// Sampling channel, holding the ring and status shared by its two halves.
pub struct SampleChannel<T: Unit, const N: usize> {
    ring: RingBuffer<T, N>,
    pending: AtomicBool,
}

impl<T: Unit, const N: usize> SampleChannel<T, N> {
    /// Create a new, empty channel.  `const`, so it can be a `static`.
    pub const fn new() -> Self {
        Self {
            ring: RingBuffer::new(),
            pending: AtomicBool::new(false),
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
    /// - `trigger` - The ADC start-conversion bit
    /// - `register` - The ADC result register the interrupt reads from
    pub fn split<C: Trigger, R: SourceRegister<T>>(
        &mut self,
        trigger: C,
        register: R,
    ) -> (Sampler<'_, C, T, N>, SampleInterrupt<'_, R, T, N>) {
        *self.pending.get_mut() = false;
        let (producer, consumer) = self.ring.split();
        let pending = &self.pending;

        debug!(
            "Created sampling channel, capacity {N}, {:?}",
            AdcMode::of::<T>()
        );

        (
            Sampler {
                consumer,
                trigger,
                pending,
            },
            SampleInterrupt {
                producer,
                register,
                pending,
            },
        )
    }
}

impl<T: Unit, const N: usize> Default for SampleChannel<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Foreground half of a sampling channel.
pub struct Sampler<'a, C: Trigger, T: Unit, const N: usize> {
    consumer: Consumer<'a, T, N>,
    trigger: C,
    pending: &'a AtomicBool,
}

impl<C: Trigger, T: Unit, const N: usize> Sampler<'_, C, T, N> {
    /// Request a conversion.  The result is queued by the interrupt.
    pub fn start_conversion(&mut self) {
        // Before triggering, so a fast conversion can't be overtaken
        self.pending.store(true, Ordering::Release);
        self.trigger.trigger();
    }

    /// Request a conversion and wait for the oldest queued result.
    ///
    /// If results from earlier requests are still unread, the oldest of
    /// those is returned, not the one just requested.
    pub fn convert(&mut self) -> T {
        self.start_conversion();
        self.read_blocking()
    }

    /// Take the oldest queued result, spinning until one arrives.
    ///
    /// Never returns if no conversion was requested, or the conversion
    /// interrupt never fires.  See [`Self::read_within()`] for a bounded wait.
    pub fn read_blocking(&mut self) -> T {
        self.consumer.consume()
    }

    /// Take the oldest queued result, spinning for at most `wait`.
    ///
    /// Returns [`Error::Timeout`] if nothing arrived in time.
    pub fn read_within(&mut self, wait: Wait) -> Result<T> {
        poll_within(wait, Error::NoData, || self.try_read())
    }

    /// Status of the last requested conversion.
    pub fn status(&self) -> Status {
        if self.pending.load(Ordering::Acquire) {
            Status::Pending
        } else {
            Status::Ready
        }
    }

    /// Resolution of the results in this channel.
    pub fn mode(&self) -> AdcMode {
        AdcMode::of::<T>()
    }

    /// Whether there are no unread results.
    pub fn is_empty(&self) -> bool {
        self.consumer.is_empty()
    }
}

impl<C: Trigger, T: Unit, const N: usize> TryRead<T> for Sampler<'_, C, T, N> {
    fn try_read(&mut self) -> Result<T> {
        self.consumer.try_consume().ok_or(Error::NoData)
    }
}

/// Interrupt half of a sampling channel.
pub struct SampleInterrupt<'a, R: SourceRegister<T>, T: Unit, const N: usize> {
    producer: Producer<'a, T, N>,
    register: R,
    pending: &'a AtomicBool,
}

impl<R: SourceRegister<T>, T: Unit, const N: usize> SampleInterrupt<'_, R, T, N> {
    /// The result register this half reads from.
    pub fn register(&self) -> &R {
        &self.register
    }

    /// Mutable access to the result register.
    pub fn register_mut(&mut self) -> &mut R {
        &mut self.register
    }
}

impl<R: SourceRegister<T>, T: Unit, const N: usize> ConversionInterrupt
    for SampleInterrupt<'_, R, T, N>
{
    fn on_conversion_complete(&mut self) {
        let value = self.register.read_register();

        if self.producer.is_full() {
            warn!("Sample overrun, unread results overwritten");
        }
        self.producer.produce(value);

        // After producing, so a reader seeing Ready finds the result queued
        self.pending.store(false, Ordering::Release);
    }
}
