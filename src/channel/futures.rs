//! Async foreground wrappers - an alternative to spinning.
//!
//! [`Polled`] wraps the foreground half of any channel and, instead of
//! spinning while the other context catches up, awaits an
//! application-supplied [`AsyncDelay`] between polls.  Dropping a pending
//! read or write cancels it without losing or duplicating a unit, as each
//! poll either completes fully or does nothing.

// Copyright (C) 2025 Piers Finlayson <piers@piers.rocks>
//
// MIT License

use alloc::boxed::Box;
use async_trait::async_trait;
use core::marker::PhantomData;
#[allow(unused_imports)]
use log::{debug, error, info, trace, warn};

use crate::channel::{TryRead, TryWrite};
use crate::ring::Unit;
use crate::{Error, Result};

/// Yield delay for async polling loops.
///
/// Application must provide an implementation of this trait, so the wrappers
/// can yield while waiting for the interrupt side of a channel.
///
/// This trait keeps `isr-ring` free of any specific async runtime.
///
/// Example:
///
/// ```rust,ignore
/// use embassy_time::{Duration, Timer};
/// struct Delay;
/// impl AsyncDelay for Delay {
///     async fn delay() {
///         Timer::after(Duration::from_micros(100)).await;
///     }
/// }
/// ```
pub trait AsyncDelay {
    fn delay() -> impl Future<Output = ()>;
}

/// Async read from the foreground half of a channel.
#[async_trait(?Send)]
pub trait AsyncRead<T: Unit> {
    /// Take the oldest unread unit, waiting for one to arrive.
    async fn read(&mut self) -> Result<T>;
}

/// Async write to the foreground half of a channel.
#[async_trait(?Send)]
pub trait AsyncWrite<T: Unit> {
    /// Queue a unit, waiting for a free slot.
    async fn write(&mut self, value: T) -> Result<()>;

    /// Queue every unit in `values`, in order.
    async fn write_all(&mut self, values: &[T]) -> Result<()> {
        for value in values {
            self.write(*value).await?;
        }
        Ok(())
    }
}

/// Channel half wrapped to wait asynchronously, using delay `D` between
/// polls.
///
/// ```rust,ignore
/// let (reader, rx_interrupt) = RX.split(udr0);
/// let mut reader = Polled::<_, Delay>::new(reader);
/// let byte = reader.read().await?;
/// ```
pub struct Polled<C, D: AsyncDelay> {
    inner: C,
    _delay: PhantomData<D>,
}

impl<C, D: AsyncDelay> Polled<C, D> {
    /// Wrap a channel half.
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            _delay: PhantomData,
        }
    }

    /// The wrapped channel half, for its blocking and status methods.
    pub fn inner(&mut self) -> &mut C {
        &mut self.inner
    }

    /// Unwrap the channel half.
    pub fn into_inner(self) -> C {
        self.inner
    }
}

#[async_trait(?Send)]
impl<T: Unit, C: TryRead<T>, D: AsyncDelay> AsyncRead<T> for Polled<C, D> {
    async fn read(&mut self) -> Result<T> {
        loop {
            match self.inner.try_read() {
                Err(Error::NoData) => D::delay().await,
                result => return result,
            }
        }
    }
}

#[async_trait(?Send)]
impl<T: Unit, C: TryWrite<T>, D: AsyncDelay> AsyncWrite<T> for Polled<C, D> {
    async fn write(&mut self, value: T) -> Result<()> {
        loop {
            match self.inner.try_write(value) {
                Err(Error::Busy) => D::delay().await,
                result => return result,
            }
        }
    }
}
