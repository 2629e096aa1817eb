//! Channels between an interrupt handler and foreground code.
//!
//! See [`crate`] for a description of how the channels fit together.
//!
//! Each channel owns one [`RingBuffer`](crate::ring::RingBuffer) and splits
//! into two halves:
//! - a foreground half, polled or blocked on by application code
//! - an interrupt half, implementing one of the event traits below, to be
//!   called from the matching interrupt vector

// Copyright (C) 2025 Piers Finlayson <piers@piers.rocks>
//
// MIT License

#[cfg(feature = "async")]
pub mod futures;
pub mod receive;
pub mod sample;
pub mod transmit;

#[cfg(feature = "async")]
pub use futures::{AsyncDelay, AsyncRead, AsyncWrite, Polled};
pub use receive::{RxChannel, RxInterrupt, RxReader};
pub use sample::{SampleChannel, SampleInterrupt, Sampler, Status};
pub use transmit::{TxChannel, TxInterrupt, TxWriter};

#[allow(unused_imports)]
use log::{debug, error, info, trace, warn};

use crate::ring::Unit;
use crate::{Error, Result};

/// Handler for a peripheral's "data received" interrupt.
///
/// Must be called from that interrupt only.  Handlers run to completion and
/// are not re-entered, which `&mut self` reflects: the handler cannot be
/// called again while a call is in progress.
pub trait ReceiveInterrupt {
    /// Move one received unit from the peripheral into the channel.
    fn on_receive_ready(&mut self);
}

/// Handler for a peripheral's "transmit register empty" interrupt.
///
/// Must be called from that interrupt only.  See [`ReceiveInterrupt`] for
/// the run-to-completion contract.
pub trait TransmitInterrupt {
    /// Move one queued unit from the channel to the peripheral, or disarm the
    /// interrupt if there is nothing to send.
    fn on_transmit_ready(&mut self);
}

/// Handler for an ADC's "conversion complete" interrupt.
///
/// Must be called from that interrupt only.  See [`ReceiveInterrupt`] for
/// the run-to-completion contract.
pub trait ConversionInterrupt {
    /// Move the conversion result from the peripheral into the channel.
    fn on_conversion_complete(&mut self);
}

/// Non-blocking read from the foreground half of a channel.
pub trait TryRead<T: Unit> {
    /// Take the oldest unread unit.
    ///
    /// Returns [`Error::NoData`] if nothing is available yet.
    fn try_read(&mut self) -> Result<T>;
}

/// Non-blocking write to the foreground half of a channel.
pub trait TryWrite<T: Unit> {
    /// Queue a unit.
    ///
    /// Returns [`Error::Busy`] if there is no free slot yet.
    fn try_write(&mut self, value: T) -> Result<()>;
}

/// How long a foreground operation waits for the other context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wait {
    /// Spin until the operation completes.  Hangs if the peripheral stalls.
    Forever,
    /// Give up with [`Error::Timeout`] after this many further polls.
    Spins(u32),
}

// Helper functions

/// Repeat `attempt` while it fails with `would_block`, for at most `wait`.
fn poll_within<R>(
    wait: Wait,
    would_block: Error,
    mut attempt: impl FnMut() -> Result<R>,
) -> Result<R> {
    let mut remaining = match wait {
        Wait::Forever => None,
        Wait::Spins(spins) => Some(spins),
    };

    loop {
        match attempt() {
            Err(err) if err == would_block => {}
            result => return result,
        }

        match remaining.as_mut() {
            Some(0) => {
                trace!("Gave up waiting after {wait:?}, {would_block:?}");
                return Err(Error::Timeout);
            }
            Some(spins) => *spins -= 1,
            None => {}
        }

        core::hint::spin_loop();
    }
}
