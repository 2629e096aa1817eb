//! Single-producer, single-consumer ring buffer.
//!
//! The buffer is shared between two execution contexts, typically an
//! interrupt handler and foreground code.  [`RingBuffer::split()`] hands out
//! exactly one [`Producer`], which alone advances `head`, and one
//! [`Consumer`], which alone advances `tail`.
//!
//! Capacity must be a power of two between 2 and 256, so that index
//! wraparound is a mask and each index fits in one atomically accessed byte.
//! Anything else fails to compile:
//!
//! ```compile_fail
//! let ring = isr_ring::ring::RingBuffer::<u8, 6>::new();
//! ```
//!
//! One slot is always left unused, so a ring of capacity `N` holds at most
//! `N - 1` unread units.  [`Producer::produce()`] does not check for this.
//! Producing into a full ring moves `head` onto unread data, which is lost.
//! Callers that must not lose data check [`Producer::is_full()`] first.

// Copyright (C) 2025 Piers Finlayson <piers@piers.rocks>
//
// MIT License

#[allow(unused_imports)]
use log::{debug, error, info, trace, warn};

#[cfg(target_has_atomic = "16")]
use core::sync::atomic::AtomicU16;
use core::sync::atomic::{AtomicU8, Ordering};

/// A unit of data that can be moved through a [`RingBuffer`].
///
/// Each slot is stored in an atomic cell of the unit's width, so a slot read
/// racing an overwrite returns either the old or the new unit, never a torn
/// one.
pub trait Unit: Copy + Send + Sync + 'static {
    /// Storage cell for one slot
    type Slot: Send + Sync;

    /// Initial value of every slot
    #[allow(clippy::declare_interior_mutable_const)]
    const EMPTY: Self::Slot;

    /// Width of this unit in bits
    const BITS: u32;

    /// Read a slot
    fn load(slot: &Self::Slot) -> Self;

    /// Write a slot
    fn store(slot: &Self::Slot, value: Self);
}

impl Unit for u8 {
    type Slot = AtomicU8;
    #[allow(clippy::declare_interior_mutable_const)]
    const EMPTY: AtomicU8 = AtomicU8::new(0);
    const BITS: u32 = 8;

    #[inline]
    fn load(slot: &AtomicU8) -> Self {
        slot.load(Ordering::Relaxed)
    }

    #[inline]
    fn store(slot: &AtomicU8, value: Self) {
        slot.store(value, Ordering::Relaxed)
    }
}

#[cfg(target_has_atomic = "16")]
impl Unit for u16 {
    type Slot = AtomicU16;
    #[allow(clippy::declare_interior_mutable_const)]
    const EMPTY: AtomicU16 = AtomicU16::new(0);
    const BITS: u32 = 16;

    #[inline]
    fn load(slot: &AtomicU16) -> Self {
        slot.load(Ordering::Relaxed)
    }

    #[inline]
    fn store(slot: &AtomicU16, value: Self) {
        slot.store(value, Ordering::Relaxed)
    }
}

/// Fixed capacity circular queue of `N` units of type `T`.
///
/// Create it at initialization (it can live in a `static`), then
/// [`split()`](Self::split) it to get the producer and consumer halves.
pub struct RingBuffer<T: Unit, const N: usize> {
    slots: [T::Slot; N],
    head: AtomicU8,
    tail: AtomicU8,
}

impl<T: Unit, const N: usize> RingBuffer<T, N> {
    const VALID_CAPACITY: () = assert!(
        N.is_power_of_two() && N >= 2 && N <= 256,
        "ring capacity must be a power of two between 2 and 256"
    );

    const MASK: u8 = (N - 1) as u8;

    /// Create an empty ring with both indices at zero.
    pub const fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::VALID_CAPACITY;

        Self {
            slots: [const { T::EMPTY }; N],
            head: AtomicU8::new(0),
            tail: AtomicU8::new(0),
        }
    }

    /// Number of slots in the ring.  At most `capacity() - 1` units can be
    /// pending at once.
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Whether there are no unread units.
    pub fn is_empty(&self) -> bool {
        self.head.load(Ordering::Acquire) == self.tail.load(Ordering::Acquire)
    }

    /// Flush the ring and split it into its producer and consumer halves.
    ///
    /// Takes `&mut self`, so no other half can exist while this runs, and
    /// at most one of each exists while the returned halves are alive.
    pub fn split(&mut self) -> (Producer<'_, T, N>, Consumer<'_, T, N>) {
        *self.head.get_mut() = 0;
        *self.tail.get_mut() = 0;

        debug!("Split ring of {N} {}-bit slots", T::BITS);

        let ring: &Self = self;
        (Producer { ring }, Consumer { ring })
    }

    #[inline]
    const fn next(index: u8) -> u8 {
        index.wrapping_add(1) & Self::MASK
    }

    fn pending(&self) -> usize {
        let head = self.head.load(Ordering::Acquire);
        let tail = self.tail.load(Ordering::Acquire);
        (head.wrapping_sub(tail) & Self::MASK) as usize
    }
}

impl<T: Unit, const N: usize> Default for RingBuffer<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Producer half of a [`RingBuffer`].  The only writer of `head`.
pub struct Producer<'a, T: Unit, const N: usize> {
    ring: &'a RingBuffer<T, N>,
}

impl<T: Unit, const N: usize> Producer<'_, T, N> {
    /// Write `value` into the slot after `head`, then publish it by
    /// advancing `head`.
    ///
    /// Never blocks and never fails.  If the ring is full this moves `head`
    /// onto unread data, which is silently lost.
    pub fn produce(&mut self, value: T) {
        let head = RingBuffer::<T, N>::next(self.ring.head.load(Ordering::Relaxed));
        T::store(&self.ring.slots[head as usize], value);
        self.ring.head.store(head, Ordering::Release);
    }

    /// Whether producing now would overwrite an unread unit.
    pub fn is_full(&self) -> bool {
        let head = self.ring.head.load(Ordering::Relaxed);
        RingBuffer::<T, N>::next(head) == self.ring.tail.load(Ordering::Acquire)
    }

    /// Whether the consumer has read everything produced so far.
    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    /// Number of unread units.
    pub fn len(&self) -> usize {
        self.ring.pending()
    }

    /// Index of the most recently written slot.
    pub fn head(&self) -> u8 {
        self.ring.head.load(Ordering::Relaxed)
    }
}

/// Consumer half of a [`RingBuffer`].  The only writer of `tail`.
pub struct Consumer<'a, T: Unit, const N: usize> {
    ring: &'a RingBuffer<T, N>,
}

impl<T: Unit, const N: usize> Consumer<'_, T, N> {
    /// Take the oldest unread unit, or `None` if the ring is empty.
    pub fn try_consume(&mut self) -> Option<T> {
        let tail = self.ring.tail.load(Ordering::Relaxed);
        if self.ring.head.load(Ordering::Acquire) == tail {
            return None;
        }

        let tail = RingBuffer::<T, N>::next(tail);
        let value = T::load(&self.ring.slots[tail as usize]);

        // Hand the slot back to the producer only once it has been read
        self.ring.tail.store(tail, Ordering::Release);

        Some(value)
    }

    /// Take the oldest unread unit, spinning until the producer publishes one.
    ///
    /// Never returns if the producer never runs.
    pub fn consume(&mut self) -> T {
        loop {
            if let Some(value) = self.try_consume() {
                return value;
            }
            core::hint::spin_loop();
        }
    }

    /// Whether there are no unread units.
    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    /// Number of unread units.
    pub fn len(&self) -> usize {
        self.ring.pending()
    }

    /// Index of the most recently read slot.
    pub fn tail(&self) -> u8 {
        self.ring.tail.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fifo_round_trip<const N: usize>() {
        let mut ring = RingBuffer::<u8, N>::new();
        let (mut producer, mut consumer) = ring.split();

        // Several laps, each filling the ring to N - 1 pending
        for lap in 0..3u8 {
            for i in 0..(N - 1) {
                producer.produce(lap.wrapping_mul(31).wrapping_add(i as u8));
            }
            assert!(producer.is_full());
            assert_eq!(consumer.len(), N - 1);
            for i in 0..(N - 1) {
                assert_eq!(
                    consumer.consume(),
                    lap.wrapping_mul(31).wrapping_add(i as u8)
                );
            }
            assert!(consumer.is_empty());
        }
    }

    #[test]
    fn fifo_order_for_each_capacity() {
        fifo_round_trip::<2>();
        fifo_round_trip::<4>();
        fifo_round_trip::<8>();
        fifo_round_trip::<64>();
        fifo_round_trip::<256>();
    }

    #[test]
    fn empty_after_new_and_after_drain() {
        let mut ring = RingBuffer::<u8, 8>::new();
        assert!(ring.is_empty());
        assert_eq!(ring.capacity(), 8);

        let (mut producer, mut consumer) = ring.split();
        assert!(consumer.is_empty());
        assert_eq!(consumer.try_consume(), None);

        producer.produce(7);
        assert!(!consumer.is_empty());
        assert!(!producer.is_empty());

        assert_eq!(consumer.try_consume(), Some(7));
        assert!(consumer.is_empty());
        assert!(producer.is_empty());
    }

    #[test]
    fn head_wraps_by_mask() {
        let mut ring = RingBuffer::<u8, 8>::new();
        let (mut producer, consumer) = ring.split();

        for i in 1..=8u8 {
            producer.produce(i);
            assert!(producer.head() < 8);
        }
        assert_eq!(producer.head(), 0);

        producer.produce(9);
        assert_eq!(producer.head(), 1);
        assert_eq!(consumer.tail(), 0);
    }

    #[test]
    fn full_leaves_one_slot_unused() {
        let mut ring = RingBuffer::<u8, 4>::new();
        let (mut producer, mut consumer) = ring.split();

        producer.produce(1);
        producer.produce(2);
        assert!(!producer.is_full());
        producer.produce(3);
        assert!(producer.is_full());
        assert_eq!(producer.len(), 3);

        assert_eq!(consumer.consume(), 1);
        assert!(!producer.is_full());
    }

    #[test]
    fn overrun_overwrites_oldest_slot() {
        let mut ring = RingBuffer::<u8, 8>::new();
        let (mut producer, mut consumer) = ring.split();

        producer.produce(b'H');
        producer.produce(b'I');
        assert_eq!(consumer.consume(), b'H');
        assert_eq!(consumer.consume(), b'I');
        assert!(consumer.is_empty());

        // Eight more without consuming: head laps all the way round onto
        // tail, so the ring looks empty and all eight are unreachable.
        for byte in b'a'..=b'h' {
            producer.produce(byte);
        }
        assert!(consumer.is_empty());

        // The ninth lands in the slot that held the oldest of the eight.
        producer.produce(b'i');
        assert_eq!(consumer.len(), 1);
        assert_eq!(consumer.consume(), b'i');
        assert!(consumer.is_empty());
    }

    #[test]
    fn split_flushes_previous_contents() {
        let mut ring = RingBuffer::<u8, 8>::new();
        {
            let (mut producer, _consumer) = ring.split();
            producer.produce(1);
            producer.produce(2);
        }
        assert!(!ring.is_empty());

        let (producer, consumer) = ring.split();
        assert!(consumer.is_empty());
        assert_eq!(producer.head(), 0);
        assert_eq!(consumer.tail(), 0);
    }

    #[test]
    fn wide_units() {
        let mut ring = RingBuffer::<u16, 8>::new();
        let (mut producer, mut consumer) = ring.split();

        producer.produce(0x03FF);
        producer.produce(0x0200);
        assert_eq!(consumer.consume(), 0x03FF);
        assert_eq!(consumer.consume(), 0x0200);
        assert_eq!(<u16 as Unit>::BITS, 16);
    }
}
