//! Channels driven with a second thread standing in for interrupt context.
//!
//! Each test moves one half of a channel to a spawned thread, and checks the
//! ordering and blocking behaviour seen from the other half.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use isr_ring::Error;
use isr_ring::channel::{
    ConversionInterrupt, ReceiveInterrupt, RxChannel, SampleChannel, Status, TransmitInterrupt,
    TryWrite, TxChannel, Wait,
};
use isr_ring::io::{InterruptSource, SinkRegister, SourceRegister, Trigger};

/// Transmit-ready interrupt enable that counts its transitions.
#[derive(Default)]
struct Gate {
    enabled: AtomicBool,
    armed: AtomicUsize,
    disarmed: AtomicUsize,
}

impl InterruptSource for Gate {
    fn enable_interrupt(&self) {
        if !self.enabled.swap(true, Ordering::SeqCst) {
            self.armed.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn disable_interrupt(&self) {
        if self.enabled.swap(false, Ordering::SeqCst) {
            self.disarmed.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn is_interrupt_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }
}

/// Transmit data register that records what was sent.
#[derive(Default)]
struct Wire {
    sent: Vec<u8>,
}

impl SinkRegister<u8> for Wire {
    fn write_register(&mut self, value: u8) {
        self.sent.push(value);
    }
}

/// Receive data register producing 0, 1, 2, ...
#[derive(Default)]
struct Counter {
    next: u8,
}

impl SourceRegister<u8> for Counter {
    fn read_register(&mut self) -> u8 {
        let value = self.next;
        self.next = self.next.wrapping_add(1);
        value
    }
}

#[test]
fn write_blocks_until_a_slot_is_freed() {
    let gate = Gate::default();
    let mut channel = TxChannel::<u8, 4>::new();
    let (mut writer, mut isr) = channel.split(Wire::default(), &gate);

    for byte in 1..=3 {
        writer.write(byte);
    }
    assert!(writer.is_full());

    let returned = AtomicBool::new(false);
    let mut writer = thread::scope(|s| {
        let handle = s.spawn(|| {
            writer.write(4);
            returned.store(true, Ordering::SeqCst);
            writer
        });

        thread::sleep(Duration::from_millis(50));
        assert!(!returned.load(Ordering::SeqCst), "write returned while full");

        // Stand-in for one transmit-ready interrupt
        isr.on_transmit_ready();

        let writer = handle.join().expect("writer thread panicked");
        assert!(returned.load(Ordering::SeqCst));
        writer
    });

    assert!(writer.is_full());
    while gate.is_interrupt_enabled() {
        isr.on_transmit_ready();
    }
    assert_eq!(isr.register().sent, [1, 2, 3, 4]);
    writer.flush();
}

#[test]
fn gate_disarms_once_when_drained_and_rearms_once_on_write() {
    let gate = Gate::default();
    let mut channel = TxChannel::<u8, 8>::new();
    let (mut writer, mut isr) = channel.split(Wire::default(), &gate);
    let armed = gate.armed.load(Ordering::SeqCst);
    let disarmed = gate.disarmed.load(Ordering::SeqCst);

    for &byte in b"ring" {
        writer.write(byte);
    }

    thread::scope(|s| {
        s.spawn(|| {
            // The hardware keeps raising the interrupt while it is armed
            while gate.is_interrupt_enabled() {
                isr.on_transmit_ready();
            }
        });
    });

    assert_eq!(isr.register().sent, b"ring");
    assert_eq!(gate.armed.load(Ordering::SeqCst), armed + 1);
    assert_eq!(gate.disarmed.load(Ordering::SeqCst), disarmed + 1);

    writer.write(b'!');
    assert!(gate.is_interrupt_enabled());
    assert_eq!(gate.armed.load(Ordering::SeqCst), armed + 2);
    assert_eq!(gate.disarmed.load(Ordering::SeqCst), disarmed + 1);
}

#[test]
fn receive_is_fifo_across_contexts() {
    const TOTAL: usize = 1000;

    let mut channel = RxChannel::<u8, 16>::new();
    let (mut reader, mut isr) = channel.split(Counter::default());

    thread::scope(|s| {
        s.spawn(move || {
            // Paced so it never overruns the reader
            for _ in 0..TOTAL {
                while isr.would_overrun() {
                    thread::yield_now();
                }
                isr.on_receive_ready();
            }
        });

        for i in 0..TOTAL {
            assert_eq!(reader.read_blocking(), i as u8);
        }
    });

    assert!(reader.is_empty());
    assert_eq!(reader.read_within(Wait::Spins(10)), Err(Error::Timeout));
}

#[test]
fn transmit_is_fifo_across_contexts() {
    let gate = Gate::default();
    let mut channel = TxChannel::<u8, 4>::new();
    let (mut writer, mut isr) = channel.split(Wire::default(), &gate);
    let done = AtomicBool::new(false);

    // One core: an interrupt handler and a foreground write never overlap
    let core = Mutex::new(());

    thread::scope(|s| {
        s.spawn(|| {
            loop {
                let _running = core.lock().expect("core lock poisoned");
                if gate.is_interrupt_enabled() {
                    isr.on_transmit_ready();
                } else if done.load(Ordering::SeqCst) {
                    break;
                }
            }
        });

        for byte in 0..=255u8 {
            loop {
                let _running = core.lock().expect("core lock poisoned");
                match writer.try_write(byte) {
                    Ok(()) => break,
                    Err(err) => assert_eq!(err, Error::Busy),
                }
            }
        }
        writer.flush();
        done.store(true, Ordering::SeqCst);
    });

    let expected: Vec<u8> = (0..=255).collect();
    assert_eq!(isr.register().sent, expected);
}

/// ADC start bit, observed by the simulated converter.
struct StartBit<'a>(&'a AtomicBool);

impl Trigger for StartBit<'_> {
    fn trigger(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

/// ADC result register returning a ramp of 10-bit values.
#[derive(Default)]
struct Ramp {
    next: u16,
}

impl SourceRegister<u16> for Ramp {
    fn read_register(&mut self) -> u16 {
        let value = self.next;
        self.next = (self.next + 97) & 0x03FF;
        value
    }
}

#[test]
fn sampler_converts_on_request() {
    const CONVERSIONS: usize = 50;

    let start = AtomicBool::new(false);
    let mut channel = SampleChannel::<u16, 8>::new();
    let (mut sampler, mut isr) = channel.split(StartBit(&start), Ramp::default());

    thread::scope(|s| {
        s.spawn(|| {
            let mut completed = 0;
            while completed < CONVERSIONS {
                if start.swap(false, Ordering::SeqCst) {
                    isr.on_conversion_complete();
                    completed += 1;
                } else {
                    thread::yield_now();
                }
            }
        });

        let mut expected = 0u16;
        for _ in 0..CONVERSIONS {
            assert_eq!(sampler.convert(), expected);
            expected = (expected + 97) & 0x03FF;
        }
    });

    assert_eq!(sampler.status(), Status::Ready);
    assert!(sampler.is_empty());
}
