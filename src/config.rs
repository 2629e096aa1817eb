//! Compile-time configuration.
//!
//! Capacities and unit widths are const generics and type parameters, fixed
//! per channel when it is declared.  This module holds the ATmega328P driver
//! defaults, convenience aliases built from them, and the ADC resolution
//! derived from the sample type.

// Copyright (C) 2025 Piers Finlayson <piers@piers.rocks>
//
// MIT License

use crate::channel::SampleChannel;
use crate::ring::Unit;
use crate::uart::Usart;

/// Default UART receive ring capacity
pub const UART_RX_CAPACITY: usize = 8;

/// Default UART transmit ring capacity
pub const UART_TX_CAPACITY: usize = 8;

/// Default ADC result ring capacity
pub const ADC_CAPACITY: usize = 8;

/// UART with the default ring capacities.
pub type DefaultUsart = Usart<UART_RX_CAPACITY, UART_TX_CAPACITY>;

/// 8-bit ADC channel with the default capacity.
pub type Adc8Channel = SampleChannel<u8, ADC_CAPACITY>;

/// 10-bit ADC channel with the default capacity.
#[cfg(target_has_atomic = "16")]
pub type Adc10Channel = SampleChannel<u16, ADC_CAPACITY>;

/// ADC result resolution.
///
/// Selected by the sample type: `u8` results are the high byte of a left
/// adjusted conversion, `u16` results are the full 10-bit conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdcMode {
    /// 10-bit results, in a `u16`
    TenBit,
    /// 8-bit results, the top bits of the conversion
    EightBit,
}

impl AdcMode {
    /// Mode implied by a sample type.
    pub const fn of<T: Unit>() -> Self {
        if T::BITS > 8 {
            AdcMode::TenBit
        } else {
            AdcMode::EightBit
        }
    }

    /// Significant bits in a result.
    pub const fn resolution(self) -> u32 {
        match self {
            AdcMode::TenBit => 10,
            AdcMode::EightBit => 8,
        }
    }

    /// Largest possible result.
    pub const fn max_value(self) -> u16 {
        (1 << self.resolution()) - 1
    }
}

/// ATmega328P register addresses and bit positions used by the channels.
///
/// Only the registers the channels touch: data registers, the
/// transmit-ready interrupt enable and the ADC start bit.
pub mod atmega328p {
    /// USART0 data register, read for receive and written for transmit
    pub const UDR0: usize = 0xC6;
    /// USART0 control and status register B
    pub const UCSR0B: usize = 0xC1;
    /// Data register empty interrupt enable bit in `UCSR0B`
    pub const UDRIE0: u8 = 5;
    /// ADC result, 10-bit right adjusted (`ADCL` then `ADCH`)
    pub const ADC: usize = 0x78;
    /// ADC result high byte, the 8-bit result when left adjusted
    pub const ADCH: usize = 0x79;
    /// ADC control and status register A
    pub const ADCSRA: usize = 0x7A;
    /// Start conversion bit in `ADCSRA`
    pub const ADSC: u8 = 6;
}
