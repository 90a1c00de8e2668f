//! WS2812 writer on an RMT TX channel.
//!
//! Each bit becomes one high/low pulse pair; pixels go out GRB, MSB first.

use core::time::Duration;

use esp_idf_hal::rmt::{PinState, Pulse, TxRmtDriver, VariableLengthSignal};
use esp_idf_hal::sys::EspError;
use smart_leds::{SmartLedsWrite, RGB8};

const T0H_NS: u64 = 350;
const T0L_NS: u64 = 800;
const T1H_NS: u64 = 700;
const T1L_NS: u64 = 600;

pub struct Ws2812Rmt<'d> {
    tx: TxRmtDriver<'d>,
    zero: [Pulse; 2],
    one: [Pulse; 2],
}

impl<'d> Ws2812Rmt<'d> {
    pub fn new(tx: TxRmtDriver<'d>) -> Result<Self, EspError> {
        let hz = tx.counter_clock()?;
        let pulse = |state, ns| Pulse::new_with_duration(hz, state, &Duration::from_nanos(ns));
        Ok(Self {
            zero: [pulse(PinState::High, T0H_NS)?, pulse(PinState::Low, T0L_NS)?],
            one: [pulse(PinState::High, T1H_NS)?, pulse(PinState::Low, T1L_NS)?],
            tx,
        })
    }
}

impl SmartLedsWrite for Ws2812Rmt<'_> {
    type Error = EspError;
    type Color = RGB8;

    fn write<T, I>(&mut self, iterator: T) -> Result<(), EspError>
    where
        T: IntoIterator<Item = I>,
        I: Into<RGB8>,
    {
        let mut signal = VariableLengthSignal::new();
        for pixel in iterator {
            let c: RGB8 = pixel.into();
            let grb = (u32::from(c.g) << 16) | (u32::from(c.r) << 8) | u32::from(c.b);
            for bit in (0..24).rev() {
                let pair = if grb & (1 << bit) != 0 { &self.one } else { &self.zero };
                signal.push(pair)?;
            }
        }
        self.tx.start_blocking(&signal)
    }
}
