//! DHT11 temperature / humidity sensor on a single open-drain wire.
//!
//! ## Protocol
//!
//! ```text
//!  host: ──┐ ≥18 ms ┌── release
//!          └────────┘
//!  sensor:             ┐ 80 µs ┌ 80 µs ┐ then 40 × (50 µs low + high)
//!                      └───────┘       └─
//! ```
//!
//! A bit's high phase lasts ~27 µs for `0` and ~70 µs for `1`.  Rather than
//! trusting absolute loop timing, each high phase is compared with the
//! 50 µs low phase that precedes it.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};

use crate::app::ports::{ClimatePort, ClimateReading};
use crate::error::SensorError;

/// Upper bound on any single phase, in polling steps of ~1 µs.
const PHASE_TIMEOUT: u32 = 200;

pub struct Dht11<P, D> {
    pin: P,
    delay: D,
}

impl<P, D> Dht11<P, D>
where
    P: InputPin + OutputPin,
    D: DelayNs,
{
    /// `pin` must be open-drain with a pull-up.
    pub fn new(mut pin: P, delay: D) -> Self {
        // Idle high so the first read starts from a clean state.
        let _ = pin.set_high();
        Self { pin, delay }
    }

    fn read_frame(&mut self) -> Result<[u8; 5], SensorError> {
        self.pin.set_low().map_err(|_| SensorError::GpioReadFailed)?;
        self.delay.delay_ms(20);
        self.pin.set_high().map_err(|_| SensorError::GpioReadFailed)?;

        // Response: line still high from us, then 80 µs low, 80 µs high.
        self.phase(true)?;
        self.phase(false)?;
        self.phase(true)?;

        let mut frame = [0u8; 5];
        for bit in 0..40 {
            let low = self.phase(false)?;
            let high = self.phase(true)?;
            if high > low {
                frame[bit / 8] |= 0x80 >> (bit % 8);
            }
        }
        Ok(frame)
    }

    /// Wait out a phase at `level`, returning its length in polling steps.
    fn phase(&mut self, level: bool) -> Result<u32, SensorError> {
        let mut steps = 0;
        while self.pin.is_high().map_err(|_| SensorError::GpioReadFailed)? == level {
            steps += 1;
            if steps > PHASE_TIMEOUT {
                return Err(SensorError::Timeout);
            }
            self.delay.delay_us(1);
        }
        Ok(steps)
    }
}

/// Validate the checksum and convert a raw 5-byte frame.
pub fn decode(frame: [u8; 5]) -> Result<ClimateReading, SensorError> {
    let sum = frame[..4].iter().fold(0u8, |acc, b| acc.wrapping_add(*b));
    if sum != frame[4] {
        return Err(SensorError::ChecksumMismatch);
    }
    let humidity_pct = f32::from(frame[0]) + f32::from(frame[1]) / 10.0;
    let magnitude = f32::from(frame[2]) + f32::from(frame[3] & 0x7F) / 10.0;
    let temperature_c = if frame[3] & 0x80 != 0 { -magnitude } else { magnitude };
    Ok(ClimateReading {
        temperature_c,
        humidity_pct,
    })
}

impl<P, D> ClimatePort for Dht11<P, D>
where
    P: InputPin + OutputPin,
    D: DelayNs,
{
    fn read_climate(&mut self) -> Result<ClimateReading, SensorError> {
        let frame = self.read_frame();
        // Release the line whatever happened.
        let _ = self.pin.set_high();
        decode(frame?)
    }
}
