//! Four-pixel WS2812 strip showing one colour at a time.
//!
//! Generic over any [`SmartLedsWrite`] backend: the RMT writer in
//! [`ws2812`](super::ws2812) on the device, a recording writer in tests.

use smart_leds::{SmartLedsWrite, RGB8};

use crate::arbiter::OutputDevice;
use crate::error::ActuatorError;

/// Colours the handlers signal with.
pub mod colour {
    use smart_leds::RGB8;

    pub const OFF: RGB8 = RGB8 { r: 0, g: 0, b: 0 };
    pub const RED: RGB8 = RGB8 { r: 255, g: 0, b: 0 };
    pub const GREEN: RGB8 = RGB8 { r: 0, g: 255, b: 0 };
    pub const BLUE: RGB8 = RGB8 { r: 0, g: 0, b: 255 };
    pub const ORANGE: RGB8 = RGB8 { r: 255, g: 165, b: 0 };
}

pub struct RgbStrip<W> {
    writer: W,
    pixels: usize,
    current: RGB8,
}

impl<W> RgbStrip<W>
where
    W: SmartLedsWrite<Color = RGB8>,
{
    pub fn new(writer: W, pixels: usize) -> Self {
        Self {
            writer,
            pixels,
            current: colour::OFF,
        }
    }

    pub fn current(&self) -> RGB8 {
        self.current
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }

    fn fill(&mut self, c: RGB8) -> Result<(), ActuatorError> {
        self.writer
            .write(core::iter::repeat_n(c, self.pixels))
            .map_err(|_| ActuatorError::StripWriteFailed)?;
        self.current = c;
        Ok(())
    }
}

impl<W> OutputDevice for RgbStrip<W>
where
    W: SmartLedsWrite<Color = RGB8>,
{
    type Payload = RGB8;

    fn apply(&mut self, c: &RGB8) -> Result<(), ActuatorError> {
        self.fill(*c)
    }

    fn apply_idle(&mut self) -> Result<(), ActuatorError> {
        self.fill(colour::OFF)
    }
}
