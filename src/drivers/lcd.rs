//! 16x2 HD44780 character LCD behind a PCF8574 I²C backpack.
//!
//! The backpack maps P0..P3 to RS, RW, EN, backlight and P4..P7 to D4..D7,
//! so the controller runs in 4-bit mode: every byte is two nibbles, each
//! latched by an EN pulse.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use crate::arbiter::OutputDevice;
use crate::error::ActuatorError;

pub const COLUMNS: usize = 16;

pub type Line = heapless::String<COLUMNS>;

/// Two lines of text, truncated to the panel width.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TextFrame {
    pub top: Line,
    pub bottom: Line,
}

impl TextFrame {
    pub fn new(top: &str, bottom: &str) -> Self {
        Self {
            top: truncate(top),
            bottom: truncate(bottom),
        }
    }
}

fn truncate(s: &str) -> Line {
    let mut line = Line::new();
    for ch in s.chars() {
        if line.push(ch).is_err() {
            break;
        }
    }
    line
}

// ── HD44780 commands ──────────────────────────────────────────

const CMD_CLEAR: u8 = 0x01;
const CMD_ENTRY_MODE: u8 = 0x06; // increment, no shift
const CMD_DISPLAY_ON: u8 = 0x0C; // display on, cursor off, blink off
const CMD_FUNCTION_SET: u8 = 0x28; // 4-bit, 2 lines, 5x8
const CMD_SET_DDRAM: u8 = 0x80;
const ROW_OFFSETS: [u8; 2] = [0x00, 0x40];

// ── PCF8574 bits ──────────────────────────────────────────────

const RS: u8 = 0x01;
const EN: u8 = 0x04;
const BACKLIGHT: u8 = 0x08;

pub struct Lcd1602<I, D> {
    i2c: I,
    delay: D,
    address: u8,
    shown: Option<TextFrame>,
}

impl<I: I2c, D: DelayNs> Lcd1602<I, D> {
    /// Run the HD44780 4-bit init sequence and clear the panel.
    pub fn new(i2c: I, delay: D, address: u8) -> Result<Self, ActuatorError> {
        let mut lcd = Self {
            i2c,
            delay,
            address,
            shown: None,
        };
        lcd.delay.delay_ms(50);
        // Three 8-bit "function set" nibbles, then switch to 4-bit.
        for _ in 0..3 {
            lcd.write_nibble(0x30, 0)?;
            lcd.delay.delay_ms(5);
        }
        lcd.write_nibble(0x20, 0)?;
        lcd.command(CMD_FUNCTION_SET)?;
        lcd.command(CMD_DISPLAY_ON)?;
        lcd.command(CMD_ENTRY_MODE)?;
        lcd.clear()?;
        Ok(lcd)
    }

    /// What the panel currently shows, `None` when blank.
    pub fn shown(&self) -> Option<&TextFrame> {
        self.shown.as_ref()
    }

    pub fn release(self) -> I {
        self.i2c
    }

    fn clear(&mut self) -> Result<(), ActuatorError> {
        self.command(CMD_CLEAR)?;
        self.delay.delay_ms(2);
        self.shown = None;
        Ok(())
    }

    fn write_line(&mut self, row: usize, text: &str) -> Result<(), ActuatorError> {
        self.command(CMD_SET_DDRAM | ROW_OFFSETS[row])?;
        let bytes = text.bytes().chain(core::iter::repeat(b' '));
        for b in bytes.take(COLUMNS) {
            // Non-ASCII has no glyph in the A00 ROM.
            self.send(if b.is_ascii() { b } else { b'?' }, RS)?;
        }
        Ok(())
    }

    fn command(&mut self, cmd: u8) -> Result<(), ActuatorError> {
        self.send(cmd, 0)
    }

    fn send(&mut self, byte: u8, mode: u8) -> Result<(), ActuatorError> {
        self.write_nibble(byte & 0xF0, mode)?;
        self.write_nibble((byte << 4) & 0xF0, mode)
    }

    fn write_nibble(&mut self, nibble: u8, mode: u8) -> Result<(), ActuatorError> {
        let base = nibble | mode | BACKLIGHT;
        self.i2c
            .write(self.address, &[base | EN, base])
            .map_err(|_| ActuatorError::BusWriteFailed)?;
        self.delay.delay_us(50);
        Ok(())
    }
}

impl<I: I2c, D: DelayNs> OutputDevice for Lcd1602<I, D> {
    type Payload = TextFrame;

    fn apply(&mut self, frame: &TextFrame) -> Result<(), ActuatorError> {
        if self.shown.as_ref() == Some(frame) {
            return Ok(());
        }
        self.write_line(0, &frame.top)?;
        self.write_line(1, &frame.bottom)?;
        self.shown = Some(frame.clone());
        Ok(())
    }

    fn apply_idle(&mut self) -> Result<(), ActuatorError> {
        self.clear()
    }
}
