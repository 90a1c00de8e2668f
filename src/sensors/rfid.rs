//! MFRC522 13.56 MHz card reader in I²C mode.
//!
//! Only what card-presence polling needs: REQA, cascade-level-1
//! anticollision and the BCC check.  No authentication, no block reads.

use core::fmt::Write as _;

use embedded_hal::i2c::I2c;

use crate::app::ports::{CardId, CardReaderPort};
use crate::error::SensorError;

// ── Registers ─────────────────────────────────────────────────

const REG_COMMAND: u8 = 0x01;
const REG_COM_IRQ: u8 = 0x04;
const REG_ERROR: u8 = 0x06;
const REG_FIFO_DATA: u8 = 0x09;
const REG_FIFO_LEVEL: u8 = 0x0A;
const REG_BIT_FRAMING: u8 = 0x0D;
const REG_MODE: u8 = 0x11;
const REG_TX_CONTROL: u8 = 0x14;
const REG_TX_ASK: u8 = 0x15;
const REG_T_MODE: u8 = 0x2A;
const REG_T_PRESCALER: u8 = 0x2B;
const REG_T_RELOAD_H: u8 = 0x2C;
const REG_T_RELOAD_L: u8 = 0x2D;

// ── Commands ──────────────────────────────────────────────────

const CMD_IDLE: u8 = 0x00;
const CMD_TRANSCEIVE: u8 = 0x0C;
const CMD_SOFT_RESET: u8 = 0x0F;

// ── PICC ──────────────────────────────────────────────────────

const PICC_REQA: u8 = 0x26;
const PICC_SEL_CL1: u8 = 0x93;

const IRQ_RX: u8 = 0x20;
const IRQ_IDLE: u8 = 0x10;
const IRQ_TIMER: u8 = 0x01;
/// BufferOvfl | ParityErr | ProtocolErr.
const ERR_MASK: u8 = 0x13;

/// Polls of ComIrqReg before giving up on a transceive.
const IRQ_POLLS: u32 = 200;

pub struct Mfrc522<I> {
    i2c: I,
    address: u8,
}

impl<I: I2c> Mfrc522<I> {
    /// Soft-reset, program the 25 ms receive timeout and enable the antenna.
    pub fn new(i2c: I, address: u8) -> Result<Self, SensorError> {
        let mut reader = Self { i2c, address };
        reader.write(REG_COMMAND, CMD_SOFT_RESET)?;
        reader.write(REG_T_MODE, 0x8D)?;
        reader.write(REG_T_PRESCALER, 0x3E)?;
        reader.write(REG_T_RELOAD_H, 0x00)?;
        reader.write(REG_T_RELOAD_L, 30)?;
        reader.write(REG_TX_ASK, 0x40)?; // 100 % ASK
        reader.write(REG_MODE, 0x3D)?; // CRC preset 0x6363
        let tx = reader.read(REG_TX_CONTROL)?;
        if tx & 0x03 != 0x03 {
            reader.write(REG_TX_CONTROL, tx | 0x03)?;
        }
        Ok(reader)
    }

    /// UID of the card in the field, `None` if nothing answers REQA.
    pub fn read_uid(&mut self) -> Result<Option<[u8; 4]>, SensorError> {
        let mut atqa = [0u8; 2];
        // REQA is a 7-bit short frame.
        match self.transceive(&[PICC_REQA], 7, &mut atqa) {
            Ok(2) => {}
            Ok(_) | Err(SensorError::Timeout) => return Ok(None),
            Err(e) => return Err(e),
        }

        let mut resp = [0u8; 5];
        let n = self.transceive(&[PICC_SEL_CL1, 0x20], 0, &mut resp)?;
        if n != 5 {
            return Ok(None);
        }
        let uid = [resp[0], resp[1], resp[2], resp[3]];
        if bcc(&uid) != resp[4] {
            return Err(SensorError::ChecksumMismatch);
        }
        Ok(Some(uid))
    }

    fn transceive(&mut self, data: &[u8], tx_last_bits: u8, out: &mut [u8]) -> Result<usize, SensorError> {
        self.write(REG_COMMAND, CMD_IDLE)?;
        self.write(REG_COM_IRQ, 0x7F)?;
        self.write(REG_FIFO_LEVEL, 0x80)?; // flush
        for &b in data {
            self.write(REG_FIFO_DATA, b)?;
        }
        self.write(REG_BIT_FRAMING, tx_last_bits)?;
        self.write(REG_COMMAND, CMD_TRANSCEIVE)?;
        self.write(REG_BIT_FRAMING, 0x80 | tx_last_bits)?; // StartSend

        let mut irq = 0;
        for _ in 0..IRQ_POLLS {
            irq = self.read(REG_COM_IRQ)?;
            if irq & (IRQ_RX | IRQ_IDLE | IRQ_TIMER) != 0 {
                break;
            }
        }
        self.write(REG_BIT_FRAMING, 0)?;

        if irq & (IRQ_RX | IRQ_IDLE) == 0 {
            return Err(SensorError::Timeout);
        }
        if self.read(REG_ERROR)? & ERR_MASK != 0 {
            return Err(SensorError::BusError);
        }

        let level = usize::from(self.read(REG_FIFO_LEVEL)?).min(out.len());
        for slot in out.iter_mut().take(level) {
            *slot = self.read(REG_FIFO_DATA)?;
        }
        Ok(level)
    }

    fn write(&mut self, reg: u8, value: u8) -> Result<(), SensorError> {
        self.i2c
            .write(self.address, &[reg, value])
            .map_err(|_| SensorError::BusError)
    }

    fn read(&mut self, reg: u8) -> Result<u8, SensorError> {
        let mut buf = [0u8];
        self.i2c
            .write_read(self.address, &[reg], &mut buf)
            .map_err(|_| SensorError::BusError)?;
        Ok(buf[0])
    }
}

/// Block check character: XOR of the UID bytes.
pub fn bcc(uid: &[u8]) -> u8 {
    uid.iter().fold(0, |acc, b| acc ^ b)
}

/// Decimal concatenation of the UID bytes: `[136, 4, 35, 209]` -> `"136435209"`.
pub fn card_id(uid: &[u8]) -> CardId {
    let mut id = CardId::new();
    for b in uid {
        // At most 4 × 3 digits, well under capacity.
        let _ = write!(id, "{}", b);
    }
    id
}

impl<I: I2c> CardReaderPort for Mfrc522<I> {
    fn poll_card(&mut self) -> Result<Option<CardId>, SensorError> {
        Ok(self.read_uid()?.map(|uid| card_id(&uid)))
    }
}
