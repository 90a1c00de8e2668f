//! One I²C peripheral shared by the LCD backpack and the RFID reader.
//!
//! Both devices are driven from the scheduler thread, so a `RefCell` is
//! enough.  A re-entrant borrow reports [`SharedBusError::Busy`] instead of
//! panicking.

use core::cell::RefCell;
use std::rc::Rc;

use embedded_hal::i2c::{self, ErrorKind, ErrorType, I2c, Operation, SevenBitAddress};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SharedBusError<E> {
    Busy,
    Bus(E),
}

impl<E: i2c::Error> i2c::Error for SharedBusError<E> {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::Busy => ErrorKind::Other,
            Self::Bus(e) => e.kind(),
        }
    }
}

/// A cloneable handle onto the shared bus.
pub struct SharedI2c<B> {
    bus: Rc<RefCell<B>>,
}

impl<B> Clone for SharedI2c<B> {
    fn clone(&self) -> Self {
        Self {
            bus: Rc::clone(&self.bus),
        }
    }
}

impl<B: I2c> SharedI2c<B> {
    pub fn new(bus: B) -> Self {
        Self {
            bus: Rc::new(RefCell::new(bus)),
        }
    }
}

impl<B: I2c> ErrorType for SharedI2c<B> {
    type Error = SharedBusError<B::Error>;
}

impl<B: I2c> I2c<SevenBitAddress> for SharedI2c<B> {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        let mut bus = self.bus.try_borrow_mut().map_err(|_| SharedBusError::Busy)?;
        bus.transaction(address, operations).map_err(SharedBusError::Bus)
    }
}
