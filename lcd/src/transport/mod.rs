//! I²C transports.
//!
//! The driver only ever needs one primitive: write raw bytes to the backpack's address.
//! Opening the bus and picking the address is left to the transport implementation.

pub mod hal;

use crate::LcdResult;
use std::fmt::Debug;

pub trait I2cTransport: Debug {
    /// Writes `bytes` to the device in a single I²C write transaction.
    fn write(&mut self, bytes: &[u8]) -> LcdResult<()>;
}

impl<T: I2cTransport + ?Sized> I2cTransport for &mut T {
    fn write(&mut self, bytes: &[u8]) -> LcdResult<()> {
        (**self).write(bytes)
    }
}

impl<T: I2cTransport + ?Sized> I2cTransport for Box<T> {
    fn write(&mut self, bytes: &[u8]) -> LcdResult<()> {
        (**self).write(bytes)
    }
}
