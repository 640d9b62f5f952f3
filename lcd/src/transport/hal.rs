//! Adapters for [embedded_hal] 1.0 buses and delays.

use crate::clock::Clock;
use crate::transport::I2cTransport;
use crate::{LcdError, LcdResult};
use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{Error, I2c, SevenBitAddress};
#[cfg(target_os = "linux")]
use linux_embedded_hal::I2cdev;
use std::fmt::{Debug, Formatter};
use std::time::Duration;

/// [I2cTransport] over any [embedded_hal] I²C bus, addressing a single device.
pub struct HalTransport<I> {
    i2c: I,
    address: SevenBitAddress,
}

impl<I: I2c> HalTransport<I> {
    pub fn new(i2c: I, address: SevenBitAddress) -> Self {
        HalTransport { i2c, address }
    }

    /// Gives the underlying bus back.
    pub fn release(self) -> I {
        self.i2c
    }
}

#[cfg(target_os = "linux")]
impl HalTransport<I2cdev> {
    /// Opens the Linux `i2c-dev` node `/dev/i2c-{bus}` for the device at `address`.
    pub fn open_i2cdev(bus: u8, address: SevenBitAddress) -> LcdResult<Self> {
        if address > 0x7F {
            return Err(LcdError::InvalidArgument);
        }
        let i2c = I2cdev::new(format!("/dev/i2c-{}", bus))
            .map_err(|err| LcdError::Bus(format!("/dev/i2c-{}: {}", bus, err)))?;
        Ok(HalTransport::new(i2c, address))
    }
}

impl<I> Debug for HalTransport<I> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "HalTransport({:#04x})", self.address)
    }
}

impl<I: I2c> I2cTransport for HalTransport<I> {
    fn write(&mut self, bytes: &[u8]) -> LcdResult<()> {
        self.i2c
            .write(self.address, bytes)
            .map_err(|err| LcdError::Bus(format!("{:?}", err.kind())))
    }
}

/// [Clock] over an [embedded_hal] delay provider.
pub struct HalDelay<D>(pub D);

impl<D> Debug for HalDelay<D> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "HalDelay")
    }
}

impl<D: DelayNs> Clock for HalDelay<D> {
    fn sleep(&mut self, duration: Duration) {
        self.0.delay_us(duration.as_micros().try_into().unwrap_or(u32::MAX));
    }
}
