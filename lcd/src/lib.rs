//! Driver for HD44780-compatible character LCDs behind a PCF8574 I²C backpack (LCM1602, LCM2004
//! and similar modules).
//!
//! The display is write-only and blindly timed: every transaction is followed by a fixed delay
//! instead of polling the busy flag, as the backpack's RW line is never driven high. See
//! [lcd::hd44780::driver] for the driver itself.

pub mod clock;
pub mod lcd;
pub mod transport;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

use thiserror::Error;

#[derive(Debug, Error, Eq, PartialEq, Clone)]
pub enum LcdError {
    #[error("invalid argument")]
    InvalidArgument,
    #[error("IO error: {0}")]
    Io(std::io::ErrorKind),
    #[error("bus error: {0}")]
    Bus(String),
}

impl From<std::io::Error> for LcdError {
    fn from(err: std::io::Error) -> Self {
        LcdError::Io(err.kind())
    }
}

pub type LcdResult<T> = Result<T, LcdError>;
