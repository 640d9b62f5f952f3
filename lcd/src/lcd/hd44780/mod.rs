//! HD44780 LCD module.
//!
//! Only the write half of the controller is supported: the I²C backpack keeps RW low, so there is
//! no busy flag to poll and every instruction is followed by a fixed delay instead.

pub mod driver;
