//! HD44780 LCD driver module.
//!
//! See [HD44780Driver] for the instruction set and [I2cHD44780Driver] for the implementation over
//! a PCF8574 I²C backpack.

mod i2c;
mod init;

use crate::{LcdError, LcdResult};
use log::warn;
use std::fmt::Debug;
pub use i2c::*;
pub use init::*;

/// Instruction opcodes. The flags from [flag] are OR'd into the matching opcode.
pub mod command {
    pub const CLEAR_DISPLAY: u8 = 0x01;
    pub const RETURN_HOME: u8 = 0x02;
    pub const ENTRY_MODE_SET: u8 = 0x04;
    pub const DISPLAY_CONTROL: u8 = 0x08;
    pub const CURSOR_SHIFT: u8 = 0x10;
    pub const FUNCTION_SET: u8 = 0x20;
    pub const SET_DDRAM_ADDRESS: u8 = 0x80;
}

pub mod flag {
    // Entry mode set; INCREMENT makes text run left to right
    pub const ENTRY_INCREMENT: u8 = 0x02;
    pub const ENTRY_SHIFT: u8 = 0x01;

    // Display control
    pub const DISPLAY_ON: u8 = 0x04;
    pub const CURSOR_ON: u8 = 0x02;
    pub const BLINK_ON: u8 = 0x01;

    // Cursor shift
    pub const DISPLAY_MOVE: u8 = 0x08;
    pub const MOVE_RIGHT: u8 = 0x04;

    // Function set
    pub const BUS_8BIT: u8 = 0x10;
    pub const BUS_4BIT: u8 = 0x00;
    pub const TWO_LINE: u8 = 0x08;
    pub const DOTS_5X10: u8 = 0x04;
    pub const DOTS_5X8: u8 = 0x00;
}

/// Which controller register a transaction targets.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum RegisterSelect {
    /// Instruction register, for commands.
    Instruction,
    /// Data register, for characters written to DDRAM.
    Data,
}

impl RegisterSelect {
    /// The RS bit as placed on the backpack byte.
    pub fn bit(&self) -> u8 {
        match self {
            RegisterSelect::Instruction => 0b0000_0000,
            RegisterSelect::Data => 0b0000_0001,
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum CursorDirection {
    /// Moves the cursor to the left after writing data.
    Left,
    /// Moves the cursor to the right after writing data.
    Right,
}

/// A display row, numbered from 1 like the module silkscreen.
///
/// Rows 3 and 4 only exist on 4-line modules. On those, DDRAM continues row 1 into row 3 and row 2
/// into row 4, which is where the odd base offsets come from.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Row {
    First,
    Second,
    Third,
    Fourth,
}

impl Row {
    /// DDRAM address of the first column of this row.
    pub fn ddram_offset(&self) -> u8 {
        match self {
            Row::First => 0x00,
            Row::Second => 0x40,
            Row::Third => 0x14,
            Row::Fourth => 0x54,
        }
    }
}

impl TryFrom<u8> for Row {
    type Error = LcdError;

    fn try_from(row: u8) -> LcdResult<Self> {
        match row {
            1 => Ok(Row::First),
            2 => Ok(Row::Second),
            3 => Ok(Row::Third),
            4 => Ok(Row::Fourth),
            _ => Err(LcdError::InvalidArgument),
        }
    }
}

pub trait HD44780Driver: Debug {
    /// Clears the display and sets the cursor to the home position.
    fn clear_display(&mut self) -> LcdResult<()> {
        self.send_command(command::CLEAR_DISPLAY)
    }

    /// Sets the cursor to the home position.
    fn return_home(&mut self) -> LcdResult<()> {
        self.send_command(command::RETURN_HOME)
    }

    /// Sets the display to the specified entry mode.
    fn set_entry_mode(&mut self, cursor_direction: CursorDirection, shift: bool) -> LcdResult<()> {
        let mut command = command::ENTRY_MODE_SET;
        if cursor_direction == CursorDirection::Right {
            command |= flag::ENTRY_INCREMENT;
        }
        if shift {
            command |= flag::ENTRY_SHIFT;
        }
        self.send_command(command)
    }

    /// Sets the display on/off, cursor on/off, and blinking on/off.
    fn set_display_control(
        &mut self,
        display_on: bool,
        cursor_on: bool,
        blink_on: bool,
    ) -> LcdResult<()> {
        let mut command = command::DISPLAY_CONTROL;
        if display_on {
            command |= flag::DISPLAY_ON;
        }
        if cursor_on {
            command |= flag::CURSOR_ON;
        }
        if blink_on {
            command |= flag::BLINK_ON;
        }
        self.send_command(command)
    }

    /// Moves the cursor or shifts the display.
    fn cursor_shift(&mut self, display_shift: bool, direction: CursorDirection) -> LcdResult<()> {
        let mut command = command::CURSOR_SHIFT;
        if display_shift {
            command |= flag::DISPLAY_MOVE;
        }
        if direction == CursorDirection::Right {
            command |= flag::MOVE_RIGHT;
        }
        self.send_command(command)
    }

    /// Sets the bus width, number of lines and font.
    ///
    /// Over the backpack only the 4-bit bus is wired, so `eight_bit` should stay `false` outside
    /// of the bootstrap sequence.
    fn function_set(&mut self, eight_bit: bool, two_lines: bool, tall_font: bool) -> LcdResult<()> {
        let mut command = command::FUNCTION_SET;
        if eight_bit {
            command |= flag::BUS_8BIT;
        }
        if two_lines {
            command |= flag::TWO_LINE;
        }
        if tall_font {
            command |= flag::DOTS_5X10;
        }
        self.send_command(command)
    }

    /// Sets the DDRAM address.
    fn set_ddram_address(&mut self, address: u8) -> LcdResult<()> {
        if address > 0b01111111 {
            return Err(LcdError::InvalidArgument);
        }
        self.send_command(command::SET_DDRAM_ADDRESS | address)
    }

    /// Clears the display, then explicitly returns the cursor home.
    fn clear(&mut self) -> LcdResult<()> {
        self.clear_display()?;
        self.return_home()
    }

    /// Moves the cursor to `column` (0-based) of `row` (1-4).
    ///
    /// The column is not checked against the module width; past the visible area the address
    /// runs into whatever DDRAM follows.
    fn set_cursor(&mut self, row: u8, column: u8) -> LcdResult<()> {
        let row = Row::try_from(row)?;
        let address = row
            .ddram_offset()
            .checked_add(column)
            .ok_or(LcdError::InvalidArgument)?;
        self.set_ddram_address(address)
    }

    /// Sends every byte of `text` to the data register, starting at the current cursor.
    fn print(&mut self, text: &str) -> LcdResult<()> {
        if !text.is_ascii() {
            warn!("Non-ASCII text sent as raw bytes: {:?}", text);
        }
        for byte in text.bytes() {
            self.send_data(byte)?;
        }
        Ok(())
    }

    /// Writes `text` starting at `column` of `row`.
    ///
    /// # Errors
    /// - [LcdError::InvalidArgument] if `row` is not 1-4, before anything is sent.
    fn write_string(&mut self, text: &str, row: u8, column: u8) -> LcdResult<()> {
        self.set_cursor(row, column)?;
        self.print(text)
    }

    // Low-level commands, implemented by the driver implementation.

    /// Sends a command to the HD44780 controller.
    /// Sets the RS bit to 0 (instruction).
    fn send_command(&mut self, command: u8) -> LcdResult<()>;

    /// Sends data to the HD44780 controller.
    /// Sets the RS bit to 1 (data).
    fn send_data(&mut self, data: u8) -> LcdResult<()>;
}
