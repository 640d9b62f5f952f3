use crate::clock::{Clock, ThreadClock};
use crate::lcd::hd44780::driver::{CursorDirection, HD44780Driver, InitError, InitStep, RegisterSelect};
use crate::transport::I2cTransport;
use crate::{LcdError, LcdResult};
use log::{debug, trace};
use std::time::Duration;

/// HD44780 driver talking through a PCF8574 I²C backpack in 4-bit mode.
///
/// The backpack maps one I²C byte onto the controller pins:
///
/// | Bit | 7  | 6  | 5  | 4  | 3         | 2  | 1  | 0  |
/// |-----|----|----|----|----|-----------|----|----|----|
/// | Pin | D7 | D6 | D5 | D4 | Backlight | E  | RW | RS |
///
/// RW is never set, so nothing is ever read back. Every byte is sent as two nibbles, high nibble
/// first, each latched by pulsing E; the delays in between are fixed (see the `*_SETTLE` and
/// [Self::ENABLE_PULSE] constants) and are what keeps the controller in sync.
///
/// A driver only exists after [Self::open] ran the power-on sequence successfully. Every call
/// moves the controller's cursor, so calls take `&mut self`; put the driver behind a `Mutex` if
/// more than one thread draws.
#[derive(Debug)]
pub struct I2cHD44780Driver<T: I2cTransport, C: Clock = ThreadClock> {
    transport: T,
    clock: C,
}

impl<T: I2cTransport> I2cHD44780Driver<T> {
    /// Initializes the display behind `transport`, sleeping on the current thread.
    pub fn open(transport: T) -> Result<Self, InitError> {
        Self::open_with_clock(transport, ThreadClock)
    }
}

impl<T: I2cTransport, C: Clock> I2cHD44780Driver<T, C> {
    pub const ENABLE_BIT: u8 = 0b0000_0100;
    pub const BACKLIGHT_BIT: u8 = 0b0000_1000;

    /// Wait after every raw bus write.
    pub const COMMAND_SETTLE: Duration = Duration::from_micros(100);
    /// How long E is held high. The datasheet asks for 450 ns; the rest covers I²C latency.
    pub const ENABLE_PULSE: Duration = Duration::from_micros(500);
    /// Wait after E goes low, before the next nibble.
    pub const STROBE_SETTLE: Duration = Duration::from_micros(100);
    /// Wait after the power-on sequence before the display accepts commands.
    pub const STARTUP_SETTLE: Duration = Duration::from_millis(200);

    /// Initializes the display behind `transport`, using `clock` for every delay.
    ///
    /// The transport is dropped if initialization fails; pass `&mut transport` to keep it.
    pub fn open_with_clock(transport: T, clock: C) -> Result<Self, InitError> {
        let mut driver = I2cHD44780Driver { transport, clock };
        driver.init()?;
        Ok(driver)
    }

    /// Runs the power-on sequence for a controller in an unknown state.
    ///
    /// Three "8-bit mode" nibbles resynchronize the controller whether it was in 8-bit mode,
    /// 4-bit mode, or halfway through a 4-bit transfer. The fourth nibble then switches it to 4-bit.
    fn init(&mut self) -> Result<(), InitError> {
        let mut step = InitStep::PoweredUnknown;
        debug!("Initializing {:?}", self.transport);

        for n in 1..=3 {
            self.write_nibble(0x03).map_err(|source| InitError { step, source })?;
            step = InitStep::Bit4ModeRequested(n);
        }

        self.write_nibble(0x02).map_err(|source| InitError { step, source })?;
        self.function_set(false, true, false)
            .map_err(|source| InitError { step, source })?;
        step = InitStep::FunctionSetApplied;

        self.set_display_control(true, false, false)
            .map_err(|source| InitError { step, source })?;
        self.clear_display().map_err(|source| InitError { step, source })?;
        step = InitStep::DisplayOnCleared;

        self.set_entry_mode(CursorDirection::Right, false)
            .map_err(|source| InitError { step, source })?;
        step = InitStep::EntryModeSet;
        trace!("Init step reached: {}, settling", step);

        self.clock.sleep(Self::STARTUP_SETTLE);
        step = InitStep::Ready;
        debug!("{:?}: {}", self.transport, step);
        Ok(())
    }

    /// Writes a single byte to the backpack and waits [Self::COMMAND_SETTLE].
    fn write_raw(&mut self, byte: u8) -> LcdResult<()> {
        self.transport.write(&[byte])?;
        self.clock.sleep(Self::COMMAND_SETTLE);
        Ok(())
    }

    /// Latches `nibble` (data in bits 4-7, RS in bit 0) by pulsing E high then low.
    fn strobe(&mut self, nibble: u8) -> LcdResult<()> {
        self.write_raw(nibble | Self::ENABLE_BIT | Self::BACKLIGHT_BIT)?;
        self.clock.sleep(Self::ENABLE_PULSE);
        self.write_raw((nibble & !Self::ENABLE_BIT) | Self::BACKLIGHT_BIT)?;
        self.clock.sleep(Self::STROBE_SETTLE);
        Ok(())
    }

    /// Strobes a bare 4-bit value as an instruction. Only meaningful during initialization, when
    /// the controller may still be listening on an 8-bit bus.
    fn write_nibble(&mut self, value: u8) -> LcdResult<()> {
        if value > 0b1111 {
            return Err(LcdError::InvalidArgument);
        }
        trace!("Writing raw nibble: {:04b}", value);
        self.strobe(value << 4)
    }

    fn send(&mut self, data: u8, rs: RegisterSelect) -> LcdResult<()> {
        trace!("Sending data: {:08b}, RS: {:?}", data, rs);
        self.strobe((data & 0xF0) | rs.bit())?;
        self.strobe(((data << 4) & 0xF0) | rs.bit())
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Gives back the transport. The display keeps showing its content.
    pub fn into_inner(self) -> T {
        self.transport
    }
}

impl<T: I2cTransport, C: Clock> HD44780Driver for I2cHD44780Driver<T, C> {
    fn send_command(&mut self, command: u8) -> LcdResult<()> {
        self.send(command, RegisterSelect::Instruction)
    }

    fn send_data(&mut self, data: u8) -> LcdResult<()> {
        self.send(data, RegisterSelect::Data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{FakeClock, RecordingTransport};
    use std::io::ErrorKind;

    type TestDriver = I2cHD44780Driver<RecordingTransport, FakeClock>;

    const INIT_BYTES: [u8; 24] = [
        0x3C, 0x38, 0x3C, 0x38, 0x3C, 0x38, // 0x3 x3
        0x2C, 0x28, // 0x2
        0x2C, 0x28, 0x8C, 0x88, // function set 0x28
        0x0C, 0x08, 0xCC, 0xC8, // display control 0x0C
        0x0C, 0x08, 0x1C, 0x18, // clear 0x01
        0x0C, 0x08, 0x6C, 0x68, // entry mode 0x06
    ];

    fn open() -> TestDriver {
        I2cHD44780Driver::open_with_clock(RecordingTransport::new(), FakeClock::new()).unwrap()
    }

    fn open_failing_at(index: usize) -> Result<TestDriver, InitError> {
        I2cHD44780Driver::open_with_clock(
            RecordingTransport::new().failing_at(index),
            FakeClock::new(),
        )
    }

    fn bytes_after_init(lcd: &TestDriver) -> Vec<u8> {
        lcd.transport().bytes()[INIT_BYTES.len()..].to_vec()
    }

    #[test]
    fn init_sequence() {
        let lcd = open();
        assert_eq!(lcd.transport().bytes(), INIT_BYTES);
        assert!(lcd.transport().writes().iter().all(|write| write.len() == 1));
    }

    #[test]
    fn init_waits_for_startup_last() {
        let lcd = open();
        let sleeps = lcd.clock().sleeps();
        assert_eq!(sleeps.len(), 12 * 4 + 1);
        assert_eq!(sleeps.last(), Some(&TestDriver::STARTUP_SETTLE));
        assert_eq!(
            lcd.clock().total(),
            Duration::from_micros(12 * 800) + Duration::from_millis(200)
        );
    }

    #[test]
    fn strobe_delays() {
        let mut lcd = open();
        lcd.send_data(b'x').unwrap();
        let sleeps = &lcd.clock().sleeps()[49..];
        let strobe = [
            TestDriver::COMMAND_SETTLE,
            TestDriver::ENABLE_PULSE,
            TestDriver::COMMAND_SETTLE,
            TestDriver::STROBE_SETTLE,
        ];
        assert_eq!(sleeps, [strobe, strobe].concat());
    }

    #[test]
    fn strobe_only_clears_enable() {
        let mut lcd = open();
        lcd.write_string("Strobe", 3, 2).unwrap();
        lcd.clear().unwrap();
        for pair in lcd.transport().bytes().chunks(2) {
            assert_eq!(pair[0] & TestDriver::ENABLE_BIT, TestDriver::ENABLE_BIT);
            assert_eq!(pair[1], pair[0] & !TestDriver::ENABLE_BIT);
            assert_eq!(pair[1] & TestDriver::BACKLIGHT_BIT, TestDriver::BACKLIGHT_BIT);
        }
    }

    #[test]
    fn clear_is_clear_then_home() {
        let mut lcd = open();
        lcd.clear().unwrap();
        assert_eq!(
            bytes_after_init(&lcd),
            [0x0C, 0x08, 0x1C, 0x18, 0x0C, 0x08, 0x2C, 0x28]
        );
    }

    #[test]
    fn clear_twice_sends_the_same_bytes() {
        let mut lcd = open();
        lcd.clear().unwrap();
        let first = bytes_after_init(&lcd);
        lcd.clear().unwrap();
        let both = bytes_after_init(&lcd);
        assert_eq!(both.len(), 2 * first.len());
        assert_eq!(both[..first.len()], both[first.len()..]);
    }

    #[test]
    fn write_string_encoding() {
        let mut lcd = open();
        lcd.write_string("AB", 1, 5).unwrap();
        assert_eq!(
            bytes_after_init(&lcd),
            [
                0x8C, 0x88, 0x5C, 0x58, // address 0x85, RS=0
                0x4D, 0x49, 0x1D, 0x19, // 'A', RS=1
                0x4D, 0x49, 0x2D, 0x29, // 'B', RS=1
            ]
        );
    }

    #[test]
    fn write_string_sends_four_writes_per_byte() {
        for (text, row, column) in [("", 1, 0), ("Hello", 2, 0), ("12345678901234567890", 4, 0)] {
            let mut lcd = open();
            lcd.write_string(text, row, column).unwrap();
            assert_eq!(bytes_after_init(&lcd).len(), (1 + text.len()) * 4, "{text:?}");
        }
    }

    #[test]
    fn write_string_past_the_last_column_is_not_rejected() {
        let mut lcd = open();
        lcd.write_string("This line is far too long for a 16x2", 1, 10).unwrap();
    }

    #[test]
    fn cursor_shift_encoding() {
        let mut lcd = open();
        lcd.cursor_shift(true, CursorDirection::Right).unwrap();
        lcd.cursor_shift(false, CursorDirection::Left).unwrap();
        assert_eq!(
            bytes_after_init(&lcd),
            [
                0x1C, 0x18, 0xCC, 0xC8, // display shift right 0x1C
                0x1C, 0x18, 0x0C, 0x08, // cursor shift left 0x10
            ]
        );
    }

    #[test]
    fn invalid_row_writes_nothing() {
        let mut lcd = open();
        assert_eq!(lcd.write_string("x", 0, 0), Err(LcdError::InvalidArgument));
        assert_eq!(lcd.write_string("x", 5, 0), Err(LcdError::InvalidArgument));
        assert!(bytes_after_init(&lcd).is_empty());
    }

    #[test]
    fn init_failure_reports_the_last_step_reached() {
        let cases = [
            (0, InitStep::PoweredUnknown),
            (1, InitStep::PoweredUnknown),
            (2, InitStep::Bit4ModeRequested(1)),
            (5, InitStep::Bit4ModeRequested(2)),
            (7, InitStep::Bit4ModeRequested(3)),
            (8, InitStep::Bit4ModeRequested(3)),
            (12, InitStep::FunctionSetApplied),
            (19, InitStep::FunctionSetApplied),
            (20, InitStep::DisplayOnCleared),
            (23, InitStep::DisplayOnCleared),
        ];
        for (index, step) in cases {
            let err = open_failing_at(index).unwrap_err();
            assert_eq!(
                err,
                InitError { step, source: LcdError::Io(ErrorKind::BrokenPipe) },
                "failing write {index}"
            );
        }
    }

    #[test]
    fn init_failure_stops_at_the_failed_write() {
        let mut transport = RecordingTransport::new().failing_at(10);
        let mut clock = FakeClock::new();
        assert!(I2cHD44780Driver::open_with_clock(&mut transport, &mut clock).is_err());

        assert_eq!(transport.attempts(), 11);
        assert_eq!(transport.bytes(), INIT_BYTES[..10]);
        assert!(!clock.sleeps().contains(&TestDriver::STARTUP_SETTLE));
    }

    #[test]
    fn runtime_failure_stops_at_the_failed_write() {
        // First write of 'c': address and two characters went out before it.
        let mut lcd = TestDriver::open_with_clock(
            RecordingTransport::new().failing_at(INIT_BYTES.len() + 4 + 8),
            FakeClock::new(),
        )
        .unwrap();

        let err = lcd.write_string("abcdef", 1, 0).unwrap_err();

        assert_eq!(err, LcdError::Io(ErrorKind::BrokenPipe));
        assert_eq!(lcd.transport().attempts(), INIT_BYTES.len() + 4 + 8 + 1);
        assert_eq!(bytes_after_init(&lcd).len(), 4 + 8);
    }

    #[test]
    fn raw_nibbles_must_fit_in_four_bits() {
        let mut lcd = open();
        assert_eq!(lcd.write_nibble(0x10), Err(LcdError::InvalidArgument));
        assert!(bytes_after_init(&lcd).is_empty());
    }

    #[test]
    fn into_inner_returns_the_transport() {
        let transport = open().into_inner();
        assert_eq!(transport.writes().len(), INIT_BYTES.len());
    }
}
