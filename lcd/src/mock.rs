//! Recording transport and clock for tests.

use crate::clock::Clock;
use crate::transport::I2cTransport;
use crate::{LcdError, LcdResult};
use std::io::ErrorKind;
use std::time::Duration;

/// Records every write. Can be told to fail one specific write.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    writes: Vec<Vec<u8>>,
    attempts: usize,
    fail_at: Option<usize>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the `index`-th write attempt (0-based, counted from now on) fail with
    /// [ErrorKind::BrokenPipe].
    pub fn failing_at(mut self, index: usize) -> Self {
        self.fail_at = Some(self.attempts + index);
        self
    }

    /// All successful writes, one entry per call.
    pub fn writes(&self) -> &[Vec<u8>] {
        &self.writes
    }

    /// All successfully written bytes, flattened.
    pub fn bytes(&self) -> Vec<u8> {
        self.writes.iter().flatten().copied().collect()
    }

    pub fn attempts(&self) -> usize {
        self.attempts
    }
}

impl I2cTransport for RecordingTransport {
    fn write(&mut self, bytes: &[u8]) -> LcdResult<()> {
        let attempt = self.attempts;
        self.attempts += 1;
        if self.fail_at == Some(attempt) {
            return Err(LcdError::Io(ErrorKind::BrokenPipe));
        }
        self.writes.push(bytes.to_vec());
        Ok(())
    }
}

/// Records requested sleeps instead of sleeping.
#[derive(Debug, Default)]
pub struct FakeClock {
    sleeps: Vec<Duration>,
}

impl FakeClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sleeps(&self) -> &[Duration] {
        &self.sleeps
    }

    pub fn total(&self) -> Duration {
        self.sleeps.iter().sum()
    }
}

impl Clock for FakeClock {
    fn sleep(&mut self, duration: Duration) {
        self.sleeps.push(duration);
    }
}
