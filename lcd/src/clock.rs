//! Delay source used by the drivers.
//!
//! The HD44780 is driven blind, so the delays between bus writes are what keeps it in sync.
//! They go through [Clock] so tests can record them instead of waiting.

use std::fmt::Debug;
use std::thread;
use std::time::Duration;

pub trait Clock: Debug {
    /// Blocks the calling thread for at least `duration`.
    fn sleep(&mut self, duration: Duration);
}

impl<C: Clock + ?Sized> Clock for &mut C {
    fn sleep(&mut self, duration: Duration) {
        (**self).sleep(duration)
    }
}

impl<C: Clock + ?Sized> Clock for Box<C> {
    fn sleep(&mut self, duration: Duration) {
        (**self).sleep(duration)
    }
}

/// [Clock] backed by [thread::sleep].
#[derive(Debug, Default, Copy, Clone)]
pub struct ThreadClock;

impl Clock for ThreadClock {
    fn sleep(&mut self, duration: Duration) {
        thread::sleep(duration);
    }
}
