use crate::LcdError;
use std::fmt::{Display, Formatter};
use thiserror::Error;

/// Steps of the power-on sequence, in the order they are reached.
///
/// There is no read-back, so a step is considered reached as soon as its writes went out.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum InitStep {
    /// Nothing sent yet; the controller may be in 8-bit or 4-bit mode, or mid-nibble.
    PoweredUnknown,
    /// The n-th (1-3) "8-bit mode" nibble has been strobed.
    Bit4ModeRequested(u8),
    /// 4-bit mode committed and function set (2 lines, 5x8 font) sent.
    FunctionSetApplied,
    /// Display switched on and cleared.
    DisplayOnCleared,
    /// Left-to-right entry mode set.
    EntryModeSet,
    Ready,
}

impl Display for InitStep {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            InitStep::PoweredUnknown => write!(f, "powered, state unknown"),
            InitStep::Bit4ModeRequested(n) => write!(f, "4-bit mode requested ({}/3)", n),
            InitStep::FunctionSetApplied => write!(f, "function set applied"),
            InitStep::DisplayOnCleared => write!(f, "display on and cleared"),
            InitStep::EntryModeSet => write!(f, "entry mode set"),
            InitStep::Ready => write!(f, "ready"),
        }
    }
}

/// The display never became ready.
///
/// `step` is the last step fully sent before `source` occurred.
#[derive(Debug, Error, Eq, PartialEq, Clone)]
#[error("LCD initialization failed after step \"{step}\": {source}")]
pub struct InitError {
    pub step: InitStep,
    #[source]
    pub source: LcdError,
}
