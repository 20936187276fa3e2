//! Setup validation errors

use core::fmt;

use super::pins::{Pin, Signal};

/// Reasons a display setup is rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SetupError {
    /// Setup format version not understood
    UnsupportedVersion(u8),
    /// Required signal left unconnected
    SignalRequired(Signal),
    /// Pin does not exist on the target MCU
    PinOutOfRange { signal: Signal, pin: Pin },
    /// Output signal wired to an input-only pin
    PinInputOnly { signal: Signal, pin: Pin },
    /// Two signals wired to the same pin
    PinConflict {
        first: Signal,
        second: Signal,
        pin: Pin,
    },
    /// A clock rate of zero
    ZeroFrequency,
    /// Write clock above the controller ceiling
    WriteFrequencyTooHigh { hz: u32, max_hz: u32 },
    /// Read clock above the controller ceiling
    ReadFrequencyTooHigh { hz: u32, max_hz: u32 },
    /// Read clock faster than write clock
    ReadFasterThanWrite { read_hz: u32, write_hz: u32 },
    /// Text rendering requested with no fonts included
    NoFonts,
    /// Included fonts exceed the flash budget
    FontBudgetExceeded { footprint: u32, budget: u32 },
    /// Non-tristating SDO wired to MISO on a shared bus
    MisoOnSharedBus,
}

impl fmt::Display for SetupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SetupError::UnsupportedVersion(v) => write!(f, "unsupported setup version {}", v),
            SetupError::SignalRequired(s) => write!(f, "{} must be connected", s.name()),
            SetupError::PinOutOfRange { signal, pin } => {
                write!(f, "{} pin {} does not exist on target", signal.name(), pin.0)
            }
            SetupError::PinInputOnly { signal, pin } => {
                write!(f, "{} pin {} is input-only", signal.name(), pin.0)
            }
            SetupError::PinConflict { first, second, pin } => write!(
                f,
                "{} and {} both wired to pin {}",
                first.name(),
                second.name(),
                pin.0
            ),
            SetupError::ZeroFrequency => f.write_str("SPI frequency must be non-zero"),
            SetupError::WriteFrequencyTooHigh { hz, max_hz } => {
                write!(f, "write frequency {} Hz exceeds {} Hz", hz, max_hz)
            }
            SetupError::ReadFrequencyTooHigh { hz, max_hz } => {
                write!(f, "read frequency {} Hz exceeds {} Hz", hz, max_hz)
            }
            SetupError::ReadFasterThanWrite { read_hz, write_hz } => write!(
                f,
                "read frequency {} Hz above write frequency {} Hz",
                read_hz, write_hz
            ),
            SetupError::NoFonts => f.write_str("text rendering needs at least one font"),
            SetupError::FontBudgetExceeded { footprint, budget } => write!(
                f,
                "fonts need {} bytes of flash, budget is {}",
                footprint, budget
            ),
            SetupError::MisoOnSharedBus => {
                f.write_str("controller SDO does not tristate; disconnect MISO on a shared bus")
            }
        }
    }
}
