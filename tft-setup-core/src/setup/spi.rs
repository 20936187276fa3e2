//! SPI bus timing

use tft_setup_hal::spi::{Mode, SpiConfig};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// SPI clock rates for the display
///
/// Readback needs more timing margin than writes, so `read_hz` is
/// normally the lower of the two.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SpiTiming {
    /// Clock for write transactions in Hz
    pub write_hz: u32,
    /// Clock for read transactions (status, pixel readback) in Hz
    pub read_hz: u32,
}

impl SpiTiming {
    /// 27 MHz write, 20 MHz read
    pub const MHZ_27: SpiTiming = SpiTiming::new(27_000_000, 20_000_000);
    /// 40 MHz write, 20 MHz read
    pub const MHZ_40: SpiTiming = SpiTiming::new(40_000_000, 20_000_000);
    /// 80 MHz write, 20 MHz read
    pub const MHZ_80: SpiTiming = SpiTiming::new(80_000_000, 20_000_000);

    pub const fn new(write_hz: u32, read_hz: u32) -> Self {
        Self { write_hz, read_hz }
    }

    /// Look up a preset by setup file key ("27mhz", "40mhz", "80mhz")
    pub fn preset(key: &str) -> Option<Self> {
        match key {
            "27mhz" => Some(Self::MHZ_27),
            "40mhz" => Some(Self::MHZ_40),
            "80mhz" => Some(Self::MHZ_80),
            _ => None,
        }
    }

    /// Peripheral setup for write transactions
    pub const fn write_config(&self) -> SpiConfig {
        SpiConfig::new(self.write_hz, Mode::Mode0)
    }

    /// Peripheral setup for read transactions
    pub const fn read_config(&self) -> SpiConfig {
        SpiConfig::new(self.read_hz, Mode::Mode0)
    }
}

impl Default for SpiTiming {
    fn default() -> Self {
        Self::MHZ_27
    }
}
