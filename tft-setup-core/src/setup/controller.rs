//! Display controller catalogue

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Display controller chip
///
/// Selects which controller-specific command set the driver compiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ControllerModel {
    Ili9341,
    Ili9481,
    Ili9486,
    /// SDO does not tristate when CS is high
    Ili9488,
    St7735,
    St7789,
    St7796,
    Gc9a01,
    Hx8357d,
    Ssd1351,
}

impl ControllerModel {
    /// Every supported controller
    pub const ALL: [ControllerModel; 10] = [
        ControllerModel::Ili9341,
        ControllerModel::Ili9481,
        ControllerModel::Ili9486,
        ControllerModel::Ili9488,
        ControllerModel::St7735,
        ControllerModel::St7789,
        ControllerModel::St7796,
        ControllerModel::Gc9a01,
        ControllerModel::Hx8357d,
        ControllerModel::Ssd1351,
    ];

    /// Chip name as printed in datasheets
    pub const fn name(self) -> &'static str {
        match self {
            ControllerModel::Ili9341 => "ILI9341",
            ControllerModel::Ili9481 => "ILI9481",
            ControllerModel::Ili9486 => "ILI9486",
            ControllerModel::Ili9488 => "ILI9488",
            ControllerModel::St7735 => "ST7735",
            ControllerModel::St7789 => "ST7789",
            ControllerModel::St7796 => "ST7796",
            ControllerModel::Gc9a01 => "GC9A01",
            ControllerModel::Hx8357d => "HX8357D",
            ControllerModel::Ssd1351 => "SSD1351",
        }
    }

    /// Key used in setup files
    pub const fn key(self) -> &'static str {
        match self {
            ControllerModel::Ili9341 => "ili9341",
            ControllerModel::Ili9481 => "ili9481",
            ControllerModel::Ili9486 => "ili9486",
            ControllerModel::Ili9488 => "ili9488",
            ControllerModel::St7735 => "st7735",
            ControllerModel::St7789 => "st7789",
            ControllerModel::St7796 => "st7796",
            ControllerModel::Gc9a01 => "gc9a01",
            ControllerModel::Hx8357d => "hx8357d",
            ControllerModel::Ssd1351 => "ssd1351",
        }
    }

    /// Look up a controller by setup file key
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.key() == key)
    }

    /// Native panel resolution (width, height) in portrait orientation
    pub const fn native_size(self) -> (u16, u16) {
        match self {
            ControllerModel::Ili9341 | ControllerModel::St7789 => (240, 320),
            ControllerModel::Ili9481
            | ControllerModel::Ili9486
            | ControllerModel::Ili9488
            | ControllerModel::St7796
            | ControllerModel::Hx8357d => (320, 480),
            ControllerModel::St7735 => (128, 160),
            ControllerModel::Gc9a01 => (240, 240),
            ControllerModel::Ssd1351 => (128, 128),
        }
    }

    /// Highest write clock the controller and typical wiring sustain, in Hz
    pub const fn max_write_hz(self) -> u32 {
        match self {
            ControllerModel::Ili9341
            | ControllerModel::St7789
            | ControllerModel::St7796
            | ControllerModel::Gc9a01 => 80_000_000,
            ControllerModel::Ili9488 => 40_000_000,
            ControllerModel::Ili9481
            | ControllerModel::Ili9486
            | ControllerModel::St7735
            | ControllerModel::Hx8357d => 27_000_000,
            ControllerModel::Ssd1351 => 20_000_000,
        }
    }

    /// Highest readback clock in Hz
    pub const fn max_read_hz(self) -> u32 {
        match self {
            ControllerModel::Ssd1351 => 10_000_000,
            _ => 20_000_000,
        }
    }

    /// Whether SDO releases the bus when CS is high
    ///
    /// Controllers that do not tristate cannot share MISO with other SPI
    /// peripherals.
    pub const fn sdo_tristates(self) -> bool {
        !matches!(self, ControllerModel::Ili9488)
    }
}
