//! Pin assignment
//!
//! Maps each display signal line to a GPIO number on the target MCU.

use heapless::Vec;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::error::SetupError;

/// Number of display signal lines
pub const SIGNAL_COUNT: usize = 7;

/// GPIO pin number
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Pin(pub u8);

impl Pin {
    /// GPIO number
    pub const fn number(self) -> u8 {
        self.0
    }
}

/// Display signal line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Signal {
    /// Display SDO, only needed for readback
    Miso,
    Mosi,
    Sclk,
    /// Chip select
    Cs,
    /// Data/command select
    Dc,
    /// Reset; unconnected when tied to the board reset
    Rst,
    /// Backlight LED driver
    Backlight,
}

impl Signal {
    /// All signals in wiring order
    pub const ALL: [Signal; SIGNAL_COUNT] = [
        Signal::Miso,
        Signal::Mosi,
        Signal::Sclk,
        Signal::Cs,
        Signal::Dc,
        Signal::Rst,
        Signal::Backlight,
    ];

    /// Conventional signal name
    pub const fn name(self) -> &'static str {
        match self {
            Signal::Miso => "MISO",
            Signal::Mosi => "MOSI",
            Signal::Sclk => "SCLK",
            Signal::Cs => "CS",
            Signal::Dc => "DC",
            Signal::Rst => "RST",
            Signal::Backlight => "BL",
        }
    }

    /// Key used in setup files
    pub const fn key(self) -> &'static str {
        match self {
            Signal::Miso => "miso",
            Signal::Mosi => "mosi",
            Signal::Sclk => "sclk",
            Signal::Cs => "cs",
            Signal::Dc => "dc",
            Signal::Rst => "rst",
            Signal::Backlight => "backlight",
        }
    }

    /// Look up a signal by setup file key
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.key() == key)
    }

    /// Whether the signal may be left unconnected
    pub const fn is_optional(self) -> bool {
        matches!(self, Signal::Miso | Signal::Rst | Signal::Backlight)
    }
}

/// MCU family the pins belong to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Target {
    Esp32,
    Esp32S2,
    Esp32S3,
    Rp2040,
    /// RP2350B package (48 GPIOs)
    Rp2350,
}

impl Target {
    /// Bit mask of the GPIOs that exist on the chip
    pub const fn gpio_mask(self) -> u64 {
        match self {
            // GPIO20, 24 and 28-31 are not bonded out
            Target::Esp32 => {
                pin_range(0, 19) | pin_range(21, 23) | pin_range(25, 27) | pin_range(32, 39)
            }
            // GPIO22-25 do not exist
            Target::Esp32S2 => pin_range(0, 21) | pin_range(26, 46),
            Target::Esp32S3 => pin_range(0, 21) | pin_range(26, 48),
            Target::Rp2040 => pin_range(0, 29),
            Target::Rp2350 => pin_range(0, 47),
        }
    }

    /// Bit mask of the GPIOs that can drive an output
    pub const fn output_mask(self) -> u64 {
        match self {
            // GPIO34-39 are input-only
            Target::Esp32 => self.gpio_mask() & !pin_range(34, 39),
            // GPIO46 is input-only
            Target::Esp32S2 => self.gpio_mask() & !pin_range(46, 46),
            _ => self.gpio_mask(),
        }
    }

    /// Whether the pin exists on the chip
    pub const fn has_pin(self, pin: Pin) -> bool {
        pin.0 < 64 && self.gpio_mask() & (1 << pin.0) != 0
    }

    /// Whether the pin exists and can drive an output
    pub const fn can_drive(self, pin: Pin) -> bool {
        pin.0 < 64 && self.output_mask() & (1 << pin.0) != 0
    }

    /// Key used in setup files
    pub const fn key(self) -> &'static str {
        match self {
            Target::Esp32 => "esp32",
            Target::Esp32S2 => "esp32s2",
            Target::Esp32S3 => "esp32s3",
            Target::Rp2040 => "rp2040",
            Target::Rp2350 => "rp2350",
        }
    }

    /// Look up a target by setup file key
    pub fn from_key(key: &str) -> Option<Self> {
        [
            Target::Esp32,
            Target::Esp32S2,
            Target::Esp32S3,
            Target::Rp2040,
            Target::Rp2350,
        ]
        .into_iter()
        .find(|t| t.key() == key)
    }
}

/// Mask with bits `first..=last` set
const fn pin_range(first: u8, last: u8) -> u64 {
    let upper = if last >= 63 { u64::MAX } else { (1 << (last + 1)) - 1 };
    upper & !((1 << first) - 1)
}

/// Physical wiring of the display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PinAssignment {
    /// Do not connect to display SDO if other devices occupy the SPI bus
    pub miso: Option<Pin>,
    pub mosi: Pin,
    pub sclk: Pin,
    pub cs: Pin,
    pub dc: Pin,
    pub rst: Option<Pin>,
    pub backlight: Option<Pin>,
}

impl PinAssignment {
    /// Write-only wiring with reset tied to the board and no backlight control
    pub const fn new(mosi: Pin, sclk: Pin, cs: Pin, dc: Pin) -> Self {
        Self {
            miso: None,
            mosi,
            sclk,
            cs,
            dc,
            rst: None,
            backlight: None,
        }
    }

    /// Pin wired to a signal, `None` if unconnected
    pub const fn get(&self, signal: Signal) -> Option<Pin> {
        match signal {
            Signal::Miso => self.miso,
            Signal::Mosi => Some(self.mosi),
            Signal::Sclk => Some(self.sclk),
            Signal::Cs => Some(self.cs),
            Signal::Dc => Some(self.dc),
            Signal::Rst => self.rst,
            Signal::Backlight => self.backlight,
        }
    }

    /// Rewire a signal
    ///
    /// Only optional signals accept `None`. Does not check for conflicts;
    /// that happens when the setup is built.
    pub fn set(&mut self, signal: Signal, pin: Option<Pin>) -> Result<(), SetupError> {
        match (signal, pin) {
            (Signal::Miso, pin) => self.miso = pin,
            (Signal::Rst, pin) => self.rst = pin,
            (Signal::Backlight, pin) => self.backlight = pin,
            (Signal::Mosi, Some(pin)) => self.mosi = pin,
            (Signal::Sclk, Some(pin)) => self.sclk = pin,
            (Signal::Cs, Some(pin)) => self.cs = pin,
            (Signal::Dc, Some(pin)) => self.dc = pin,
            (signal, None) => return Err(SetupError::SignalRequired(signal)),
        }
        Ok(())
    }

    /// Pin per signal, in [`Signal::ALL`] order
    pub const fn as_array(&self) -> [Option<Pin>; SIGNAL_COUNT] {
        [
            self.miso,
            Some(self.mosi),
            Some(self.sclk),
            Some(self.cs),
            Some(self.dc),
            self.rst,
            self.backlight,
        ]
    }

    /// Connected signals and their pins
    pub fn connected(&self) -> Vec<(Signal, Pin), SIGNAL_COUNT> {
        let mut out = Vec::new();
        for (signal, pin) in Signal::ALL.into_iter().zip(self.as_array()) {
            if let Some(pin) = pin {
                // Capacity equals the signal count
                let _ = out.push((signal, pin));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wiring() -> PinAssignment {
        PinAssignment {
            miso: None,
            mosi: Pin(11),
            sclk: Pin(13),
            cs: Pin(10),
            dc: Pin(9),
            rst: Some(Pin(15)),
            backlight: None,
        }
    }

    #[test]
    fn test_get_follows_fields() {
        let pins = wiring();
        assert_eq!(pins.get(Signal::Miso), None);
        assert_eq!(pins.get(Signal::Cs), Some(Pin(10)));
        assert_eq!(pins.get(Signal::Rst), Some(Pin(15)));
    }

    #[test]
    fn test_connected_skips_unwired() {
        let connected = wiring().connected();
        assert_eq!(connected.len(), 5);
        assert_eq!(connected[0], (Signal::Mosi, Pin(11)));
        assert!(!connected.iter().any(|(s, _)| *s == Signal::Backlight));
    }

    #[test]
    fn test_set_optional_and_required() {
        let mut pins = wiring();
        pins.set(Signal::Backlight, Some(Pin(14))).unwrap();
        assert_eq!(pins.backlight, Some(Pin(14)));

        assert_eq!(
            pins.set(Signal::Dc, None),
            Err(SetupError::SignalRequired(Signal::Dc))
        );
        assert_eq!(pins.dc, Pin(9));
    }

    #[test]
    fn test_signal_keys() {
        for signal in Signal::ALL {
            assert_eq!(Signal::from_key(signal.key()), Some(signal));
        }
        assert_eq!(Signal::from_key("bl"), None);
        assert!(Signal::Rst.is_optional());
        assert!(!Signal::Sclk.is_optional());
    }

    #[test]
    fn test_target_pin_tables() {
        assert!(Target::Rp2040.has_pin(Pin(29)));
        assert!(!Target::Rp2040.has_pin(Pin(30)));

        for n in 22..=25 {
            assert!(!Target::Esp32S3.has_pin(Pin(n)));
            assert!(!Target::Esp32S2.has_pin(Pin(n)));
        }
        assert!(Target::Esp32S3.can_drive(Pin(48)));
        assert!(!Target::Esp32S3.has_pin(Pin(200)));

        for n in [20, 24, 28, 31] {
            assert!(!Target::Esp32.has_pin(Pin(n)));
        }
        assert!(Target::Esp32.has_pin(Pin(36)));
        assert!(!Target::Esp32.can_drive(Pin(36)));
        assert!(Target::Esp32.can_drive(Pin(33)));
        assert!(!Target::Esp32S2.can_drive(Pin(46)));
    }

    #[test]
    fn test_target_keys() {
        assert_eq!(Target::from_key("esp32s3"), Some(Target::Esp32S3));
        assert_eq!(Target::from_key("avr"), None);
    }
}
