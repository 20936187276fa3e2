//! Backlight polarity and control

use tft_setup_hal::gpio::{Level, OutputPin};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Logic level that energizes the backlight
///
/// Must match the backlight driver circuit on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BacklightPolarity {
    #[default]
    ActiveHigh,
    ActiveLow,
}

impl BacklightPolarity {
    /// Level that turns the backlight on
    pub const fn on_level(self) -> Level {
        match self {
            BacklightPolarity::ActiveHigh => Level::High,
            BacklightPolarity::ActiveLow => Level::Low,
        }
    }

    /// Level that turns the backlight off
    pub const fn off_level(self) -> Level {
        self.on_level().inverted()
    }

    /// Parse the setup file form ("high" or "low")
    pub fn from_level_key(key: &str) -> Option<Self> {
        match key {
            "high" => Some(BacklightPolarity::ActiveHigh),
            "low" => Some(BacklightPolarity::ActiveLow),
            _ => None,
        }
    }
}

/// Backlight control over an output pin
pub struct Backlight<P> {
    pin: P,
    polarity: BacklightPolarity,
}

impl<P: OutputPin> Backlight<P> {
    /// Take over the pin, starting with the backlight off
    pub fn new(mut pin: P, polarity: BacklightPolarity) -> Self {
        pin.set_level(polarity.off_level());
        Self { pin, polarity }
    }

    pub fn on(&mut self) {
        self.pin.set_level(self.polarity.on_level());
    }

    pub fn off(&mut self) {
        self.pin.set_level(self.polarity.off_level());
    }

    pub fn set(&mut self, on: bool) {
        if on {
            self.on();
        } else {
            self.off();
        }
    }

    pub fn is_on(&self) -> bool {
        self.pin.level() == self.polarity.on_level()
    }

    /// Release the pin
    pub fn into_inner(self) -> P {
        self.pin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakePin {
        high: bool,
    }

    impl OutputPin for FakePin {
        fn set_high(&mut self) {
            self.high = true;
        }
        fn set_low(&mut self) {
            self.high = false;
        }
        fn is_set_high(&self) -> bool {
            self.high
        }
    }

    #[test]
    fn test_active_high() {
        let mut bl = Backlight::new(FakePin { high: true }, BacklightPolarity::ActiveHigh);
        assert!(!bl.is_on());

        bl.on();
        assert!(bl.is_on());
        assert!(bl.into_inner().high);
    }

    #[test]
    fn test_active_low_drives_pin_low() {
        let mut bl = Backlight::new(FakePin { high: false }, BacklightPolarity::ActiveLow);
        assert!(!bl.is_on());

        bl.set(true);
        assert!(bl.is_on());
        bl.off();
        assert!(bl.into_inner().high);
    }

    #[test]
    fn test_level_keys() {
        assert_eq!(
            BacklightPolarity::from_level_key("low"),
            Some(BacklightPolarity::ActiveLow)
        );
        assert_eq!(BacklightPolarity::from_level_key("LOW"), None);
    }
}
