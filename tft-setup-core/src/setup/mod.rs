//! Display setup types
//!
//! A [`DisplaySetup`] can only be obtained through [`SetupBuilder::build`],
//! which validates it. Mutations go back through the builder, so a setup
//! is either replaced by a new valid one or left untouched.

pub mod backlight;
pub mod controller;
pub mod error;
pub mod fonts;
pub mod pins;
pub mod spi;
mod validate;

pub use backlight::{Backlight, BacklightPolarity};
pub use controller::ControllerModel;
pub use error::SetupError;
pub use fonts::{Font, FontSet, UnknownFontBits};
pub use pins::{Pin, PinAssignment, Signal, Target};
pub use spi::SpiTiming;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Current setup format version
pub const SETUP_VERSION: u8 = 1;

/// Default flash budget for linked font tables (64 KiB)
pub const DEFAULT_FONT_FLASH_BUDGET: u32 = 64 * 1024;

/// Unvalidated display setup
///
/// Every field is public so loaders can fill it in piece by piece. Call
/// [`SetupBuilder::build`] to obtain a [`DisplaySetup`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SetupBuilder {
    /// Setup format version
    pub version: u8,
    /// MCU family the pins belong to
    pub target: Target,
    /// Display controller chip
    pub controller: ControllerModel,
    /// Pin wiring
    pub pins: PinAssignment,
    /// Fonts linked into the firmware
    pub fonts: FontSet,
    /// Anti-aliased text rendering path
    pub smooth_font: bool,
    /// SPI clock rates
    pub spi: SpiTiming,
    /// Level that energizes the backlight
    pub backlight_polarity: BacklightPolarity,
    /// Other devices share the SPI bus with the display
    pub bus_shared: bool,
    /// Firmware draws text (requires at least one font)
    pub text_rendering: bool,
    /// Flash budget for font tables in bytes
    pub font_flash_budget: u32,
}

impl SetupBuilder {
    /// Start a setup for a controller wired to the given pins
    ///
    /// Defaults: no fonts, no smooth font, 27 MHz write / 20 MHz read,
    /// active-high backlight, exclusive bus, no text rendering.
    pub const fn new(target: Target, controller: ControllerModel, pins: PinAssignment) -> Self {
        Self {
            version: SETUP_VERSION,
            target,
            controller,
            pins,
            fonts: FontSet::empty(),
            smooth_font: false,
            spi: SpiTiming::MHZ_27,
            backlight_polarity: BacklightPolarity::ActiveHigh,
            bus_shared: false,
            text_rendering: false,
            font_flash_budget: DEFAULT_FONT_FLASH_BUDGET,
        }
    }

    /// Validate and freeze the setup
    pub const fn build(self) -> Result<DisplaySetup, SetupError> {
        match validate::validate(&self) {
            Ok(()) => Ok(DisplaySetup { raw: self }),
            Err(e) => Err(e),
        }
    }
}

/// Validated display setup
///
/// Consumed wholesale by the display driver at initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(try_from = "SetupBuilder", into = "SetupBuilder")
)]
pub struct DisplaySetup {
    raw: SetupBuilder,
}

const USER_SETUP_BUILDER: SetupBuilder = SetupBuilder {
    version: SETUP_VERSION,
    target: Target::Esp32S3,
    // ILI9488 SDO does not tristate when CS is high: keep MISO off shared buses
    controller: ControllerModel::Ili9488,
    pins: PinAssignment {
        miso: Some(Pin(12)),
        mosi: Pin(11),
        sclk: Pin(13),
        cs: Pin(10),
        dc: Pin(9),
        rst: Some(Pin(15)),
        backlight: Some(Pin(14)),
    },
    fonts: FontSet::all(),
    smooth_font: true,
    spi: SpiTiming::MHZ_27,
    backlight_polarity: BacklightPolarity::ActiveHigh,
    bus_shared: false,
    text_rendering: true,
    font_flash_budget: DEFAULT_FONT_FLASH_BUDGET,
};

impl DisplaySetup {
    /// The built-in setup compiled into the firmware
    pub const USER_SETUP: DisplaySetup = match USER_SETUP_BUILDER.build() {
        Ok(setup) => setup,
        Err(_) => panic!("built-in display setup is invalid"),
    };

    /// Setup format version
    pub const fn version(&self) -> u8 {
        self.raw.version
    }

    /// MCU family
    pub const fn target(&self) -> Target {
        self.raw.target
    }

    /// Display controller chip
    pub const fn controller(&self) -> ControllerModel {
        self.raw.controller
    }

    /// Pin wiring
    pub const fn pins(&self) -> &PinAssignment {
        &self.raw.pins
    }

    /// Fonts linked into the firmware
    pub const fn fonts(&self) -> FontSet {
        self.raw.fonts
    }

    /// Anti-aliased text rendering enabled
    pub const fn smooth_font(&self) -> bool {
        self.raw.smooth_font
    }

    /// SPI clock rates
    pub const fn spi(&self) -> SpiTiming {
        self.raw.spi
    }

    /// Backlight polarity
    pub const fn backlight_polarity(&self) -> BacklightPolarity {
        self.raw.backlight_polarity
    }

    /// Other devices share the SPI bus
    pub const fn bus_shared(&self) -> bool {
        self.raw.bus_shared
    }

    /// Firmware draws text
    pub const fn text_rendering(&self) -> bool {
        self.raw.text_rendering
    }

    /// Flash budget for font tables in bytes
    pub const fn font_flash_budget(&self) -> u32 {
        self.raw.font_flash_budget
    }

    /// Copy of the fields, for editing
    pub const fn into_builder(self) -> SetupBuilder {
        self.raw
    }

    /// Rewire one signal
    ///
    /// `None` leaves an optional signal (MISO, RST, backlight) unconnected.
    pub fn with_pin(self, signal: Signal, pin: Option<Pin>) -> Result<Self, SetupError> {
        let mut raw = self.raw;
        raw.pins.set(signal, pin)?;
        raw.build()
    }

    /// Swap the controller model
    pub fn with_controller(self, controller: ControllerModel) -> Result<Self, SetupError> {
        SetupBuilder { controller, ..self.raw }.build()
    }

    /// Change the SPI clock rates
    pub fn with_spi(self, spi: SpiTiming) -> Result<Self, SetupError> {
        SetupBuilder { spi, ..self.raw }.build()
    }

    /// Change the font inclusion set
    pub fn with_fonts(self, fonts: FontSet) -> Result<Self, SetupError> {
        SetupBuilder { fonts, ..self.raw }.build()
    }

    /// Change the backlight polarity
    pub fn with_backlight_polarity(self, polarity: BacklightPolarity) -> Result<Self, SetupError> {
        SetupBuilder {
            backlight_polarity: polarity,
            ..self.raw
        }
        .build()
    }
}

impl Default for DisplaySetup {
    fn default() -> Self {
        Self::USER_SETUP
    }
}

impl TryFrom<SetupBuilder> for DisplaySetup {
    type Error = SetupError;

    fn try_from(raw: SetupBuilder) -> Result<Self, Self::Error> {
        raw.build()
    }
}

impl From<DisplaySetup> for SetupBuilder {
    fn from(setup: DisplaySetup) -> Self {
        setup.raw
    }
}
