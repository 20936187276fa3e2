//! Display setup file and loader
//!
//! The firmware's display setup lives in `user_setup.toml`, validated by
//! `build.rs` when the crate is compiled and bundled into the binary. At
//! runtime a setup can also be loaded from flash, as TOML text or as a
//! postcard-encoded binary, with the bundled file as fallback.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

#[macro_use]
mod log;

pub mod loader;
pub mod toml;

pub use loader::{LoadError, SetupLoader, SetupSource};
pub use toml::{parse_setup, ParseError};

use tft_setup_core::setup::DisplaySetup;

/// The setup file bundled at build time
pub const USER_SETUP_TOML: &str = include_str!("../user_setup.toml");

// Written out by hand: build.rs compiles the parser without defmt
#[cfg(feature = "defmt")]
impl defmt::Format for ParseError {
    fn format(&self, f: defmt::Formatter) {
        match self {
            ParseError::InvalidSection => defmt::write!(f, "InvalidSection"),
            ParseError::DuplicateSection => defmt::write!(f, "DuplicateSection"),
            ParseError::InvalidValue => defmt::write!(f, "InvalidValue"),
            ParseError::UnknownKey => defmt::write!(f, "UnknownKey"),
            ParseError::DuplicateKey => defmt::write!(f, "DuplicateKey"),
            ParseError::MissingKey(key) => defmt::write!(f, "MissingKey({=str})", *key),
            ParseError::DuplicateController => defmt::write!(f, "DuplicateController"),
            ParseError::Invalid(e) => defmt::write!(f, "Invalid({})", e),
        }
    }
}

/// Parse the bundled setup file
pub fn embedded_setup() -> Result<DisplaySetup, ParseError> {
    parse_setup(USER_SETUP_TOML)
}
