//! Board-agnostic display setup for SPI TFT panels
//!
//! This crate describes, in one place, every hardware- and feature-dependent
//! value a TFT display driver needs:
//!
//! - Controller model (which command set the driver speaks)
//! - Pin assignment (MISO, MOSI, SCLK, CS, DC, RST, backlight)
//! - Font inclusion set and smooth-font rendering
//! - SPI clock rates for write and read transactions
//! - Backlight polarity
//!
//! Swapping hardware means editing [`setup::DisplaySetup::USER_SETUP`] (or
//! the TOML file loaded by `tft-setup-config`). Every setup is validated when
//! it is built, so an invalid built-in table fails compilation.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod setup;

pub use setup::*;
