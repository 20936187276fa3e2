//! TFT setup hardware abstraction layer
//!
//! Traits and plain data types through which a display setup reaches the
//! hardware. Chip-specific HALs implement them; the setup crates only ever
//! see these seams.
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  tft-setup-config (loader, TOML file)   │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  tft-setup-core (DisplaySetup)          │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  tft-setup-hal (this crate - traits)    │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::OutputPin`] - Backlight and other control lines
//! - [`spi::SpiConfig`] - Clock setup for write and read transactions
//! - [`flash::FlashStorage`] - Persisted display setups

#![no_std]
#![deny(unsafe_code)]

pub mod flash;
pub mod gpio;
pub mod spi;

pub use flash::{FlashError, FlashStorage, StorageKey};
pub use gpio::{Level, OutputPin};
pub use spi::{Mode, Phase, Polarity, SpiConfig};
