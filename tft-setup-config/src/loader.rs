//! Setup persistence
//!
//! Loads the display setup from flash storage. Falls back to the bundled
//! `user_setup.toml` if flash holds nothing usable.

use core::str;

use tft_setup_core::setup::{DisplaySetup, SetupBuilder, SetupError};
use tft_setup_hal::flash::{FlashError, FlashStorage, StorageKey};

use crate::embedded_setup;
use crate::toml::{parse_setup, ParseError};

/// Maximum serialized setup size (binary)
const MAX_SETUP_SIZE: usize = 128;

/// Maximum TOML setup size
const MAX_TOML_SIZE: usize = 2048;

/// Setup persistence errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LoadError {
    /// Flash operation failed
    Flash(FlashError),
    /// Binary setup could not be decoded
    Deserialize,
    /// Setup could not be encoded
    Serialize,
    /// TOML parsing failed
    TomlParse(ParseError),
    /// Invalid UTF-8 in TOML data
    InvalidUtf8,
    /// Decoded setup failed validation
    Invalid(SetupError),
    /// Setup text exceeds the storage slot
    TooLarge,
}

impl From<FlashError> for LoadError {
    fn from(e: FlashError) -> Self {
        LoadError::Flash(e)
    }
}

impl From<ParseError> for LoadError {
    fn from(e: ParseError) -> Self {
        LoadError::TomlParse(e)
    }
}

impl From<SetupError> for LoadError {
    fn from(e: SetupError) -> Self {
        LoadError::Invalid(e)
    }
}

/// Where a loaded setup came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SetupSource {
    /// TOML text in flash
    Toml,
    /// Binary postcard data in flash
    Binary,
    /// `user_setup.toml` bundled at build time
    Embedded,
}

/// Setup persistence manager
pub struct SetupLoader<S> {
    storage: S,
}

impl<S: FlashStorage> SetupLoader<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Consume the loader and return the underlying storage
    pub fn into_storage(self) -> S {
        self.storage
    }

    /// Load the setup from flash
    ///
    /// Tries TOML first, falls back to binary postcard format.
    pub async fn load(&mut self) -> Result<(DisplaySetup, SetupSource), LoadError> {
        info!("Loading display setup from flash...");

        let toml_err = match self.load_toml().await {
            Ok(setup) => {
                info!("Loaded display setup from TOML");
                return Ok((setup, SetupSource::Toml));
            }
            Err(LoadError::Flash(FlashError::NotFound)) => {
                debug!("No TOML setup found, trying binary format");
                None
            }
            Err(e) => {
                warn!("Failed to load TOML setup: {:?}, trying binary", e);
                Some(e)
            }
        };

        match (self.load_binary().await, toml_err) {
            (Ok(setup), _) => Ok((setup, SetupSource::Binary)),
            // A broken TOML file says more than a missing binary
            (Err(LoadError::Flash(FlashError::NotFound)), Some(e)) => Err(e),
            (Err(e), _) => Err(e),
        }
    }

    /// Load the setup from flash, or the bundled file if that fails
    pub async fn load_or_embedded(&mut self) -> Result<(DisplaySetup, SetupSource), LoadError> {
        match self.load().await {
            Ok(loaded) => Ok(loaded),
            Err(e) => {
                warn!("No usable setup in flash ({:?}), using bundled setup", e);
                let setup = embedded_setup()?;
                log_setup_summary(&setup);
                Ok((setup, SetupSource::Embedded))
            }
        }
    }

    /// Persist a setup in binary form
    pub async fn store(&mut self, setup: &DisplaySetup) -> Result<(), LoadError> {
        let mut buffer = [0u8; MAX_SETUP_SIZE];
        let bytes = postcard::to_slice(setup, &mut buffer).map_err(|_| LoadError::Serialize)?;

        self.storage.write(StorageKey::DisplaySetup, bytes).await?;
        debug!("Stored {} bytes of binary setup", bytes.len());
        Ok(())
    }

    /// Validate and persist a setup as TOML text
    ///
    /// Nothing is written if the text does not parse into a valid setup.
    pub async fn store_toml(&mut self, text: &str) -> Result<DisplaySetup, LoadError> {
        if text.len() > MAX_TOML_SIZE {
            return Err(LoadError::TooLarge);
        }
        let setup = parse_setup(text)?;

        self.storage
            .write(StorageKey::DisplaySetupToml, text.as_bytes())
            .await?;
        Ok(setup)
    }

    /// Load the setup from TOML format
    async fn load_toml(&mut self) -> Result<DisplaySetup, LoadError> {
        let mut buffer = [0u8; MAX_TOML_SIZE];
        let len = self
            .storage
            .read(StorageKey::DisplaySetupToml, &mut buffer)
            .await?;

        debug!("Read {} bytes of TOML from flash", len);

        let toml_str = str::from_utf8(&buffer[..len]).map_err(|_| LoadError::InvalidUtf8)?;
        let setup = parse_setup(toml_str)?;

        log_setup_summary(&setup);
        Ok(setup)
    }

    /// Load the setup from binary postcard format
    async fn load_binary(&mut self) -> Result<DisplaySetup, LoadError> {
        let mut buffer = [0u8; MAX_SETUP_SIZE];
        let len = self
            .storage
            .read(StorageKey::DisplaySetup, &mut buffer)
            .await?;

        debug!("Read {} bytes of binary setup from flash", len);

        // Decode the unvalidated form so validation failures keep their reason
        let raw: SetupBuilder =
            postcard::from_bytes(&buffer[..len]).map_err(|_| LoadError::Deserialize)?;
        let setup = raw.build().map_err(|e| {
            warn!("Stored setup rejected: {:?}", e);
            LoadError::Invalid(e)
        })?;

        log_setup_summary(&setup);
        Ok(setup)
    }
}

/// Log a summary of the loaded setup
fn log_setup_summary(setup: &DisplaySetup) {
    let pins = setup.pins();
    info!("Display setup: {}", setup.controller().name());
    debug!(
        "  MOSI {} SCLK {} CS {} DC {}",
        pins.mosi.0,
        pins.sclk.0,
        pins.cs.0,
        pins.dc.0
    );
    debug!(
        "  SPI write {} Hz, read {} Hz",
        setup.spi().write_hz,
        setup.spi().read_hz
    );
    debug!(
        "  {} fonts, {} bytes of flash",
        setup.fonts().len(),
        setup.fonts().flash_footprint()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_futures::block_on;
    use std::vec::Vec;
    use tft_setup_core::setup::{ControllerModel, FontSet, Pin, Signal};

    #[derive(Default)]
    struct MemStorage {
        binary: Option<Vec<u8>>,
        toml: Option<Vec<u8>>,
    }

    impl MemStorage {
        fn slot(&mut self, key: StorageKey) -> &mut Option<Vec<u8>> {
            match key {
                StorageKey::DisplaySetup => &mut self.binary,
                StorageKey::DisplaySetupToml => &mut self.toml,
            }
        }
    }

    impl FlashStorage for MemStorage {
        async fn read(&mut self, key: StorageKey, buffer: &mut [u8]) -> Result<usize, FlashError> {
            let data = self.slot(key).as_ref().ok_or(FlashError::NotFound)?;
            if data.len() > buffer.len() {
                return Err(FlashError::BufferTooSmall);
            }
            buffer[..data.len()].copy_from_slice(data);
            Ok(data.len())
        }

        async fn write(&mut self, key: StorageKey, data: &[u8]) -> Result<(), FlashError> {
            *self.slot(key) = Some(data.to_vec());
            Ok(())
        }

        async fn exists(&mut self, key: StorageKey) -> bool {
            self.slot(key).is_some()
        }
    }

    const ST7789_TOML: &str = r#"
target = "rp2040"
controller = "st7789"

[pins]
mosi = 3
sclk = 2
cs = 5
dc = 6
"#;

    #[test]
    fn test_empty_flash_is_not_found() {
        let mut loader = SetupLoader::new(MemStorage::default());
        assert_eq!(
            block_on(loader.load()),
            Err(LoadError::Flash(FlashError::NotFound))
        );
    }

    #[test]
    fn test_empty_flash_falls_back_to_embedded() {
        let mut loader = SetupLoader::new(MemStorage::default());
        let (setup, source) = block_on(loader.load_or_embedded()).unwrap();

        assert_eq!(source, SetupSource::Embedded);
        assert_eq!(setup, DisplaySetup::USER_SETUP);
    }

    #[test]
    fn test_store_then_load_binary() {
        let setup = DisplaySetup::USER_SETUP
            .with_pin(Signal::Backlight, Some(Pin(21)))
            .unwrap();

        let mut loader = SetupLoader::new(MemStorage::default());
        block_on(loader.store(&setup)).unwrap();

        let (loaded, source) = block_on(loader.load()).unwrap();
        assert_eq!(source, SetupSource::Binary);
        assert_eq!(loaded, setup);
    }

    #[test]
    fn test_toml_preferred_over_binary() {
        let mut loader = SetupLoader::new(MemStorage::default());
        block_on(loader.store(&DisplaySetup::USER_SETUP)).unwrap();
        block_on(loader.store_toml(ST7789_TOML)).unwrap();

        let (loaded, source) = block_on(loader.load()).unwrap();
        assert_eq!(source, SetupSource::Toml);
        assert_eq!(loaded.controller(), ControllerModel::St7789);
    }

    #[test]
    fn test_invalid_toml_not_stored() {
        let mut loader = SetupLoader::new(MemStorage::default());
        let text = ST7789_TOML.replace("cs = 5", "cs = 6");

        let result = block_on(loader.store_toml(&text));
        assert!(matches!(
            result,
            Err(LoadError::TomlParse(ParseError::Invalid(SetupError::PinConflict { .. })))
        ));
        assert!(!block_on(loader.into_storage().exists(StorageKey::DisplaySetupToml)));
    }

    #[test]
    fn test_broken_toml_falls_back_to_binary() {
        let mut storage = MemStorage::default();
        storage.toml = Some(b"controller = \"nope\"".to_vec());
        let mut loader = SetupLoader::new(storage);

        assert_eq!(
            block_on(loader.load()),
            Err(LoadError::TomlParse(ParseError::InvalidValue))
        );

        block_on(loader.store(&DisplaySetup::USER_SETUP)).unwrap();
        let (_, source) = block_on(loader.load()).unwrap();
        assert_eq!(source, SetupSource::Binary);
    }

    #[test]
    fn test_binary_with_conflict_rejected() {
        let mut raw = DisplaySetup::USER_SETUP.into_builder();
        raw.pins.dc = raw.pins.cs;
        let mut buffer = [0u8; MAX_SETUP_SIZE];
        let bytes = postcard::to_slice(&raw, &mut buffer).unwrap();

        let mut storage = MemStorage::default();
        storage.binary = Some(bytes.to_vec());
        let mut loader = SetupLoader::new(storage);

        assert!(matches!(
            block_on(loader.load()),
            Err(LoadError::Invalid(SetupError::PinConflict { .. }))
        ));
    }

    #[test]
    fn test_garbage_binary() {
        let mut storage = MemStorage::default();
        storage.binary = Some(std::vec![0xff; 4]);
        let mut loader = SetupLoader::new(storage);

        assert_eq!(block_on(loader.load()), Err(LoadError::Deserialize));
    }

    #[test]
    fn test_oversized_toml_rejected() {
        let mut loader = SetupLoader::new(MemStorage::default());
        let text = std::format!("{}{}", ST7789_TOML, "#".repeat(MAX_TOML_SIZE));

        assert_eq!(block_on(loader.store_toml(&text)), Err(LoadError::TooLarge));
        assert!(!block_on(loader.into_storage().exists(StorageKey::DisplaySetupToml)));
    }

    #[test]
    fn test_unknown_font_bits_rejected() {
        assert_eq!(postcard::from_bytes::<FontSet>(&[0x7f]).ok(), Some(FontSet::all()));
        assert!(postcard::from_bytes::<FontSet>(&[0x80]).is_err());
    }
}
