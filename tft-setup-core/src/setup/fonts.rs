//! Font inclusion set
//!
//! Each included font links its glyph table into the firmware image.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Font tables available to the driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum Font {
    /// Font 1, original Adafruit 8 pixel font
    Glcd = 0,
    /// Small 16 pixel font
    Font2 = 1,
    /// Medium 26 pixel font
    Font4 = 2,
    /// Large 48 pixel font
    Font6 = 3,
    /// 7-segment 48 pixel font
    Font7 = 4,
    /// Large 75 pixel font
    Font8 = 5,
    /// Adafruit_GFX free fonts FF1 to FF48 and custom fonts
    FreeFonts = 6,
}

impl Font {
    pub const ALL: [Font; 7] = [
        Font::Glcd,
        Font::Font2,
        Font::Font4,
        Font::Font6,
        Font::Font7,
        Font::Font8,
        Font::FreeFonts,
    ];

    /// Approximate flash footprint of the glyph table in bytes
    ///
    /// Free fonts only link the faces the firmware references, so the
    /// inclusion itself costs nothing.
    pub const fn flash_bytes(self) -> u32 {
        match self {
            Font::Glcd => 1820,
            Font::Font2 => 3534,
            Font::Font4 => 5848,
            Font::Font6 => 2666,
            Font::Font7 => 2438,
            Font::Font8 => 3256,
            Font::FreeFonts => 0,
        }
    }

    /// Glyph height in pixels, `None` for the free font family
    pub const fn height(self) -> Option<u8> {
        match self {
            Font::Glcd => Some(8),
            Font::Font2 => Some(16),
            Font::Font4 => Some(26),
            Font::Font6 | Font::Font7 => Some(48),
            Font::Font8 => Some(75),
            Font::FreeFonts => None,
        }
    }

    /// Characters the font can draw, `None` when it covers printable ASCII
    pub const fn charset(self) -> Option<&'static str> {
        match self {
            Font::Font6 => Some("1234567890:-.apm"),
            Font::Font7 | Font::Font8 => Some("1234567890:-."),
            _ => None,
        }
    }

    /// Key used in setup files
    pub const fn key(self) -> &'static str {
        match self {
            Font::Glcd => "glcd",
            Font::Font2 => "font2",
            Font::Font4 => "font4",
            Font::Font6 => "font6",
            Font::Font7 => "font7",
            Font::Font8 => "font8",
            Font::FreeFonts => "gfxff",
        }
    }

    /// Look up a font by setup file key
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.key() == key)
    }

    const fn bit(self) -> u8 {
        1 << self as u8
    }
}

/// Set of fonts linked into the firmware
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(try_from = "u8", into = "u8")
)]
pub struct FontSet(u8);

/// Font set bits that name no catalogued font
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UnknownFontBits(pub u8);

impl core::fmt::Display for UnknownFontBits {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "unknown font bits {:#04x}", self.0)
    }
}

impl FontSet {
    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn all() -> Self {
        let mut bits = 0;
        let mut i = 0;
        while i < Font::ALL.len() {
            bits |= Font::ALL[i].bit();
            i += 1;
        }
        Self(bits)
    }

    /// This set plus `font`
    pub const fn with(self, font: Font) -> Self {
        Self(self.0 | font.bit())
    }

    /// This set minus `font`
    pub const fn without(self, font: Font) -> Self {
        Self(self.0 & !font.bit())
    }

    pub const fn contains(self, font: Font) -> bool {
        self.0 & font.bit() != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Included fonts in catalogue order
    pub fn iter(self) -> impl Iterator<Item = Font> {
        Font::ALL.into_iter().filter(move |f| self.contains(*f))
    }

    /// Total flash consumed by the included glyph tables
    pub const fn flash_footprint(self) -> u32 {
        let mut total = 0;
        let mut i = 0;
        while i < Font::ALL.len() {
            if self.contains(Font::ALL[i]) {
                total += Font::ALL[i].flash_bytes();
            }
            i += 1;
        }
        total
    }
}

impl TryFrom<u8> for FontSet {
    type Error = UnknownFontBits;

    fn try_from(bits: u8) -> Result<Self, Self::Error> {
        let unknown = bits & !FontSet::all().0;
        if unknown != 0 {
            return Err(UnknownFontBits(unknown));
        }
        Ok(Self(bits))
    }
}

impl From<FontSet> for u8 {
    fn from(set: FontSet) -> u8 {
        set.0
    }
}

impl FromIterator<Font> for FontSet {
    fn from_iter<I: IntoIterator<Item = Font>>(iter: I) -> Self {
        iter.into_iter().fold(FontSet::empty(), FontSet::with)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_fonts_footprint() {
        // 1820 + 3534 + 5848 + 2666 + 2438 + 3256
        assert_eq!(FontSet::all().flash_footprint(), 19_562);
        assert_eq!(FontSet::all().len(), 7);
    }

    #[test]
    fn test_with_without() {
        let set = FontSet::empty().with(Font::Font2).with(Font::Font7);
        assert!(set.contains(Font::Font2));
        assert!(!set.contains(Font::Glcd));
        assert_eq!(set.flash_footprint(), 3534 + 2438);

        let set = set.without(Font::Font2);
        assert_eq!(set.iter().collect::<heapless::Vec<_, 7>>(), [Font::Font7]);
        assert!(set.without(Font::Font7).is_empty());
    }

    #[test]
    fn test_set_from_bits() {
        let bits = u8::from(FontSet::all());
        assert_eq!(FontSet::try_from(bits), Ok(FontSet::all()));
        assert_eq!(FontSet::try_from(0), Ok(FontSet::empty()));
        assert_eq!(FontSet::try_from(0x80), Err(UnknownFontBits(0x80)));
        assert_eq!(FontSet::try_from(0x81), Err(UnknownFontBits(0x80)));
    }

    #[test]
    fn test_collect_into_set() {
        let set: FontSet = [Font::Glcd, Font::FreeFonts].into_iter().collect();
        assert_eq!(set.len(), 2);
        assert_eq!(set.flash_footprint(), 1820);
    }

    #[test]
    fn test_digit_only_fonts() {
        assert_eq!(Font::Font7.charset(), Some("1234567890:-."));
        assert_eq!(Font::Font4.charset(), None);
        assert_eq!(Font::from_key("gfxff"), Some(Font::FreeFonts));
    }
}
