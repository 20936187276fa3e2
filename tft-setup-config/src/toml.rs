//! Minimal TOML parser for display setup files
//!
//! Handles only the subset needed for `user_setup.toml`. It does NOT
//! support the whole TOML language. `build.rs` runs this same parser, so a
//! file that builds is a file that loads.
//!
//! Supported features:
//! - Key = value pairs (string, integer, boolean)
//! - Basic `"..."` and literal `'...'` strings
//! - Integers with `_` digit separators
//! - [section] headers
//! - Comments (# ...), including after values and headers
//!
//! NOT supported:
//! - Multi-line strings and escape sequences
//! - Arrays and inline tables
//! - Dotted keys

use heapless::String as HString;
use heapless::Vec as HVec;

use tft_setup_core::setup::{
    BacklightPolarity, ControllerModel, DisplaySetup, Font, FontSet, Pin, PinAssignment,
    SetupBuilder, SetupError, Signal, SpiTiming, Target, DEFAULT_FONT_FLASH_BUDGET,
    SETUP_VERSION,
};
use tft_setup_core::setup::pins::SIGNAL_COUNT;

/// Upper bound on distinct keys in a setup file
const MAX_KEYS: usize = 32;

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    /// Unknown or malformed section header
    InvalidSection,
    /// Section header given more than once
    DuplicateSection,
    /// Invalid value for a key
    InvalidValue,
    /// Key not recognised in its section
    UnknownKey,
    /// Key given more than once in its section
    DuplicateKey,
    /// Required key absent
    MissingKey(&'static str),
    /// `controller` given more than once
    DuplicateController,
    /// Parsed setup failed validation
    Invalid(SetupError),
}

impl From<SetupError> for ParseError {
    fn from(e: SetupError) -> Self {
        ParseError::Invalid(e)
    }
}

impl core::fmt::Display for ParseError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ParseError::InvalidSection => f.write_str("invalid section header"),
            ParseError::DuplicateSection => f.write_str("section defined twice"),
            ParseError::InvalidValue => f.write_str("invalid value"),
            ParseError::UnknownKey => f.write_str("unknown key"),
            ParseError::DuplicateKey => f.write_str("key defined twice"),
            ParseError::MissingKey(key) => write!(f, "missing key '{}'", key),
            ParseError::DuplicateController => f.write_str("more than one controller selected"),
            ParseError::Invalid(e) => write!(f, "invalid setup: {}", e),
        }
    }
}

/// Current parsing context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Pins,
    Backlight,
    Fonts,
    Spi,
}

/// Values collected so far; `None` means the key was not given
#[derive(Default)]
struct Draft {
    version: Option<u8>,
    target: Option<Target>,
    controller: Option<ControllerModel>,
    bus_shared: bool,
    text_rendering: bool,
    /// Outer `None`: not given. Inner `None`: given as -1 (unconnected)
    pins: [Option<Option<Pin>>; SIGNAL_COUNT],
    polarity: BacklightPolarity,
    fonts: FontSet,
    smooth_font: bool,
    font_flash_budget: Option<u32>,
    spi_preset: Option<SpiTiming>,
    write_hz: Option<u32>,
    read_hz: Option<u32>,
}

/// Parse a TOML setup file into a validated [`DisplaySetup`]
pub fn parse_setup(input: &str) -> Result<DisplaySetup, ParseError> {
    let mut draft = Draft::default();
    let mut section = Section::Root;
    let mut opened: HVec<Section, 5> = HVec::new();
    let mut seen: HVec<(Section, &str), MAX_KEYS> = HVec::new();

    for line in input.lines() {
        let line = strip_comment(line).trim();
        if line.is_empty() {
            continue;
        }

        if line.starts_with('[') {
            section = parse_section_header(line)?;
            if opened.contains(&section) {
                return Err(ParseError::DuplicateSection);
            }
            opened.push(section).map_err(|_| ParseError::InvalidSection)?;
            continue;
        }

        let (key, value) = parse_key_value(line).ok_or(ParseError::InvalidValue)?;
        if seen.contains(&(section, key)) {
            return Err(match (section, key) {
                (Section::Root, "controller") => ParseError::DuplicateController,
                _ => ParseError::DuplicateKey,
            });
        }
        apply_value(section, key, value, &mut draft)?;
        seen.push((section, key)).map_err(|_| ParseError::UnknownKey)?;
    }

    finish(draft)
}

/// Cut a trailing `# comment`, ignoring `#` inside quoted strings
fn strip_comment(line: &str) -> &str {
    let mut quote = None;
    for (i, c) in line.char_indices() {
        match (quote, c) {
            (None, '#') => return &line[..i],
            (None, '"' | '\'') => quote = Some(c),
            (Some(q), c) if c == q => quote = None,
            _ => {}
        }
    }
    line
}

/// Parse a section header like "[pins]"
fn parse_section_header(line: &str) -> Result<Section, ParseError> {
    let name = line
        .strip_prefix('[')
        .and_then(|l| l.strip_suffix(']'))
        .ok_or(ParseError::InvalidSection)?;

    match name.trim() {
        "pins" => Ok(Section::Pins),
        "backlight" => Ok(Section::Backlight),
        "fonts" => Ok(Section::Fonts),
        "spi" => Ok(Section::Spi),
        _ => Err(ParseError::InvalidSection),
    }
}

/// Parse "key = value" line
fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let eq_pos = line.find('=')?;
    let key = line[..eq_pos].trim();
    let value = line[eq_pos + 1..].trim();

    if key.is_empty() || value.is_empty() {
        return None;
    }

    Some((key, value))
}

/// Parse a basic or literal string value
fn parse_string(value: &str) -> Result<&str, ParseError> {
    ['"', '\'']
        .into_iter()
        .find_map(|q| value.strip_prefix(q).and_then(|v| v.strip_suffix(q)))
        .filter(|v| !v.contains(['"', '\'', '\\']))
        .ok_or(ParseError::InvalidValue)
}

/// Parse an integer value, allowing `_` separators
fn parse_int<T: core::str::FromStr>(value: &str) -> Result<T, ParseError> {
    let mut digits: HString<24> = HString::new();
    for c in value.chars().filter(|c| *c != '_') {
        digits.push(c).map_err(|_| ParseError::InvalidValue)?;
    }
    digits.parse().map_err(|_| ParseError::InvalidValue)
}

/// Parse a boolean value
fn parse_bool(value: &str) -> Result<bool, ParseError> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ParseError::InvalidValue),
    }
}

/// Parse a pin number; -1 leaves the signal unconnected
fn parse_pin(value: &str) -> Result<Option<Pin>, ParseError> {
    match parse_int::<i16>(value)? {
        -1 => Ok(None),
        n => u8::try_from(n)
            .map(|n| Some(Pin(n)))
            .map_err(|_| ParseError::InvalidValue),
    }
}

fn apply_value(
    section: Section,
    key: &str,
    value: &str,
    draft: &mut Draft,
) -> Result<(), ParseError> {
    match section {
        Section::Root => match key {
            "version" => draft.version = Some(parse_int(value)?),
            "target" => {
                let target = Target::from_key(parse_string(value)?);
                draft.target = Some(target.ok_or(ParseError::InvalidValue)?);
            }
            "controller" => {
                let model = ControllerModel::from_key(parse_string(value)?);
                draft.controller = Some(model.ok_or(ParseError::InvalidValue)?);
            }
            "bus_shared" => draft.bus_shared = parse_bool(value)?,
            "text_rendering" => draft.text_rendering = parse_bool(value)?,
            _ => return Err(ParseError::UnknownKey),
        },
        Section::Pins => {
            let signal = Signal::from_key(key).ok_or(ParseError::UnknownKey)?;
            draft.pins[signal as usize] = Some(parse_pin(value)?);
        }
        Section::Backlight => match key {
            "on" => {
                let polarity = BacklightPolarity::from_level_key(parse_string(value)?);
                draft.polarity = polarity.ok_or(ParseError::InvalidValue)?;
            }
            _ => return Err(ParseError::UnknownKey),
        },
        Section::Fonts => match key {
            "smooth" => draft.smooth_font = parse_bool(value)?,
            "flash_budget" => draft.font_flash_budget = Some(parse_int(value)?),
            _ => {
                let font = Font::from_key(key).ok_or(ParseError::UnknownKey)?;
                draft.fonts = if parse_bool(value)? {
                    draft.fonts.with(font)
                } else {
                    draft.fonts.without(font)
                };
            }
        },
        Section::Spi => match key {
            "write_hz" => draft.write_hz = Some(parse_int(value)?),
            "read_hz" => draft.read_hz = Some(parse_int(value)?),
            "preset" => {
                let preset = SpiTiming::preset(parse_string(value)?);
                draft.spi_preset = Some(preset.ok_or(ParseError::InvalidValue)?);
            }
            _ => return Err(ParseError::UnknownKey),
        },
    }
    Ok(())
}

/// Check required keys and build the setup
fn finish(draft: Draft) -> Result<DisplaySetup, ParseError> {
    let target = draft.target.ok_or(ParseError::MissingKey("target"))?;
    let controller = draft.controller.ok_or(ParseError::MissingKey("controller"))?;

    let required = |signal: Signal| match draft.pins[signal as usize] {
        Some(Some(pin)) => Ok(pin),
        Some(None) => Err(ParseError::Invalid(SetupError::SignalRequired(signal))),
        None => Err(ParseError::MissingKey(signal.key())),
    };
    let mut pins = PinAssignment::new(
        required(Signal::Mosi)?,
        required(Signal::Sclk)?,
        required(Signal::Cs)?,
        required(Signal::Dc)?,
    );
    for signal in Signal::ALL.into_iter().filter(|s| s.is_optional()) {
        if let Some(pin) = draft.pins[signal as usize] {
            pins.set(signal, pin)?;
        }
    }

    let mut setup = SetupBuilder::new(target, controller, pins);
    setup.version = draft.version.unwrap_or(SETUP_VERSION);
    setup.fonts = draft.fonts;
    setup.smooth_font = draft.smooth_font;
    // Explicit clocks override the preset wherever they appear
    let base = draft.spi_preset.unwrap_or_default();
    setup.spi = SpiTiming::new(
        draft.write_hz.unwrap_or(base.write_hz),
        draft.read_hz.unwrap_or(base.read_hz),
    );
    setup.backlight_polarity = draft.polarity;
    setup.bus_shared = draft.bus_shared;
    setup.text_rendering = draft.text_rendering;
    setup.font_flash_budget = draft.font_flash_budget.unwrap_or(DEFAULT_FONT_FLASH_BUDGET);

    setup.build().map_err(ParseError::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
target = "rp2040"
controller = "st7789"

[pins]
mosi = 3
sclk = 2
cs = 5
dc = 6
"#;

    #[test]
    fn test_parse_minimal() {
        let setup = parse_setup(MINIMAL).unwrap();

        assert_eq!(setup.target(), Target::Rp2040);
        assert_eq!(setup.controller(), ControllerModel::St7789);
        assert_eq!(setup.pins().cs, Pin(5));
        assert_eq!(setup.pins().miso, None);
        assert_eq!(setup.spi(), SpiTiming::MHZ_27);
        assert!(setup.fonts().is_empty());
    }

    #[test]
    fn test_parse_embedded_file_matches_builtin() {
        let setup = parse_setup(crate::USER_SETUP_TOML).unwrap();
        assert_eq!(setup, DisplaySetup::USER_SETUP);
    }

    #[test]
    fn test_cs_equal_to_dc_rejected() {
        let input = MINIMAL.replace("cs = 5", "cs = 6");
        assert_eq!(
            parse_setup(&input),
            Err(ParseError::Invalid(SetupError::PinConflict {
                first: Signal::Cs,
                second: Signal::Dc,
                pin: Pin(6),
            }))
        );
    }

    #[test]
    fn test_controller_selected_exactly_once() {
        let missing = MINIMAL.replace("controller = \"st7789\"", "");
        assert_eq!(parse_setup(&missing), Err(ParseError::MissingKey("controller")));

        let twice = MINIMAL.replace(
            "controller = \"st7789\"",
            "controller = \"st7789\"\ncontroller = \"ili9341\"",
        );
        assert_eq!(parse_setup(&twice), Err(ParseError::DuplicateController));
    }

    #[test]
    fn test_unconnected_pins() {
        let input = std::format!("{}rst = -1\nbacklight = 7\n", MINIMAL);
        let setup = parse_setup(&input).unwrap();
        assert_eq!(setup.pins().rst, None);
        assert_eq!(setup.pins().backlight, Some(Pin(7)));

        let input = MINIMAL.replace("dc = 6", "dc = -1");
        assert_eq!(
            parse_setup(&input),
            Err(ParseError::Invalid(SetupError::SignalRequired(Signal::Dc)))
        );
    }

    #[test]
    fn test_missing_required_pin() {
        let input = MINIMAL.replace("sclk = 2", "");
        assert_eq!(parse_setup(&input), Err(ParseError::MissingKey("sclk")));
    }

    #[test]
    fn test_spi_preset_and_override() {
        let input = std::format!("{}[spi]\npreset = \"80mhz\"\nread_hz = 10_000_000\n", MINIMAL);
        let setup = parse_setup(&input).unwrap();
        assert_eq!(setup.spi(), SpiTiming::new(80_000_000, 10_000_000));
    }

    #[test]
    fn test_spi_key_order_irrelevant() {
        let preset_first =
            std::format!("{}[spi]\npreset = \"40mhz\"\nread_hz = 10_000_000\n", MINIMAL);
        let preset_last =
            std::format!("{}[spi]\nread_hz = 10_000_000\npreset = \"40mhz\"\n", MINIMAL);

        let expected = SpiTiming::new(40_000_000, 10_000_000);
        assert_eq!(parse_setup(&preset_first).unwrap().spi(), expected);
        assert_eq!(parse_setup(&preset_last).unwrap().spi(), expected);
    }

    #[test]
    fn test_literal_strings_and_header_comments() {
        let input = r#"
target = 'rp2040'  # literal string
controller = "st7789"

[pins] # wiring
mosi = 3
sclk = 2
cs = 5
dc = 6

[spi] # bus clocks
preset = '40mhz'
"#;
        let setup = parse_setup(input).unwrap();
        assert_eq!(setup.target(), Target::Rp2040);
        assert_eq!(setup.spi(), SpiTiming::MHZ_40);
    }

    #[test]
    fn test_repeated_keys_rejected() {
        let input = MINIMAL.replace("cs = 5", "cs = 5\ncs = 7");
        assert_eq!(parse_setup(&input), Err(ParseError::DuplicateKey));

        let input = std::format!("{}[fonts]\nglcd = true\nglcd = false\n", MINIMAL);
        assert_eq!(parse_setup(&input), Err(ParseError::DuplicateKey));
    }

    #[test]
    fn test_repeated_section_rejected() {
        let input = std::format!("{}[pins]\nbacklight = 7\n", MINIMAL);
        assert_eq!(parse_setup(&input), Err(ParseError::DuplicateSection));
    }

    #[test]
    fn test_backlight_polarity() {
        let input = std::format!("{}[backlight]\non = \"low\" # inverted driver\n", MINIMAL);
        let setup = parse_setup(&input).unwrap();
        assert_eq!(setup.backlight_polarity(), BacklightPolarity::ActiveLow);

        let input = std::format!("{}[backlight]\non = \"dim\"\n", MINIMAL);
        assert_eq!(parse_setup(&input), Err(ParseError::InvalidValue));
    }

    #[test]
    fn test_fonts_section() {
        let input = std::format!(
            "text_rendering = true\n{}[fonts]\nfont2 = true\nglcd = false\nsmooth = true\n",
            MINIMAL
        );
        let setup = parse_setup(&input).unwrap();
        assert_eq!(setup.fonts(), FontSet::empty().with(Font::Font2));
        assert!(setup.smooth_font());
    }

    #[test]
    fn test_text_without_fonts_rejected() {
        let input = std::format!("text_rendering = true\n{}", MINIMAL);
        assert_eq!(
            parse_setup(&input),
            Err(ParseError::Invalid(SetupError::NoFonts))
        );
    }

    #[test]
    fn test_unknown_section_and_key() {
        let input = std::format!("{}[touch]\ncs = 21\n", MINIMAL);
        assert_eq!(parse_setup(&input), Err(ParseError::InvalidSection));

        let input = std::format!("{}te = 4\n", MINIMAL);
        assert_eq!(parse_setup(&input), Err(ParseError::UnknownKey));
    }

    #[test]
    fn test_pin_value_range() {
        let input = MINIMAL.replace("mosi = 3", "mosi = 300");
        assert_eq!(parse_setup(&input), Err(ParseError::InvalidValue));
    }

    #[test]
    fn test_parse_helpers() {
        assert_eq!(parse_key_value("a = \"x#y\""), Some(("a", "\"x#y\"")));
        assert_eq!(parse_key_value("a ="), None);
        assert_eq!(parse_int::<u32>("27_000_000"), Ok(27_000_000));
        assert_eq!(parse_string("esp32"), Err(ParseError::InvalidValue));
        assert_eq!(parse_string("'esp32'"), Ok("esp32"));
        assert_eq!(parse_string("\"esp32'"), Err(ParseError::InvalidValue));
        assert_eq!(strip_comment("on = \"#1\" # note"), "on = \"#1\" ");
        assert_eq!(strip_comment("# whole line"), "");
    }
}
