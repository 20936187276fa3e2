//! Setup validation
//!
//! `const` so the built-in setup is checked by the compiler. Checks run in
//! a fixed order and the first failure is reported.

use super::error::SetupError;
use super::pins::{Pin, Signal, SIGNAL_COUNT};
use super::{SetupBuilder, SETUP_VERSION};

pub(super) const fn validate(setup: &SetupBuilder) -> Result<(), SetupError> {
    if setup.version != SETUP_VERSION {
        return Err(SetupError::UnsupportedVersion(setup.version));
    }

    if let Err(e) = check_pins(setup) {
        return Err(e);
    }
    if let Err(e) = check_clocks(setup) {
        return Err(e);
    }

    if setup.text_rendering && setup.fonts.is_empty() {
        return Err(SetupError::NoFonts);
    }

    let footprint = setup.fonts.flash_footprint();
    if footprint > setup.font_flash_budget {
        return Err(SetupError::FontBudgetExceeded {
            footprint,
            budget: setup.font_flash_budget,
        });
    }

    if setup.bus_shared && !setup.controller.sdo_tristates() && setup.pins.miso.is_some() {
        return Err(SetupError::MisoOnSharedBus);
    }

    Ok(())
}

const fn check_pins(setup: &SetupBuilder) -> Result<(), SetupError> {
    let pins = setup.pins.as_array();
    let target = setup.target;

    // MISO only listens; every other line is driven by the MCU
    let mut i = 0;
    while i < SIGNAL_COUNT {
        if let Some(pin) = pins[i] {
            let signal = Signal::ALL[i];
            if !target.has_pin(pin) {
                return Err(SetupError::PinOutOfRange { signal, pin });
            }
            if !matches!(signal, Signal::Miso) && !target.can_drive(pin) {
                return Err(SetupError::PinInputOnly { signal, pin });
            }
        }
        i += 1;
    }

    let mut i = 0;
    while i < SIGNAL_COUNT {
        if let Some(Pin(a)) = pins[i] {
            let mut j = i + 1;
            while j < SIGNAL_COUNT {
                if let Some(Pin(b)) = pins[j] {
                    if a == b {
                        return Err(SetupError::PinConflict {
                            first: Signal::ALL[i],
                            second: Signal::ALL[j],
                            pin: Pin(a),
                        });
                    }
                }
                j += 1;
            }
        }
        i += 1;
    }

    Ok(())
}

const fn check_clocks(setup: &SetupBuilder) -> Result<(), SetupError> {
    let spi = setup.spi;
    if spi.write_hz == 0 || spi.read_hz == 0 {
        return Err(SetupError::ZeroFrequency);
    }

    let max_write = setup.controller.max_write_hz();
    if spi.write_hz > max_write {
        return Err(SetupError::WriteFrequencyTooHigh {
            hz: spi.write_hz,
            max_hz: max_write,
        });
    }

    let max_read = setup.controller.max_read_hz();
    if spi.read_hz > max_read {
        return Err(SetupError::ReadFrequencyTooHigh {
            hz: spi.read_hz,
            max_hz: max_read,
        });
    }

    if spi.read_hz > spi.write_hz {
        return Err(SetupError::ReadFasterThanWrite {
            read_hz: spi.read_hz,
            write_hz: spi.write_hz,
        });
    }

    Ok(())
}
