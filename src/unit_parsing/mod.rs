// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Code to parse strings into plain numbers or some quantity with a unit.

mod error;

pub use error::UnitParseError;

use strum::IntoEnumIterator;
use strum_macros::{EnumIter, IntoStaticStr};

use crate::constants::{ARCSEC_TO_RAD, DEG_TO_RAD, MAS_TO_RAD, UAS_TO_RAD};

/// A unit that can be recognised at the end of a string.
trait Unit: Copy + PartialEq + IntoEnumIterator + Into<&'static str> {
    /// The variant used when the string is a naked number.
    const NO_UNIT: Self;

    /// Alternative spellings of the unit (other than its name).
    fn aliases(self) -> &'static [&'static str] {
        &[]
    }

    fn matches(self, suffix: &str) -> bool {
        let name: &'static str = self.into();
        let suffix = suffix.to_lowercase();
        name.to_lowercase() == suffix || self.aliases().iter().any(|a| *a == suffix)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, EnumIter, IntoStaticStr)]
pub enum AngleFormat {
    /// Radians
    Rad,

    /// Degrees
    Deg,

    /// Arcseconds
    Arcsec,

    /// Milliarcseconds
    Mas,

    /// Microarcseconds
    Uas,

    NoUnit,
}

impl Unit for AngleFormat {
    const NO_UNIT: Self = AngleFormat::NoUnit;

    fn aliases(self) -> &'static [&'static str] {
        match self {
            AngleFormat::Rad => &["radian", "radians"],
            AngleFormat::Deg => &["degree", "degrees"],
            AngleFormat::Arcsec => &["as", "asec"],
            AngleFormat::Mas => &["milliarcsec"],
            AngleFormat::Uas => &["µas", "μas", "microarcsec"],
            AngleFormat::NoUnit => &[],
        }
    }
}

impl AngleFormat {
    /// Convert a value in this unit to radians. Naked numbers are taken to
    /// already be in radians.
    pub fn to_radians(self, value: f64) -> f64 {
        match self {
            AngleFormat::Rad | AngleFormat::NoUnit => value,
            AngleFormat::Deg => value * DEG_TO_RAD,
            AngleFormat::Arcsec => value * ARCSEC_TO_RAD,
            AngleFormat::Mas => value * MAS_TO_RAD,
            AngleFormat::Uas => value * UAS_TO_RAD,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, EnumIter, IntoStaticStr)]
#[allow(non_camel_case_types)]
pub enum FreqFormat {
    /// Hertz
    Hz,

    /// kiloHertz
    kHz,

    /// MegaHertz
    MHz,

    /// GigaHertz
    GHz,

    NoUnit,
}

impl Unit for FreqFormat {
    const NO_UNIT: Self = FreqFormat::NoUnit;
}

impl FreqFormat {
    /// Convert a value in this unit to \[Hz\].
    pub fn to_hz(self, value: f64) -> f64 {
        match self {
            FreqFormat::Hz | FreqFormat::NoUnit => value,
            FreqFormat::kHz => value * 1e3,
            FreqFormat::MHz => value * 1e6,
            FreqFormat::GHz => value * 1e9,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, EnumIter, IntoStaticStr)]
pub enum TimeFormat {
    /// Seconds
    S,

    /// Milliseconds
    Ms,

    /// Minutes
    Min,

    NoUnit,
}

impl Unit for TimeFormat {
    const NO_UNIT: Self = TimeFormat::NoUnit;
}

impl TimeFormat {
    /// Convert a value in this unit to \[seconds\].
    pub fn to_seconds(self, value: f64) -> f64 {
        match self {
            TimeFormat::S | TimeFormat::NoUnit => value,
            TimeFormat::Ms => value / 1e3,
            TimeFormat::Min => value * 60.0,
        }
    }
}

/// Split a string into its numerical part and its (possibly empty) trailing
/// alphabetic unit. Exponents (e.g. "1e-10rad") stay with the number.
fn split_unit(s: &str) -> (&str, &str) {
    let s = s.trim();
    let unit_start = s
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_alphabetic())
        .last()
        .map(|(i, _)| i)
        .unwrap_or(s.len());
    (s[..unit_start].trim(), &s[unit_start..])
}

fn parse_with_unit<U: Unit>(s: &str, unit_type: &'static str) -> Result<(f64, U), UnitParseError> {
    // Try to parse a naked number.
    let maybe_number: Option<f64> = s.trim().parse().ok();
    if let Some(number) = maybe_number {
        return Ok((number, U::NO_UNIT));
    };

    // That didn't work; let's search over our supported formats.
    let (prefix, suffix) = split_unit(s);
    for format in U::iter().filter(|&f| f != U::NO_UNIT) {
        if format.matches(suffix) {
            let number: f64 = match prefix.parse() {
                Ok(n) => n,
                Err(_) => {
                    return Err(UnitParseError::GotUnitButCantParse {
                        input: s.to_string(),
                        unit: format.into(),
                    })
                }
            };
            return Ok((number, format));
        }
    }

    // If we made it this far, we don't know how to parse the string.
    Err(UnitParseError::Unknown {
        input: s.to_string(),
        unit_type,
    })
}

/// Parse a string that may have a unit of angle attached to it.
pub fn parse_angle(s: &str) -> Result<(f64, AngleFormat), UnitParseError> {
    parse_with_unit(s, "angle")
}

/// Parse a string that may have a unit of frequency attached to it.
pub fn parse_freq(s: &str) -> Result<(f64, FreqFormat), UnitParseError> {
    parse_with_unit(s, "frequency")
}

/// Parse a string that may have a unit of time attached to it.
pub fn parse_time(s: &str) -> Result<(f64, TimeFormat), UnitParseError> {
    parse_with_unit(s, "time")
}

/// Parse an angle straight into \[radians\].
pub fn parse_angle_rad(s: &str) -> Result<f64, UnitParseError> {
    parse_angle(s).map(|(v, f)| f.to_radians(v))
}

/// Parse a frequency straight into \[Hz\].
pub fn parse_freq_hz(s: &str) -> Result<f64, UnitParseError> {
    parse_freq(s).map(|(v, f)| f.to_hz(v))
}

/// Parse a time straight into \[seconds\].
pub fn parse_time_s(s: &str) -> Result<f64, UnitParseError> {
    parse_time(s).map(|(v, f)| f.to_seconds(v))
}
