//! Textual parameter interface.
//!
//! Live parameter updates arrive as `key=value` text, typically from a control
//! socket or a preset file. [`ParamKey`] names every recognised key and
//! [`PARAMETERS`] describes each one for help output and preset validation.
//!
//! # Lenient parsing
//!
//! Values are parsed the way C's `strtof` / `atoi` read them: the longest
//! numeric prefix is used and anything unparsable reads as zero. `"-6dB"`
//! is -6, `"abc"` is 0. A malformed value therefore shows up as an unexpected
//! setting, never as an error or a panic. Flags are on when the text starts
//! with `1`.
//!
//! # Parameters
//!
//! | Key | Unit | Default | Effect |
//! |-----|------|---------|--------|
//! | phaserotate | flag | 1 | Phase rotator on/off |
//! | gain | dB | 3 | Compression ratio, `10^(x/20)` |
//! | limit | dB | -3 | Output ceiling, `2^(x/6)` |
//! | ngthresh | dB | -19 | Gate onset `2^((x-1)/6)`, offset `2^((x+1)/6)` |
//! | nggain | dB | -6 | Gate attenuation, `2^(x/6)` |
//! | duckenable | flag | 0 | Ducker on/off |
//! | duckrelease | ms | 250 | Ducker release time |
//! | duckhold | ms | 500 | Ducker hold time (integer) |
//! | deessbias | linear | 0.35 | De-esser band ratio bias |
//! | deessgain | dB | -6 | De-esser attenuation, `2^(x/6)` |
//! | hpcutoff | Hz | 100 | Subsonic cutoff |
//! | hpstages | count | 4 | Subsonic sections (1-4) |
//! | hfmulti | linear | 4 | HF detail amount |
//! | hfcutoff | Hz | 2000 | HF detail cutoff |
//! | lfmulti | linear | 4 | LF detail amount |
//! | lfcutoff | Hz | 150 | LF detail cutoff |

use std::fmt;
use std::str::FromStr;

/// Unit of a parameter value as written in text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamUnit {
    /// Decibels.
    Decibels,
    /// Hertz.
    Hertz,
    /// Milliseconds.
    Milliseconds,
    /// Plain number.
    Linear,
    /// Whole number of stages.
    Count,
    /// `1` for on, anything else for off.
    Flag,
}

impl ParamUnit {
    /// Unit suffix for display.
    pub const fn suffix(&self) -> &'static str {
        match self {
            ParamUnit::Decibels => " dB",
            ParamUnit::Hertz => " Hz",
            ParamUnit::Milliseconds => " ms",
            ParamUnit::Linear | ParamUnit::Count | ParamUnit::Flag => "",
        }
    }
}

/// Every key accepted by [`Channel::set_parameter`](crate::Channel::set_parameter).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamKey {
    /// `phaserotate`
    PhaseRotate,
    /// `gain`
    Gain,
    /// `limit`
    Limit,
    /// `ngthresh`
    GateThreshold,
    /// `nggain`
    GateGain,
    /// `duckenable`
    DuckEnable,
    /// `duckrelease`
    DuckRelease,
    /// `duckhold`
    DuckHold,
    /// `deessbias`
    DeEssBias,
    /// `deessgain`
    DeEssGain,
    /// `hpcutoff`
    HpCutoff,
    /// `hpstages`
    HpStages,
    /// `hfmulti`
    HfMulti,
    /// `hfcutoff`
    HfCutoff,
    /// `lfmulti`
    LfMulti,
    /// `lfcutoff`
    LfCutoff,
}

impl ParamKey {
    /// All keys in table order.
    pub const ALL: [ParamKey; 16] = [
        ParamKey::PhaseRotate,
        ParamKey::Gain,
        ParamKey::Limit,
        ParamKey::GateThreshold,
        ParamKey::GateGain,
        ParamKey::DuckEnable,
        ParamKey::DuckRelease,
        ParamKey::DuckHold,
        ParamKey::DeEssBias,
        ParamKey::DeEssGain,
        ParamKey::HpCutoff,
        ParamKey::HpStages,
        ParamKey::HfMulti,
        ParamKey::HfCutoff,
        ParamKey::LfMulti,
        ParamKey::LfCutoff,
    ];

    /// Look up a key by its exact text.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == key)
    }

    /// Key text.
    pub fn as_str(&self) -> &'static str {
        self.descriptor().key
    }

    /// Descriptor for this key.
    pub fn descriptor(&self) -> &'static ParamDescriptor {
        &PARAMETERS[*self as usize]
    }
}

impl fmt::Display for ParamKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for [`ParamKey::from_str`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown parameter key '{0}'")]
pub struct UnknownKey(pub String);

impl FromStr for ParamKey {
    type Err = UnknownKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_key(s).ok_or_else(|| UnknownKey(s.to_string()))
    }
}

/// Static description of one parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamDescriptor {
    /// Key text.
    pub key: &'static str,
    /// Unit of the textual value.
    pub unit: ParamUnit,
    /// Lowest accepted value; lower values are clamped.
    pub min: f32,
    /// Highest accepted value; higher values are clamped.
    pub max: f32,
    /// Default value in the textual unit.
    pub default: f32,
    /// One-line description.
    pub description: &'static str,
}

/// Descriptor table, indexed by `ParamKey as usize`.
pub static PARAMETERS: [ParamDescriptor; 16] = [
    ParamDescriptor {
        key: "phaserotate",
        unit: ParamUnit::Flag,
        min: 0.0,
        max: 1.0,
        default: 1.0,
        description: "Enable the 4-section phase rotator",
    },
    ParamDescriptor {
        key: "gain",
        unit: ParamUnit::Decibels,
        min: -40.0,
        max: 40.0,
        default: 3.0,
        description: "Maximum gain (compression ratio)",
    },
    ParamDescriptor {
        key: "limit",
        unit: ParamUnit::Decibels,
        min: -60.0,
        max: 0.0,
        default: -3.0,
        description: "Output ceiling",
    },
    ParamDescriptor {
        key: "ngthresh",
        unit: ParamUnit::Decibels,
        min: -120.0,
        max: 0.0,
        default: -19.0,
        description: "Noise gate threshold, +/-1 dB hysteresis",
    },
    ParamDescriptor {
        key: "nggain",
        unit: ParamUnit::Decibels,
        min: -120.0,
        max: 0.0,
        default: -6.0,
        description: "Noise gate attenuation",
    },
    ParamDescriptor {
        key: "duckenable",
        unit: ParamUnit::Flag,
        min: 0.0,
        max: 1.0,
        default: 0.0,
        description: "Enable background ducking",
    },
    ParamDescriptor {
        key: "duckrelease",
        unit: ParamUnit::Milliseconds,
        min: 1.0,
        max: 60000.0,
        default: 250.0,
        description: "Ducker release time",
    },
    ParamDescriptor {
        key: "duckhold",
        unit: ParamUnit::Milliseconds,
        min: 0.0,
        max: 60000.0,
        default: 500.0,
        description: "Ducker hold time before release",
    },
    ParamDescriptor {
        key: "deessbias",
        unit: ParamUnit::Linear,
        min: 0.0,
        max: 10.0,
        default: 0.35,
        description: "De-esser high/low band ratio bias",
    },
    ParamDescriptor {
        key: "deessgain",
        unit: ParamUnit::Decibels,
        min: -120.0,
        max: 0.0,
        default: -6.0,
        description: "De-esser attenuation",
    },
    ParamDescriptor {
        key: "hpcutoff",
        unit: ParamUnit::Hertz,
        min: 1.0,
        max: 24000.0,
        default: 100.0,
        description: "Subsonic highpass cutoff",
    },
    ParamDescriptor {
        key: "hpstages",
        unit: ParamUnit::Count,
        min: 1.0,
        max: 4.0,
        default: 4.0,
        description: "Number of 12 dB/oct subsonic sections",
    },
    ParamDescriptor {
        key: "hfmulti",
        unit: ParamUnit::Linear,
        min: 0.0,
        max: 16.0,
        default: 4.0,
        description: "HF detail amount",
    },
    ParamDescriptor {
        key: "hfcutoff",
        unit: ParamUnit::Hertz,
        min: 1.0,
        max: 24000.0,
        default: 2000.0,
        description: "HF detail highpass cutoff",
    },
    ParamDescriptor {
        key: "lfmulti",
        unit: ParamUnit::Linear,
        min: 0.0,
        max: 16.0,
        default: 4.0,
        description: "LF detail amount",
    },
    ParamDescriptor {
        key: "lfcutoff",
        unit: ParamUnit::Hertz,
        min: 1.0,
        max: 24000.0,
        default: 150.0,
        description: "LF detail lowpass cutoff",
    },
];

impl ParamDescriptor {
    /// Clamp a value into the accepted range.
    pub fn clamp(&self, value: f32) -> f32 {
        if value.is_nan() {
            self.default
        } else {
            value.clamp(self.min, self.max)
        }
    }

    /// Format a value with its unit suffix.
    pub fn format(&self, value: f32) -> String {
        match self.unit {
            ParamUnit::Flag => {
                let text = if value >= 0.5 { "on" } else { "off" };
                text.to_string()
            }
            ParamUnit::Count => format!("{}", value as u32),
            _ => format!("{}{}", value, self.unit.suffix()),
        }
    }
}

/// Read the longest leading decimal number, `strtof` style. Garbage reads as 0.
///
/// # Example
///
/// ```rust
/// use vocalis_agc::params::parse_leading_f32;
///
/// assert_eq!(parse_leading_f32(" -6.5dB"), -6.5);
/// assert_eq!(parse_leading_f32("1e3ms"), 1000.0);
/// assert_eq!(parse_leading_f32("loud"), 0.0);
/// ```
pub fn parse_leading_f32(text: &str) -> f32 {
    let s = text.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    let int_start = end;
    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
    }
    let mut digits = end - int_start;
    if bytes.get(end) == Some(&b'.') {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while bytes.get(frac_end).is_some_and(u8::is_ascii_digit) {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        if digits > 0 {
            end = frac_end;
        }
    }
    if digits == 0 {
        return 0.0;
    }
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while bytes.get(exp_end).is_some_and(u8::is_ascii_digit) {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse().unwrap_or(0.0)
}

/// Read the leading integer, `atoi` style. Garbage reads as 0, overflow saturates.
///
/// ```rust
/// use vocalis_agc::params::parse_leading_int;
///
/// assert_eq!(parse_leading_int("750.9"), 750);
/// assert_eq!(parse_leading_int("x"), 0);
/// ```
pub fn parse_leading_int(text: &str) -> i64 {
    let s = text.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let mut value: i64 = 0;
    for b in digits.bytes().take_while(u8::is_ascii_digit) {
        value = value.saturating_mul(10).saturating_add(i64::from(b - b'0'));
    }
    if negative { -value } else { value }
}

/// Flag values are on when the text starts with `1`.
pub fn parse_flag(text: &str) -> bool {
    text.starts_with('1')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_indexed_by_key() {
        for key in ParamKey::ALL {
            assert_eq!(ParamKey::from_key(key.as_str()), Some(key));
            assert_eq!(key.descriptor().key, key.as_str());
        }
        assert_eq!(ParamKey::from_key("volume"), None);
        assert_eq!(ParamKey::from_key("Gain"), None);
    }

    #[test]
    fn defaults_are_within_range() {
        for d in &PARAMETERS {
            assert!(d.min <= d.default && d.default <= d.max, "{}", d.key);
        }
    }

    #[test]
    fn from_str_reports_unknown_key() {
        assert_eq!("hpstages".parse::<ParamKey>(), Ok(ParamKey::HpStages));
        let err = "bogus".parse::<ParamKey>().unwrap_err();
        assert_eq!(err.to_string(), "unknown parameter key 'bogus'");
    }

    #[test]
    fn leading_float_prefixes() {
        assert_eq!(parse_leading_f32("3"), 3.0);
        assert_eq!(parse_leading_f32("  +2.5"), 2.5);
        assert_eq!(parse_leading_f32("-.5"), -0.5);
        assert_eq!(parse_leading_f32("7."), 7.0);
        assert_eq!(parse_leading_f32("12abc"), 12.0);
        assert_eq!(parse_leading_f32("2e"), 2.0);
        assert_eq!(parse_leading_f32("2e-1x"), 0.2);
        assert_eq!(parse_leading_f32(""), 0.0);
        assert_eq!(parse_leading_f32("-"), 0.0);
        assert_eq!(parse_leading_f32("."), 0.0);
        assert_eq!(parse_leading_f32("nan"), 0.0);
    }

    #[test]
    fn leading_int_prefixes() {
        assert_eq!(parse_leading_int("500"), 500);
        assert_eq!(parse_leading_int(" -20ms"), -20);
        assert_eq!(parse_leading_int("+7"), 7);
        assert_eq!(parse_leading_int(""), 0);
        assert_eq!(parse_leading_int("99999999999999999999999"), i64::MAX);
    }

    #[test]
    fn flags() {
        assert!(parse_flag("1"));
        assert!(parse_flag("1yes"));
        assert!(!parse_flag("0"));
        assert!(!parse_flag("true"));
        assert!(!parse_flag(""));
    }

    #[test]
    fn descriptor_clamp_and_format() {
        let stages = ParamKey::HpStages.descriptor();
        assert_eq!(stages.clamp(9.0), 4.0);
        assert_eq!(stages.clamp(f32::NAN), 4.0);
        assert_eq!(stages.format(2.0), "2");
        assert_eq!(ParamKey::Limit.descriptor().format(-3.0), "-3 dB");
        assert_eq!(ParamKey::DuckEnable.descriptor().format(1.0), "on");
    }
}
