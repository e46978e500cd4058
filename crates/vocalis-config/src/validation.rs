//! Preset validation.
//!
//! [`Channel::set_parameter`](vocalis_agc::Channel::set_parameter) is lenient by
//! design of the live control path: garbage reads as zero and out-of-range
//! values are clamped. Preset files are checked strictly before they are used
//! so that a typo is reported instead of silently producing a zero.
//!
//! # Example
//!
//! ```rust
//! use vocalis_config::{validate_param, ValidationError};
//!
//! assert!(validate_param("gain", "6").is_ok());
//! assert!(matches!(
//!     validate_param("gain", "loud"),
//!     Err(ValidationError::InvalidFormat { .. })
//! ));
//! ```

use thiserror::Error;
use vocalis_agc::{ParamKey, ParamUnit};

use crate::Preset;

/// Shortest accepted lookahead in milliseconds.
pub const MIN_LOOKAHEAD_MS: f32 = 0.1;

/// Longest accepted lookahead in milliseconds.
pub const MAX_LOOKAHEAD_MS: f32 = 1000.0;

/// Validation error types.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// Unknown parameter name.
    #[error("unknown parameter '{0}'")]
    UnknownParameter(String),

    /// Parameter value out of range.
    #[error("parameter '{param}' value {value} out of range [{min}, {max}]")]
    OutOfRange {
        /// Name of the parameter.
        param: String,
        /// The value that was out of range.
        value: f32,
        /// Minimum allowed value.
        min: f32,
        /// Maximum allowed value.
        max: f32,
    },

    /// Invalid parameter format.
    #[error("invalid format for parameter '{param}': {reason}")]
    InvalidFormat {
        /// Name of the parameter.
        param: String,
        /// Description of the format error.
        reason: String,
    },

    /// Lookahead outside the supported range.
    #[error("lookahead {0} ms out of range [0.1, 1000]")]
    Lookahead(f32),

    /// Sample rate hint of zero.
    #[error("sample rate must be greater than zero")]
    SampleRate,

    /// Multiple validation errors.
    #[error("multiple validation errors: {}", .0.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; "))]
    Multiple(Vec<ValidationError>),
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Check one key/value pair and return the parsed value.
pub fn validate_param(key: &str, value: &str) -> ValidationResult<f32> {
    let param = ParamKey::from_key(key)
        .ok_or_else(|| ValidationError::UnknownParameter(key.to_string()))?;
    let desc = param.descriptor();
    let text = value.trim();

    let parsed = match desc.unit {
        ParamUnit::Flag => match text {
            "0" => 0.0,
            "1" => 1.0,
            _ => {
                return Err(ValidationError::InvalidFormat {
                    param: key.to_string(),
                    reason: format!("expected 0 or 1, got '{value}'"),
                });
            }
        },
        ParamUnit::Count => text.parse::<u32>().map(|v| v as f32).map_err(|_| {
            ValidationError::InvalidFormat {
                param: key.to_string(),
                reason: format!("expected a whole number, got '{value}'"),
            }
        })?,
        _ => match text.parse::<f32>() {
            Ok(v) if v.is_finite() => v,
            _ => {
                return Err(ValidationError::InvalidFormat {
                    param: key.to_string(),
                    reason: format!("expected a number, got '{value}'"),
                });
            }
        },
    };

    if parsed < desc.min || parsed > desc.max {
        return Err(ValidationError::OutOfRange {
            param: key.to_string(),
            value: parsed,
            min: desc.min,
            max: desc.max,
        });
    }
    Ok(parsed)
}

/// Check a whole preset, collecting every problem.
pub fn validate_preset(preset: &Preset) -> ValidationResult<()> {
    let mut errors = Vec::new();

    if let Some(ms) = preset.lookahead_ms
        && !(MIN_LOOKAHEAD_MS..=MAX_LOOKAHEAD_MS).contains(&ms)
    {
        errors.push(ValidationError::Lookahead(ms));
    }
    if preset.sample_rate == Some(0) {
        errors.push(ValidationError::SampleRate);
    }
    for (key, value) in &preset.params {
        if let Err(e) = validate_param(key, value) {
            errors.push(e);
        }
    }

    match errors.len() {
        0 => Ok(()),
        1 => Err(errors.remove(0)),
        _ => Err(ValidationError::Multiple(errors)),
    }
}
