//! Shared CLI helpers used across multiple commands.

use anyhow::Context;
use vocalis_config::{Preset, resolve_preset};

/// Parse a `key=value` string for clap's `value_parser`.
pub fn parse_key_val(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(format!(
            "Invalid parameter format: '{}' (expected key=value)",
            s
        )),
    }
}

/// Load a preset by factory name, user preset name or path, and validate it.
pub fn load_preset(name: &str) -> anyhow::Result<Preset> {
    let preset =
        resolve_preset(name).context("use 'vocalis presets list' to see available presets")?;
    preset
        .validate()
        .with_context(|| format!("preset '{}' is invalid", preset.name))?;
    Ok(preset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_val_parsing() {
        assert_eq!(
            parse_key_val("gain=6"),
            Ok(("gain".to_string(), "6".to_string()))
        );
        assert_eq!(
            parse_key_val("limit=-3=x"),
            Ok(("limit".to_string(), "-3=x".to_string()))
        );
        assert!(parse_key_val("gain").is_err());
        assert!(parse_key_val("=6").is_err());
    }
}
