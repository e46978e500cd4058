//! Preset file format and operations.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use vocalis_agc::Channel;

use crate::error::ConfigError;

/// Lookahead used when a preset does not name one.
pub const DEFAULT_LOOKAHEAD_MS: f32 = 10.0;

/// A named set of AGC parameter values.
///
/// Values are kept as text, exactly as
/// [`Channel::set_parameter`](vocalis_agc::Channel::set_parameter) receives them.
///
/// # TOML Format
///
/// ```toml
/// name = "Podcast"
/// description = "Close-miked spoken word"
/// lookahead_ms = 10.0
///
/// [params]
/// gain = "6"
/// ngthresh = "-24"
/// hpcutoff = "80"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Preset {
    /// Name of the preset.
    pub name: String,

    /// Optional description of the preset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Sample rate the preset was tuned at; informational only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_rate: Option<u32>,

    /// Lookahead length in milliseconds. Fixed when a channel is built.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lookahead_ms: Option<f32>,

    /// Parameter key/value pairs.
    #[serde(default)]
    pub params: BTreeMap<String, String>,
}

impl Preset {
    /// Create a new empty preset.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            sample_rate: None,
            lookahead_ms: None,
            params: BTreeMap::new(),
        }
    }

    /// Create a preset with a description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the sample rate hint.
    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = Some(sample_rate);
        self
    }

    /// Set the lookahead length.
    pub fn with_lookahead_ms(mut self, lookahead_ms: f32) -> Self {
        self.lookahead_ms = Some(lookahead_ms);
        self
    }

    /// Add or replace a parameter value.
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Look up a parameter value.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Lookahead in seconds, falling back to [`DEFAULT_LOOKAHEAD_MS`].
    pub fn lookahead_seconds(&self) -> f32 {
        self.lookahead_ms.unwrap_or(DEFAULT_LOOKAHEAD_MS) / 1000.0
    }

    /// Load a preset from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        let preset: Preset = toml::from_str(&content)?;
        tracing::debug!(path = %path.display(), name = %preset.name, "preset loaded");
        Ok(preset)
    }

    /// Load a preset from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Save the preset to a TOML file, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }

        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
        Ok(())
    }

    /// Convert the preset to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Apply every parameter to a channel and return how many keys it accepted.
    ///
    /// Unknown keys are skipped with a warning. The lookahead is not applied;
    /// build the channel with [`lookahead_seconds`](Self::lookahead_seconds).
    pub fn apply(&self, channel: &mut Channel) -> usize {
        let mut applied = 0;
        for (key, value) in &self.params {
            if channel.set_parameter(key, value) {
                applied += 1;
            } else {
                tracing::warn!(preset = %self.name, key = %key, "preset names an unknown parameter");
            }
        }
        applied
    }

    /// Check every key, value and the lookahead.
    pub fn validate(&self) -> Result<(), ConfigError> {
        crate::validation::validate_preset(self)?;
        Ok(())
    }
}

impl Default for Preset {
    fn default() -> Self {
        Self::new("Untitled")
    }
}
