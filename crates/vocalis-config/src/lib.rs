//! Configuration and preset management for the vocalis AGC.
//!
//! # Features
//!
//! - **Presets**: named parameter sets stored as TOML
//! - **Validation**: strict checks of keys, values and lookahead
//! - **Factory Presets**: built-in starting points
//! - **Paths**: platform-specific user preset directory
//!
//! # Example
//!
//! ```rust,no_run
//! use vocalis_agc::Channel;
//! use vocalis_config::{Preset, resolve_preset, user_presets_dir};
//!
//! let preset = resolve_preset("podcast").unwrap();
//! preset.validate().unwrap();
//!
//! let mut channel = Channel::new(48000, preset.lookahead_seconds()).unwrap();
//! preset.apply(&mut channel);
//!
//! let mine = Preset::new("Late Show")
//!     .with_lookahead_ms(8.0)
//!     .with_param("ngthresh", "-28");
//! mine.save(user_presets_dir().join("late_show.toml")).unwrap();
//! ```

mod error;
mod preset;

/// Factory presets bundled with the library.
pub mod factory_presets;

/// Platform-specific preset paths and lookup.
pub mod paths;

/// Preset validation.
pub mod validation;

pub use error::ConfigError;
pub use factory_presets::{
    FACTORY_PRESET_NAMES, factory_presets, get_factory_preset, is_factory_preset,
};
pub use paths::{
    ensure_user_presets_dir, find_user_preset, list_user_presets, preset_name_from_path,
    resolve_preset, user_presets_dir,
};
pub use preset::{DEFAULT_LOOKAHEAD_MS, Preset};
pub use validation::{ValidationError, ValidationResult, validate_param, validate_preset};
