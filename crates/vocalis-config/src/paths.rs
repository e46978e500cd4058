//! Platform-specific paths for user presets.
//!
//! # Directory Structure
//!
//! - Linux: `~/.config/vocalis/presets/`
//! - macOS: `~/Library/Application Support/vocalis/presets/`
//! - Windows: `%APPDATA%\vocalis\presets\`

use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::factory_presets::get_factory_preset;
use crate::preset::Preset;

const APP_NAME: &str = "vocalis";
const PRESETS_SUBDIR: &str = "presets";

/// User presets directory. Falls back to `./vocalis/presets` when the platform
/// config directory is unknown.
pub fn user_presets_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
        .join(PRESETS_SUBDIR)
}

/// Create the user presets directory if needed and return it.
pub fn ensure_user_presets_dir() -> Result<PathBuf, ConfigError> {
    let dir = user_presets_dir();
    if !dir.exists() {
        std::fs::create_dir_all(&dir).map_err(|e| ConfigError::create_dir(&dir, e))?;
    }
    Ok(dir)
}

/// `.toml` files in the user presets directory, sorted by path.
///
/// Empty when the directory does not exist or cannot be read.
pub fn list_user_presets() -> Vec<PathBuf> {
    list_presets_in_dir(&user_presets_dir())
}

/// `.toml` files in `dir`, sorted by path.
pub fn list_presets_in_dir(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut presets: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "toml"))
        .collect();
    presets.sort();
    presets
}

/// Find a user preset file by name, with or without `.toml`.
pub fn find_user_preset(name: &str) -> Option<PathBuf> {
    find_preset_in(&user_presets_dir(), name)
}

/// Find a preset file named `name` in `dir`.
pub fn find_preset_in(dir: &Path, name: &str) -> Option<PathBuf> {
    let filename = if name.ends_with(".toml") {
        name.to_string()
    } else {
        format!("{name}.toml")
    };
    let path = dir.join(filename);
    path.is_file().then_some(path)
}

/// Resolve a preset argument.
///
/// Checks factory presets, then user presets, then treats `name` as a path.
pub fn resolve_preset(name: &str) -> Result<Preset, ConfigError> {
    if let Some(preset) = get_factory_preset(name) {
        return Ok(preset);
    }
    if let Some(path) = find_user_preset(name) {
        return Preset::load(path);
    }
    let path = Path::new(name);
    if path.is_file() {
        return Preset::load(path);
    }
    Err(ConfigError::PresetNotFound(name.to_string()))
}

/// File stem of a preset path.
///
/// ```rust
/// use vocalis_config::paths::preset_name_from_path;
/// use std::path::Path;
///
/// let name = preset_name_from_path(Path::new("/path/to/late_show.toml"));
/// assert_eq!(name.as_deref(), Some("late_show"));
/// ```
pub fn preset_name_from_path(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn user_dir_ends_with_app_presets() {
        let dir = user_presets_dir();
        assert!(dir.ends_with("vocalis/presets"));
    }

    #[test]
    fn lists_only_toml_files() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("b.toml"), "name = \"B\"").unwrap();
        fs::write(temp.path().join("a.toml"), "name = \"A\"").unwrap();
        fs::write(temp.path().join("notes.txt"), "x").unwrap();
        fs::create_dir(temp.path().join("dir.toml")).unwrap();

        let found = list_presets_in_dir(temp.path());
        let names: Vec<_> = found
            .iter()
            .filter_map(|p| preset_name_from_path(p))
            .collect();
        assert_eq!(names, vec!["a", "b"]);
        assert!(list_presets_in_dir(&temp.path().join("missing")).is_empty());
    }

    #[test]
    fn find_accepts_name_with_or_without_extension() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("late.toml"), "name = \"Late\"").unwrap();
        assert!(find_preset_in(temp.path(), "late").is_some());
        assert!(find_preset_in(temp.path(), "late.toml").is_some());
        assert!(find_preset_in(temp.path(), "early").is_none());
    }

    #[test]
    fn resolve_prefers_factory_then_path() {
        assert_eq!(resolve_preset("podcast").unwrap().name, "Podcast");

        let temp = TempDir::new().unwrap();
        let path = temp.path().join("custom.toml");
        fs::write(&path, "name = \"Custom\"\n[params]\ngain = \"4\"\n").unwrap();
        let preset = resolve_preset(path.to_str().unwrap()).unwrap();
        assert_eq!(preset.param("gain"), Some("4"));

        assert!(matches!(
            resolve_preset("/definitely/not/here.toml"),
            Err(ConfigError::PresetNotFound(_))
        ));
    }
}
