//! Factory presets bundled with the library.
//!
//! These presets are compiled in and always available, so `--preset podcast`
//! works without any files on disk. They are starting points for common voice
//! chains rather than finished tunings.

use crate::Preset;

/// Names of the factory presets.
pub static FACTORY_PRESET_NAMES: &[&str] = &["default", "podcast", "broadcast", "gentle", "music-bed"];

static FACTORY_PRESETS_TOML: &[(&str, &str)] = &[
    ("default", DEFAULT_PRESET),
    ("podcast", PODCAST_PRESET),
    ("broadcast", BROADCAST_PRESET),
    ("gentle", GENTLE_PRESET),
    ("music-bed", MUSIC_BED_PRESET),
];

const DEFAULT_PRESET: &str = r#"
name = "Default"
description = "Built-in defaults: 3 dB ratio, -3 dB ceiling, 10 ms lookahead"
lookahead_ms = 10.0
"#;

const PODCAST_PRESET: &str = r#"
name = "Podcast"
description = "Close-miked spoken word with a firm gate and gentle de-essing"
lookahead_ms = 10.0

[params]
gain = "6"
limit = "-3"
ngthresh = "-24"
nggain = "-12"
deessbias = "0.4"
deessgain = "-6"
hpcutoff = "80"
hpstages = "4"
"#;

const BROADCAST_PRESET: &str = r#"
name = "Broadcast"
description = "Dense, forward voice for live streams"
lookahead_ms = 5.0

[params]
gain = "9"
limit = "-1"
ngthresh = "-22"
nggain = "-9"
deessbias = "0.5"
deessgain = "-9"
hpcutoff = "100"
hfmulti = "6"
lfmulti = "3"
"#;

const GENTLE_PRESET: &str = r#"
name = "Gentle"
description = "Light levelling for dynamic material"
lookahead_ms = 20.0

[params]
gain = "1"
limit = "-6"
ngthresh = "-30"
nggain = "-3"
hfmulti = "2"
lfmulti = "2"
phaserotate = "0"
"#;

const MUSIC_BED_PRESET: &str = r#"
name = "Music Bed"
description = "Voice over music: ducking enabled with a slow release"
lookahead_ms = 10.0

[params]
gain = "3"
limit = "-3"
duckenable = "1"
duckrelease = "500"
duckhold = "750"
"#;

/// Parse every factory preset.
pub fn factory_presets() -> Vec<Preset> {
    FACTORY_PRESETS_TOML
        .iter()
        .filter_map(|(name, toml)| match Preset::from_toml(toml) {
            Ok(preset) => Some(preset),
            Err(e) => {
                tracing::error!(preset = name, error = %e, "factory preset failed to parse");
                None
            }
        })
        .collect()
}

/// Look up a factory preset by name (case-insensitive).
pub fn get_factory_preset(name: &str) -> Option<Preset> {
    FACTORY_PRESETS_TOML
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .and_then(|(_, toml)| Preset::from_toml(toml).ok())
}

/// Whether `name` is a factory preset.
pub fn is_factory_preset(name: &str) -> bool {
    FACTORY_PRESET_NAMES
        .iter()
        .any(|n| n.eq_ignore_ascii_case(name))
}
