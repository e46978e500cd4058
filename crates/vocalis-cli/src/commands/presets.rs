//! Preset management commands.
//!
//! Provides commands to list, show, save, copy and delete AGC presets.

use crate::commands::common::{load_preset, parse_key_val};
use clap::{Args, Subcommand};
use vocalis_config::{
    DEFAULT_LOOKAHEAD_MS, FACTORY_PRESET_NAMES, Preset, ensure_user_presets_dir, get_factory_preset, list_user_presets,
    preset_name_from_path, user_presets_dir,
};

#[derive(Args)]
pub struct PresetsArgs {
    #[command(subcommand)]
    command: PresetsCommand,
}

#[derive(Subcommand)]
enum PresetsCommand {
    /// List available presets (factory and user)
    List {
        /// Show only factory presets
        #[arg(long)]
        factory: bool,

        /// Show only user presets
        #[arg(long)]
        user: bool,
    },

    /// Show details of a preset
    Show {
        /// Preset name or path
        name: String,
    },

    /// Save parameter values as a user preset
    Save {
        /// Name for the new preset
        name: String,

        /// Parameter values (e.g., "ngthresh=-24")
        #[arg(long, value_parser = parse_key_val, number_of_values = 1)]
        param: Vec<(String, String)>,

        /// Lookahead in milliseconds
        #[arg(long)]
        lookahead_ms: Option<f32>,

        /// Description of the preset
        #[arg(short, long)]
        description: Option<String>,

        /// Overwrite if preset already exists
        #[arg(long)]
        force: bool,
    },

    /// Delete a user preset
    Delete {
        /// Preset name to delete
        name: String,

        /// Confirm deletion
        #[arg(long)]
        force: bool,
    },

    /// Copy a factory preset to user presets for customization
    Copy {
        /// Factory preset name
        source: String,

        /// New preset name (defaults to the source name)
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Show the user preset directory
    Paths,
}

pub fn run(args: PresetsArgs) -> anyhow::Result<()> {
    match args.command {
        PresetsCommand::List { factory, user } => list_presets(factory, user),
        PresetsCommand::Show { name } => show_preset(&name),
        PresetsCommand::Save {
            name,
            param,
            lookahead_ms,
            description,
            force,
        } => save_preset(&name, param, lookahead_ms, description, force),
        PresetsCommand::Delete { name, force } => delete_preset(&name, force),
        PresetsCommand::Copy { source, name } => copy_preset(&source, name.as_deref()),
        PresetsCommand::Paths => {
            println!("User presets: {}", user_presets_dir().display());
            Ok(())
        }
    }
}

fn list_presets(factory_only: bool, user_only: bool) -> anyhow::Result<()> {
    if !user_only {
        println!("Factory Presets:");
        println!("================");
        for &name in FACTORY_PRESET_NAMES {
            let desc = get_factory_preset(name)
                .and_then(|preset| preset.description)
                .unwrap_or_default();
            println!("  {:20} - {}", name, desc);
        }
        println!();
    }

    if !factory_only {
        println!("User Presets:");
        println!("=============");
        let user_presets = list_user_presets();
        if user_presets.is_empty() {
            println!("  (none)");
            println!();
            println!("  Create a preset with: vocalis presets save <name> --param key=value\n");
        }
        for path in user_presets {
            let name = preset_name_from_path(&path).unwrap_or_else(|| "unknown".to_string());
            match Preset::load(&path) {
                Ok(preset) => {
                    let desc = preset.description.as_deref().unwrap_or("");
                    println!("  {:20} - {}", name, desc);
                }
                Err(e) => {
                    tracing::debug!(path = %path.display(), error = %e, "unreadable user preset");
                    println!("  {:20} - (error loading)", name);
                }
            }
        }
        println!();
    }

    Ok(())
}

fn show_preset(name: &str) -> anyhow::Result<()> {
    let preset = load_preset(name)?;

    println!("Preset: {}", preset.name);
    println!("{}", "=".repeat(8 + preset.name.len()));
    println!();

    if let Some(desc) = &preset.description {
        println!("Description: {}", desc);
        println!();
    }
    println!(
        "Lookahead: {} ms",
        preset.lookahead_ms.unwrap_or(DEFAULT_LOOKAHEAD_MS)
    );
    if let Some(rate) = preset.sample_rate {
        println!("Tuned at:  {} Hz", rate);
    }
    println!();

    if preset.params.is_empty() {
        println!("Parameters: (all defaults)");
    } else {
        println!("Parameters ({}):", preset.params.len());
        for (key, value) in &preset.params {
            println!("  {} = {}", key, value);
        }
    }

    Ok(())
}

fn save_preset(
    name: &str,
    params: Vec<(String, String)>,
    lookahead_ms: Option<f32>,
    description: Option<String>,
    force: bool,
) -> anyhow::Result<()> {
    let dir = ensure_user_presets_dir()?;
    let preset_path = dir.join(format!("{}.toml", name));

    if preset_path.exists() && !force {
        anyhow::bail!("Preset '{}' already exists. Use --force to overwrite.", name);
    }

    let mut preset = Preset::new(name);
    preset.description = description;
    preset.lookahead_ms = lookahead_ms;
    preset.params.extend(params);
    preset.validate()?;

    preset.save(&preset_path)?;
    println!("Saved preset '{}' to {}", name, preset_path.display());
    Ok(())
}

fn delete_preset(name: &str, force: bool) -> anyhow::Result<()> {
    if get_factory_preset(name).is_some() {
        anyhow::bail!("Cannot delete factory preset '{}'. Factory presets are built-in.", name);
    }

    let preset_path = user_presets_dir().join(format!("{}.toml", name));
    if !preset_path.exists() {
        anyhow::bail!("User preset '{}' not found.", name);
    }
    if !force {
        anyhow::bail!("Use --force to confirm deletion of preset '{}'.", name);
    }

    std::fs::remove_file(&preset_path)?;
    println!("Deleted preset '{}'.", name);
    Ok(())
}

fn copy_preset(source: &str, new_name: Option<&str>) -> anyhow::Result<()> {
    let preset = get_factory_preset(source)
        .ok_or_else(|| anyhow::anyhow!("Factory preset '{}' not found.", source))?;
    let target_name = new_name.unwrap_or(source);

    let dir = ensure_user_presets_dir()?;
    let preset_path = dir.join(format!("{}.toml", target_name));
    if preset_path.exists() {
        anyhow::bail!(
            "Preset '{}' already exists in user presets. Choose a different name with --name.",
            target_name
        );
    }

    let copy = Preset {
        name: target_name.to_string(),
        description: preset.description.map(|d| format!("{} (copy)", d)),
        ..preset
    };
    copy.save(&preset_path)?;
    println!("Copied '{}' to {}", source, preset_path.display());
    Ok(())
}
