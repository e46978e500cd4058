//! File-based AGC processing command.

use crate::commands::common::{load_preset, parse_key_val};
use anyhow::Context;
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::path::{Path, PathBuf};
use vocalis_config::{DEFAULT_LOOKAHEAD_MS, Preset};
use vocalis_core::linear_to_db;
use vocalis_io::{
    AgcEngine, ChannelStats, EngineConfig, WavSpec, read_wav, read_wav_info, read_wav_stereo,
    write_wav, write_wav_stereo,
};

#[derive(Args)]
pub struct ProcessArgs {
    /// Input WAV file
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output WAV file
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Preset name or TOML file
    #[arg(short, long)]
    preset: Option<String>,

    /// Parameter overrides applied after the preset (e.g., "ngthresh=-24")
    #[arg(long, value_parser = parse_key_val, number_of_values = 1)]
    param: Vec<(String, String)>,

    /// Lookahead in milliseconds (overrides the preset)
    #[arg(long)]
    lookahead_ms: Option<f32>,

    /// Samples between control updates
    #[arg(long, default_value = "1")]
    block_size: usize,

    /// Mix stereo input down to a single channel
    #[arg(long, conflicts_with = "link")]
    mono: bool,

    /// Drive both stereo channels from one gain computer
    #[arg(long)]
    link: bool,

    /// Treat the microphone as muted (ducking releases)
    #[arg(long)]
    mute: bool,

    /// Output bit depth (16, 24, or 32); defaults to the input depth
    #[arg(long)]
    bit_depth: Option<u16>,

    /// Write a JSON processing report to this path
    #[arg(long, value_name = "PATH")]
    report: Option<PathBuf>,
}

/// Machine-readable summary of one run.
#[derive(Debug, Serialize)]
struct Report {
    input: String,
    output: String,
    preset: Option<String>,
    sample_rate: u32,
    frames: usize,
    lookahead_ms: f32,
    latency_samples: usize,
    control_interval: usize,
    linked: bool,
    muted: bool,
    channels: Vec<ChannelReport>,
}

#[derive(Debug, Serialize)]
struct ChannelReport {
    peak_in_db: f32,
    peak_out_db: f32,
    control_updates: u64,
    gate_closed_pct: f32,
    deesser_active_pct: f32,
    min_ducking: f32,
    red_db: f32,
    yellow_db: f32,
    green_db: f32,
}

impl ChannelReport {
    fn new(stats: &ChannelStats, engine: &AgcEngine, index: usize) -> Self {
        let pct = |count: u64| {
            if stats.updates == 0 {
                0.0
            } else {
                100.0 * count as f32 / stats.updates as f32
            }
        };
        let meters = engine.meter_levels(index).unwrap_or_default();
        Self {
            peak_in_db: linear_to_db(stats.peak_in),
            peak_out_db: linear_to_db(stats.peak_out),
            control_updates: stats.updates,
            gate_closed_pct: pct(stats.gate_closed),
            deesser_active_pct: pct(stats.deesser_active),
            min_ducking: stats.min_ducking,
            red_db: meters.red_db,
            yellow_db: meters.yellow_db,
            green_db: meters.green_db,
        }
    }
}

pub fn run(args: ProcessArgs) -> anyhow::Result<()> {
    let info = read_wav_info(&args.input)
        .with_context(|| format!("cannot open {}", args.input.display()))?;
    println!("Reading {}...", args.input.display());
    println!(
        "  {} frames, {} ch, {} Hz, {:.2}s",
        info.num_frames, info.channels, info.sample_rate, info.duration_secs
    );

    let settings = effective_settings(&args)?;
    if let Some(rate) = settings.sample_rate
        && rate != info.sample_rate
    {
        tracing::warn!(
            preset_rate = rate,
            file_rate = info.sample_rate,
            "preset was tuned at a different sample rate"
        );
    }

    let lookahead_ms = settings.lookahead_ms.unwrap_or(DEFAULT_LOOKAHEAD_MS);
    let stereo = info.channels >= 2 && !args.mono;
    let config = EngineConfig {
        sample_rate: info.sample_rate,
        lookahead_seconds: settings.lookahead_seconds(),
        channels: if stereo { 2 } else { 1 },
        linked: stereo && args.link,
        control_interval: args.block_size.max(1),
        mic_muted: args.mute,
    };
    let mut engine = AgcEngine::new(config)?;
    engine.for_each_channel(|ch| {
        settings.apply(ch);
    });

    println!(
        "Processing with {} ms lookahead ({} samples), control every {} sample(s)...",
        lookahead_ms,
        engine.latency_samples(),
        config.control_interval
    );

    let bits = args.bit_depth.unwrap_or(match info.bits_per_sample {
        16 | 24 => info.bits_per_sample,
        _ => 32,
    });
    let out_spec = WavSpec {
        channels: config.channels,
        sample_rate: info.sample_rate,
        bits_per_sample: bits,
    };

    let frames = if stereo {
        let (samples, _) = read_wav_stereo(&args.input)?;
        let pb = progress_bar(samples.len())?;
        let output = engine.process_stereo_with(&samples, |n| pb.set_position(n as u64));
        pb.finish_with_message("done");
        println!("\nWriting {}...", args.output.display());
        write_wav_stereo(&args.output, &output, out_spec)?;
        samples.len()
    } else {
        let (samples, _) = read_wav(&args.input)?;
        let pb = progress_bar(samples.len())?;
        let output = engine.process_mono_with(&samples, |n| pb.set_position(n as u64));
        pb.finish_with_message("done");
        println!("\nWriting {}...", args.output.display());
        write_wav(&args.output, &output, out_spec)?;
        samples.len()
    };

    let channels: Vec<ChannelReport> = engine
        .stats()
        .iter()
        .enumerate()
        .map(|(i, stats)| ChannelReport::new(stats, &engine, i))
        .collect();

    println!("\nStats:");
    for (i, ch) in channels.iter().enumerate() {
        println!(
            "  ch{i}: peak in {:.1} dB, peak out {:.1} dB, gate closed {:.0}%, de-esser {:.0}%, min ducking {:.2}",
            ch.peak_in_db,
            ch.peak_out_db,
            ch.gate_closed_pct,
            ch.deesser_active_pct,
            ch.min_ducking
        );
    }

    if let Some(path) = &args.report {
        let report = Report {
            input: args.input.display().to_string(),
            output: args.output.display().to_string(),
            preset: args.preset.clone(),
            sample_rate: info.sample_rate,
            frames,
            lookahead_ms,
            latency_samples: engine.latency_samples(),
            control_interval: config.control_interval,
            linked: config.linked,
            muted: config.mic_muted,
            channels,
        };
        write_report(path, &report)?;
        println!("Report written to {}", path.display());
    }

    println!("Done!");
    Ok(())
}

/// Preset (or defaults) with the command-line overrides merged in, validated.
fn effective_settings(args: &ProcessArgs) -> anyhow::Result<Preset> {
    let mut preset = match &args.preset {
        Some(name) => {
            let preset = load_preset(name)?;
            println!("Loading preset: {}", preset.name);
            preset
        }
        None => Preset::new("command line"),
    };

    preset.params.extend(args.param.iter().cloned());
    if args.lookahead_ms.is_some() {
        preset.lookahead_ms = args.lookahead_ms;
    }
    preset.validate().context("invalid settings")?;
    Ok(preset)
}

fn progress_bar(len: usize) -> anyhow::Result<ProgressBar> {
    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("##-"),
    );
    Ok(pb)
}

fn write_report(path: &Path, report: &Report) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json).with_context(|| format!("cannot write {}", path.display()))?;
    Ok(())
}
