//! Integration tests for vocalis-io: WAV files through the AGC engine.

use tempfile::TempDir;
use vocalis_io::{
    AgcEngine, EngineConfig, StereoSamples, WavFormat, WavSpec, read_wav, read_wav_info,
    read_wav_stereo, write_wav, write_wav_stereo,
};

fn sine_wave(sample_rate: u32, freq_hz: f32, amplitude: f32, num_samples: usize) -> Vec<f32> {
    (0..num_samples)
        .map(|i| {
            amplitude * (2.0 * std::f32::consts::PI * freq_hz * i as f32 / sample_rate as f32).sin()
        })
        .collect()
}

#[test]
fn wav_info_reports_duration() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("info.wav");
    let spec = WavSpec {
        channels: 2,
        sample_rate: 44100,
        bits_per_sample: 24,
    };
    let half = sine_wave(44100, 440.0, 0.5, 22050);
    write_wav_stereo(&path, &StereoSamples::new(half.clone(), half), spec).unwrap();

    let info = read_wav_info(&path).unwrap();
    assert_eq!(info.channels, 2);
    assert_eq!(info.num_frames, 22050);
    assert_eq!(info.format, WavFormat::Pcm);
    assert!((info.duration_secs - 0.5).abs() < 1e-9);
}

#[test]
fn mono_file_through_engine_respects_ceiling() {
    let temp = TempDir::new().unwrap();
    let input_path = temp.path().join("in.wav");
    let output_path = temp.path().join("out.wav");

    let sr = 48000;
    let samples = sine_wave(sr, 220.0, 0.95, sr as usize);
    write_wav(&input_path, &samples, WavSpec { sample_rate: sr, ..WavSpec::default() }).unwrap();

    let (loaded, spec) = read_wav(&input_path).unwrap();
    let mut engine = AgcEngine::new(EngineConfig::mono(spec.sample_rate)).unwrap();
    let processed = engine.process_mono(&loaded);
    write_wav(&output_path, &processed, spec).unwrap();

    let (result, result_spec) = read_wav(&output_path).unwrap();
    assert_eq!(result_spec.sample_rate, sr);
    assert_eq!(result.len(), samples.len());

    let limit = engine.channel(0).unwrap().control().limit();
    let peak = result.iter().fold(0.0f32, |m, y| m.max(y.abs()));
    assert!(peak <= limit, "peak {peak} above {limit}");
    assert!(peak > 0.5 * limit);
    assert_eq!(engine.stats()[0].peak_out, peak);
}

#[test]
fn stereo_file_round_trip_linked() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("stereo.wav");
    let sr = 48000;
    let input = StereoSamples::new(
        sine_wave(sr, 300.0, 0.9, 9600),
        sine_wave(sr, 300.0, 0.9, 9600),
    );

    let mut engine = AgcEngine::new(EngineConfig::stereo(sr, true)).unwrap();
    let out = engine.process_stereo(&input);
    write_wav_stereo(&path, &out, WavSpec { sample_rate: sr, ..WavSpec::default() }).unwrap();

    let (loaded, spec) = read_wav_stereo(&path).unwrap();
    assert_eq!(spec.channels, 2);
    assert_eq!(loaded, out);
    // identical inputs through one shared gain stay identical
    assert_eq!(loaded.left, loaded.right);
}

#[test]
fn muted_engine_never_ducks() {
    let config = EngineConfig {
        mic_muted: true,
        ..EngineConfig::mono(48000)
    };
    let mut engine = AgcEngine::new(config).unwrap();
    assert!(engine.set_parameter("duckenable", "1"));
    engine.process_mono(&sine_wave(48000, 300.0, 0.8, 9600));
    assert_eq!(engine.stats()[0].min_ducking, 1.0);

    let mut live = AgcEngine::new(EngineConfig::mono(48000)).unwrap();
    live.set_parameter("duckenable", "1");
    live.process_mono(&sine_wave(48000, 300.0, 0.8, 9600));
    assert!(live.stats()[0].min_ducking < 0.5);
}
