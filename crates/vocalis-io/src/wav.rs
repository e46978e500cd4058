//! WAV file reading and writing.
//!
//! Samples are exchanged as `f32` in `[-1, 1]`. Integer PCM is scaled by
//! `2^(bits-1)` on read and clamped on write; 32-bit files are IEEE float.

use crate::{Error, Result};
use hound::{SampleFormat, WavReader, WavWriter};
use std::path::Path;

/// WAV audio encoding format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WavFormat {
    /// Linear PCM (integer samples).
    Pcm,
    /// IEEE 754 floating-point samples.
    IeeeFloat,
}

/// WAV file metadata extracted without loading sample data.
#[derive(Debug, Clone)]
pub struct WavInfo {
    /// Number of audio channels.
    pub channels: u16,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Bit depth per sample.
    pub bits_per_sample: u16,
    /// Sample frames (samples per channel).
    pub num_frames: u64,
    /// Duration in seconds.
    pub duration_secs: f64,
    /// Audio encoding format.
    pub format: WavFormat,
}

/// Read WAV metadata without decoding samples.
pub fn read_wav_info<P: AsRef<Path>>(path: P) -> Result<WavInfo> {
    let reader = WavReader::open(path)?;
    let spec = reader.spec();
    let num_frames = u64::from(reader.len()) / u64::from(spec.channels.max(1));

    Ok(WavInfo {
        channels: spec.channels,
        sample_rate: spec.sample_rate,
        bits_per_sample: spec.bits_per_sample,
        num_frames,
        duration_secs: num_frames as f64 / f64::from(spec.sample_rate.max(1)),
        format: match spec.sample_format {
            SampleFormat::Float => WavFormat::IeeeFloat,
            SampleFormat::Int => WavFormat::Pcm,
        },
    })
}

/// Output file specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavSpec {
    /// Number of audio channels (1 = mono, 2 = stereo).
    pub channels: u16,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// 16 or 24 for integer PCM, 32 for float.
    pub bits_per_sample: u16,
}

impl WavSpec {
    /// Encoding implied by the bit depth.
    pub fn format(&self) -> WavFormat {
        if self.bits_per_sample == 32 {
            WavFormat::IeeeFloat
        } else {
            WavFormat::Pcm
        }
    }

    /// Copy with a different bit depth.
    pub fn with_bits(mut self, bits_per_sample: u16) -> Self {
        self.bits_per_sample = bits_per_sample;
        self
    }

    fn to_hound(self) -> Result<hound::WavSpec> {
        let sample_format = match self.bits_per_sample {
            16 | 24 => SampleFormat::Int,
            32 => SampleFormat::Float,
            other => {
                return Err(Error::UnsupportedFormat(format!(
                    "{other}-bit output (use 16, 24 or 32)"
                )));
            }
        };
        Ok(hound::WavSpec {
            channels: self.channels,
            sample_rate: self.sample_rate,
            bits_per_sample: self.bits_per_sample,
            sample_format,
        })
    }
}

impl Default for WavSpec {
    fn default() -> Self {
        Self {
            channels: 1,
            sample_rate: 48000,
            bits_per_sample: 32,
        }
    }
}

impl From<hound::WavSpec> for WavSpec {
    fn from(spec: hound::WavSpec) -> Self {
        Self {
            channels: spec.channels,
            sample_rate: spec.sample_rate,
            bits_per_sample: spec.bits_per_sample,
        }
    }
}

/// A pair of equal-length channel buffers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StereoSamples {
    /// Left channel.
    pub left: Vec<f32>,
    /// Right channel.
    pub right: Vec<f32>,
}

impl StereoSamples {
    /// Pair two buffers. The longer one is truncated to the shorter.
    pub fn new(mut left: Vec<f32>, mut right: Vec<f32>) -> Self {
        let len = left.len().min(right.len());
        left.truncate(len);
        right.truncate(len);
        Self { left, right }
    }

    /// Duplicate a mono buffer into both channels.
    pub fn from_mono(mono: Vec<f32>) -> Self {
        Self {
            right: mono.clone(),
            left: mono,
        }
    }

    /// Frames per channel.
    pub fn len(&self) -> usize {
        self.left.len()
    }

    /// True when there are no frames.
    pub fn is_empty(&self) -> bool {
        self.left.is_empty()
    }

    /// Average of both channels.
    pub fn to_mono(&self) -> Vec<f32> {
        self.left
            .iter()
            .zip(&self.right)
            .map(|(l, r)| 0.5 * (l + r))
            .collect()
    }
}

/// Decode every sample of a file, interleaved, as `f32`.
fn read_interleaved<P: AsRef<Path>>(path: P) -> Result<(Vec<f32>, WavSpec)> {
    let path = path.as_ref();
    let reader = WavReader::open(path)?;
    let hound_spec = reader.spec();

    let samples = match hound_spec.sample_format {
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<std::result::Result<Vec<_>, _>>()?,
        SampleFormat::Int => {
            let scale = 1.0 / (1i64 << (hound_spec.bits_per_sample.clamp(1, 32) - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 * scale))
                .collect::<std::result::Result<Vec<_>, _>>()?
        }
    };

    tracing::debug!(
        path = %path.display(),
        channels = hound_spec.channels,
        sample_rate = hound_spec.sample_rate,
        samples = samples.len(),
        "WAV decoded"
    );
    Ok((samples, WavSpec::from(hound_spec)))
}

/// Read a WAV file, mixing multi-channel audio down to mono by averaging.
pub fn read_wav<P: AsRef<Path>>(path: P) -> Result<(Vec<f32>, WavSpec)> {
    let (samples, spec) = read_interleaved(path)?;
    let channels = usize::from(spec.channels.max(1));
    if channels == 1 {
        return Ok((samples, spec));
    }
    let mono = samples
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect();
    Ok((mono, spec))
}

/// Read a WAV file as two channels.
///
/// Mono is duplicated; beyond two channels only the first two are kept.
pub fn read_wav_stereo<P: AsRef<Path>>(path: P) -> Result<(StereoSamples, WavSpec)> {
    let (samples, spec) = read_interleaved(path)?;
    let channels = usize::from(spec.channels.max(1));
    if channels == 1 {
        return Ok((StereoSamples::from_mono(samples), spec));
    }

    let frames = samples.len() / channels;
    let mut left = Vec::with_capacity(frames);
    let mut right = Vec::with_capacity(frames);
    for frame in samples.chunks_exact(channels) {
        left.push(frame[0]);
        right.push(frame[1]);
    }
    Ok((StereoSamples { left, right }, spec))
}

fn write_frames<P, I>(path: P, spec: WavSpec, samples: I) -> Result<()>
where
    P: AsRef<Path>,
    I: IntoIterator<Item = f32>,
{
    let path = path.as_ref();
    let mut writer = WavWriter::create(path, spec.to_hound()?)?;

    match spec.format() {
        WavFormat::IeeeFloat => {
            for sample in samples {
                writer.write_sample(sample)?;
            }
        }
        WavFormat::Pcm => {
            let full_scale = (1i32 << (spec.bits_per_sample - 1)) as f32;
            for sample in samples {
                let value = (sample * full_scale).clamp(-full_scale, full_scale - 1.0);
                writer.write_sample(value as i32)?;
            }
        }
    }

    writer.finalize()?;
    tracing::debug!(path = %path.display(), channels = spec.channels, "WAV written");
    Ok(())
}

/// Write a mono WAV file. `spec.channels` is forced to 1.
pub fn write_wav<P: AsRef<Path>>(path: P, samples: &[f32], spec: WavSpec) -> Result<()> {
    let spec = WavSpec { channels: 1, ..spec };
    write_frames(path, spec, samples.iter().copied())
}

/// Write a stereo WAV file. `spec.channels` is forced to 2.
pub fn write_wav_stereo<P: AsRef<Path>>(
    path: P,
    samples: &StereoSamples,
    spec: WavSpec,
) -> Result<()> {
    let spec = WavSpec { channels: 2, ..spec };
    let frames = samples
        .left
        .iter()
        .zip(&samples.right)
        .flat_map(|(&l, &r)| [l, r]);
    write_frames(path, spec, frames)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn ramp(n: usize) -> Vec<f32> {
        (0..n).map(|i| i as f32 / n as f32 * 1.8 - 0.9).collect()
    }

    #[test]
    fn float_round_trip_is_exact() {
        let samples = ramp(1000);
        let file = NamedTempFile::new().unwrap();
        write_wav(file.path(), &samples, WavSpec::default()).unwrap();

        let (loaded, spec) = read_wav(file.path()).unwrap();
        assert_eq!(spec, WavSpec::default());
        assert_eq!(loaded, samples);
    }

    #[test]
    fn pcm_depths_quantize_within_one_step() {
        for bits in [16u16, 24] {
            let samples = ramp(500);
            let spec = WavSpec::default().with_bits(bits);
            let file = NamedTempFile::new().unwrap();
            write_wav(file.path(), &samples, spec).unwrap();

            let (loaded, loaded_spec) = read_wav(file.path()).unwrap();
            assert_eq!(loaded_spec.bits_per_sample, bits);
            let step = 1.0 / (1i64 << (bits - 1)) as f32;
            for (a, b) in samples.iter().zip(&loaded) {
                assert!((a - b).abs() <= step, "{bits}-bit: {a} vs {b}");
            }
        }
    }

    #[test]
    fn full_scale_is_clamped_on_pcm_write() {
        let file = NamedTempFile::new().unwrap();
        let spec = WavSpec::default().with_bits(16);
        write_wav(file.path(), &[1.5, -1.5], spec).unwrap();
        let (loaded, _) = read_wav(file.path()).unwrap();
        assert!(loaded[0] < 1.0 && loaded[0] > 0.999);
        assert_eq!(loaded[1], -1.0);
    }

    #[test]
    fn unsupported_depth_is_rejected() {
        let file = NamedTempFile::new().unwrap();
        let err = write_wav(file.path(), &[0.0], WavSpec::default().with_bits(8)).unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat(_)));
    }

    #[test]
    fn stereo_helpers() {
        let stereo = StereoSamples::new(vec![1.0, 2.0, 9.0], vec![3.0, 4.0]);
        assert_eq!(stereo.len(), 2);
        assert_eq!(stereo.to_mono(), vec![2.0, 3.0]);
        assert!(StereoSamples::default().is_empty());
    }

    #[test]
    fn stereo_file_mixes_down_for_mono_read() {
        let stereo = StereoSamples::new(vec![0.5, -0.5], vec![0.25, 0.25]);
        let file = NamedTempFile::new().unwrap();
        write_wav_stereo(file.path(), &stereo, WavSpec::default()).unwrap();

        let (mono, spec) = read_wav(file.path()).unwrap();
        assert_eq!(spec.channels, 2);
        assert_eq!(mono, vec![0.375, -0.125]);

        let (back, _) = read_wav_stereo(file.path()).unwrap();
        assert_eq!(back, stereo);
    }
}
