//! Audio file I/O for the vocalis AGC.
//!
//! This crate provides:
//!
//! - **WAV file I/O**: [`read_wav`], [`read_wav_stereo`], [`write_wav`] and
//!   [`write_wav_stereo`] built on `hound`
//! - **Offline processing**: [`AgcEngine`] drives one or two AGC channels over
//!   whole buffers, playing the role of an audio callback
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use vocalis_io::{AgcEngine, EngineConfig, read_wav, write_wav};
//!
//! let (samples, spec) = read_wav("voice.wav")?;
//! let mut engine = AgcEngine::new(EngineConfig::mono(spec.sample_rate))?;
//! engine.set_parameter("limit", "-6");
//! let processed = engine.process_mono(&samples);
//! write_wav("voice_agc.wav", &processed, spec)?;
//! # Ok::<(), vocalis_io::Error>(())
//! ```

mod engine;
mod wav;

pub use engine::{AgcEngine, ChannelStats, EngineConfig};
pub use wav::{
    StereoSamples, WavFormat, WavInfo, WavSpec, read_wav, read_wav_info, read_wav_stereo,
    write_wav, write_wav_stereo,
};

/// Error types for audio I/O operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// WAV file read/write error.
    #[error("WAV file error: {0}")]
    Wav(#[from] hound::Error),

    /// The requested sample format is not supported.
    #[error("Unsupported sample format: {0}")]
    UnsupportedFormat(String),

    /// The AGC channels could not be built.
    #[error("AGC setup failed: {0}")]
    Agc(#[from] vocalis_agc::AgcError),

    /// The stereo link could not be established.
    #[error("stereo link failed: {0}")]
    Link(#[from] vocalis_agc::LinkError),

    /// Standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type for audio I/O operations.
pub type Result<T> = std::result::Result<T, Error>;
