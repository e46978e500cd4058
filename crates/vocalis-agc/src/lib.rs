//! Vocalis AGC - fast-lookahead microphone gain control
//!
//! A voice-oriented automatic gain control that sees every sample one lookahead
//! period before it is emitted, so the gain can be fully adapted by the time a
//! peak reaches the output. Around the core level control sit a noise gate, a
//! de-esser, a ducking factor for background music and a voicing filter bank.
//!
//! # Signal Path
//!
//! ```text
//! input ─► subsonic HPF ─► HF/LF detail ─► phase rotator ─┬─► delay (L) ─► × gain ─► output
//!                                                         │                 ▲
//!                                                         └─► envelope ─► control
//!                                                             de-esser     gate, ducker,
//!                                                                          meters
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use vocalis_agc::Channel;
//!
//! let mut ch = Channel::new(48000, 0.01).unwrap();
//! ch.set_parameter("limit", "-6");
//! ch.set_parameter("ngthresh", "-30");
//!
//! let input = [0.25f32; 1024];
//! let mut output = [0.0f32; 1024];
//! for (x, y) in input.iter().zip(output.iter_mut()) {
//!     ch.process_stage1(*x);
//!     ch.process_stage2(false);
//!     *y = ch.process_stage3();
//! }
//! ```
//!
//! Stereo pairs are built with a [`ChannelRack`], which lets one channel run the
//! control computation for both.
//!
//! # Parameters
//!
//! Every setting has a textual key (see [`PARAMETERS`]) so that hosts, presets
//! and command lines can update it with [`Channel::set_parameter`].

pub mod channel;
pub mod control;
pub mod deesser;
pub mod ducker;
pub mod error;
pub mod filter_bank;
pub mod gate;
pub mod meter;
pub mod params;
pub mod rack;

pub use channel::Channel;
pub use control::GainControl;
pub use deesser::{DeEsser, DeEsserState};
pub use ducker::Ducker;
pub use error::{AgcError, LinkError};
pub use filter_bank::{FilterBank, FilterSettings};
pub use gate::{GateState, NoiseGate};
pub use meter::{MeterLevels, Meters};
pub use params::{PARAMETERS, ParamDescriptor, ParamKey, ParamUnit, UnknownKey};
pub use rack::{Authority, ChannelId, ChannelRack};
