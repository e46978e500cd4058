//! Vocalis Core - DSP primitives for the lookahead AGC
//!
//! This crate provides the building blocks of the vocalis signal path, designed
//! for real-time processing with zero allocation after construction.
//!
//! # Core Abstractions
//!
//! ## Filters
//!
//! - [`RcCoefficients`] - One-pole RC coefficient set derived from a cutoff
//! - [`RcState`] - Running accumulators; resonant highpass, detail shelves,
//!   phase rotator and de-esser band splitter topologies
//!
//! ## Delay
//!
//! - [`LookaheadDelay`] - Circular buffer with a constant write/read cursor offset
//!
//! ## Level Detection & Smoothing
//!
//! - [`RoundRobinPeak`] / [`ResetSchedule`] - Four-slot staggered peak tracker
//! - [`LinearRamp`] - Bounded-rate approach to a target
//!
//! ## Utilities
//!
//! - Math functions: [`db_to_linear`], [`db6_to_linear`], [`attenuation_db`], etc.
//!
//! # no_std Support
//!
//! This crate is `no_std` compatible. Disable the default `std` feature:
//!
//! ```toml
//! [dependencies]
//! vocalis-core = { version = "0.1", default-features = false }
//! ```
//!
//! # Design Principles
//!
//! - **Real-time safe**: No allocations in processing paths
//! - **No dependencies on std**: Pure `no_std` with `libm` for math
//! - **Value types**: Coefficients are immutable between parameter updates

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod delay;
pub mod math;
pub mod ramp;
pub mod rc_filter;
pub mod round_robin;

// Re-export main types at crate root
pub use delay::LookaheadDelay;
pub use math::{
    attenuation_db, db_to_linear, db6_to_linear, flush_denormal, linear_to_db, ms_to_samples,
};
pub use ramp::LinearRamp;
pub use rc_filter::{MIN_CUTOFF_HZ, RcCoefficients, RcState};
pub use round_robin::{ResetSchedule, RoundRobinPeak};
