//! Lookahead delay line.
//!
//! A fixed-capacity circular buffer holding filtered audio while the control
//! path analyzes it ahead of output. Two monotonically increasing cursors index
//! it modulo its length:
//!
//! ```text
//! write = L + n        (n = number of stores so far)
//! read  = n
//! ```
//!
//! `write - read == L` holds for the lifetime of the line. [`LookaheadDelay::store`]
//! writes at `write mod L` and advances both cursors; [`LookaheadDelay::load`] reads
//! at `read mod L`. A sample stored by call `n` is therefore returned by the load
//! that follows store `n + L - 1`, after `L` control updates have seen it.
//!
//! Before that warm-up the buffer still holds its zero initialisation, so early
//! loads produce silence rather than garbage.

#[cfg(not(feature = "std"))]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std as alloc;

use alloc::collections::TryReserveError;
use alloc::vec::Vec;

/// Circular lookahead buffer with a constant write/read cursor offset.
///
/// # Memory
///
/// The buffer is allocated once by [`LookaheadDelay::try_new`] and never
/// reallocated. No allocations occur during processing.
///
/// # Example
///
/// ```rust
/// use vocalis_core::LookaheadDelay;
///
/// let mut delay = LookaheadDelay::try_new(4).unwrap();
/// let mut out = Vec::new();
/// for x in [1.0, 2.0, 3.0, 4.0, 5.0, 6.0] {
///     delay.store(x);
///     out.push(delay.load());
/// }
/// // three samples of silence, then the input delayed by L - 1
/// assert_eq!(out, [0.0, 0.0, 0.0, 1.0, 2.0, 3.0]);
/// assert_eq!(delay.write_cursor() - delay.read_cursor(), 4);
/// ```
#[derive(Debug, Clone)]
pub struct LookaheadDelay {
    buffer: Vec<f32>,
    write: u64,
    read: u64,
}

impl LookaheadDelay {
    /// Allocate a zeroed delay line of `len` samples (at least one).
    ///
    /// Fails only if the allocator cannot reserve the buffer.
    pub fn try_new(len: usize) -> Result<Self, TryReserveError> {
        let len = len.max(1);
        let mut buffer = Vec::new();
        buffer.try_reserve_exact(len)?;
        buffer.resize(len, 0.0);

        #[cfg(feature = "tracing")]
        tracing::trace!(len, "lookahead delay allocated");

        Ok(Self {
            buffer,
            write: len as u64,
            read: 0,
        })
    }

    /// Buffer length `L` in samples.
    #[inline]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Always false; the line holds at least one sample.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Store one sample and advance both cursors.
    #[inline]
    pub fn store(&mut self, sample: f32) {
        let len = self.buffer.len() as u64;
        let idx = (self.write % len) as usize;
        self.buffer[idx] = sample;
        self.write += 1;
        self.read += 1;
    }

    /// Sample at the read cursor, `L - 1` stores behind the newest.
    #[inline]
    pub fn load(&self) -> f32 {
        let len = self.buffer.len() as u64;
        self.buffer[(self.read % len) as usize]
    }

    /// Total write position (starts at `L`).
    #[inline]
    pub fn write_cursor(&self) -> u64 {
        self.write
    }

    /// Total read position (starts at 0).
    #[inline]
    pub fn read_cursor(&self) -> u64 {
        self.read
    }

    /// Number of samples stored since construction.
    #[inline]
    pub fn stored(&self) -> u64 {
        self.read
    }

    /// True once every slot has been written at least once.
    #[inline]
    pub fn is_warm(&self) -> bool {
        self.read >= self.buffer.len() as u64
    }

    /// Zero the buffer and rewind both cursors.
    pub fn clear(&mut self) {
        self.buffer.fill(0.0);
        self.write = self.buffer.len() as u64;
        self.read = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_length_rounds_up() {
        let delay = LookaheadDelay::try_new(0).unwrap();
        assert_eq!(delay.len(), 1);
        assert!(!delay.is_empty());
    }

    #[test]
    fn delay_is_len_minus_one() {
        let len = 8;
        let mut delay = LookaheadDelay::try_new(len).unwrap();
        let mut outputs = Vec::new();
        for n in 0..32 {
            delay.store(n as f32 + 1.0);
            outputs.push(delay.load());
        }
        for (n, &y) in outputs.iter().enumerate() {
            if n < len - 1 {
                assert_eq!(y, 0.0, "output {n} should be silent during warm-up");
            } else {
                assert_eq!(y, (n - (len - 1)) as f32 + 1.0);
            }
        }
    }

    #[test]
    fn single_sample_line_is_pass_through() {
        let mut delay = LookaheadDelay::try_new(1).unwrap();
        for x in [0.5, -0.25, 1.0] {
            delay.store(x);
            assert_eq!(delay.load(), x);
        }
    }

    #[test]
    fn cursor_offset_is_constant() {
        let mut delay = LookaheadDelay::try_new(5).unwrap();
        for _ in 0..100 {
            assert_eq!(delay.write_cursor() - delay.read_cursor(), 5);
            delay.store(1.0);
        }
        assert_eq!(delay.stored(), 100);
    }

    #[test]
    fn warm_after_len_stores() {
        let mut delay = LookaheadDelay::try_new(3).unwrap();
        for _ in 0..2 {
            delay.store(0.0);
            assert!(!delay.is_warm());
        }
        delay.store(0.0);
        assert!(delay.is_warm());
    }

    #[test]
    fn clear_rewinds() {
        let mut delay = LookaheadDelay::try_new(4).unwrap();
        for _ in 0..10 {
            delay.store(1.0);
        }
        delay.clear();
        assert_eq!(delay.read_cursor(), 0);
        assert_eq!(delay.write_cursor(), 4);
        assert_eq!(delay.load(), 0.0);
    }
}
