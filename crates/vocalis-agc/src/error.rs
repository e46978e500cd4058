//! Error types for channel construction and stereo linking.

use std::collections::TryReserveError;
use thiserror::Error;

use crate::ChannelId;

/// Errors raised when creating a channel.
#[derive(Debug, Error)]
pub enum AgcError {
    /// Sample rate or lookahead cannot produce a usable channel.
    #[error("invalid channel configuration: {reason}")]
    InvalidConfig {
        /// Description of the rejected value.
        reason: String,
    },

    /// The delay line could not be allocated.
    #[error("failed to allocate {len}-sample lookahead buffer: {source}")]
    Allocation {
        /// Requested buffer length in samples.
        len: usize,
        /// Underlying allocator error.
        #[source]
        source: TryReserveError,
    },
}

impl AgcError {
    /// Create an invalid configuration error.
    pub fn invalid(reason: impl Into<String>) -> Self {
        AgcError::InvalidConfig {
            reason: reason.into(),
        }
    }
}

/// Errors raised by [`ChannelRack`](crate::ChannelRack) link operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LinkError {
    /// The id does not refer to a live channel.
    #[error("unknown channel {0:?}")]
    UnknownChannel(ChannelId),

    /// A channel cannot be its own partner.
    #[error("channel {0:?} cannot partner with itself")]
    SelfPartner(ChannelId),

    /// Partnered mode requested on a channel without a partner.
    #[error("channel {0:?} has no partner")]
    NoPartner(ChannelId),

    /// Both channels of a pair would defer to each other, leaving no host.
    #[error("channel {channel:?} cannot defer to {partner:?}, which already defers to it")]
    ConflictingHosts {
        /// Channel that asked to defer.
        channel: ChannelId,
        /// Its partner, already deferring.
        partner: ChannelId,
    },
}
