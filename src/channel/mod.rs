//! The query capability the statistics core depends on.
//!
//! The core never opens, authenticates or closes a channel itself. It sends one text command
//! through a [`Querier`] and receives the raw reply text, or a [`TransportError`] that folds
//! every failure mode (missing socket, unreachable daemon, timeout, malformed or oversized
//! reply, daemon-side error) into a single kind.
//!
//! [`UnixSocketQuerier`] is the implementation used against a live daemon control socket.

use std::sync::Arc;

mod error;
mod socket;

pub use error::TransportError;
pub use socket::{DEFAULT_MAX_REPLY_BYTES, UnixSocketQuerier};

/// Sends a single command over an already-established channel and returns the raw reply.
///
/// One call is one bounded round trip. Implementations must not interleave two commands on
/// the same underlying connection.
pub trait Querier: Send + Sync {
    /// Sends `command` over the channel identified by `channel`.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] for every channel-level failure.
    fn query(&self, channel: &str, command: &str) -> Result<String, TransportError>;
}

impl<Q: Querier + ?Sized> Querier for &Q {
    fn query(&self, channel: &str, command: &str) -> Result<String, TransportError> {
        (**self).query(channel, command)
    }
}

impl<Q: Querier + ?Sized> Querier for Arc<Q> {
    fn query(&self, channel: &str, command: &str) -> Result<String, TransportError> {
        (**self).query(channel, command)
    }
}
