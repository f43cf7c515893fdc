//! Unified error type for cardtable.

use cardtable_protocol::ProtocolError;
use cardtable_transport::TransportError;

/// Top-level error that wraps the sub-crate errors.
///
/// The `#[from]` attributes let `?` convert transport and protocol
/// errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum CardtableError {
    /// The channel to the relay failed (connect, send, receive).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A frame could not be encoded or decoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}
