//! Error types for the protocol layer.
//!
//! Each crate in cardtable defines its own error enum. A `ProtocolError`
//! always means "this frame (or command) could not be turned into a typed
//! message", never "the network broke".

/// Errors that can occur while encoding commands or decoding events.
///
/// The decode variants are ordered by how far a frame got before it was
/// rejected: not text, not JSON, no `type`, unknown `type`, wrong shape.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization of an outgoing command failed.
    #[error("encode failed: {0}")]
    Encode(#[source] serde_json::Error),

    /// The frame is not valid UTF-8 text.
    #[error("frame is not valid UTF-8 text")]
    NotText(#[source] std::str::Utf8Error),

    /// The frame is not well-formed JSON.
    #[error("decode failed: {0}")]
    Decode(#[source] serde_json::Error),

    /// The frame is JSON but has no string `type` field (or is not an
    /// object at all).
    #[error("message has no \"type\" tag")]
    MissingType,

    /// The `type` tag is not in the event catalogue.
    #[error("unknown message type {0:?}")]
    UnknownType(String),

    /// The `type` tag is known but the fields don't match its shape.
    #[error("invalid {kind} payload: {source}")]
    InvalidPayload {
        kind: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ProtocolError {
    /// Returns the message `type` the error relates to, when one was read.
    pub fn kind(&self) -> Option<&str> {
        match self {
            Self::UnknownType(kind) => Some(kind),
            Self::InvalidPayload { kind, .. } => Some(kind),
            _ => None,
        }
    }
}
