//! Codec trait and the JSON implementation.
//!
//! A "codec" (coder/decoder) converts between the typed catalogue in
//! [`crate::message`] and raw frame bytes. The engine only talks to the
//! [`Codec`] trait, so the rest of the stack never sees JSON.
//!
//! Decoding is strict and staged. A frame is handed to the reducer only
//! if it survives every stage:
//!
//! ```text
//! bytes ─→ UTF-8 text ─→ JSON value ─→ has "type" ─→ known "type" ─→ typed event
//!            NotText       Decode       MissingType   UnknownType    InvalidPayload
//! ```

use crate::{ClientCommand, ProtocolError, ServerEvent};

/// Turns commands into frames and frames into events.
///
/// `Send + Sync + 'static` so a codec can live inside an engine that is
/// moved onto a Tokio task.
pub trait Codec: Send + Sync + 'static {
    /// Serializes an outgoing command into a frame.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Encode`] if serialization fails.
    fn encode_command(
        &self,
        command: &ClientCommand,
    ) -> Result<Vec<u8>, ProtocolError>;

    /// Parses and validates an incoming frame.
    ///
    /// # Errors
    /// Returns the [`ProtocolError`] variant naming the first stage the
    /// frame failed. No partially typed value is ever produced.
    fn decode_event(&self, data: &[u8]) -> Result<ServerEvent, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that speaks the relay server's JSON text protocol.
///
/// ## Example
///
/// ```rust
/// use cardtable_protocol::{Codec, JsonCodec, ServerEvent};
///
/// let codec = JsonCodec;
/// let event = codec.decode_event(br#"{"type":"game_ended"}"#).unwrap();
/// assert_eq!(event, ServerEvent::GameEnded);
///
/// assert!(codec.decode_event(b"{not json").is_err());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode_command(
        &self,
        command: &ClientCommand,
    ) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(command).map_err(ProtocolError::Encode)
    }

    fn decode_event(&self, data: &[u8]) -> Result<ServerEvent, ProtocolError> {
        let text = std::str::from_utf8(data).map_err(ProtocolError::NotText)?;

        // Parse into an untyped value first so an unknown tag can be told
        // apart from a known tag with a bad payload.
        let value: serde_json::Value =
            serde_json::from_str(text).map_err(ProtocolError::Decode)?;

        let kind = value
            .get("type")
            .and_then(serde_json::Value::as_str)
            .ok_or(ProtocolError::MissingType)?;

        if !ServerEvent::is_known_kind(kind) {
            return Err(ProtocolError::UnknownType(kind.to_string()));
        }
        let kind = kind.to_string();

        serde_json::from_value(value)
            .map_err(|source| ProtocolError::InvalidPayload { kind, source })
    }
}

// =========================================================================
// Tests
// =========================================================================
