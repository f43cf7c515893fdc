//! Wire protocol for cardtable.
//!
//! This crate defines the "language" the client and the relay server
//! speak:
//!
//! - **Types** ([`Card`], [`Player`], [`Phase`], ...): the data model
//!   that travels on the wire.
//! - **Messages** ([`ClientCommand`], [`ServerEvent`]): the closed
//!   catalogue of commands and events, one variant per message type.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how messages become
//!   frames and frames become messages.
//! - **Errors** ([`ProtocolError`]): why a frame was rejected.
//!
//! # Architecture
//!
//! The protocol layer sits between transport (raw frames) and state (the
//! mirrored game). It doesn't know about connections or subscribers.
//!
//! ```text
//! Transport (bytes) → Protocol (ServerEvent) → State (GameState)
//! ```

mod codec;
mod error;
mod message;
mod types;

pub use codec::{Codec, JsonCodec};
pub use error::ProtocolError;
pub use message::{ClientCommand, ServerEvent, Snapshot};
pub use types::{Card, CardId, GameId, Phase, Player, PlayerId, Position, Suit};
