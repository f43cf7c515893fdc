//! Client transport layer for cardtable.
//!
//! Provides the [`Connector`] and [`Connection`] traits that abstract over
//! how a channel to the relay is opened, plus the [`ConnectionManager`]
//! that owns the lifecycle of one such channel.
//!
//! # Feature Flags
//!
//! - `websocket` (default): WebSocket client transport via `tokio-tungstenite`
//!
//! An in-process [`memory`] transport is always available; tests and
//! demos use it to play the server's role without a socket.

use std::fmt;
use std::future::Future;

mod config;
mod error;
mod manager;
pub mod memory;
#[cfg(feature = "websocket")]
mod websocket;

pub use config::ConnectionConfig;
pub use error::TransportError;
pub use manager::ConnectionManager;
#[cfg(feature = "websocket")]
pub use websocket::{WebSocketConnection, WebSocketConnector};

// ---------------------------------------------------------------------------
// Connection state & events
// ---------------------------------------------------------------------------

/// Lifecycle state of the channel to the relay.
///
/// ```text
/// Disconnected ──connect()──→ Connecting ──opened──→ Connected
///      ↑                          │                      │
///      └────── failure ───────────┘                      │
///      └────── disconnect() / peer close / error ────────┘
/// ```
///
/// Commands may only be sent while `Connected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => write!(f, "disconnected"),
            Self::Connecting => write!(f, "connecting"),
            Self::Connected => write!(f, "connected"),
        }
    }
}

/// Something observable happened on the channel.
///
/// Delivered one at a time, in order, by
/// [`ConnectionManager::next_event`].
#[derive(Debug)]
pub enum ConnectionEvent {
    /// The connection state changed.
    StateChanged {
        from: ConnectionState,
        to: ConnectionState,
    },

    /// A frame arrived from the relay.
    Frame(Vec<u8>),

    /// The transport failed. Always followed by a `StateChanged` to
    /// `Disconnected`.
    Error(TransportError),
}

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// Opens connections to a relay endpoint.
///
/// The returned futures are `Send` because the manager runs them on a
/// spawned Tokio task.
pub trait Connector: Send + Sync + 'static {
    /// The connection type produced by this connector.
    type Connection: Connection;

    /// Opens a new connection to `url`.
    fn connect(
        &self,
        url: &str,
    ) -> impl Future<Output = Result<Self::Connection, TransportError>> + Send;
}

/// A single open channel that can send and receive frames.
pub trait Connection: Send + 'static {
    /// Sends one frame to the relay.
    fn send(
        &mut self,
        data: Vec<u8>,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Receives the next frame from the relay.
    ///
    /// Returns `Ok(None)` when the connection is cleanly closed. Must be
    /// cancel-safe: the manager races it against outbound sends.
    fn recv(
        &mut self,
    ) -> impl Future<Output = Result<Option<Vec<u8>>, TransportError>> + Send;

    /// Closes the connection.
    fn close(&mut self) -> impl Future<Output = Result<(), TransportError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_state_default_is_disconnected() {
        assert_eq!(ConnectionState::default(), ConnectionState::Disconnected);
    }

    #[test]
    fn test_connection_state_display() {
        assert_eq!(ConnectionState::Connecting.to_string(), "connecting");
        assert_eq!(ConnectionState::Connected.to_string(), "connected");
        assert_eq!(ConnectionState::Disconnected.to_string(), "disconnected");
    }
}
