//! Engine configuration and builder.

use std::time::Duration;

use cardtable_protocol::{JsonCodec, PlayerId};
use cardtable_state::{DuplicateJoinPolicy, Store, StoreConfig};
use cardtable_transport::{
    ConnectionConfig, ConnectionManager, Connector, WebSocketConnector,
};
use serde::{Deserialize, Serialize};

use crate::Engine;

// ---------------------------------------------------------------------------
// EngineConfig
// ---------------------------------------------------------------------------

/// Everything an [`Engine`] needs besides its connector.
///
/// Serializable so a client can keep it in a settings file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Where and how to connect.
    #[serde(default)]
    pub connection: ConnectionConfig,

    /// How server events are folded into state.
    #[serde(default)]
    pub store: StoreConfig,

    /// The player this client plays as, when already known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_player: Option<PlayerId>,
}

// ---------------------------------------------------------------------------
// EngineBuilder
// ---------------------------------------------------------------------------

/// Builder for an [`Engine`].
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use cardtable::prelude::*;
///
/// let engine = Engine::<cardtable::transport::WebSocketConnector>::builder()
///     .endpoint("ws", "cards.example.com", 8000)
///     .connect_timeout(Duration::from_secs(5))
///     .duplicate_joins(DuplicateJoinPolicy::Upsert)
///     .build_websocket();
/// assert_eq!(engine.config().url, "ws://cards.example.com:8000/ws");
/// ```
#[derive(Debug, Clone, Default)]
pub struct EngineBuilder {
    config: EngineConfig,
}

impl EngineBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from an existing configuration.
    pub fn from_config(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Sets the relay URL.
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.config.connection.url = url.into();
        self
    }

    /// Sets the relay URL from its parts: `<scheme>://<host>:<port>/ws`.
    pub fn endpoint(mut self, scheme: &str, host: &str, port: u16) -> Self {
        self.config.connection.url =
            ConnectionConfig::endpoint_url(scheme, host, port);
        self
    }

    /// Sets how long opening the channel may take.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connection.connect_timeout = timeout;
        self
    }

    /// Sets the player this client plays as.
    pub fn local_player(mut self, player: impl Into<PlayerId>) -> Self {
        self.config.local_player = Some(player.into());
        self
    }

    /// Sets how repeated `player_joined` events are handled.
    pub fn duplicate_joins(mut self, policy: DuplicateJoinPolicy) -> Self {
        self.config.store.duplicate_joins = policy;
        self
    }

    /// Builds an engine that opens channels with `connector`.
    ///
    /// The engine starts disconnected; call
    /// [`Engine::connect`](crate::Engine::connect) to open the channel.
    pub fn build<C: Connector>(self, connector: C) -> Engine<C> {
        let EngineConfig {
            connection,
            store,
            local_player,
        } = self.config;

        let mut store = Store::with_config(store);
        store.set_local_player(local_player);

        Engine::from_parts(
            ConnectionManager::new(connector, connection),
            JsonCodec,
            store,
        )
    }

    /// Builds an engine that talks WebSocket.
    pub fn build_websocket(self) -> Engine<WebSocketConnector> {
        self.build(WebSocketConnector)
    }
}
