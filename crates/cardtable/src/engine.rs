//! The engine: one connection, one codec, one store.
//!
//! [`Engine`] ties the layers together:
//!
//! ```text
//! ConnectionManager ──Frame──→ JsonCodec ──ServerEvent──→ Store ──→ subscribers
//! ```
//!
//! The engine has a single owner. Nothing happens in the background
//! except socket I/O: a frame only reaches the store when the owner calls
//! [`step()`](Engine::step) (or [`run()`](Engine::run)), so every state
//! change happens on the owner's task, one event at a time, in arrival
//! order.

use cardtable_protocol::{Card, Codec, JsonCodec, PlayerId, ProtocolError};
use cardtable_state::{GameState, Store, StoreView, SubscriptionId};
use cardtable_transport::{
    ConnectionConfig, ConnectionEvent, ConnectionManager, ConnectionState,
    Connector, TransportError, WebSocketConnector,
};

use crate::{CardtableError, EngineBuilder};

/// What one call to [`Engine::step`] did.
#[derive(Debug)]
pub enum Step {
    /// A server event of this `type` was applied to the store.
    Applied(&'static str),

    /// A frame was discarded because it could not be decoded. State is
    /// unchanged.
    Rejected(ProtocolError),

    /// The connection state changed.
    Connection {
        from: ConnectionState,
        to: ConnectionState,
    },

    /// The transport failed. The next step reports the move to
    /// `Disconnected`.
    TransportFailed(TransportError),
}

/// Client-side synchronization engine.
///
/// Created with [`Engine::builder`] or [`Engine::websocket`]. The command
/// methods (`join_game`, `play_card`, ...) live in the dispatcher module.
pub struct Engine<C: Connector> {
    pub(crate) connection: ConnectionManager<C>,
    pub(crate) codec: JsonCodec,
    pub(crate) store: Store,
}

impl Engine<WebSocketConnector> {
    /// Creates a WebSocket engine with default store settings.
    pub fn websocket(config: ConnectionConfig) -> Self {
        EngineBuilder::new()
            .url(config.url)
            .connect_timeout(config.connect_timeout)
            .build_websocket()
    }
}

impl<C: Connector> Engine<C> {
    /// Creates a new builder.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    pub(crate) fn from_parts(
        connection: ConnectionManager<C>,
        codec: JsonCodec,
        store: Store,
    ) -> Self {
        Self {
            connection,
            codec,
            store,
        }
    }

    // -----------------------------------------------------------------------
    // Connection lifecycle
    // -----------------------------------------------------------------------

    /// Starts opening the channel. A no-op unless disconnected.
    pub fn connect(&mut self) {
        self.connection.connect();
    }

    /// Closes the channel. Frames still in flight are discarded.
    pub fn disconnect(&mut self) {
        self.connection.disconnect();
    }

    /// The current connection state.
    pub fn connection_state(&self) -> ConnectionState {
        self.connection.state()
    }

    /// The connection settings.
    pub fn config(&self) -> &ConnectionConfig {
        self.connection.config()
    }

    // -----------------------------------------------------------------------
    // Event processing
    // -----------------------------------------------------------------------

    /// Waits for one connection event and processes it to completion.
    ///
    /// Cancel-safe: dropping the future before it resolves loses nothing.
    pub async fn step(&mut self) -> Step {
        match self.connection.next_event().await {
            ConnectionEvent::Frame(data) => self.handle_frame(&data),
            ConnectionEvent::StateChanged { from, to } => {
                Step::Connection { from, to }
            }
            ConnectionEvent::Error(error) => Step::TransportFailed(error),
        }
    }

    /// Steps until the channel is closed.
    ///
    /// Returns the number of steps taken, or the transport error that
    /// brought the channel down. Returns `Ok(0)` at once if the engine
    /// is not connected or connecting.
    pub async fn run(&mut self) -> Result<usize, CardtableError> {
        if self.connection.state() == ConnectionState::Disconnected {
            return Ok(0);
        }

        let mut steps = 0;
        let mut failure = None;
        loop {
            let step = self.step().await;
            steps += 1;
            match step {
                Step::TransportFailed(error) => failure = Some(error),
                Step::Connection {
                    to: ConnectionState::Disconnected,
                    ..
                } => break,
                _ => {}
            }
        }

        tracing::info!(steps, failed = failure.is_some(), "engine stopped");
        match failure {
            Some(error) => Err(error.into()),
            None => Ok(steps),
        }
    }

    fn handle_frame(&mut self, data: &[u8]) -> Step {
        match self.codec.decode_event(data) {
            Ok(event) => {
                let kind = event.kind();
                tracing::debug!(kind, "applying server event");
                self.store.apply(&event);
                Step::Applied(kind)
            }
            Err(error) => {
                tracing::warn!(
                    %error,
                    kind = error.kind(),
                    bytes = data.len(),
                    "discarding frame"
                );
                Step::Rejected(error)
            }
        }
    }

    // -----------------------------------------------------------------------
    // State access
    // -----------------------------------------------------------------------

    /// The confirmed game state.
    pub fn state(&self) -> &GameState {
        self.store.state()
    }

    /// The locally selected card, if any.
    pub fn selected_card(&self) -> Option<&Card> {
        self.store.selected()
    }

    /// The state and selection together, as subscribers see them.
    pub fn view(&self) -> StoreView<'_> {
        self.store.view()
    }

    /// The player this client plays as, if known.
    pub fn local_player(&self) -> Option<&PlayerId> {
        self.store.local_player()
    }

    /// Sets the player this client plays as.
    pub fn set_local_player(&mut self, player: Option<PlayerId>) {
        self.store.set_local_player(player);
    }

    /// Registers a callback invoked after every state or selection
    /// change.
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&StoreView<'_>) + Send + 'static,
    {
        self.store.subscribe(callback)
    }

    /// Removes a callback. Returns `false` if it was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.store.unsubscribe(id)
    }

    /// Clears the mirrored state and selection. The connection is left
    /// alone.
    pub fn reset(&mut self) {
        self.store.reset();
    }
}

impl<C: Connector> std::fmt::Debug for Engine<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("connection", &self.connection.state())
            .field("store", &self.store)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use cardtable_protocol::Phase;
    use cardtable_transport::memory::{MemoryConnector, MemoryPeer};

    async fn step(engine: &mut Engine<MemoryConnector>) -> Step {
        tokio::time::timeout(Duration::from_secs(2), engine.step())
            .await
            .expect("step should complete")
    }

    async fn connected() -> (Engine<MemoryConnector>, MemoryPeer) {
        let (connector, mut peers) = MemoryConnector::new();
        let mut engine = Engine::<MemoryConnector>::builder().build(connector);
        engine.connect();

        assert!(matches!(
            step(&mut engine).await,
            Step::Connection { to: ConnectionState::Connecting, .. }
        ));
        assert!(matches!(
            step(&mut engine).await,
            Step::Connection { to: ConnectionState::Connected, .. }
        ));
        let peer = peers.recv().await.expect("peer should be handed out");
        (engine, peer)
    }

    #[tokio::test]
    async fn test_frame_is_applied() {
        let (mut engine, peer) = connected().await;

        peer.send_text(r#"{"type":"game_ended"}"#);

        assert!(matches!(step(&mut engine).await, Step::Applied("game_ended")));
        assert_eq!(engine.state().phase, Phase::Finished);
        assert_eq!(engine.view().state, engine.state());
    }

    #[tokio::test]
    async fn test_malformed_frame_is_rejected_without_change() {
        let (mut engine, peer) = connected().await;
        let before = engine.state().clone();

        peer.send_text("{not json");

        assert!(matches!(
            step(&mut engine).await,
            Step::Rejected(ProtocolError::Decode(_))
        ));
        assert_eq!(engine.state(), &before);
    }

    #[tokio::test]
    async fn test_unknown_type_is_rejected() {
        let (mut engine, peer) = connected().await;

        peer.send_text(r#"{"type":"shuffle"}"#);

        match step(&mut engine).await {
            Step::Rejected(ProtocolError::UnknownType(kind)) => {
                assert_eq!(kind, "shuffle");
            }
            other => panic!("expected UnknownType rejection, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_run_returns_ok_on_clean_close() {
        let (mut engine, peer) = connected().await;
        peer.send_text(r#"{"type":"game_ended"}"#);
        drop(peer);

        let steps = tokio::time::timeout(Duration::from_secs(2), engine.run())
            .await
            .expect("run should finish")
            .expect("clean close is not an error");

        // The frame, then the move to Disconnected.
        assert_eq!(steps, 2);
        assert_eq!(engine.connection_state(), ConnectionState::Disconnected);
        assert_eq!(engine.state().phase, Phase::Finished);
    }

    #[tokio::test]
    async fn test_run_reports_transport_failure() {
        let (mut engine, peer) = connected().await;
        peer.fail("reset by peer");

        let result = tokio::time::timeout(Duration::from_secs(2), engine.run())
            .await
            .expect("run should finish");

        assert!(matches!(result, Err(CardtableError::Transport(_))));
    }

    #[tokio::test]
    async fn test_run_when_disconnected_returns_immediately() {
        let (connector, _peers) = MemoryConnector::new();
        let mut engine = Engine::<MemoryConnector>::builder().build(connector);
        assert_eq!(engine.run().await.unwrap(), 0);
    }
}
