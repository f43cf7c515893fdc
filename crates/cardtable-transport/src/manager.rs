//! The connection manager: owns the lifecycle of one channel to the relay.
//!
//! # How it works
//!
//! Each `connect()` starts a new *generation*: a fresh signal channel and
//! a spawned I/O task that opens the connection and then shuttles frames
//! in both directions.
//!
//! ```text
//!                  signals (per generation)
//!   I/O task  ───────────────────────────────→  ConnectionManager::next_event()
//!      ↑                                                   │
//!      └──────────── outbound frames ──── send() ←─────────┘ (owner)
//! ```
//!
//! The manager itself is plain data with no locks. It is owned by one
//! task, which calls `connect`/`disconnect`/`send` and awaits
//! `next_event`. All state transitions happen on that task.
//!
//! `disconnect()` drops the generation's signal receiver. Whatever the old
//! I/O task still produces has nowhere to go, so no frame from a closed
//! channel can ever come out of `next_event`. The task is never aborted:
//! it notices the receiver is gone, closes whatever it opened, and ends.

use std::collections::VecDeque;
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::{
    Connection, ConnectionConfig, ConnectionEvent, ConnectionState, Connector,
    TransportError,
};

/// What the I/O task reports back to the manager.
#[derive(Debug)]
enum Signal {
    /// The channel is open; here is where to push outbound frames.
    Opened(mpsc::UnboundedSender<Vec<u8>>),
    /// Opening failed (or timed out).
    OpenFailed(TransportError),
    /// A frame arrived.
    Frame(Vec<u8>),
    /// The relay closed the channel cleanly.
    Closed,
    /// The channel broke.
    Failed(TransportError),
}

/// Owns one persistent channel to the relay.
///
/// ## Guarantees
///
/// - `connect()` is idempotent while connecting or connected.
/// - `send()` never blocks and never queues for later: it either hands
///   the frame to the open channel or drops it.
/// - After `disconnect()` returns, `next_event()` yields nothing from the
///   closed channel.
/// - No reconnection happens unless the caller calls `connect()` again.
pub struct ConnectionManager<C: Connector> {
    connector: Arc<C>,
    config: ConnectionConfig,
    state: ConnectionState,

    /// Incremented by every `connect()`. Only used for diagnostics.
    generation: u64,

    /// Receiver for the current generation's signals. `None` while
    /// disconnected.
    signals: Option<mpsc::UnboundedReceiver<Signal>>,

    /// Where `send()` pushes frames. Only `Some` while connected.
    outbound: Option<mpsc::UnboundedSender<Vec<u8>>>,

    /// Events produced synchronously (state changes, errors) that are
    /// waiting to be returned by `next_event()`.
    pending: VecDeque<ConnectionEvent>,
}

impl<C: Connector> ConnectionManager<C> {
    /// Creates a manager in the `Disconnected` state. Nothing is opened
    /// until [`connect()`](Self::connect) is called.
    pub fn new(connector: C, config: ConnectionConfig) -> Self {
        Self {
            connector: Arc::new(connector),
            config,
            state: ConnectionState::Disconnected,
            generation: 0,
            signals: None,
            outbound: None,
            pending: VecDeque::new(),
        }
    }

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// The configuration this manager connects with.
    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Number of `connect()` calls that actually started a connection.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Starts opening the channel. No-op unless `Disconnected`.
    ///
    /// Returns immediately; the outcome arrives later through
    /// [`next_event()`](Self::next_event). Must be called from within a
    /// Tokio runtime.
    pub fn connect(&mut self) {
        if self.state != ConnectionState::Disconnected {
            tracing::debug!(
                state = %self.state,
                "connect ignored: channel already open or opening"
            );
            return;
        }

        self.generation += 1;
        let (tx, rx) = mpsc::unbounded_channel();
        self.signals = Some(rx);
        tokio::spawn(run_connection(
            Arc::clone(&self.connector),
            self.config.clone(),
            self.generation,
            tx,
        ));

        tracing::info!(
            url = %self.config.url,
            generation = self.generation,
            "connecting"
        );
        self.transition(ConnectionState::Connecting);
    }

    /// Closes the channel. Safe to call in any state.
    ///
    /// Frames that the old channel delivers after this call are
    /// discarded.
    pub fn disconnect(&mut self) {
        // An open channel closes once its outbound queue is gone. A
        // pending open gives up, or closes the channel it just got, once
        // nobody is listening.
        self.signals = None;
        self.outbound = None;

        if self.state == ConnectionState::Disconnected {
            tracing::debug!("disconnect ignored: already disconnected");
            return;
        }

        tracing::info!(generation = self.generation, "disconnecting");
        self.transition(ConnectionState::Disconnected);
    }

    /// Hands a frame to the open channel.
    ///
    /// Returns `true` if the frame was handed over, `false` if it was
    /// dropped because the channel is not `Connected`. Dropped frames are
    /// not retried.
    pub fn send(&self, data: Vec<u8>) -> bool {
        match (&self.state, &self.outbound) {
            (ConnectionState::Connected, Some(outbound)) => {
                let len = data.len();
                if outbound.send(data).is_ok() {
                    tracing::trace!(bytes = len, "frame queued for send");
                    true
                } else {
                    tracing::debug!(
                        bytes = len,
                        "dropping outbound frame: channel is closing"
                    );
                    false
                }
            }
            _ => {
                tracing::debug!(
                    state = %self.state,
                    bytes = data.len(),
                    "dropping outbound frame: not connected"
                );
                false
            }
        }
    }

    /// Waits for the next observable event.
    ///
    /// Events come out in the order they happened. While disconnected
    /// with nothing pending this waits until the next `connect()`, so
    /// callers typically race it against their own inputs in a
    /// `tokio::select!`. Cancel-safe.
    pub async fn next_event(&mut self) -> ConnectionEvent {
        loop {
            if let Some(event) = self.pending.pop_front() {
                return event;
            }

            let Some(signals) = self.signals.as_mut() else {
                std::future::pending::<()>().await;
                continue;
            };
            let signal = signals.recv().await;

            match signal {
                Some(signal) => {
                    if let Some(event) = self.handle_signal(signal) {
                        return event;
                    }
                }
                None => {
                    // The I/O task ended without saying why.
                    tracing::debug!(
                        generation = self.generation,
                        "I/O task ended"
                    );
                    self.teardown();
                    self.transition(ConnectionState::Disconnected);
                }
            }
        }
    }

    fn handle_signal(&mut self, signal: Signal) -> Option<ConnectionEvent> {
        match signal {
            Signal::Opened(outbound) => {
                self.outbound = Some(outbound);
                tracing::info!(
                    url = %self.config.url,
                    generation = self.generation,
                    "connected"
                );
                self.transition(ConnectionState::Connected);
                None
            }
            Signal::Frame(data) => Some(ConnectionEvent::Frame(data)),
            Signal::Closed => {
                tracing::info!(
                    generation = self.generation,
                    "connection closed by relay"
                );
                self.teardown();
                self.transition(ConnectionState::Disconnected);
                None
            }
            Signal::OpenFailed(error) | Signal::Failed(error) => {
                tracing::warn!(
                    generation = self.generation,
                    %error,
                    "transport error"
                );
                self.teardown();
                self.pending.push_back(ConnectionEvent::Error(error));
                self.transition(ConnectionState::Disconnected);
                None
            }
        }
    }

    fn teardown(&mut self) {
        self.signals = None;
        self.outbound = None;
    }

    fn transition(&mut self, to: ConnectionState) {
        let from = self.state;
        if from == to {
            return;
        }
        self.state = to;
        self.pending
            .push_back(ConnectionEvent::StateChanged { from, to });
    }
}

/// Body of the per-generation I/O task.
async fn run_connection<C: Connector>(
    connector: Arc<C>,
    config: ConnectionConfig,
    generation: u64,
    signals: mpsc::UnboundedSender<Signal>,
) {
    let opened = tokio::select! {
        biased;
        opened = tokio::time::timeout(
            config.connect_timeout,
            connector.connect(&config.url),
        ) => opened,
        () = signals.closed() => {
            tracing::debug!(generation, "connect abandoned");
            return;
        }
    };

    let mut conn = match opened {
        Ok(Ok(conn)) => conn,
        Ok(Err(e)) => {
            let _ = signals.send(Signal::OpenFailed(e));
            return;
        }
        Err(_) => {
            let _ = signals.send(Signal::OpenFailed(
                TransportError::ConnectTimeout(config.url.clone()),
            ));
            return;
        }
    };

    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel();
    if signals.send(Signal::Opened(outbound_tx)).is_err() {
        // The manager moved on while we were opening.
        let _ = conn.close().await;
        return;
    }

    loop {
        tokio::select! {
            inbound = conn.recv() => match inbound {
                Ok(Some(data)) => {
                    if signals.send(Signal::Frame(data)).is_err() {
                        break;
                    }
                }
                Ok(None) => {
                    let _ = signals.send(Signal::Closed);
                    return;
                }
                Err(e) => {
                    let _ = signals.send(Signal::Failed(e));
                    return;
                }
            },
            outbound = outbound_rx.recv() => match outbound {
                Some(data) => {
                    if let Err(e) = conn.send(data).await {
                        let _ = signals.send(Signal::Failed(e));
                        return;
                    }
                }
                // The manager dropped its sender: disconnect() was called.
                None => break,
            },
        }
    }

    if let Err(error) = conn.close().await {
        tracing::debug!(generation, %error, "close failed");
    }
    tracing::debug!(generation, "I/O task finished");
}

// =========================================================================
// Tests
// =========================================================================
