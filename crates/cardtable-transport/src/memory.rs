//! In-process transport.
//!
//! [`MemoryConnector`] opens "connections" that are just a pair of Tokio
//! channels. For every connection it opens, the other end is handed out
//! as a [`MemoryPeer`], which plays the relay's role: it can push frames,
//! read what the client sent, close cleanly, or fail the link.
//!
//! ```rust
//! # async fn demo() {
//! use cardtable_transport::memory::MemoryConnector;
//!
//! let (connector, mut peers) = MemoryConnector::new();
//! // ... hand `connector` to a ConnectionManager and call connect() ...
//! # drop(connector);
//! if let Some(peer) = peers.recv().await {
//!     peer.send_text(r#"{"type":"game_ended"}"#);
//! }
//! # }
//! ```

use std::io;

use tokio::sync::mpsc;

use crate::{Connection, Connector, TransportError};

type Inbound = Result<Vec<u8>, String>;

#[derive(Debug)]
enum Mode {
    Accept(mpsc::UnboundedSender<MemoryPeer>),
    Refuse(String),
    Hang,
}

/// A [`Connector`] whose connections live entirely in memory.
#[derive(Debug)]
pub struct MemoryConnector {
    mode: Mode,
}

impl MemoryConnector {
    /// Creates a connector that accepts every connection and hands the
    /// server side of each one to the returned receiver.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<MemoryPeer>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                mode: Mode::Accept(tx),
            },
            rx,
        )
    }

    /// Creates a connector that refuses every connection with `reason`.
    pub fn refusing(reason: impl Into<String>) -> Self {
        Self {
            mode: Mode::Refuse(reason.into()),
        }
    }

    /// Creates a connector whose connection attempts never complete.
    pub fn hanging() -> Self {
        Self { mode: Mode::Hang }
    }
}

impl Connector for MemoryConnector {
    type Connection = MemoryConnection;

    async fn connect(
        &self,
        url: &str,
    ) -> Result<Self::Connection, TransportError> {
        match &self.mode {
            Mode::Accept(peers) => {
                let (to_client, inbound) = mpsc::unbounded_channel();
                let (outbound, from_client) = mpsc::unbounded_channel();
                let peer = MemoryPeer {
                    url: url.to_string(),
                    to_client,
                    from_client,
                };
                peers.send(peer).map_err(|_| TransportError::ConnectFailed {
                    url: url.to_string(),
                    reason: "nobody is listening for peers".into(),
                })?;
                Ok(MemoryConnection { inbound, outbound })
            }
            Mode::Refuse(reason) => Err(TransportError::ConnectFailed {
                url: url.to_string(),
                reason: reason.clone(),
            }),
            Mode::Hang => std::future::pending().await,
        }
    }
}

/// The client side of an in-memory connection.
#[derive(Debug)]
pub struct MemoryConnection {
    inbound: mpsc::UnboundedReceiver<Inbound>,
    outbound: mpsc::UnboundedSender<Vec<u8>>,
}

impl Connection for MemoryConnection {
    async fn send(&mut self, data: Vec<u8>) -> Result<(), TransportError> {
        self.outbound.send(data).map_err(|_| {
            TransportError::SendFailed(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "peer is gone",
            ))
        })
    }

    async fn recv(&mut self) -> Result<Option<Vec<u8>>, TransportError> {
        match self.inbound.recv().await {
            Some(Ok(data)) => Ok(Some(data)),
            Some(Err(reason)) => Err(TransportError::ReceiveFailed(
                io::Error::new(io::ErrorKind::ConnectionReset, reason),
            )),
            None => Ok(None),
        }
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.inbound.close();
        Ok(())
    }
}

/// The server side of an in-memory connection.
///
/// Dropping the peer closes the connection cleanly from the server's
/// side.
#[derive(Debug)]
pub struct MemoryPeer {
    url: String,
    to_client: mpsc::UnboundedSender<Inbound>,
    from_client: mpsc::UnboundedReceiver<Vec<u8>>,
}

impl MemoryPeer {
    /// The URL the client dialed.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Pushes a frame to the client. Returns `false` if the client side
    /// is gone.
    pub fn send(&self, data: impl Into<Vec<u8>>) -> bool {
        self.to_client.send(Ok(data.into())).is_ok()
    }

    /// Pushes a text frame to the client.
    pub fn send_text(&self, text: &str) -> bool {
        self.send(text.as_bytes())
    }

    /// Breaks the link with a receive error on the client side.
    pub fn fail(&self, reason: impl Into<String>) -> bool {
        self.to_client.send(Err(reason.into())).is_ok()
    }

    /// Waits for the next frame the client sent. `None` once the client
    /// has closed the connection.
    pub async fn recv(&mut self) -> Option<Vec<u8>> {
        self.from_client.recv().await
    }

    /// Returns a frame the client already sent, without waiting.
    pub fn try_recv(&mut self) -> Option<Vec<u8>> {
        self.from_client.try_recv().ok()
    }
}
