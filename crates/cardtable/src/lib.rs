//! # cardtable
//!
//! Client-side state synchronization engine for multiplayer card games.
//!
//! A relay server pushes game events over a WebSocket; cardtable keeps a
//! local mirror of the game in step with them, sends the player's
//! commands back, and keeps the local card selection consistent with what
//! the server confirms.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cardtable::prelude::*;
//!
//! # async fn demo() -> Result<(), CardtableError> {
//! let mut engine = Engine::websocket(ConnectionConfig::new("ws://127.0.0.1:8000/ws"));
//! engine.subscribe(|view| {
//!     println!("phase: {}, players: {}", view.state.phase, view.state.players.len());
//! });
//!
//! engine.connect();
//! loop {
//!     match engine.step().await {
//!         Step::Connection { to: ConnectionState::Connected, .. } => {
//!             engine.join_game("Ann", None);
//!         }
//!         Step::Connection { to: ConnectionState::Disconnected, .. } => break,
//!         _ => {}
//!     }
//! }
//! # Ok(())
//! # }
//! ```

mod config;
mod dispatch;
mod engine;
mod error;

pub use config::{EngineBuilder, EngineConfig};
pub use engine::{Engine, Step};
pub use error::CardtableError;

pub use cardtable_protocol as protocol;
pub use cardtable_state as state;
pub use cardtable_transport as transport;

/// Everything a client usually needs, in one import.
pub mod prelude {
    pub use crate::{CardtableError, Engine, EngineBuilder, EngineConfig, Step};
    pub use cardtable_protocol::{
        Card, CardId, GameId, Phase, Player, PlayerId, Position, Suit,
    };
    pub use cardtable_state::{
        DuplicateJoinPolicy, GameState, StoreView, SubscriptionId, Zone,
    };
    pub use cardtable_transport::{ConnectionConfig, ConnectionState};
}
