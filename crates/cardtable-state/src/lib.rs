//! State layer for cardtable.
//!
//! This crate holds the client's mirror of the game:
//! - **State**: [`GameState`], the confirmed copy of the server's game
//! - **Reducer**: [`Reducer`] / [`reduce`], pure `(state, event) -> state`
//! - **Store**: [`Store`], state plus local selection plus subscribers
//!
//! Nothing here does I/O. Events come in already decoded; how they got
//! here is the transport's business.

mod config;
mod reducer;
mod state;
mod store;

pub use config::{DuplicateJoinPolicy, StoreConfig};
pub use reducer::{reduce, Reducer};
pub use state::{GameState, Zone};
pub use store::{Store, StoreView, SubscriptionId};
