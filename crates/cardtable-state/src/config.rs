//! Store configuration.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DuplicateJoinPolicy
// ---------------------------------------------------------------------------

/// What the reducer does with a `player_joined` for an id that is already
/// seated.
///
/// The relay does not promise to send each join once, so the choice is
/// left to the caller.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateJoinPolicy {
    /// Append the player again. The table shows two seats for one id.
    #[default]
    Append,

    /// Replace the existing player in place, keeping their seat.
    Upsert,
}

// ---------------------------------------------------------------------------
// StoreConfig
// ---------------------------------------------------------------------------

/// Configuration for a [`Store`](crate::Store).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// How repeated `player_joined` events are folded in.
    #[serde(default)]
    pub duplicate_joins: DuplicateJoinPolicy,
}
