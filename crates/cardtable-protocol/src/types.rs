//! Core data types shared by the client and the relay server.
//!
//! Everything in this module travels "on the wire": cards, players, the
//! game phase, and the drop position used by the shared zone. The JSON
//! field names follow the server's camelCase convention, so most structs
//! carry `#[serde(rename_all = "camelCase")]`.

use serde::{Deserialize, Serialize};

use std::fmt;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A unique identifier for a card.
///
/// Newtype over the server-assigned string (a UUID in practice). The id is
/// the card's identity: it stays the same while the card moves between a
/// hand, the shared zone, the deck, and the played log.
///
/// `#[serde(transparent)]` serializes `CardId("c1")` as just `"c1"`.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct CardId(pub String);

/// A unique identifier for a player, assigned by the server.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PlayerId(pub String);

/// A unique identifier for one game (one table) on the server.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct GameId(pub String);

macro_rules! string_id {
    ($($ty:ident),+) => {
        $(
            impl $ty {
                /// Returns the id as a string slice.
                pub fn as_str(&self) -> &str {
                    &self.0
                }
            }

            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(&self.0)
                }
            }

            impl From<&str> for $ty {
                fn from(value: &str) -> Self {
                    Self(value.to_string())
                }
            }

            impl From<String> for $ty {
                fn from(value: String) -> Self {
                    Self(value)
                }
            }
        )+
    };
}

string_id!(CardId, PlayerId, GameId);

// ---------------------------------------------------------------------------
// Cards
// ---------------------------------------------------------------------------

/// The four French suits. Serialized in lowercase (`"hearts"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Suit {
    Hearts,
    Diamonds,
    Clubs,
    Spades,
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hearts => write!(f, "hearts"),
            Self::Diamonds => write!(f, "diamonds"),
            Self::Clubs => write!(f, "clubs"),
            Self::Spades => write!(f, "spades"),
        }
    }
}

/// A single playing card.
///
/// Cards are immutable once created. `rank` is the display label
/// (`"A"`, `"10"`, `"K"`); `value` is the numeric weight the server's
/// rules use. The two are independent: an ace may be worth 1 or 14
/// depending on the game.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub suit: Suit,
    pub rank: String,
    pub value: i32,
}

impl Card {
    /// Convenience constructor, mostly for tests and demos.
    pub fn new(
        id: impl Into<CardId>,
        suit: Suit,
        rank: impl Into<String>,
        value: i32,
    ) -> Self {
        Self {
            id: id.into(),
            suit,
            rank: rank.into(),
            value,
        }
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} of {} ({})", self.rank, self.suit, self.id)
    }
}

// ---------------------------------------------------------------------------
// Players
// ---------------------------------------------------------------------------

/// A participant at the table, as the server describes them.
///
/// `hand` is ordered for display only; the server decides what the order
/// means for the rules (usually nothing).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    #[serde(default)]
    pub hand: Vec<Card>,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub is_current_player: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_dealer: Option<bool>,
}

impl Player {
    /// Creates a player with an empty hand and zero score.
    pub fn new(id: impl Into<PlayerId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            hand: Vec::new(),
            score: 0,
            is_current_player: false,
            is_dealer: None,
        }
    }

    /// Returns `true` if the card with this id is in the player's hand.
    pub fn holds(&self, card_id: &CardId) -> bool {
        self.hand.iter().any(|c| &c.id == card_id)
    }
}

// ---------------------------------------------------------------------------
// Phase
// ---------------------------------------------------------------------------

/// The coarse state machine of a game.
///
/// ```text
/// Waiting ──→ Playing ──→ Finished
/// ```
///
/// The client never advances the phase on its own; every transition
/// arrives from the server.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    #[default]
    Waiting,
    Playing,
    Finished,
}

impl Phase {
    /// Returns `true` once the game has left the lobby.
    pub fn has_started(self) -> bool {
        !matches!(self, Self::Waiting)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Waiting => write!(f, "waiting"),
            Self::Playing => write!(f, "playing"),
            Self::Finished => write!(f, "finished"),
        }
    }
}

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// Where a card was dropped on the shared zone, in table coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

// =========================================================================
// Tests
// =========================================================================
