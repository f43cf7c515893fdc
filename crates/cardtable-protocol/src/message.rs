//! The command and event catalogue.
//!
//! Two closed enums cover everything that crosses the wire:
//!
//! - [`ClientCommand`]: client → server, shaped `{ "type": ..., "data": {...} }`
//! - [`ServerEvent`]: server → client, shaped `{ "type": ..., ...fields }`
//!
//! The two directions use different serde tagging because the server
//! does: commands carry their payload under `data` ("adjacently tagged"),
//! events carry their fields next to `type` ("internally tagged").

use serde::{Deserialize, Serialize};

use crate::types::{Card, GameId, Phase, Player, PlayerId, Position};

// ---------------------------------------------------------------------------
// ClientCommand
// ---------------------------------------------------------------------------

/// A player-initiated command sent to the server.
///
/// `#[serde(tag = "type", content = "data")]` produces:
///   `{ "type": "play_card", "data": { "card": {...} } }`
/// and for variants without data just:
///   `{ "type": "deal_cards" }`
///
/// Selecting a card is deliberately absent: selection is local UI state
/// and is never sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ClientCommand {
    /// Join an existing game, or create one when `game_id` is `None`.
    JoinGame {
        #[serde(rename = "playerName")]
        player_name: String,
        #[serde(
            rename = "gameId",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        game_id: Option<GameId>,
    },

    /// Ask the server to deal a new round.
    DealCards,

    /// Play a card from the local hand.
    PlayCard { card: Card },

    /// Drop a card onto the shared zone at a table position.
    DropCardShared { card: Card, position: Position },

    /// Leave the current game.
    LeaveGame,
}

impl ClientCommand {
    /// The wire `type` tag of this command.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::JoinGame { .. } => "join_game",
            Self::DealCards => "deal_cards",
            Self::PlayCard { .. } => "play_card",
            Self::DropCardShared { .. } => "drop_card_shared",
            Self::LeaveGame => "leave_game",
        }
    }
}

// ---------------------------------------------------------------------------
// ServerEvent
// ---------------------------------------------------------------------------

/// The full-state payload of a `game_state` event.
///
/// Collections are `Option` so the reducer can tell "field absent" (keep
/// what we have) from "field present and empty" (clear it).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default)]
    pub game_id: Option<GameId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub players: Option<Vec<Player>>,
    #[serde(default)]
    pub current_player: Option<PlayerId>,
    pub game_phase: Phase,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub played_cards: Option<Vec<Card>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shared_zone: Option<Vec<Card>>,
}

/// An event pushed by the server.
///
/// `#[serde(tag = "type")]` produces internally tagged JSON:
///   `{ "type": "player_left", "playerId": "p2" }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Full snapshot. Replaces the mirrored state wholesale.
    GameState(Snapshot),

    /// A player sat down at the table.
    PlayerJoined { player: Player },

    /// A player left the table.
    PlayerLeft {
        #[serde(rename = "playerId")]
        player_id: PlayerId,
    },

    /// Somebody played a card. `player_id` is sent by the server but the
    /// mirror does not need it.
    CardPlayed {
        card: Card,
        #[serde(
            rename = "playerId",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        player_id: Option<PlayerId>,
    },

    /// The deal outcome: every player's new hand plus the remaining deck.
    CardsDealt { players: Vec<Player>, deck: Vec<Card> },

    /// The game is over.
    GameEnded,

    /// The server rejected something we sent.
    Error {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
}

impl ServerEvent {
    /// Every `type` tag the client understands.
    pub const KINDS: &'static [&'static str] = &[
        "game_state",
        "player_joined",
        "player_left",
        "card_played",
        "cards_dealt",
        "game_ended",
        "error",
    ];

    /// The wire `type` tag of this event.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::GameState(_) => "game_state",
            Self::PlayerJoined { .. } => "player_joined",
            Self::PlayerLeft { .. } => "player_left",
            Self::CardPlayed { .. } => "card_played",
            Self::CardsDealt { .. } => "cards_dealt",
            Self::GameEnded => "game_ended",
            Self::Error { .. } => "error",
        }
    }

    /// Returns `true` if `kind` is a catalogued event tag.
    pub fn is_known_kind(kind: &str) -> bool {
        Self::KINDS.contains(&kind)
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! The JSON shapes here are what the relay server speaks. A mismatch
    //! means the server silently ignores our commands, so each variant's
    //! shape is checked field by field.

    use super::*;
    use crate::types::Suit;
    use serde_json::json;

    fn ace() -> Card {
        Card::new("c1", Suit::Spades, "A", 14)
    }

    // =====================================================================
    // ClientCommand
    // =====================================================================

    #[test]
    fn test_join_game_json_format() {
        let cmd = ClientCommand::JoinGame {
            player_name: "Alice".into(),
            game_id: Some(GameId::from("g1")),
        };
        let json = serde_json::to_value(&cmd).unwrap();
        assert_eq!(
            json,
            json!({
                "type": "join_game",
                "data": { "playerName": "Alice", "gameId": "g1" }
            })
        );
    }

    #[test]
    fn test_join_game_without_game_id_omits_field() {
        let cmd = ClientCommand::JoinGame {
            player_name: "Alice".into(),
            game_id: None,
        };
        let json = serde_json::to_value(&cmd).unwrap();
        assert_eq!(json["data"], json!({ "playerName": "Alice" }));
    }

    #[test]
    fn test_deal_cards_has_no_data() {
        let json = serde_json::to_value(&ClientCommand::DealCards).unwrap();
        assert_eq!(json, json!({ "type": "deal_cards" }));
    }

    #[test]
    fn test_play_card_json_format() {
        let json =
            serde_json::to_value(&ClientCommand::PlayCard { card: ace() })
                .unwrap();
        assert_eq!(json["type"], "play_card");
        assert_eq!(json["data"]["card"]["id"], "c1");
        assert_eq!(json["data"]["card"]["value"], 14);
    }

    #[test]
    fn test_drop_card_shared_json_format() {
        let cmd = ClientCommand::DropCardShared {
            card: ace(),
            position: Position::new(120.0, 48.5),
        };
        let json = serde_json::to_value(&cmd).unwrap();
        assert_eq!(json["type"], "drop_card_shared");
        assert_eq!(json["data"]["position"], json!({ "x": 120.0, "y": 48.5 }));
        assert_eq!(json["data"]["card"]["suit"], "spades");
    }

    #[test]
    fn test_command_kind_matches_wire_tag() {
        let cmds = [
            ClientCommand::JoinGame {
                player_name: "a".into(),
                game_id: None,
            },
            ClientCommand::DealCards,
            ClientCommand::PlayCard { card: ace() },
            ClientCommand::DropCardShared {
                card: ace(),
                position: Position::default(),
            },
            ClientCommand::LeaveGame,
        ];
        for cmd in cmds {
            let json = serde_json::to_value(&cmd).unwrap();
            assert_eq!(json["type"], cmd.kind());
        }
    }

    // =====================================================================
    // ServerEvent
    // =====================================================================

    #[test]
    fn test_game_state_parses_full_snapshot() {
        let json = json!({
            "type": "game_state",
            "gameId": "g1",
            "players": [{ "id": "p1", "name": "Alice", "hand": [],
                          "score": 3, "isCurrentPlayer": true }],
            "currentPlayer": "p1",
            "gamePhase": "playing",
            "playedCards": [],
            "sharedZone": [{ "id": "c9", "suit": "hearts", "rank": "9", "value": 9 }]
        });
        let event: ServerEvent = serde_json::from_value(json).unwrap();

        let ServerEvent::GameState(snap) = event else {
            panic!("expected GameState");
        };
        assert_eq!(snap.game_id, Some(GameId::from("g1")));
        assert_eq!(snap.game_phase, Phase::Playing);
        assert_eq!(snap.players.as_ref().map(Vec::len), Some(1));
        assert_eq!(snap.played_cards, Some(vec![]));
        assert_eq!(snap.shared_zone.as_ref().map(Vec::len), Some(1));
    }

    #[test]
    fn test_game_state_absent_collections_are_none() {
        let json = json!({
            "type": "game_state",
            "gameId": null,
            "currentPlayer": null,
            "gamePhase": "waiting"
        });
        let event: ServerEvent = serde_json::from_value(json).unwrap();
        let ServerEvent::GameState(snap) = event else {
            panic!("expected GameState");
        };
        assert_eq!(snap.game_id, None);
        assert_eq!(snap.players, None);
        assert_eq!(snap.played_cards, None);
        assert_eq!(snap.shared_zone, None);
    }

    #[test]
    fn test_game_state_requires_phase() {
        let json = json!({ "type": "game_state", "gameId": "g1" });
        let result: Result<ServerEvent, _> = serde_json::from_value(json);
        assert!(result.is_err());
    }

    #[test]
    fn test_player_left_uses_camel_case_id() {
        let event: ServerEvent = serde_json::from_value(
            json!({ "type": "player_left", "playerId": "p2" }),
        )
        .unwrap();
        assert_eq!(
            event,
            ServerEvent::PlayerLeft {
                player_id: PlayerId::from("p2")
            }
        );
    }

    #[test]
    fn test_card_played_player_id_is_optional() {
        let event: ServerEvent = serde_json::from_value(json!({
            "type": "card_played",
            "card": { "id": "c1", "suit": "spades", "rank": "A", "value": 14 }
        }))
        .unwrap();
        assert_eq!(
            event,
            ServerEvent::CardPlayed {
                card: ace(),
                player_id: None
            }
        );
    }

    #[test]
    fn test_game_ended_has_only_a_tag() {
        let event: ServerEvent =
            serde_json::from_value(json!({ "type": "game_ended" })).unwrap();
        assert_eq!(event, ServerEvent::GameEnded);
        assert_eq!(event.kind(), "game_ended");
    }

    #[test]
    fn test_error_message_is_optional() {
        let event: ServerEvent =
            serde_json::from_value(json!({ "type": "error" })).unwrap();
        assert_eq!(event, ServerEvent::Error { message: None });
    }

    #[test]
    fn test_cards_dealt_requires_deck() {
        let result: Result<ServerEvent, _> = serde_json::from_value(
            json!({ "type": "cards_dealt", "players": [] }),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_kinds_cover_every_variant() {
        let events = [
            ServerEvent::GameState(Snapshot::default()),
            ServerEvent::PlayerJoined {
                player: Player::new("p1", "A"),
            },
            ServerEvent::PlayerLeft {
                player_id: PlayerId::from("p1"),
            },
            ServerEvent::CardPlayed {
                card: ace(),
                player_id: None,
            },
            ServerEvent::CardsDealt {
                players: vec![],
                deck: vec![],
            },
            ServerEvent::GameEnded,
            ServerEvent::Error { message: None },
        ];
        assert_eq!(events.len(), ServerEvent::KINDS.len());
        for event in &events {
            assert!(ServerEvent::is_known_kind(event.kind()));
            let json = serde_json::to_value(event).unwrap();
            assert_eq!(json["type"], event.kind());
        }
        assert!(!ServerEvent::is_known_kind("fly_to_moon"));
    }
}
