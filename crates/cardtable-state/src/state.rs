//! The mirrored game state.

use cardtable_protocol::{Card, CardId, GameId, Phase, Player, PlayerId};
use serde::Serialize;

/// The client's copy of the server's game.
///
/// A fresh `GameState` is the lobby: phase `Waiting`, no game id, every
/// collection empty. After that it only changes through the reducer.
///
/// `played_cards` is an append-only history; `shared_zone` is what is
/// currently visible on the table. A played card shows up in both.
///
/// `game_started` is local bookkeeping and never goes on the wire. It
/// latches the first time the game reaches `playing` or `finished` and
/// stays set, whatever later snapshots say about the phase, until the
/// state is replaced with a fresh one.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub game_id: Option<GameId>,
    pub players: Vec<Player>,
    pub current_player_id: Option<PlayerId>,
    pub phase: Phase,
    pub played_cards: Vec<Card>,
    pub deck: Vec<Card>,
    pub shared_zone: Vec<Card>,
    #[serde(skip)]
    pub game_started: bool,
}

/// Somewhere a card can be.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Zone {
    Hand(PlayerId),
    SharedZone,
    Deck,
    Played,
}

impl GameState {
    /// The initial, empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a player by id.
    pub fn player(&self, id: &PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| &p.id == id)
    }

    /// The player whose turn it is, if any.
    pub fn current_player(&self) -> Option<&Player> {
        self.current_player_id.as_ref().and_then(|id| self.player(id))
    }

    /// Every zone that currently contains `card`.
    ///
    /// Normally at most one. The exception is a card that was just
    /// played: it sits in both `Played` and `SharedZone`, and stays in the
    /// player's hand until the next snapshot removes it.
    pub fn zones_of(&self, card: &CardId) -> Vec<Zone> {
        let mut zones: Vec<Zone> = self
            .players
            .iter()
            .filter(|p| p.holds(card))
            .map(|p| Zone::Hand(p.id.clone()))
            .collect();

        let contains = |cards: &[Card]| cards.iter().any(|c| &c.id == card);
        if contains(&self.shared_zone) {
            zones.push(Zone::SharedZone);
        }
        if contains(&self.deck) {
            zones.push(Zone::Deck);
        }
        if contains(&self.played_cards) {
            zones.push(Zone::Played);
        }
        zones
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cardtable_protocol::Suit;

    fn card(id: &str) -> Card {
        Card::new(id, Suit::Hearts, "7", 7)
    }

    #[test]
    fn test_new_state_is_empty_lobby() {
        let state = GameState::new();
        assert_eq!(state.phase, Phase::Waiting);
        assert_eq!(state.game_id, None);
        assert_eq!(state.current_player_id, None);
        assert!(state.players.is_empty());
        assert!(state.played_cards.is_empty());
        assert!(state.deck.is_empty());
        assert!(state.shared_zone.is_empty());
        assert!(!state.game_started);
    }

    #[test]
    fn test_current_player_lookup() {
        let mut state = GameState::new();
        state.players = vec![Player::new("p1", "Ann"), Player::new("p2", "Bo")];
        assert!(state.current_player().is_none());

        state.current_player_id = Some(PlayerId::from("p2"));
        assert_eq!(state.current_player().map(|p| p.name.as_str()), Some("Bo"));
    }

    #[test]
    fn test_zones_of_reports_each_location() {
        let mut holder = Player::new("p1", "Ann");
        holder.hand.push(card("h1"));

        let state = GameState {
            players: vec![holder],
            deck: vec![card("d1")],
            shared_zone: vec![card("s1")],
            played_cards: vec![card("s1")],
            ..GameState::default()
        };

        assert_eq!(
            state.zones_of(&CardId::from("h1")),
            vec![Zone::Hand(PlayerId::from("p1"))]
        );
        assert_eq!(state.zones_of(&CardId::from("d1")), vec![Zone::Deck]);
        assert_eq!(
            state.zones_of(&CardId::from("s1")),
            vec![Zone::SharedZone, Zone::Played]
        );
        assert!(state.zones_of(&CardId::from("nowhere")).is_empty());
    }

    #[test]
    fn test_state_serializes_camel_case() {
        let json = serde_json::to_value(GameState::new()).unwrap();
        assert_eq!(json["phase"], "waiting");
        assert!(json["sharedZone"].as_array().unwrap().is_empty());
        assert!(json["currentPlayerId"].is_null());
    }

    #[test]
    fn test_started_latch_stays_off_the_wire() {
        let state = GameState {
            game_started: true,
            ..GameState::default()
        };
        let json = serde_json::to_value(state).unwrap();
        assert!(json.get("gameStarted").is_none());
        assert!(json.get("game_started").is_none());
    }
}
