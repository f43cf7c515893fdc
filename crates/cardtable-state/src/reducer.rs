//! The state reducer: `(GameState, ServerEvent) -> GameState`.
//!
//! Reducing never mutates its input. It clones what it needs and returns
//! a new state, so the same `(state, event)` pair always gives the same
//! answer and a subscriber holding the old state sees it unchanged.
//!
//! | event           | effect                                               |
//! |-----------------|------------------------------------------------------|
//! | `game_state`    | replace every field the snapshot carries             |
//! | `player_joined` | append (or upsert, see [`DuplicateJoinPolicy`])      |
//! | `player_left`   | remove that player, others keep their order          |
//! | `card_played`   | append to the played log and the shared zone         |
//! | `cards_dealt`   | replace players and deck, phase untouched            |
//! | `game_ended`    | phase becomes `finished`                             |
//! | `error`         | nothing                                              |

use cardtable_protocol::{GameId, Phase, Player, PlayerId, ServerEvent, Snapshot};
use tracing::{debug, warn};

use crate::{DuplicateJoinPolicy, GameState, StoreConfig};

/// Folds server events into a [`GameState`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Reducer {
    duplicate_joins: DuplicateJoinPolicy,
}

impl Reducer {
    /// Creates a reducer with the policies from `config`.
    pub fn new(config: &StoreConfig) -> Self {
        Self {
            duplicate_joins: config.duplicate_joins,
        }
    }

    /// Creates a reducer with the given duplicate-join policy.
    pub fn with_duplicate_joins(policy: DuplicateJoinPolicy) -> Self {
        Self {
            duplicate_joins: policy,
        }
    }

    /// The duplicate-join policy in effect.
    pub fn duplicate_joins(&self) -> DuplicateJoinPolicy {
        self.duplicate_joins
    }

    /// Returns the state that follows `state` after `event`.
    pub fn reduce(&self, state: &GameState, event: &ServerEvent) -> GameState {
        let mut next = match event {
            ServerEvent::GameState(snapshot) => apply_snapshot(state, snapshot),

            ServerEvent::PlayerJoined { player } => {
                let mut next = state.clone();
                self.seat(&mut next.players, player);
                next
            }

            ServerEvent::PlayerLeft { player_id } => {
                let mut next = state.clone();
                next.players.retain(|p| &p.id != player_id);
                next
            }

            ServerEvent::CardPlayed { card, .. } => {
                let mut next = state.clone();
                next.played_cards.push(card.clone());
                next.shared_zone.push(card.clone());
                next
            }

            ServerEvent::CardsDealt { players, deck } => GameState {
                players: players.clone(),
                deck: deck.clone(),
                ..state.clone()
            },

            ServerEvent::GameEnded => GameState {
                phase: Phase::Finished,
                game_started: true,
                ..state.clone()
            },

            ServerEvent::Error { message } => {
                warn!(
                    message = message.as_deref().unwrap_or("<none>"),
                    "server reported an error"
                );
                return state.clone();
            }
        };

        drop_dangling_current_player(&mut next);
        next
    }

    fn seat(&self, players: &mut Vec<Player>, player: &Player) {
        let existing = players.iter().position(|p| p.id == player.id);
        match (self.duplicate_joins, existing) {
            (DuplicateJoinPolicy::Upsert, Some(index)) => {
                debug!(player_id = %player.id, "player re-joined, replacing seat");
                players[index] = player.clone();
            }
            (DuplicateJoinPolicy::Append, Some(_)) => {
                debug!(player_id = %player.id, "player re-joined, appending again");
                players.push(player.clone());
            }
            (_, None) => players.push(player.clone()),
        }
    }
}

/// Reduces with the default policies.
///
/// ```rust
/// use cardtable_protocol::ServerEvent;
/// use cardtable_state::{reduce, GameState};
///
/// let before = GameState::new();
/// let after = reduce(&before, &ServerEvent::GameEnded);
/// assert_eq!(after.phase, cardtable_protocol::Phase::Finished);
/// assert_eq!(before, GameState::new());
/// ```
pub fn reduce(state: &GameState, event: &ServerEvent) -> GameState {
    Reducer::default().reduce(state, event)
}

// ---------------------------------------------------------------------------
// Snapshot handling
// ---------------------------------------------------------------------------

fn apply_snapshot(state: &GameState, snapshot: &Snapshot) -> GameState {
    if let Some(incoming) = foreign_game_id(state, snapshot.game_id.as_ref()) {
        warn!(
            current = ?state.game_id,
            incoming = %incoming,
            phase = %state.phase,
            started = state.game_started,
            "ignoring snapshot for another game after the game started"
        );
        return state.clone();
    }

    GameState {
        // A snapshot without an id never clears the one we have.
        game_id: snapshot.game_id.clone().or_else(|| state.game_id.clone()),
        players: snapshot
            .players
            .clone()
            .unwrap_or_else(|| state.players.clone()),
        current_player_id: snapshot.current_player.clone(),
        phase: snapshot.game_phase,
        played_cards: snapshot
            .played_cards
            .clone()
            .unwrap_or_else(|| state.played_cards.clone()),
        deck: state.deck.clone(),
        shared_zone: snapshot
            .shared_zone
            .clone()
            .unwrap_or_else(|| state.shared_zone.clone()),
        game_started: state.game_started || snapshot.game_phase.has_started(),
    }
}

/// The game id is written once per session: until the game first starts
/// it may still change, but after that a snapshot naming a different
/// game is not ours, even if the phase has since gone back to `waiting`.
/// Only a fresh state lifts this. Returns the offending id.
fn foreign_game_id<'a>(state: &GameState, incoming: Option<&'a GameId>) -> Option<&'a GameId> {
    match (&state.game_id, incoming) {
        (Some(current), Some(id)) if current != id && state.game_started => Some(id),
        _ => None,
    }
}

fn drop_dangling_current_player(state: &mut GameState) {
    let dangling = state
        .current_player_id
        .as_ref()
        .is_some_and(|id| !has_player(&state.players, id));
    if dangling {
        debug!(
            player_id = ?state.current_player_id,
            "current player is not seated, clearing"
        );
        state.current_player_id = None;
    }
}

fn has_player(players: &[Player], id: &PlayerId) -> bool {
    players.iter().any(|p| &p.id == id)
}

// =========================================================================
// Tests
// =========================================================================
