//! The game state store.
//!
//! A [`Store`] owns two things that must never be mixed up:
//!
//! - the **confirmed** [`GameState`], which only changes when the server
//!   says so (through [`Store::apply`]);
//! - the **selection**, a local-only guess about which card the player
//!   is about to use.
//!
//! Every change to either one is pushed to subscribers synchronously,
//! as a read-only [`StoreView`].
//!
//! # Selection reconciliation
//!
//! After each event the store checks whether the selected card is still
//! meaningful. It is dropped when:
//!
//! - a `card_played` names it, or
//! - the relevant hand held it before the event and does not after. The
//!   relevant hand is the local player's when one is set with
//!   [`Store::set_local_player`], otherwise any hand at the table.

use std::fmt;

use cardtable_protocol::{Card, CardId, PlayerId, ServerEvent};
use tracing::debug;

use crate::{GameState, Reducer, StoreConfig};

/// A read-only view handed to subscribers.
#[derive(Debug, Clone, Copy)]
pub struct StoreView<'a> {
    pub state: &'a GameState,
    pub selected: Option<&'a Card>,
}

/// Identifies a subscription so it can be removed again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber = Box<dyn FnMut(&StoreView<'_>) + Send>;

/// Holds the mirrored game state and the local selection.
pub struct Store {
    state: GameState,
    selected: Option<Card>,
    local_player: Option<PlayerId>,
    reducer: Reducer,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription: u64,
}

impl Store {
    /// Creates an empty store with default configuration.
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    /// Creates an empty store.
    pub fn with_config(config: StoreConfig) -> Self {
        Self {
            state: GameState::new(),
            selected: None,
            local_player: None,
            reducer: Reducer::new(&config),
            subscribers: Vec::new(),
            next_subscription: 0,
        }
    }

    /// The confirmed game state.
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// The locally selected card, if any.
    pub fn selected(&self) -> Option<&Card> {
        self.selected.as_ref()
    }

    /// The player this client is playing as, if known.
    pub fn local_player(&self) -> Option<&PlayerId> {
        self.local_player.as_ref()
    }

    /// A view of the current state and selection.
    pub fn view(&self) -> StoreView<'_> {
        StoreView {
            state: &self.state,
            selected: self.selected.as_ref(),
        }
    }

    // -----------------------------------------------------------------------
    // Mutation
    // -----------------------------------------------------------------------

    /// Folds a server event into the state, reconciles the selection,
    /// and notifies subscribers.
    pub fn apply(&mut self, event: &ServerEvent) {
        let next = self.reducer.reduce(&self.state, event);
        if self.selection_went_stale(event, &next) {
            debug!(event = event.kind(), "selected card is gone, clearing selection");
            self.selected = None;
        }
        self.state = next;
        self.notify();
    }

    /// Replaces the selection. No validation: the UI may select any card
    /// it is showing.
    pub fn select(&mut self, card: Option<Card>) {
        self.selected = card;
        self.notify();
    }

    /// Drops the selection.
    pub fn clear_selection(&mut self) {
        self.select(None);
    }

    /// Goes back to the empty lobby state with nothing selected.
    ///
    /// Subscribers and the local player id survive a reset.
    pub fn reset(&mut self) {
        self.state = GameState::new();
        self.selected = None;
        self.notify();
    }

    /// Sets whose hand the selection belongs to.
    pub fn set_local_player(&mut self, player: Option<PlayerId>) {
        self.local_player = player;
    }

    // -----------------------------------------------------------------------
    // Subscriptions
    // -----------------------------------------------------------------------

    /// Registers a callback invoked after every change.
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&StoreView<'_>) + Send + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Removes a callback. Returns `false` if it was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub, _)| *sub != id);
        self.subscribers.len() != before
    }

    /// The number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    fn notify(&mut self) {
        let view = StoreView {
            state: &self.state,
            selected: self.selected.as_ref(),
        };
        for (_, callback) in &mut self.subscribers {
            callback(&view);
        }
    }

    fn selection_went_stale(&self, event: &ServerEvent, next: &GameState) -> bool {
        let Some(selected) = &self.selected else {
            return false;
        };

        if matches!(event, ServerEvent::CardPlayed { card, .. } if card.id == selected.id) {
            return true;
        }

        let held_before = self.hand_holds(&self.state, &selected.id);
        held_before && !self.hand_holds(next, &selected.id)
    }

    fn hand_holds(&self, state: &GameState, card: &CardId) -> bool {
        match &self.local_player {
            Some(me) => state.player(me).is_some_and(|p| p.holds(card)),
            None => state.players.iter().any(|p| p.holds(card)),
        }
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("state", &self.state)
            .field("selected", &self.selected)
            .field("local_player", &self.local_player)
            .field("reducer", &self.reducer)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use cardtable_protocol::{GameId, Phase, Player, Snapshot, Suit};

    fn card(id: &str) -> Card {
        Card::new(id, Suit::Diamonds, "Q", 12)
    }

    fn player(id: &str, cards: &[&str]) -> Player {
        let mut p = Player::new(id, id);
        p.hand = cards.iter().map(|c| card(c)).collect();
        p
    }

    fn dealt(players: Vec<Player>) -> ServerEvent {
        ServerEvent::CardsDealt {
            players,
            deck: Vec::new(),
        }
    }

    fn snapshot(players: Vec<Player>) -> ServerEvent {
        ServerEvent::GameState(Snapshot {
            players: Some(players),
            game_phase: Phase::Playing,
            ..Snapshot::default()
        })
    }

    /// Records the selected card id seen by each notification.
    fn recorder(store: &mut Store) -> (SubscriptionId, Arc<Mutex<Vec<Option<String>>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let id = store.subscribe(move |view| {
            sink.lock()
                .unwrap()
                .push(view.selected.map(|c| c.id.as_str().to_string()));
        });
        (id, seen)
    }

    #[test]
    fn test_new_store_is_empty() {
        let store = Store::new();
        assert_eq!(store.state(), &GameState::new());
        assert!(store.selected().is_none());
        assert_eq!(store.subscriber_count(), 0);
    }

    #[test]
    fn test_apply_updates_state_and_notifies() {
        let mut store = Store::new();
        let (_, seen) = recorder(&mut store);

        store.apply(&ServerEvent::GameEnded);

        assert_eq!(store.state().phase, Phase::Finished);
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_select_is_unconditional_and_notifies() {
        let mut store = Store::new();
        let (_, seen) = recorder(&mut store);

        // Not in any hand, still accepted.
        store.select(Some(card("anything")));
        assert_eq!(store.selected().map(|c| c.id.as_str()), Some("anything"));

        store.clear_selection();
        assert!(store.selected().is_none());
        assert_eq!(*seen.lock().unwrap(), vec![Some("anything".to_string()), None]);
    }

    #[test]
    fn test_unsubscribe_stops_notifications() {
        let mut store = Store::new();
        let (id, seen) = recorder(&mut store);

        assert!(store.unsubscribe(id));
        assert!(!store.unsubscribe(id));
        store.apply(&ServerEvent::GameEnded);

        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_every_subscriber_is_notified() {
        let mut store = Store::new();
        let (_, first) = recorder(&mut store);
        let (_, second) = recorder(&mut store);

        store.select(Some(card("c1")));

        assert_eq!(first.lock().unwrap().len(), 1);
        assert_eq!(second.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_card_played_clears_matching_selection() {
        let mut store = Store::new();
        store.select(Some(card("c1")));

        store.apply(&ServerEvent::CardPlayed {
            card: card("c2"),
            player_id: None,
        });
        assert!(store.selected().is_some(), "a different card was played");

        store.apply(&ServerEvent::CardPlayed {
            card: card("c1"),
            player_id: None,
        });
        assert!(store.selected().is_none());
    }

    #[test]
    fn test_selection_cleared_when_card_leaves_local_hand() {
        let mut store = Store::new();
        store.set_local_player(Some(PlayerId::from("me")));
        store.apply(&dealt(vec![player("me", &["c1", "c2"])]));
        store.select(Some(card("c1")));

        store.apply(&snapshot(vec![player("me", &["c2"])]));

        assert!(store.selected().is_none());
    }

    #[test]
    fn test_selection_kept_when_other_hand_changes() {
        let mut store = Store::new();
        store.set_local_player(Some(PlayerId::from("me")));
        store.apply(&dealt(vec![
            player("me", &["c1"]),
            player("them", &["c9"]),
        ]));
        store.select(Some(card("c1")));

        store.apply(&snapshot(vec![player("me", &["c1"]), player("them", &[])]));

        assert_eq!(store.selected().map(|c| c.id.as_str()), Some("c1"));
    }

    #[test]
    fn test_selection_without_local_player_checks_every_hand() {
        let mut store = Store::new();
        store.apply(&dealt(vec![player("a", &["c1"]), player("b", &["c2"])]));
        store.select(Some(card("c2")));

        store.apply(&snapshot(vec![player("a", &["c1"]), player("b", &[])]));

        assert!(store.selected().is_none());
    }

    #[test]
    fn test_selection_of_card_never_held_survives_events() {
        let mut store = Store::new();
        store.select(Some(card("floating")));

        store.apply(&dealt(vec![player("a", &["c1"])]));

        assert!(store.selected().is_some());
    }

    #[test]
    fn test_reset_clears_state_and_selection_but_keeps_subscribers() {
        let mut store = Store::new();
        store.set_local_player(Some(PlayerId::from("me")));
        store.apply(&dealt(vec![player("me", &["c1"])]));
        store.select(Some(card("c1")));
        let (_, seen) = recorder(&mut store);

        store.reset();

        assert_eq!(store.state(), &GameState::new());
        assert!(store.selected().is_none());
        assert_eq!(store.local_player(), Some(&PlayerId::from("me")));
        assert_eq!(*seen.lock().unwrap(), vec![None]);
    }

    #[test]
    fn test_reset_lifts_game_id_lock() {
        let started = |id: &str| {
            ServerEvent::GameState(Snapshot {
                game_id: Some(GameId::from(id)),
                game_phase: Phase::Playing,
                ..Snapshot::default()
            })
        };
        let mut store = Store::new();
        store.apply(&started("g1"));
        store.apply(&started("g2"));
        assert_eq!(store.state().game_id, Some(GameId::from("g1")));

        store.reset();
        store.apply(&started("g2"));
        assert_eq!(store.state().game_id, Some(GameId::from("g2")));
    }

    #[test]
    fn test_view_tracks_state_and_selection() {
        let mut store = Store::new();
        store.apply(&dealt(vec![player("p1", &["c1"])]));
        store.select(Some(card("c1")));

        let view = store.view();
        assert_eq!(view.state, store.state());
        assert_eq!(view.selected.map(|c| c.id.as_str()), Some("c1"));
    }

    #[test]
    fn test_store_debug_hides_callbacks() {
        let mut store = Store::new();
        store.subscribe(|_| {});
        let debug = format!("{store:?}");
        assert!(debug.contains("subscribers: 1"));
    }
}
