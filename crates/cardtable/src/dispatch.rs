//! The action dispatcher: player intents become wire commands.
//!
//! Every command method returns `true` when the command was handed to a
//! live channel and `false` when it was dropped (not connected, or it
//! could not be encoded). Dropped commands are logged, never queued.
//!
//! Commands do not touch local state, with one exception:
//! [`play_card`](Engine::play_card) clears the selection straight away,
//! whether or not the command went out. The played card itself stays
//! where it is until the server confirms.

use cardtable_protocol::{Card, ClientCommand, Codec, GameId, Position};
use cardtable_transport::Connector;

use crate::Engine;

impl<C: Connector> Engine<C> {
    /// Joins a game, or asks the server for a new one when `game_id` is
    /// `None`.
    pub fn join_game(
        &mut self,
        player_name: impl Into<String>,
        game_id: Option<GameId>,
    ) -> bool {
        self.dispatch(&ClientCommand::JoinGame {
            player_name: player_name.into(),
            game_id,
        })
    }

    /// Asks the server to deal.
    pub fn deal_cards(&mut self) -> bool {
        self.dispatch(&ClientCommand::DealCards)
    }

    /// Plays a card and clears the selection.
    pub fn play_card(&mut self, card: Card) -> bool {
        let sent = self.dispatch(&ClientCommand::PlayCard { card });
        self.store.clear_selection();
        sent
    }

    /// Drops a card onto the shared zone at `position`.
    pub fn drop_card_shared(&mut self, card: Card, position: Position) -> bool {
        self.dispatch(&ClientCommand::DropCardShared { card, position })
    }

    /// Leaves the current game.
    pub fn leave_game(&mut self) -> bool {
        self.dispatch(&ClientCommand::LeaveGame)
    }

    /// Selects a card, or clears the selection with `None`. Local only:
    /// nothing is sent.
    pub fn select_card(&mut self, card: Option<Card>) {
        self.store.select(card);
    }

    fn dispatch(&self, command: &ClientCommand) -> bool {
        let kind = command.kind();
        let frame = match self.codec.encode_command(command) {
            Ok(frame) => frame,
            Err(error) => {
                tracing::warn!(command = kind, %error, "encode failed, command dropped");
                return false;
            }
        };

        let sent = self.connection.send(frame);
        if sent {
            tracing::debug!(command = kind, "command sent");
        } else {
            tracing::debug!(
                command = kind,
                state = %self.connection.state(),
                "command dropped"
            );
        }
        sent
    }
}
