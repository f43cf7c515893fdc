//! A terminal client for a cardtable relay.
//!
//! Reads commands from stdin, sends them through the engine, and prints
//! the table whenever the server changes it. Logging goes to stderr and
//! is controlled with `RUST_LOG` (default `info`).
//!
//! ```text
//! cargo run -p console-client -- --name Ann
//! cargo run -p console-client -- --url ws://10.0.0.5:8000/ws --name Bo --game g1
//! ```

mod commands;

use std::time::Duration;

use cardtable::prelude::*;
use cardtable::transport::WebSocketConnector;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use crate::commands::{parse_command, Command, HELP};

#[derive(Parser, Debug)]
#[command(name = "console-client", version, about, long_about = None)]
struct Args {
    /// Relay endpoint.
    #[arg(long, default_value = ConnectionConfig::DEFAULT_URL)]
    url: String,

    /// Name to join with.
    #[arg(long)]
    name: String,

    /// Game to join right after connecting. Without it, use `join`.
    #[arg(long)]
    game: Option<String>,

    /// Seconds to wait for the connection to open.
    #[arg(long, default_value_t = 10)]
    connect_timeout: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let mut engine = Engine::<WebSocketConnector>::builder()
        .url(args.url.clone())
        .connect_timeout(Duration::from_secs(args.connect_timeout))
        .build_websocket();

    engine.subscribe(|view| print_table(view));
    engine.connect();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            step = engine.step() => {
                if !on_step(&mut engine, &args, step) {
                    break;
                }
            }
            line = lines.next_line() => {
                match line? {
                    Some(line) => {
                        if !on_line(&mut engine, &args, &line) {
                            engine.disconnect();
                            break;
                        }
                    }
                    None => {
                        engine.disconnect();
                        break;
                    }
                }
            }
        }
    }

    Ok(())
}

/// Handles one engine step. Returns `false` when the client should exit.
fn on_step(engine: &mut Engine<WebSocketConnector>, args: &Args, step: Step) -> bool {
    match step {
        Step::Connection { to: ConnectionState::Connected, .. } => {
            println!("connected to {}", engine.config().url);
            if let Some(game) = &args.game {
                engine.join_game(args.name.clone(), Some(GameId::from(game.as_str())));
            }
        }
        Step::Connection { to: ConnectionState::Disconnected, .. } => {
            println!("disconnected");
            return false;
        }
        Step::Applied("player_joined") if engine.local_player().is_none() => {
            // The server assigns ids; recognise ourselves by name.
            let me = engine
                .state()
                .players
                .iter()
                .find(|p| p.name == args.name)
                .map(|p| p.id.clone());
            if let Some(id) = me {
                tracing::info!(player_id = %id, "playing as");
                engine.set_local_player(Some(id));
            }
        }
        Step::TransportFailed(error) => eprintln!("connection failed: {error}"),
        Step::Rejected(error) => eprintln!("ignored a bad message from the server: {error}"),
        Step::Applied(_) | Step::Connection { .. } => {}
    }
    true
}

/// Handles one input line. Returns `false` when the user wants to quit.
fn on_line(engine: &mut Engine<WebSocketConnector>, args: &Args, line: &str) -> bool {
    let command = match parse_command(line) {
        Ok(command) => command,
        Err(error) => {
            eprintln!("{error}");
            return true;
        }
    };

    let sent = match command {
        Command::Join { game } => engine.join_game(args.name.clone(), game.map(GameId::from)),
        Command::Deal => engine.deal_cards(),
        Command::Select(id) => {
            match find_card(engine.state(), engine.local_player(), &id) {
                Some(card) => engine.select_card(Some(card)),
                None => eprintln!("no card '{id}' in your hand"),
            }
            return true;
        }
        Command::Unselect => {
            engine.select_card(None);
            return true;
        }
        Command::Play(id) => {
            let card = match id {
                Some(id) => find_card(engine.state(), engine.local_player(), &id),
                None => engine.selected_card().cloned(),
            };
            match card {
                Some(card) => engine.play_card(card),
                None => {
                    eprintln!("nothing to play: select a card or name one");
                    return true;
                }
            }
        }
        Command::Drop { card, x, y } => {
            match find_card(engine.state(), engine.local_player(), &card) {
                Some(card) => engine.drop_card_shared(card, Position::new(x, y)),
                None => {
                    eprintln!("no card '{card}' in your hand");
                    return true;
                }
            }
        }
        Command::Leave => engine.leave_game(),
        Command::Show => {
            print_table(&engine.view());
            return true;
        }
        Command::Help => {
            println!("{HELP}");
            return true;
        }
        Command::Quit => return false,
    };

    if !sent {
        eprintln!("not connected, command dropped");
    }
    true
}

/// Finds a card in the local hand, or in any hand while we don't know
/// who we are yet.
fn find_card(state: &GameState, me: Option<&PlayerId>, id: &str) -> Option<Card> {
    let id = CardId::from(id);
    state
        .players
        .iter()
        .filter(|p| me.is_none_or(|me| &p.id == me))
        .flat_map(|p| p.hand.iter())
        .find(|c| c.id == id)
        .cloned()
}

fn print_table(view: &StoreView<'_>) {
    let state = view.state;
    let game = state.game_id.as_ref().map_or("-", |id| id.as_str());
    println!("--- game {game} ({}) ---", state.phase);

    for player in &state.players {
        let turn = if state.current_player_id.as_ref() == Some(&player.id) { "*" } else { " " };
        let hand: Vec<String> = player.hand.iter().map(|c| format!("{}:{c}", c.id)).collect();
        println!("{turn} {} [{}] score {}: {}", player.name, player.id, player.score, hand.join(" "));
    }

    let table: Vec<String> = state.shared_zone.iter().map(ToString::to_string).collect();
    println!("  table: {}", table.join(" "));
    println!("  deck: {} cards, played: {}", state.deck.len(), state.played_cards.len());
    if let Some(card) = view.selected {
        println!("  selected: {card}");
    }
}
