/// A line typed at the prompt.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Join { game: Option<String> },
    Deal,
    Select(String),
    Unselect,
    Play(Option<String>),
    Drop { card: String, x: f64, y: f64 },
    Leave,
    Show,
    Help,
    Quit,
}

/// Errors that can occur while parsing a line.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("'{0}' needs a card id (e.g. '{0} c12')")]
    MissingCard(&'static str),

    #[error("invalid position '{0}', expected 'drop CARD X Y'")]
    InvalidPosition(String),

    #[error("unrecognized command '{0}', type 'help' for a list")]
    Unrecognized(String),
}

pub const HELP: &str = "\
commands:
  join [GAME]        join GAME, or start a new game
  deal               ask the server to deal
  select CARD        select a card from your hand
  unselect           clear the selection
  play [CARD]        play CARD, or the selected card
  drop CARD X Y      drop CARD on the table at (X, Y)
  leave              leave the game
  show               print the table
  help               print this list
  quit               disconnect and exit";

/// Parses one input line.
pub fn parse_command(input: &str) -> Result<Command, ParseError> {
    let mut words = input.split_whitespace();
    let Some(head) = words.next() else {
        return Ok(Command::Show);
    };
    let arg = words.next().map(str::to_string);

    match head {
        "join" => Ok(Command::Join { game: arg }),
        "deal" => Ok(Command::Deal),
        "select" => arg.map(Command::Select).ok_or(ParseError::MissingCard("select")),
        "unselect" => Ok(Command::Unselect),
        "play" => Ok(Command::Play(arg)),
        "drop" => {
            let card = arg.ok_or(ParseError::MissingCard("drop"))?;
            let mut coord = || {
                let raw = words.next().unwrap_or_default();
                raw.parse::<f64>()
                    .map_err(|_| ParseError::InvalidPosition(raw.to_string()))
            };
            let x = coord()?;
            let y = coord()?;
            Ok(Command::Drop { card, x, y })
        }
        "leave" => Ok(Command::Leave),
        "show" => Ok(Command::Show),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        other => Err(ParseError::Unrecognized(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_commands() {
        assert_eq!(parse_command("deal"), Ok(Command::Deal));
        assert_eq!(parse_command("  leave  "), Ok(Command::Leave));
        assert_eq!(parse_command("exit"), Ok(Command::Quit));
        assert_eq!(parse_command(""), Ok(Command::Show));
    }

    #[test]
    fn test_join_with_and_without_game() {
        assert_eq!(parse_command("join"), Ok(Command::Join { game: None }));
        assert_eq!(
            parse_command("join g42"),
            Ok(Command::Join { game: Some("g42".into()) })
        );
    }

    #[test]
    fn test_card_commands() {
        assert_eq!(parse_command("select c3"), Ok(Command::Select("c3".into())));
        assert_eq!(parse_command("select"), Err(ParseError::MissingCard("select")));
        assert_eq!(parse_command("play"), Ok(Command::Play(None)));
        assert_eq!(parse_command("play c3"), Ok(Command::Play(Some("c3".into()))));
    }

    #[test]
    fn test_drop_parses_position() {
        assert_eq!(
            parse_command("drop c3 10 -2.5"),
            Ok(Command::Drop { card: "c3".into(), x: 10.0, y: -2.5 })
        );
        assert_eq!(
            parse_command("drop c3 ten 1"),
            Err(ParseError::InvalidPosition("ten".into()))
        );
        assert_eq!(parse_command("drop c3 1"), Err(ParseError::InvalidPosition(String::new())));
    }

    #[test]
    fn test_unrecognized_command() {
        let err = parse_command("shuffle").unwrap_err();
        assert_eq!(err, ParseError::Unrecognized("shuffle".into()));
        assert!(err.to_string().contains("help"));
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            ParseError::MissingCard("play").to_string(),
            "'play' needs a card id (e.g. 'play c12')"
        );
        assert_eq!(
            ParseError::InvalidPosition("ten".into()).to_string(),
            "invalid position 'ten', expected 'drop CARD X Y'"
        );
        let boxed: Box<dyn std::error::Error> = Box::new(ParseError::Unrecognized("x".into()));
        assert!(boxed.source().is_none());
    }
}
