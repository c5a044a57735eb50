//! REPL line parser.
//!
//! One line is one request: either an engine [`Command`] for whoever holds
//! the turn, or a local view request that never touches the session.

use dialogue::{Command, StatementId};

/// Parsed REPL line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Command(Command),
    Tree,
    History,
    Status,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("empty input")]
    Empty,

    #[error("unknown command '{0}' (try 'help')")]
    UnknownCommand(String),

    #[error("'{command}' needs {what}")]
    MissingArgument {
        command: &'static str,
        what: &'static str,
    },

    #[error("'{0}' is not a statement id")]
    BadId(String),
}

pub const HELP: &str = "\
Moves:
  challenge [id]     challenge a statement (no id: pick the target next)
  rebut [id]         rebut a statement (no id: pick the target next)
  target <id>        pick the target of a challenge or rebut
  justify <id>...    answer a challenge with one or more candidates
  rebuttal <text>    submit the text of the pending rebuttal
  skip               pass the turn
  accept             concede and end the dialogue
Views:
  tree               the argument tree so far
  history            every move so far
  status             turn, phase, quotas and clock
  help               this text
  quit               abandon the dialogue and exit";

/// Parse one line of user input.
pub fn parse_line(line: &str) -> Result<Input, ParseError> {
    let line = line.trim();
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };
    if verb.is_empty() {
        return Err(ParseError::Empty);
    }

    let input = match verb.to_ascii_lowercase().as_str() {
        "challenge" | "c" => Input::Command(Command::Challenge {
            target: optional_id(rest)?,
        }),
        "rebut" | "r" => Input::Command(Command::Rebut {
            target: optional_id(rest)?,
        }),
        "target" | "t" => {
            let target = optional_id(rest)?.ok_or(ParseError::MissingArgument {
                command: "target",
                what: "a statement id",
            })?;
            Input::Command(Command::SelectTarget { target })
        }
        "justify" | "j" => {
            let selection = rest
                .split(|c: char| c.is_whitespace() || c == ',')
                .filter(|s| !s.is_empty())
                .map(parse_id)
                .collect::<Result<Vec<_>, _>>()?;
            if selection.is_empty() {
                return Err(ParseError::MissingArgument {
                    command: "justify",
                    what: "one or more candidate ids",
                });
            }
            Input::Command(Command::Justify { selection })
        }
        "rebuttal" | "say" => {
            if rest.is_empty() {
                return Err(ParseError::MissingArgument {
                    command: "rebuttal",
                    what: "some text",
                });
            }
            Input::Command(Command::SubmitRebuttal {
                text: rest.to_string(),
            })
        }
        "skip" => Input::Command(Command::Skip),
        "accept" => Input::Command(Command::Accept),
        "tree" => Input::Tree,
        "history" | "log" => Input::History,
        "status" => Input::Status,
        "help" | "?" => Input::Help,
        "quit" | "exit" | "q" => Input::Quit,
        other => return Err(ParseError::UnknownCommand(other.to_string())),
    };
    Ok(input)
}

fn optional_id(rest: &str) -> Result<Option<StatementId>, ParseError> {
    match rest.split_whitespace().next() {
        Some(token) => parse_id(token).map(Some),
        None => Ok(None),
    }
}

fn parse_id(token: &str) -> Result<StatementId, ParseError> {
    token
        .trim_start_matches('#')
        .parse::<i64>()
        .map(StatementId)
        .map_err(|_| ParseError::BadId(token.to_string()))
}
