//! Input Feeder Module
//!
//! Parses line-oriented commands that drive a cache from a text stream.

use std::str::FromStr;

use thiserror::Error;

// == Command ==
/// One parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `put <key> <value...>`; the value is the rest of the line
    Put { key: String, value: String },
    /// `get <key>`
    Get { key: String },
    /// `del <key>`
    Delete { key: String },
    /// `print`: list entries in sequence order
    Print,
    /// `clear`
    Clear,
    /// `encrypt`
    Encrypt,
    /// `decrypt`
    Decrypt,
    /// `stats` or `stats json`
    Stats { json: bool },
    /// `quit` or `exit`
    Quit,
}

// == Feed Error ==
/// Reasons an input line could not be parsed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FeedError {
    #[error("unknown command '{0}'")]
    UnknownCommand(String),

    #[error("'{command}' expects {expected}")]
    MissingArgument {
        command: &'static str,
        expected: &'static str,
    },

    #[error("'{0}' takes no arguments")]
    UnexpectedArgument(&'static str),
}

/// Parses one line. Blank lines and `#` comments yield `Ok(None)`.
pub fn parse_line(line: &str) -> Result<Option<Command>, FeedError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    line.parse().map(Some)
}

impl FromStr for Command {
    type Err = FeedError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };

        match verb.to_ascii_lowercase().as_str() {
            "put" | "set" => {
                let (key, value) = rest
                    .split_once(char::is_whitespace)
                    .map(|(k, v)| (k, v.trim()))
                    .ok_or(FeedError::MissingArgument {
                        command: "put",
                        expected: "a key and a value",
                    })?;
                Ok(Command::Put {
                    key: key.to_string(),
                    value: value.to_string(),
                })
            }
            "get" => single_key(rest, "get").map(|key| Command::Get { key }),
            "del" | "delete" => single_key(rest, "del").map(|key| Command::Delete { key }),
            "print" => no_args(rest, "print", Command::Print),
            "clear" => no_args(rest, "clear", Command::Clear),
            "encrypt" => no_args(rest, "encrypt", Command::Encrypt),
            "decrypt" => no_args(rest, "decrypt", Command::Decrypt),
            "stats" => match rest {
                "" => Ok(Command::Stats { json: false }),
                "json" => Ok(Command::Stats { json: true }),
                _ => Err(FeedError::UnexpectedArgument("stats")),
            },
            "quit" | "exit" => no_args(rest, "quit", Command::Quit),
            other => Err(FeedError::UnknownCommand(other.to_string())),
        }
    }
}

fn single_key(rest: &str, command: &'static str) -> Result<String, FeedError> {
    let mut words = rest.split_whitespace();
    match (words.next(), words.next()) {
        (Some(key), None) => Ok(key.to_string()),
        (None, _) => Err(FeedError::MissingArgument {
            command,
            expected: "a key",
        }),
        (Some(_), Some(_)) => Err(FeedError::UnexpectedArgument(command)),
    }
}

fn no_args(rest: &str, command: &'static str, parsed: Command) -> Result<Command, FeedError> {
    if rest.is_empty() {
        Ok(parsed)
    } else {
        Err(FeedError::UnexpectedArgument(command))
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_put_keeps_value_spaces() {
        assert_eq!(
            parse_line("put user:1  Ada Lovelace ").unwrap(),
            Some(Command::Put {
                key: "user:1".to_string(),
                value: "Ada Lovelace".to_string()
            })
        );
    }

    #[test]
    fn test_parse_put_missing_value() {
        assert_eq!(
            parse_line("put onlykey"),
            Err(FeedError::MissingArgument {
                command: "put",
                expected: "a key and a value"
            })
        );
    }

    #[test]
    fn test_parse_get_and_delete() {
        assert_eq!(
            parse_line("GET k").unwrap(),
            Some(Command::Get {
                key: "k".to_string()
            })
        );
        assert_eq!(
            parse_line("del k").unwrap(),
            Some(Command::Delete {
                key: "k".to_string()
            })
        );
        assert_eq!(
            parse_line("get a b"),
            Err(FeedError::UnexpectedArgument("get"))
        );
        assert!(matches!(
            parse_line("get"),
            Err(FeedError::MissingArgument { command: "get", .. })
        ));
    }

    #[test]
    fn test_parse_no_arg_commands() {
        assert_eq!(parse_line("print").unwrap(), Some(Command::Print));
        assert_eq!(parse_line("clear").unwrap(), Some(Command::Clear));
        assert_eq!(parse_line("encrypt").unwrap(), Some(Command::Encrypt));
        assert_eq!(parse_line("decrypt").unwrap(), Some(Command::Decrypt));
        assert_eq!(parse_line("exit").unwrap(), Some(Command::Quit));
        assert_eq!(
            parse_line("clear now"),
            Err(FeedError::UnexpectedArgument("clear"))
        );
    }

    #[test]
    fn test_parse_stats() {
        assert_eq!(
            parse_line("stats").unwrap(),
            Some(Command::Stats { json: false })
        );
        assert_eq!(
            parse_line("stats json").unwrap(),
            Some(Command::Stats { json: true })
        );
    }

    #[test]
    fn test_parse_blank_and_comment() {
        assert_eq!(parse_line("").unwrap(), None);
        assert_eq!(parse_line("   ").unwrap(), None);
        assert_eq!(parse_line("# warm up").unwrap(), None);
    }

    #[test]
    fn test_parse_unknown() {
        assert_eq!(
            parse_line("flush"),
            Err(FeedError::UnknownCommand("flush".to_string()))
        );
    }
}
