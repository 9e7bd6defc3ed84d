//! Command Parsing
//!
//! Turns one line of the text protocol into a typed [`Command`] and renders
//! the reply line sent back to the client.

use std::time::Duration;

use thiserror::Error;

// == Command ==
/// A parsed client request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `SET key value [seconds]`. `ttl` is None when seconds were omitted.
    Set {
        key: String,
        value: Vec<u8>,
        ttl: Option<Duration>,
    },
    /// `GET key`
    Get { key: String },
    /// `DELETE key`
    Delete { key: String },
}

// == Command Error ==
/// Input errors. The `Display` text is the exact reply line.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("Error: SET format is 'SET key value [duration_seconds]'")]
    SetUsage,

    #[error("Error: Invalid duration, must be a number in seconds")]
    InvalidDuration,

    #[error("Error: GET format is 'GET key'")]
    GetUsage,

    #[error("Error: DELETE format is 'DELETE key'")]
    DeleteUsage,

    /// Carries the verb exactly as the client typed it
    #[error("Error: Unknown command '{0}'")]
    Unknown(String),

    /// The line exceeded the per-line byte limit and was discarded
    #[error("Error: Line too long")]
    LineTooLong,
}

impl Command {
    /// Parses a single line. Blank lines yield `Ok(None)`.
    ///
    /// Tokens are split on ASCII whitespace and the verb is case-insensitive.
    /// Values keep their raw bytes; keys are decoded as UTF-8, with invalid
    /// sequences replaced.
    pub fn parse(line: impl AsRef<[u8]>) -> Result<Option<Command>, CommandError> {
        let parts: Vec<&[u8]> = line
            .as_ref()
            .split(u8::is_ascii_whitespace)
            .filter(|token| !token.is_empty())
            .collect();
        let Some((verb, args)) = parts.split_first() else {
            return Ok(None);
        };

        let command = if verb.eq_ignore_ascii_case(b"SET") {
            match args {
                [key, value] => Command::Set {
                    key: decode_key(key),
                    value: value.to_vec(),
                    ttl: None,
                },
                [key, value, seconds] => Command::Set {
                    key: decode_key(key),
                    value: value.to_vec(),
                    ttl: Some(parse_seconds(seconds)?),
                },
                _ => return Err(CommandError::SetUsage),
            }
        } else if verb.eq_ignore_ascii_case(b"GET") {
            match args {
                [key] => Command::Get {
                    key: decode_key(key),
                },
                _ => return Err(CommandError::GetUsage),
            }
        } else if verb.eq_ignore_ascii_case(b"DELETE") {
            match args {
                [key] => Command::Delete {
                    key: decode_key(key),
                },
                _ => return Err(CommandError::DeleteUsage),
            }
        } else {
            return Err(CommandError::Unknown(decode_key(verb)));
        };

        Ok(Some(command))
    }
}

fn decode_key(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).into_owned()
}

/// Signed seconds; zero or negative means "never expires".
fn parse_seconds(raw: &[u8]) -> Result<Duration, CommandError> {
    let seconds: i64 = std::str::from_utf8(raw)
        .ok()
        .and_then(|text| text.parse().ok())
        .ok_or(CommandError::InvalidDuration)?;
    Ok(Duration::from_secs(seconds.max(0) as u64))
}

// == Reply ==
/// What the server writes back for one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Ok,
    Value(Vec<u8>),
    NotFound,
    Deleted(bool),
    Error(CommandError),
}

impl Reply {
    /// Renders the reply as a newline-terminated line.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = match self {
            Reply::Ok => b"OK".to_vec(),
            Reply::Value(value) => value.clone(),
            Reply::NotFound => b"Key not found".to_vec(),
            Reply::Deleted(true) => b"1".to_vec(),
            Reply::Deleted(false) => b"0".to_vec(),
            Reply::Error(err) => err.to_string().into_bytes(),
        };
        out.push(b'\n');
        out
    }
}

impl From<CommandError> for Reply {
    fn from(err: CommandError) -> Self {
        Reply::Error(err)
    }
}
