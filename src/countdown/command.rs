//! Verb-level command grammar

use crate::parsing::{parse_duration, parse_leading_duration, RawCommand};

use super::error::CountdownError;

/// Seconds added per tip token when a start command does not name one
pub const DEFAULT_PER_TOKEN_SECONDS: u64 = 1;

/// Parameters of a new countdown
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartRequest {
    pub seconds: u64,
    pub per_token_seconds: u64,
    pub finish_message: String,
}

impl StartRequest {
    /// A countdown with the default tip increment and finish message.
    pub fn plain(seconds: u64) -> Self {
        Self {
            seconds,
            per_token_seconds: DEFAULT_PER_TOKEN_SECONDS,
            finish_message: String::new(),
        }
    }

    /// Parse the argument text of `start`.
    ///
    /// `duration | per_token | message`, `duration | message` or a bare
    /// duration. Extra pipes after the per-token field belong to the message.
    pub fn parse(argument: &str) -> Result<Self, CountdownError> {
        if argument.contains('|') {
            let parts: Vec<&str> = argument.split('|').collect();
            let seconds =
                parse_duration(parts[0].trim()).map_err(|_| CountdownError::StartUsage)?;

            if parts.len() >= 3 {
                let per_token_seconds =
                    parse_duration(parts[1].trim()).map_err(|_| CountdownError::StartUsage)?;
                return Ok(Self {
                    seconds,
                    per_token_seconds,
                    finish_message: parts[2..].join("|").trim().to_string(),
                });
            }

            return Ok(Self {
                seconds,
                per_token_seconds: DEFAULT_PER_TOKEN_SECONDS,
                finish_message: parts[1].trim().to_string(),
            });
        }

        let (seconds, consumed) =
            parse_leading_duration(argument).map_err(|_| CountdownError::StartUsage)?;
        if !argument[consumed..].trim().is_empty() {
            return Err(CountdownError::StartUsage);
        }
        Ok(Self::plain(seconds))
    }
}

/// A validated countdown command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start(StartRequest),
    Add(u64),
    Set(u64),
    Stop,
    Status,
}

impl TryFrom<&RawCommand> for Command {
    type Error = CountdownError;

    fn try_from(raw: &RawCommand) -> Result<Self, Self::Error> {
        match raw.verb.as_str() {
            "start" => StartRequest::parse(&raw.argument).map(Command::Start),
            "add" => parse_duration(&raw.argument)
                .map(Command::Add)
                .map_err(|_| CountdownError::AddUsage),
            "set" => parse_duration(&raw.argument)
                .map(Command::Set)
                .map_err(|_| CountdownError::SetUsage),
            "stop" => Ok(Command::Stop),
            "status" => Ok(Command::Status),
            other => Err(CountdownError::UnknownVerb(other.to_string())),
        }
    }
}
