//! Text parsing module
//!
//! Duration strings and the `#countdown` chat command grammar.

pub mod command;
pub mod duration;

// Re-export main functions
pub use command::{is_command, parse_command, RawCommand, COMMAND_PREFIX};
pub use duration::{format_duration, parse_duration, parse_leading_duration, DurationError};
