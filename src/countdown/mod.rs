//! Countdown module
//!
//! Command grammar, errors and the state machine that owns the countdown.

pub mod command;
pub mod engine;
pub mod error;

pub use command::{Command, StartRequest, DEFAULT_PER_TOKEN_SECONDS};
pub use engine::{CountdownEngine, TickOutcome, TICK_PERIOD};
pub use error::CountdownError;
