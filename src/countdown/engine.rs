//! Countdown state machine
//!
//! The engine owns the one [`CountdownState`]. Every mutation, including
//! ticks, runs in two phases. The state is changed under the state lock and
//! the chat reply and overlay snapshot are captured; the state lock is then
//! released and the captured output is emitted. A second emit lock is held
//! across both phases so output still leaves in the order mutations were
//! applied, while subscribers and chat senders are free to read
//! [`CountdownEngine::snapshot`]. They must not issue commands of their own.

use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};
use tokio::runtime::Handle;
use tracing::{debug, error, info};

use crate::{
    overlay::OverlayPublisher,
    parsing::{format_duration, RawCommand},
    services::ChatSender,
    state::{
        countdown_state::{Ticker, DEFAULT_FINISH_MESSAGE},
        CountdownSnapshot, CountdownState,
    },
    tasks::countdown_tick_task,
};

use super::{
    command::{Command, StartRequest},
    error::CountdownError,
};

/// Real-time gap between two ticks
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// What a tick did to the countdown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Decremented, still running
    Continue,
    /// Reached zero and went idle
    Finished,
    /// The tick belonged to a countdown that was stopped or replaced
    Stale,
}

// Output of one mutation, emitted after the state lock is released
#[derive(Default)]
struct Emission {
    chat: Option<(String, String)>,
    snapshot: Option<CountdownSnapshot>,
}

impl Emission {
    fn chat(channel_id: &str, text: impl Into<String>) -> Self {
        Self {
            chat: Some((channel_id.to_string(), text.into())),
            snapshot: None,
        }
    }

    fn broadcast(mut self, snapshot: CountdownSnapshot) -> Self {
        self.snapshot = Some(snapshot);
        self
    }
}

pub struct CountdownEngine {
    state: Mutex<CountdownState>,
    emit: Mutex<()>,
    chat: Arc<dyn ChatSender>,
    publisher: Arc<OverlayPublisher>,
}

impl CountdownEngine {
    pub fn new(chat: Arc<dyn ChatSender>, publisher: Arc<OverlayPublisher>) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(CountdownState::new()),
            emit: Mutex::new(()),
            chat,
            publisher,
        })
    }

    /// Current state, for rendering before any update arrives
    pub fn snapshot(&self) -> CountdownSnapshot {
        self.lock_state().snapshot()
    }

    pub fn is_running(&self) -> bool {
        self.lock_state().is_running()
    }

    pub fn publisher(&self) -> &Arc<OverlayPublisher> {
        &self.publisher
    }

    /// Execute a chat command, replying to `channel_id`.
    ///
    /// Validation and state errors become chat replies; nothing is returned
    /// to the caller.
    pub fn handle_command(self: &Arc<Self>, channel_id: &str, raw: &RawCommand) {
        let result = Command::try_from(raw).and_then(|command| {
            info!("Countdown command '{}' on channel {}", raw.verb, channel_id);
            self.execute(channel_id, command)
        });

        if let Err(e) = result {
            if e.is_usage() {
                debug!("Malformed countdown command '{}': {:?}", raw.verb, e);
            } else {
                info!("Countdown command '{}' rejected: {}", raw.verb, e);
            }
            let _emit = self.lock_emit();
            self.chat.send_chat(channel_id, &e.to_string());
        }
    }

    /// Apply a validated command.
    pub fn execute(
        self: &Arc<Self>,
        channel_id: &str,
        command: Command,
    ) -> Result<(), CountdownError> {
        match command {
            Command::Start(request) => {
                self.start(channel_id, request);
                Ok(())
            }
            Command::Add(seconds) => self.add(channel_id, seconds).map(|_| ()),
            Command::Set(seconds) => {
                self.set(channel_id, seconds);
                Ok(())
            }
            Command::Stop => self.stop(channel_id),
            Command::Status => {
                self.status(channel_id);
                Ok(())
            }
        }
    }

    /// Start a countdown, replacing any running one.
    ///
    /// A zero duration finishes immediately and leaves the engine idle. A
    /// non-zero duration needs a Tokio runtime for its ticker; without one
    /// the request is logged and dropped.
    pub fn start(self: &Arc<Self>, channel_id: &str, request: StartRequest) {
        let _emit = self.lock_emit();
        let emission = {
            let mut state = self.lock_state();
            self.start_locked(&mut state, channel_id, request)
        };
        self.emit(emission);
    }

    fn start_locked(
        self: &Arc<Self>,
        state: &mut CountdownState,
        channel_id: &str,
        request: StartRequest,
    ) -> Emission {
        let runtime = match Handle::try_current() {
            Ok(runtime) => Some(runtime),
            Err(_) if request.seconds == 0 => None,
            Err(e) => {
                error!("Cannot start countdown outside a Tokio runtime: {}", e);
                return Emission::default();
            }
        };

        if state.cancel_ticker() {
            info!("Replacing running countdown");
        }

        state.remaining_seconds = request.seconds;
        state.channel_id = Some(channel_id.to_string());
        state.per_token_increment_seconds = request.per_token_seconds;
        state.finish_message = if request.finish_message.is_empty() {
            DEFAULT_FINISH_MESSAGE.to_string()
        } else {
            request.finish_message
        };
        state.touch();

        let Some(runtime) = runtime.filter(|_| state.remaining_seconds > 0) else {
            info!("Countdown started at zero; finishing immediately");
            return Emission::chat(channel_id, state.finish_message.clone())
                .broadcast(state.snapshot());
        };

        state.generation += 1;
        let generation = state.generation;
        let handle = runtime.spawn(countdown_tick_task(
            Arc::downgrade(self),
            generation,
            TICK_PERIOD,
        ));
        state.ticker = Some(Ticker { generation, handle });

        info!(
            "Countdown running: {}s, {}s per token",
            state.remaining_seconds, state.per_token_increment_seconds
        );
        Emission::chat(
            channel_id,
            format!("Countdown started: {}", format_duration(state.remaining_seconds)),
        )
        .broadcast(state.snapshot())
    }

    /// Extend the running countdown. Returns the new remaining seconds.
    pub fn add(&self, channel_id: &str, seconds: u64) -> Result<u64, CountdownError> {
        let _emit = self.lock_emit();
        let (remaining, emission) = {
            let mut state = self.lock_state();
            if !state.is_running() {
                return Err(CountdownError::NothingToExtend);
            }

            state.remaining_seconds = state.remaining_seconds.saturating_add(seconds);
            state.touch();

            let emission = Emission::chat(
                channel_id,
                format!("Countdown updated: {}", format_duration(state.remaining_seconds)),
            )
            .broadcast(state.snapshot());
            (state.remaining_seconds, emission)
        };
        self.emit(emission);
        Ok(remaining)
    }

    /// Overwrite the remaining time, or start a plain countdown when idle.
    pub fn set(self: &Arc<Self>, channel_id: &str, seconds: u64) {
        let _emit = self.lock_emit();
        let emission = {
            let mut state = self.lock_state();
            if state.is_running() {
                state.remaining_seconds = seconds;
                state.touch();

                Emission::chat(
                    channel_id,
                    format!("Countdown set: {}", format_duration(state.remaining_seconds)),
                )
                .broadcast(state.snapshot())
            } else {
                self.start_locked(&mut state, channel_id, StartRequest::plain(seconds))
            }
        };
        self.emit(emission);
    }

    pub fn stop(&self, channel_id: &str) -> Result<(), CountdownError> {
        let _emit = self.lock_emit();
        let emission = {
            let mut state = self.lock_state();
            if !state.cancel_ticker() {
                return Err(CountdownError::NothingToStop);
            }
            state.touch();

            info!("Countdown stopped with {}s remaining", state.remaining_seconds);
            Emission::chat(channel_id, "Countdown stopped").broadcast(state.snapshot())
        };
        self.emit(emission);
        Ok(())
    }

    /// Report the remaining time to chat. Read-only, nothing is broadcast.
    pub fn status(&self, channel_id: &str) {
        let _emit = self.lock_emit();
        let reply = {
            let state = self.lock_state();
            if state.is_running() {
                format!("Countdown: {}", format_duration(state.remaining_seconds))
            } else {
                "No active countdown.".to_string()
            }
        };
        self.chat.send_chat(channel_id, &reply);
    }

    /// Extend the countdown from a tip. Returns whether the tip applied.
    ///
    /// Tips for other channels, non-positive or non-finite amounts, and tips
    /// while idle or with a zero increment are ignored silently.
    pub fn apply_tip(&self, channel_id: &str, amount: f64) -> bool {
        let _emit = self.lock_emit();
        let snapshot = {
            let mut state = self.lock_state();

            let applies = state.is_running()
                && state.channel_id.as_deref() == Some(channel_id)
                && state.per_token_increment_seconds > 0
                && amount.is_finite()
                && amount > 0.0;
            if !applies {
                debug!("Ignoring tip of {} on channel {}", amount, channel_id);
                return false;
            }

            // Float-to-int `as` saturates, so huge tips clamp instead of wrapping.
            let extra = (amount * state.per_token_increment_seconds as f64).round() as u64;
            state.remaining_seconds = state.remaining_seconds.saturating_add(extra);
            state.touch();

            debug!("Tip of {} added {}s", amount, extra);
            state.snapshot()
        };
        self.emit(Emission::default().broadcast(snapshot));
        true
    }

    /// One decrement on behalf of the ticker of `generation`.
    pub fn tick(&self, generation: u64) -> TickOutcome {
        let _emit = self.lock_emit();
        let (outcome, emission) = {
            let mut state = self.lock_state();
            if !state.is_current(generation) {
                return TickOutcome::Stale;
            }

            state.remaining_seconds = state.remaining_seconds.saturating_sub(1);
            state.touch();

            if state.remaining_seconds > 0 {
                (
                    TickOutcome::Continue,
                    Emission::default().broadcast(state.snapshot()),
                )
            } else {
                // The ticker task calling us exits on `Finished`; dropping the
                // handle instead of aborting lets it return normally.
                state.ticker = None;
                info!("Countdown finished");
                let emission = match state.channel_id.as_deref() {
                    Some(channel_id) => Emission::chat(channel_id, state.finish_message.clone()),
                    None => Emission::default(),
                };
                (TickOutcome::Finished, emission.broadcast(state.snapshot()))
            }
        };
        self.emit(emission);
        outcome
    }

    // Callers hold the emit lock and no longer hold the state lock.
    fn emit(&self, emission: Emission) {
        if let Some((channel_id, text)) = emission.chat {
            self.chat.send_chat(&channel_id, &text);
        }
        if let Some(snapshot) = emission.snapshot {
            self.publisher.publish(&snapshot);
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, CountdownState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_emit(&self) -> MutexGuard<'_, ()> {
        self.emit.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for CountdownEngine {
    fn drop(&mut self) {
        self.state
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .cancel_ticker();
    }
}
