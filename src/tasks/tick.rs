//! Countdown ticker background task

use std::{sync::Weak, time::Duration};
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::debug;

use crate::countdown::{CountdownEngine, TickOutcome};

/// Decrement the countdown once per `period` until it finishes or is replaced.
///
/// Holds only a weak engine reference so a dropped engine ends the task. The
/// generation check inside [`CountdownEngine::tick`] makes a stop or restart
/// take effect even if this task is woken before its abort lands.
pub async fn countdown_tick_task(engine: Weak<CountdownEngine>, generation: u64, period: Duration) {
    debug!("Starting countdown ticker (generation {})", generation);

    let mut interval = interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        interval.tick().await;

        let Some(engine) = engine.upgrade() else {
            debug!("Countdown engine dropped, ticker exiting");
            break;
        };

        match engine.tick(generation) {
            TickOutcome::Continue => {}
            TickOutcome::Finished => {
                debug!("Countdown ticker finished (generation {})", generation);
                break;
            }
            TickOutcome::Stale => {
                debug!("Stale countdown ticker exiting (generation {})", generation);
                break;
            }
        }
    }
}
