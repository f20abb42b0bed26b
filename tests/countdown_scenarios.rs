//! End-to-end countdown scenarios driven through gateway events

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};
use tokio::time::sleep;

use chat_countdown::{
    countdown::CountdownEngine,
    gateway::{EventDispatcher, InboundEvent},
    overlay::{OverlayPublisher, Subscription},
    services::MemoryChatSender,
    state::CountdownSnapshot,
};

const CHANNEL: &str = "stream-42";

struct Scenario {
    dispatcher: EventDispatcher,
    engine: Arc<CountdownEngine>,
    chat: Arc<MemoryChatSender>,
    broadcasts: Arc<Mutex<Vec<CountdownSnapshot>>>,
    _subscription: Subscription,
}

impl Scenario {
    fn new() -> Self {
        let chat = Arc::new(MemoryChatSender::new());
        let publisher = Arc::new(OverlayPublisher::new());
        let broadcasts = Arc::new(Mutex::new(Vec::new()));
        let subscription = {
            let broadcasts = Arc::clone(&broadcasts);
            publisher.subscribe(move |s| broadcasts.lock().unwrap().push(s.clone()))
        };
        let engine = CountdownEngine::new(chat.clone(), publisher);

        Self {
            dispatcher: EventDispatcher::new(Arc::clone(&engine)),
            engine,
            chat,
            broadcasts,
            _subscription: subscription,
        }
    }

    fn moderator_says(&self, text: &str) {
        self.say(text, true);
    }

    fn viewer_says(&self, text: &str) {
        self.say(text, false);
    }

    fn say(&self, text: &str, moderator: bool) {
        self.dispatcher.dispatch(InboundEvent::ChatMessage {
            channel_id: CHANNEL.to_string(),
            text: text.to_string(),
            author_is_moderator: moderator,
            author_is_owner: false,
        });
    }

    fn tip(&self, amount: f64) {
        self.dispatcher.dispatch(InboundEvent::Tip {
            channel_id: CHANNEL.to_string(),
            amount,
        });
    }

    fn broadcasts(&self) -> Vec<CountdownSnapshot> {
        self.broadcasts.lock().unwrap().clone()
    }
}

#[tokio::test(start_paused = true)]
async fn test_countdown_runs_to_finish_message() {
    let s = Scenario::new();
    s.moderator_says("#countdown start 5 | Done!");

    assert_eq!(s.chat.texts(), vec!["Countdown started: 5s"]);
    assert_eq!(s.broadcasts().len(), 1);

    sleep(Duration::from_millis(4500)).await;
    assert_eq!(s.chat.texts(), vec!["Countdown started: 5s"]);
    assert_eq!(s.engine.snapshot().remaining_seconds, 1);

    sleep(Duration::from_secs(1)).await;
    assert_eq!(s.chat.texts(), vec!["Countdown started: 5s", "Done!"]);
    assert!(!s.engine.is_running());

    let remaining: Vec<u64> = s.broadcasts().iter().map(|b| b.remaining_seconds).collect();
    assert_eq!(remaining, vec![5, 4, 3, 2, 1, 0]);
    let last = s.broadcasts().last().cloned().unwrap();
    assert!(!last.running);
    assert_eq!(last.formatted_remaining, "0s");

    // Nothing fires after the end.
    sleep(Duration::from_secs(10)).await;
    assert_eq!(s.chat.texts().len(), 2);
    assert_eq!(s.broadcasts().len(), 6);
}

#[tokio::test(start_paused = true)]
async fn test_stop_wins_over_pending_tick() {
    let s = Scenario::new();
    s.moderator_says("#countdown start 10 | Never");

    sleep(Duration::from_millis(2500)).await;
    s.moderator_says("#countdown stop");
    assert_eq!(s.engine.snapshot().remaining_seconds, 8);

    sleep(Duration::from_secs(20)).await;
    assert_eq!(s.engine.snapshot().remaining_seconds, 8);
    assert_eq!(
        s.chat.texts(),
        vec!["Countdown started: 10s", "Countdown stopped"]
    );
    // start, two ticks, stop
    assert_eq!(s.broadcasts().len(), 4);
}

#[tokio::test(start_paused = true)]
async fn test_restart_keeps_a_single_ticker() {
    let s = Scenario::new();
    s.moderator_says("#countdown start 10");
    sleep(Duration::from_millis(1500)).await;
    s.moderator_says("#countdown start 3 | Again");

    sleep(Duration::from_millis(3500)).await;
    assert!(!s.engine.is_running());
    assert_eq!(
        s.chat.texts(),
        vec!["Countdown started: 10s", "Countdown started: 3s", "Again"]
    );

    let remaining: Vec<u64> = s.broadcasts().iter().map(|b| b.remaining_seconds).collect();
    assert_eq!(remaining, vec![10, 9, 3, 2, 1, 0]);
}

#[tokio::test(start_paused = true)]
async fn test_tip_extension_is_silent() {
    let s = Scenario::new();
    s.moderator_says("#countdown start 10 | 2 | Done");
    let chat_before = s.chat.texts();
    let broadcasts_before = s.broadcasts().len();

    s.tip(3.0);

    assert_eq!(s.engine.snapshot().remaining_seconds, 16);
    assert_eq!(s.chat.texts(), chat_before);
    assert_eq!(s.broadcasts().len(), broadcasts_before + 1);
}

#[tokio::test(start_paused = true)]
async fn test_add_while_idle_changes_nothing() {
    let s = Scenario::new();
    let before = s.engine.snapshot();

    s.moderator_says("#countdown add 30");

    assert_eq!(s.chat.texts().len(), 1);
    assert!(s.chat.texts()[0].starts_with("No active countdown to add time to."));
    assert!(s.broadcasts().is_empty());
    assert_eq!(s.engine.snapshot().remaining_seconds, before.remaining_seconds);
    assert!(!s.engine.is_running());
}

#[tokio::test(start_paused = true)]
async fn test_viewer_commands_have_no_effect() {
    let s = Scenario::new();
    s.viewer_says("#countdown stop");
    s.viewer_says("#countdown start 10");
    assert!(s.chat.sent().is_empty());
    assert!(s.broadcasts().is_empty());

    s.moderator_says("#countdown start 10");
    s.viewer_says("#countdown stop");
    s.viewer_says("#countdown add nonsense");

    assert!(s.engine.is_running());
    assert_eq!(s.chat.texts(), vec!["Countdown started: 10s"]);
    assert_eq!(s.broadcasts().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_ticks_broadcast_once_per_second_without_chat() {
    let s = Scenario::new();
    s.moderator_says("#countdown start 1m");

    sleep(Duration::from_millis(10_500)).await;

    assert_eq!(s.chat.texts(), vec!["Countdown started: 1m"]);
    assert_eq!(s.broadcasts().len(), 11);
    assert_eq!(s.engine.snapshot().remaining_seconds, 50);
    assert_eq!(s.engine.snapshot().formatted_remaining, "50s");
}
