//! Lifecycle tests for the price watcher.
//!
//! The actor is driven against a stubbed marketplace API, so these cover the
//! full poll → state → alert pipeline without network access: trend
//! computation, bounded history, threshold alerting, login ordering and
//! cancellation.

use std::collections::VecDeque;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures_util::StreamExt;
use rust_decimal::Decimal;
use tokio::time::timeout;

use floorwatch::prelude::*;

const TEST_TIMEOUT: Duration = Duration::from_secs(5);

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn project(price: &str) -> Project {
    Project {
        id: "p1".into(),
        name: "Test Project".into(),
        img_url: String::new(),
        floor_price: dec(price),
        last_trade_price: dec(price),
    }
}

/// Poll interval far beyond the test horizon: only the initial poll and
/// explicitly commanded polls run.
fn test_config() -> WatchConfig {
    WatchConfig {
        tab_id: "tab-1".into(),
        project_id: "p1".into(),
        poll_interval: Duration::from_secs(3600),
        history_cap: 24,
        alert: AlertConfig {
            enabled: true,
            minimum_price: "120".into(),
        },
    }
}

// ─── Stub marketplace API ────────────────────────────────────────────────────

#[derive(Default)]
struct StubApi {
    fetches: Mutex<VecDeque<Result<Project, SdkError>>>,
    login_result: Mutex<Option<LoginData>>,
    token: Mutex<Option<String>>,
    login_calls: AtomicUsize,
    /// Token held by the stub at the moment of each fetch call.
    fetch_tokens: Mutex<Vec<Option<String>>>,
}

impl StubApi {
    fn queue_price(&self, price: &str) {
        self.fetches.lock().unwrap().push_back(Ok(project(price)));
    }

    fn queue_err(&self, err: SdkError) {
        self.fetches.lock().unwrap().push_back(Err(err));
    }

    fn grant_login(&self, user_id: &str, token: &str) {
        *self.login_result.lock().unwrap() = Some(LoginData {
            user_id: user_id.into(),
            access_token: token.into(),
            expires_in: 3600,
        });
    }
}

impl MarketApi for StubApi {
    async fn fetch(&self, _tab_id: &TabId, _project_id: &ProjectId) -> Result<Project, SdkError> {
        self.fetch_tokens
            .lock()
            .unwrap()
            .push(self.token.lock().unwrap().clone());
        self.fetches
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(SdkError::Other("stub exhausted".into())))
    }

    async fn login(&self, _account: &str, _password: &str) -> Result<LoginData, SdkError> {
        self.login_calls.fetch_add(1, Ordering::SeqCst);
        match self.login_result.lock().unwrap().clone() {
            Some(data) => {
                *self.token.lock().unwrap() = Some(data.access_token.clone());
                Ok(data)
            }
            None => Err(SdkError::Auth(AuthError::LoginFailed("bad credentials".into()))),
        }
    }
}

// ─── Recording notifier ──────────────────────────────────────────────────────

struct RecordingNotifier {
    granted: bool,
    notifications: Mutex<Vec<(String, String)>>,
    feedbacks: AtomicUsize,
}

impl RecordingNotifier {
    fn granted() -> Arc<Self> {
        Arc::new(Self {
            granted: true,
            notifications: Mutex::new(Vec::new()),
            feedbacks: AtomicUsize::new(0),
        })
    }

    fn denied() -> Arc<Self> {
        Arc::new(Self {
            granted: false,
            notifications: Mutex::new(Vec::new()),
            feedbacks: AtomicUsize::new(0),
        })
    }
}

impl Notifier for RecordingNotifier {
    fn request_permission(&self) -> bool {
        self.granted
    }

    fn notify(&self, title: &str, body: &str) {
        self.notifications
            .lock()
            .unwrap()
            .push((title.to_string(), body.to_string()));
    }

    fn feedback(&self) {
        self.feedbacks.fetch_add(1, Ordering::SeqCst);
    }
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

/// Wait for the next event matching the predicate, ignoring others.
async fn next_matching(
    events: &mut (impl futures_util::Stream<Item = WatchEvent> + Unpin),
    predicate: impl Fn(&WatchEvent) -> bool,
) -> WatchEvent {
    timeout(TEST_TIMEOUT, async {
        while let Some(ev) = events.next().await {
            if predicate(&ev) {
                return ev;
            }
        }
        panic!("event stream ended without a matching event");
    })
    .await
    .expect("timed out waiting for matching event")
}

async fn next_price_update(
    events: &mut (impl futures_util::Stream<Item = WatchEvent> + Unpin),
) -> (PriceSnapshot, Trend) {
    match next_matching(events, |ev| matches!(ev, WatchEvent::PriceUpdated { .. })).await {
        WatchEvent::PriceUpdated { snapshot, trend } => (snapshot, trend),
        _ => unreachable!(),
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_threshold_crossing_fires_alert() {
    let api = Arc::new(StubApi::default());
    api.queue_price("150.00");
    api.queue_price("110.00");
    let notifier = RecordingNotifier::granted();
    let store = Arc::new(MemoryStore::new());

    let mut watcher = Watcher::spawn(
        Arc::clone(&api),
        test_config(),
        Arc::clone(&notifier),
        Arc::clone(&store),
    );

    {
        let mut events = watcher.events();

        let (first, trend) = next_price_update(&mut events).await;
        assert_eq!(first.floor_price, dec("150.00"));
        assert_eq!(trend, Trend::Flat);

        watcher.refresh().unwrap();
        let (second, trend) = next_price_update(&mut events).await;
        assert_eq!(second.floor_price, dec("110.00"));
        assert_eq!(trend, Trend::Down);

        let alert =
            next_matching(&mut events, |ev| matches!(ev, WatchEvent::AlertFired { .. })).await;
        match alert {
            WatchEvent::AlertFired {
                floor_price,
                threshold,
            } => {
                assert_eq!(floor_price, dec("110.00"));
                assert_eq!(threshold, dec("120"));
            }
            _ => unreachable!(),
        }
    }

    // 150.00 is above the threshold, so exactly one delivery happened.
    let notifications = notifier.notifications.lock().unwrap().clone();
    assert_eq!(notifications.len(), 1);
    assert!(notifications[0].1.contains("¥ 110.00"));
    assert_eq!(notifier.feedbacks.load(Ordering::SeqCst), 1);

    watcher.stop().await;
}

#[tokio::test]
async fn test_alert_refires_on_every_qualifying_poll() {
    let api = Arc::new(StubApi::default());
    api.queue_price("110.00");
    api.queue_price("110.00");
    let notifier = RecordingNotifier::granted();

    let mut watcher = Watcher::spawn(
        Arc::clone(&api),
        test_config(),
        Arc::clone(&notifier),
        MemoryStore::new(),
    );

    {
        let mut events = watcher.events();
        next_matching(&mut events, |ev| matches!(ev, WatchEvent::AlertFired { .. })).await;
        watcher.refresh().unwrap();
        // Same price, same threshold: no suppression, it fires again.
        next_matching(&mut events, |ev| matches!(ev, WatchEvent::AlertFired { .. })).await;
    }

    assert_eq!(notifier.notifications.lock().unwrap().len(), 2);
    watcher.stop().await;
}

#[tokio::test]
async fn test_history_keeps_last_24_in_order() {
    let api = Arc::new(StubApi::default());
    for i in 0..30 {
        api.queue_price(&format!("{}", 100 + i));
    }

    let mut watcher = Watcher::spawn(
        Arc::clone(&api),
        test_config(),
        RecordingNotifier::granted(),
        MemoryStore::new(),
    );

    {
        let mut events = watcher.events();
        next_price_update(&mut events).await; // initial poll
        for _ in 0..29 {
            watcher.refresh().unwrap();
            next_price_update(&mut events).await;
        }
    }

    let state = watcher.state().await;
    assert_eq!(state.history().len(), 24);
    let expected: Vec<Decimal> = (6..30).map(|i| Decimal::from(100 + i)).collect();
    let actual: Vec<Decimal> = state.history().iter().copied().collect();
    assert_eq!(actual, expected);
    assert_eq!(state.floor_price(), Some(dec("129")));

    watcher.stop().await;
}

#[tokio::test]
async fn test_not_found_leaves_price_state_untouched() {
    let api = Arc::new(StubApi::default());
    api.queue_price("150.00");
    api.queue_err(SdkError::Http(HttpError::NotFound("no such project".into())));

    let mut watcher = Watcher::spawn(
        Arc::clone(&api),
        test_config(),
        RecordingNotifier::granted(),
        MemoryStore::new(),
    );

    {
        let mut events = watcher.events();
        next_price_update(&mut events).await;
        watcher.refresh().unwrap();
        next_matching(&mut events, |ev| matches!(ev, WatchEvent::Error(_))).await;
    }

    let state = watcher.state().await;
    assert_eq!(state.floor_price(), Some(dec("150.00")));
    assert_eq!(state.history().len(), 1);
    assert!(state.last_error().is_some());
    assert!(!state.is_loading());

    watcher.stop().await;
}

#[tokio::test]
async fn test_server_error_leaves_price_state_untouched() {
    let api = Arc::new(StubApi::default());
    api.queue_price("150.00");
    api.queue_err(SdkError::Http(HttpError::ServerError {
        status: 502,
        body: "bad gateway".into(),
    }));

    let mut watcher = Watcher::spawn(
        Arc::clone(&api),
        test_config(),
        RecordingNotifier::granted(),
        MemoryStore::new(),
    );

    {
        let mut events = watcher.events();
        next_price_update(&mut events).await;
        watcher.refresh().unwrap();
        next_matching(&mut events, |ev| matches!(ev, WatchEvent::Error(_))).await;
    }

    let state = watcher.state().await;
    assert_eq!(state.floor_price(), Some(dec("150.00")));
    assert_eq!(state.trend(), Trend::Flat);
    assert!(!state.is_loading());

    watcher.stop().await;
}

#[tokio::test]
async fn test_login_with_empty_password_makes_no_call() {
    let api = Arc::new(StubApi::default());
    api.queue_price("150.00");

    let mut watcher = Watcher::spawn(
        Arc::clone(&api),
        test_config(),
        RecordingNotifier::granted(),
        MemoryStore::new(),
    );

    {
        let mut events = watcher.events();
        next_price_update(&mut events).await;
        watcher.login("13800000000", "").unwrap();
        next_matching(&mut events, |ev| matches!(ev, WatchEvent::Error(_))).await;
    }

    assert_eq!(api.login_calls.load(Ordering::SeqCst), 0);
    assert_eq!(*api.token.lock().unwrap(), None);

    watcher.stop().await;
}

#[tokio::test]
async fn test_login_installs_token_and_repolls() {
    let api = Arc::new(StubApi::default());
    api.queue_price("150.00"); // initial, unauthenticated
    api.queue_price("150.00"); // post-login
    api.grant_login("u-9", "tok123");
    let store = Arc::new(MemoryStore::new());

    let mut watcher = Watcher::spawn(
        Arc::clone(&api),
        test_config(),
        RecordingNotifier::granted(),
        Arc::clone(&store),
    );

    {
        let mut events = watcher.events();
        next_price_update(&mut events).await;

        watcher.login("13800000000", "secret").unwrap();
        let logged_in =
            next_matching(&mut events, |ev| matches!(ev, WatchEvent::LoggedIn { .. })).await;
        match logged_in {
            WatchEvent::LoggedIn { user_id } => assert_eq!(user_id, "u-9"),
            _ => unreachable!(),
        }
        next_price_update(&mut events).await;
    }

    // The fetch after login carried the fresh token; the first one did not.
    let tokens = api.fetch_tokens.lock().unwrap().clone();
    assert_eq!(tokens, vec![None, Some("tok123".to_string())]);

    // Token and account persisted; the password is nowhere in the store.
    assert_eq!(store.get(store_keys::ACCESS_TOKEN), Some("tok123".into()));
    assert_eq!(store.get(store_keys::ACCOUNT), Some("13800000000".into()));
    assert_eq!(store.get("password"), None);

    watcher.stop().await;
}

#[tokio::test]
async fn test_failed_login_keeps_previous_token() {
    let api = Arc::new(StubApi::default());
    api.queue_price("150.00");
    *api.token.lock().unwrap() = Some("old-token".into());
    // No login_result queued: the stub rejects the attempt.

    let mut watcher = Watcher::spawn(
        Arc::clone(&api),
        test_config(),
        RecordingNotifier::granted(),
        MemoryStore::new(),
    );

    {
        let mut events = watcher.events();
        next_price_update(&mut events).await;
        watcher.login("13800000000", "wrong").unwrap();
        next_matching(&mut events, |ev| matches!(ev, WatchEvent::Error(_))).await;
    }

    assert_eq!(api.login_calls.load(Ordering::SeqCst), 1);
    assert_eq!(*api.token.lock().unwrap(), Some("old-token".into()));

    watcher.stop().await;
}

#[tokio::test]
async fn test_permission_denied_disables_alerting() {
    let api = Arc::new(StubApi::default());
    api.queue_price("110.00"); // would qualify if alerting stayed on
    let notifier = RecordingNotifier::denied();
    let store = Arc::new(MemoryStore::new());

    let mut watcher = Watcher::spawn(
        Arc::clone(&api),
        test_config(),
        Arc::clone(&notifier),
        Arc::clone(&store),
    );

    {
        let mut events = watcher.events();
        next_price_update(&mut events).await;
    }

    assert!(notifier.notifications.lock().unwrap().is_empty());
    assert_eq!(store.get(store_keys::ALERTS_ENABLED), Some("false".into()));

    watcher.stop().await;
}

#[tokio::test]
async fn test_stop_is_idempotent() {
    let api = Arc::new(StubApi::default());
    api.queue_price("150.00");

    let mut watcher = Watcher::spawn(
        Arc::clone(&api),
        test_config(),
        RecordingNotifier::granted(),
        MemoryStore::new(),
    );

    {
        let mut events = watcher.events();
        next_price_update(&mut events).await;
    }

    watcher.stop().await;
    watcher.stop().await;
    assert!(watcher.refresh().is_err());
}

#[tokio::test]
async fn test_persisted_alert_settings_take_precedence() {
    let api = Arc::new(StubApi::default());
    api.queue_price("110.00");
    let notifier = RecordingNotifier::granted();
    let store = Arc::new(MemoryStore::new());
    // A previous run disabled alerting; config says enabled.
    store.set(store_keys::ALERTS_ENABLED, "false");

    let mut watcher = Watcher::spawn(
        Arc::clone(&api),
        test_config(),
        Arc::clone(&notifier),
        Arc::clone(&store),
    );

    {
        let mut events = watcher.events();
        next_price_update(&mut events).await;
    }
    assert!(notifier.notifications.lock().unwrap().is_empty());

    // Re-enabling through the watcher fires on the next qualifying poll.
    api.queue_price("110.00");
    watcher
        .set_alert(AlertConfig {
            enabled: true,
            minimum_price: "120".into(),
        })
        .unwrap();
    {
        let mut events = watcher.events();
        watcher.refresh().unwrap();
        next_matching(&mut events, |ev| matches!(ev, WatchEvent::AlertFired { .. })).await;
    }
    assert_eq!(store.get(store_keys::ALERTS_ENABLED), Some("true".into()));

    watcher.stop().await;
}
