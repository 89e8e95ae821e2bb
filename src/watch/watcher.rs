//! The price watcher — a single-writer polling actor.
//!
//! One background tokio task owns all mutable watch state. The public
//! [`Watcher`] handle sends commands over an mpsc channel and the task
//! applies results in strict completion order, so a scheduled tick, a manual
//! refresh and a login-triggered refresh can never interleave their writes.
//!
//! Cancellation is cooperative: `stop()` (or dropping the handle) ends the
//! task at its next wake; an in-flight network call is not aborted.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use async_lock::RwLock;
use chrono::Utc;
use futures_util::stream::Stream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::state::WatchState;
use super::{alert, AlertConfig, Notifier, PriceSnapshot, WatchConfig, WatchEvent};
use crate::auth::LoginData;
use crate::client::MarketClient;
use crate::domain::project::Project;
use crate::error::{HttpError, SdkError};
use crate::shared::{ProjectId, TabId};
use crate::store::{keys, PreferenceStore};

// ─── Market API seam ─────────────────────────────────────────────────────────

/// The two marketplace operations the watcher depends on.
///
/// [`MarketClient`] is the production implementation; tests substitute stubs.
/// A successful `login` must install the returned token so that subsequent
/// `fetch` calls carry it.
pub trait MarketApi: Send + Sync + 'static {
    fn fetch(
        &self,
        tab_id: &TabId,
        project_id: &ProjectId,
    ) -> impl Future<Output = Result<Project, SdkError>> + Send;

    fn login(
        &self,
        account: &str,
        password: &str,
    ) -> impl Future<Output = Result<LoginData, SdkError>> + Send;
}

impl<A: MarketApi> MarketApi for Arc<A> {
    async fn fetch(
        &self,
        tab_id: &TabId,
        project_id: &ProjectId,
    ) -> Result<Project, SdkError> {
        (**self).fetch(tab_id, project_id).await
    }

    async fn login(&self, account: &str, password: &str) -> Result<LoginData, SdkError> {
        (**self).login(account, password).await
    }
}

impl MarketApi for MarketClient {
    async fn fetch(
        &self,
        tab_id: &TabId,
        project_id: &ProjectId,
    ) -> Result<Project, SdkError> {
        self.projects().find(tab_id, project_id).await
    }

    async fn login(&self, account: &str, password: &str) -> Result<LoginData, SdkError> {
        self.auth().login(account, password).await
    }
}

// ─── Commands from public API to background task ─────────────────────────────

enum Command {
    Refresh,
    Login { account: String, password: String },
    SetAlert(AlertConfig),
    Stop,
}

// ─── Background task state ───────────────────────────────────────────────────

struct TaskState<A: MarketApi> {
    api: A,
    config: WatchConfig,
    notifier: Arc<dyn Notifier>,
    store: Arc<dyn PreferenceStore>,
    alert: AlertConfig,
    state: Arc<RwLock<WatchState>>,
    event_tx: mpsc::Sender<WatchEvent>,
    cmd_rx: mpsc::Receiver<Command>,
}

impl<A: MarketApi> TaskState<A> {
    fn emit(&self, event: WatchEvent) {
        let _ = self.event_tx.try_send(event);
    }
}

// ─── Public Watcher ──────────────────────────────────────────────────────────

/// Handle to a running price watcher.
///
/// Spawning performs the notification-permission request, one immediate poll,
/// and then polls on the configured interval until stopped.
pub struct Watcher {
    cmd_tx: mpsc::Sender<Command>,
    event_rx: tokio::sync::Mutex<mpsc::Receiver<WatchEvent>>,
    state: Arc<RwLock<WatchState>>,
    task_handle: Option<JoinHandle<()>>,
}

impl Watcher {
    /// Spawn the watcher task.
    ///
    /// Alert settings persisted in `store` take precedence over
    /// `config.alert`; a denied permission request force-disables alerting
    /// for this run without failing startup.
    pub fn spawn<A, N, S>(api: A, config: WatchConfig, notifier: N, store: S) -> Self
    where
        A: MarketApi,
        N: Notifier + 'static,
        S: PreferenceStore + 'static,
    {
        let (cmd_tx, cmd_rx) = mpsc::channel(64);
        let (event_tx, event_rx) = mpsc::channel(256);

        let store: Arc<dyn PreferenceStore> = Arc::new(store);
        let alert = load_alert(store.as_ref(), config.alert.clone());
        let state = Arc::new(RwLock::new(WatchState::new(config.history_cap)));

        let task = TaskState {
            api,
            config,
            notifier: Arc::new(notifier),
            store,
            alert,
            state: Arc::clone(&state),
            event_tx,
            cmd_rx,
        };

        let handle = tokio::spawn(run_task(task));

        Self {
            cmd_tx,
            event_rx: tokio::sync::Mutex::new(event_rx),
            state,
            task_handle: Some(handle),
        }
    }

    /// Poll now, out of band. The scheduled cadence is not disturbed.
    pub fn refresh(&self) -> Result<(), SdkError> {
        self.send(Command::Refresh)
    }

    /// Login with account + password, then poll with the new token.
    ///
    /// Empty fields are rejected inside the task without a network call.
    pub fn login(&self, account: &str, password: &str) -> Result<(), SdkError> {
        self.send(Command::Login {
            account: account.to_string(),
            password: password.to_string(),
        })
    }

    /// Replace the alert settings; persisted through the store.
    pub fn set_alert(&self, config: AlertConfig) -> Result<(), SdkError> {
        self.send(Command::SetAlert(config))
    }

    /// Snapshot of the current watch state.
    pub async fn state(&self) -> WatchState {
        self.state.read().await.clone()
    }

    /// Get a stream of events from the watcher.
    ///
    /// The returned stream borrows `self`, so it must be dropped before
    /// calling `stop()`.
    pub fn events(&self) -> Pin<Box<dyn Stream<Item = WatchEvent> + Send + '_>> {
        Box::pin(futures_util::stream::unfold(
            &self.event_rx,
            |rx| async move {
                let mut guard = rx.lock().await;
                guard.recv().await.map(|event| (event, rx))
            },
        ))
    }

    /// Stop the watcher.
    ///
    /// The task exits at its next wake; idempotent. An in-flight poll runs
    /// to completion first.
    pub async fn stop(&mut self) {
        if let Some(handle) = self.task_handle.take() {
            let _ = self.cmd_tx.send(Command::Stop).await;
            let _ = tokio::time::timeout(Duration::from_secs(5), handle).await;
        }
    }

    fn send(&self, cmd: Command) -> Result<(), SdkError> {
        self.cmd_tx.try_send(cmd).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => {
                SdkError::Other("Watcher command queue full".into())
            }
            mpsc::error::TrySendError::Closed(_) => SdkError::Other("Watcher stopped".into()),
        })
    }
}

impl Drop for Watcher {
    fn drop(&mut self) {
        if let Some(handle) = self.task_handle.take() {
            handle.abort();
        }
    }
}

// ─── Background task ─────────────────────────────────────────────────────────

fn load_alert(store: &dyn PreferenceStore, fallback: AlertConfig) -> AlertConfig {
    AlertConfig {
        enabled: store
            .get(keys::ALERTS_ENABLED)
            .map(|v| v == "true")
            .unwrap_or(fallback.enabled),
        minimum_price: store
            .get(keys::MINIMUM_PRICE)
            .unwrap_or(fallback.minimum_price),
    }
}

async fn run_task<A: MarketApi>(mut task: TaskState<A>) {
    // Permission is best-effort: denial downgrades alerting for this run
    // instead of blocking startup.
    if !task.notifier.request_permission() {
        tracing::info!("Notification permission denied; alerting disabled");
        task.alert.enabled = false;
        task.store.set(keys::ALERTS_ENABLED, "false");
    }

    task.emit(WatchEvent::Started);
    poll(&mut task).await;

    let mut interval = tokio::time::interval(task.config.poll_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval.reset(); // skip the immediate first tick; the initial poll just ran

    loop {
        tokio::select! {
            _ = interval.tick() => {
                poll(&mut task).await;
            }
            cmd = task.cmd_rx.recv() => {
                match cmd {
                    Some(Command::Refresh) => {
                        poll(&mut task).await;
                    }
                    Some(Command::Login { account, password }) => {
                        login(&mut task, &account, &password).await;
                    }
                    Some(Command::SetAlert(config)) => {
                        apply_alert(&mut task, config);
                    }
                    // All handles dropped counts as a stop request.
                    Some(Command::Stop) | None => break,
                }
            }
        }
    }

    tracing::info!("Watcher stopped");
    task.emit(WatchEvent::Stopped);
}

/// One poll: fetch, apply the outcome to state, then evaluate the alert.
///
/// The loading flag is cleared on every exit path.
async fn poll<A: MarketApi>(task: &mut TaskState<A>) {
    task.state.write().await.set_loading(true);

    let fetched = task
        .api
        .fetch(&task.config.tab_id, &task.config.project_id)
        .await;

    let floor_price = match fetched {
        Ok(project) => {
            let snapshot = PriceSnapshot {
                project_name: project.name,
                floor_price: project.floor_price,
                last_trade_price: project.last_trade_price,
                observed_at: Utc::now(),
            };
            let mut state = task.state.write().await;
            let trend = state.observe(snapshot.clone());
            state.set_loading(false);
            drop(state);

            task.emit(WatchEvent::PriceUpdated {
                snapshot: snapshot.clone(),
                trend,
            });
            Some(snapshot.floor_price)
        }
        Err(SdkError::Http(HttpError::NotFound(_))) => {
            let message = "未找到指定藏品".to_string();
            let mut state = task.state.write().await;
            state.record_error(message.clone());
            state.set_loading(false);
            drop(state);

            task.emit(WatchEvent::Error(message));
            None
        }
        Err(e) => {
            tracing::error!("Poll failed: {}", e);
            let message = format!("获取失败：{}", e);
            let mut state = task.state.write().await;
            state.record_error(message.clone());
            state.set_loading(false);
            drop(state);

            task.emit(WatchEvent::Error(message));
            None
        }
    };

    if let Some(floor_price) = floor_price {
        if let Some(threshold) = alert::due(&task.alert, floor_price) {
            alert::fire(task.notifier.as_ref(), floor_price);
            task.emit(WatchEvent::AlertFired {
                floor_price,
                threshold,
            });
        }
    }
}

async fn login<A: MarketApi>(task: &mut TaskState<A>, account: &str, password: &str) {
    if account.is_empty() || password.is_empty() {
        task.emit(WatchEvent::Error("请输入账号和密码".to_string()));
        return;
    }

    match task.api.login(account, password).await {
        Ok(data) => {
            // Persist the account label and token only; the password is
            // dropped here.
            task.store.set(keys::ACCOUNT, account);
            task.store.set(keys::ACCESS_TOKEN, &data.access_token);
            task.emit(WatchEvent::LoggedIn {
                user_id: data.user_id,
            });
            poll(task).await;
        }
        Err(e) => {
            tracing::error!("Login failed: {}", e);
            task.emit(WatchEvent::Error(format!("登录失败：{}", e)));
        }
    }
}

fn apply_alert<A: MarketApi>(task: &mut TaskState<A>, config: AlertConfig) {
    task.store.set(keys::MINIMUM_PRICE, &config.minimum_price);
    task.store.set(
        keys::ALERTS_ENABLED,
        if config.enabled { "true" } else { "false" },
    );
    task.alert = config;
}
