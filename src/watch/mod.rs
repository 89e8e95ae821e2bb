//! Watch layer — poll config, price data model, events, notification seam.
//!
//! The polling loop itself lives in `watcher.rs`: a background tokio task
//! owns all mutable watch state and is driven by commands, so every write
//! happens on one logical timeline. This module defines the shared types.

pub mod alert;
pub mod state;
pub mod watcher;

use std::time::Duration;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::shared::{ProjectId, TabId};

pub use state::WatchState;
pub use watcher::{MarketApi, Watcher};

// ─── Trend ───────────────────────────────────────────────────────────────────

/// Direction of the floor price relative to the previous observation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    #[default]
    Flat,
}

impl Trend {
    /// Compare a new observation against the previous one.
    pub fn from_change(current: Decimal, previous: Decimal) -> Self {
        if current > previous {
            Self::Up
        } else if current < previous {
            Self::Down
        } else {
            Self::Flat
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Flat => "flat",
        }
    }

    /// Arrow glyph for compact display.
    pub fn arrow(&self) -> &'static str {
        match self {
            Self::Up => "↑",
            Self::Down => "↓",
            Self::Flat => "→",
        }
    }
}

impl std::fmt::Display for Trend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ─── Snapshots and settings ──────────────────────────────────────────────────

/// One successful poll observation. Immutable once created.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSnapshot {
    pub project_name: String,
    pub floor_price: Decimal,
    pub last_trade_price: Decimal,
    pub observed_at: chrono::DateTime<chrono::Utc>,
}

/// User-facing alert settings.
///
/// `minimum_price` is kept as the raw user input; an unparseable value makes
/// alert evaluation a no-op rather than an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertConfig {
    pub enabled: bool,
    pub minimum_price: String,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            minimum_price: "120".to_string(),
        }
    }
}

impl AlertConfig {
    /// The parsed threshold, if the raw input is a number.
    pub fn threshold(&self) -> Option<Decimal> {
        self.minimum_price.trim().parse().ok()
    }
}

/// Configuration for the watcher.
#[derive(Debug, Clone)]
pub struct WatchConfig {
    pub tab_id: TabId,
    pub project_id: ProjectId,
    pub poll_interval: Duration,
    pub history_cap: usize,
    /// Initial alert settings; persisted values in the store take precedence.
    pub alert: AlertConfig,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            tab_id: TabId::from(crate::network::DEFAULT_TAB_ID),
            project_id: ProjectId::from(crate::network::DEFAULT_PROJECT_ID),
            poll_interval: crate::network::DEFAULT_POLL_INTERVAL,
            history_cap: crate::network::PRICE_HISTORY_CAP,
            alert: AlertConfig::default(),
        }
    }
}

// ─── WatchEvent ──────────────────────────────────────────────────────────────

/// High-level events emitted by the watcher to the consumer.
#[derive(Debug, Clone)]
pub enum WatchEvent {
    /// The watcher task is up; the initial poll follows immediately.
    Started,
    /// A poll succeeded and state was updated.
    PriceUpdated { snapshot: PriceSnapshot, trend: Trend },
    /// The floor price crossed (or sits at/under) the configured minimum.
    AlertFired {
        floor_price: Decimal,
        threshold: Decimal,
    },
    /// Login succeeded; subsequent polls carry the new token.
    LoggedIn { user_id: String },
    /// A poll or login failed; previous price state is untouched.
    Error(String),
    /// The watcher task exited.
    Stopped,
}

// ─── Notifier ────────────────────────────────────────────────────────────────

/// Delivery seam for local notifications and the haptic/feedback signal.
///
/// Implementations are fire-and-forget; the watcher never waits on delivery.
pub trait Notifier: Send + Sync {
    /// Best-effort permission request at startup. Returning `false` disables
    /// alerting for the run without surfacing an error.
    fn request_permission(&self) -> bool {
        true
    }

    fn notify(&self, title: &str, body: &str);

    fn feedback(&self);
}

impl<T: Notifier + ?Sized> Notifier for std::sync::Arc<T> {
    fn request_permission(&self) -> bool {
        (**self).request_permission()
    }

    fn notify(&self, title: &str, body: &str) {
        (**self).notify(title, body)
    }

    fn feedback(&self) {
        (**self).feedback()
    }
}

/// Headless notifier that routes alerts through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, title: &str, body: &str) {
        tracing::info!(title, body, "price alert");
    }

    fn feedback(&self) {
        tracing::debug!("feedback signal");
    }
}
