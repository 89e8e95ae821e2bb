//! # floorwatch
//!
//! Client SDK and polling price watcher for collectible floor prices on the
//! GWHT marketplace.
//!
//! ## Architecture
//!
//! The crate is organized in layers:
//!
//! 1. **Core** — Shared newtypes, domain models, wire types
//! 2. **Auth** — Credential login, bearer-token session
//! 3. **HTTP API** — `MarketHttp`, one method per endpoint, no retries
//! 4. **High-Level Client** — `MarketClient` with nested sub-clients
//! 5. **Watcher** — Single-writer polling actor with trend tracking and
//!    threshold alerting
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use floorwatch::prelude::*;
//!
//! let client = MarketClient::builder().build()?;
//! let store = MemoryStore::new();
//!
//! // Optionally restore a persisted token before the first poll.
//! if let Some(token) = store.get(store_keys::ACCESS_TOKEN) {
//!     client.restore_token(&token).await;
//! }
//!
//! let watcher = Watcher::spawn(client, WatchConfig::default(), TracingNotifier, store);
//! watcher.login("13800000000", "secret")?;
//! watcher.refresh()?;
//! ```

// ── Layer 1: Core ────────────────────────────────────────────────────────────

/// Shared newtypes and price helpers used across all domains.
pub mod shared;

/// Domain modules (vertical slices): types, wire types, conversions, client.
pub mod domain;

/// Unified SDK error types.
pub mod error;

/// Network and marketplace constants.
pub mod network;

// ── Layer 2: Auth ────────────────────────────────────────────────────────────

/// Authentication: login wire types, session state, sub-client.
pub mod auth;

// ── Layer 3: HTTP API ────────────────────────────────────────────────────────

/// Low-level HTTP client.
pub mod http;

// ── Layer 4: High-Level Client ───────────────────────────────────────────────

/// `MarketClient` — the primary API entry point.
pub mod client;

// ── Layer 5: Watcher ─────────────────────────────────────────────────────────

/// Polling watcher: state, trend, alerting, lifecycle.
pub mod watch;

/// Preference persistence seam.
pub mod store;

// ── Prelude ──────────────────────────────────────────────────────────────────

pub mod prelude {
    // Shared newtypes + helpers
    pub use crate::shared::{format_price, parse_price, ProjectId, TabId};

    // Domain types
    pub use crate::domain::project::Project;

    // Errors
    pub use crate::error::{AuthError, HttpError, SdkError};

    // Network constants
    pub use crate::network::{DEFAULT_API_URL, DEFAULT_PROJECT_ID, DEFAULT_TAB_ID};

    // Auth types
    pub use crate::auth::{AuthCredentials, LoginData, Session};

    // Client + sub-clients
    pub use crate::client::{AuthClient, MarketClient, MarketClientBuilder, ProjectsClient};

    // Watcher
    pub use crate::watch::{
        AlertConfig, MarketApi, Notifier, PriceSnapshot, TracingNotifier, Trend, WatchConfig,
        WatchEvent, WatchState, Watcher,
    };

    // Store
    pub use crate::store::{keys as store_keys, MemoryStore, PreferenceStore};
}
