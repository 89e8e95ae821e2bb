//! Network and marketplace constants.

use std::time::Duration;

/// Default REST API base URL.
pub const DEFAULT_API_URL: &str = "https://x.gwht.jscaee.cn";

/// Catalog tab the watched project is listed under.
pub const DEFAULT_TAB_ID: &str = "a8f56062-6a5e-4852-9ede-7377128d427e";

/// The watched collectible project.
pub const DEFAULT_PROJECT_ID: &str = "51413706-fa41-4577-b530-075d57d551b5";

/// Delay between scheduled polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(180);

/// Maximum number of floor prices kept in the rolling history.
pub const PRICE_HISTORY_CAP: usize = 24;

/// Device label reported in the login `clientInfo` payload.
pub const DEVICE_LABEL: &str = "ios";
