//! Wire types for the tab-items endpoint (REST).
//!
//! The backend wraps every response in a `{isSuccess, code, msg, data}`
//! envelope. Price fields arrive as numeric strings.

use crate::shared::ProjectId;
use serde::{Deserialize, Serialize};

/// Response envelope for `GET /v1/nft/project/tab/items`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TabItemsResponse {
    #[serde(rename = "isSuccess")]
    pub is_success: bool,
    pub code: String,
    pub msg: String,
    pub data: TabItemsData,
}

/// Payload of the tab-items envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TabItemsData {
    pub projects: Vec<ProjectRecord>,
    pub total: i64,
}

/// Raw project record as listed on a tab.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProjectRecord {
    pub project_id: ProjectId,
    pub name: String,
    pub img_url: String,
    pub floor_price: String,
    pub last_trade_price: String,
}
