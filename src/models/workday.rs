//! Technician workday open/close requests and the reopen audit log.

use serde::{Deserialize, Serialize};

/// Minimum length of the reason given when an admin reopens a workday.
pub const MIN_REOPEN_REASON_LEN: usize = 10;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloseWorkdayRequest {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub closed_at: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenWorkdayRequest {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub admin_id: Option<String>,
}

/// One admin-initiated workday reopening.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkdayLogEntry {
    pub id: String,
    pub user_id: String,
    pub user_name: String,
    pub admin_id: String,
    pub admin_name: String,
    pub reason: String,
    pub timestamp: String,
}
