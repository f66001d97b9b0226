//! ERP connection settings as seen by the admin UI, and raw query payloads.

use serde::{Deserialize, Serialize};

/// Connection settings with the password masked.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DatabaseConfigView {
    pub server: String,
    pub database: String,
    pub username: String,
    pub password: String,
    pub port: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DatabaseConfigRequest {
    #[serde(default)]
    pub server: Option<String>,
    #[serde(default)]
    pub database: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    /// Accepted as a string or a number
    #[serde(default)]
    pub port: Option<serde_json::Value>,
}

impl DatabaseConfigRequest {
    pub fn port_string(&self) -> Option<String> {
        match &self.port {
            Some(serde_json::Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Some(serde_json::Value::Number(n)) => Some(n.to_string()),
            _ => None,
        }
    }
}

/// Body of `POST /api/database/test`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawQueryRequest {
    #[serde(default)]
    pub query: Option<String>,
    /// Named parameters referenced as `@name`
    #[serde(default)]
    pub params: Option<serde_json::Map<String, serde_json::Value>>,
}

/// Rows of the first result set of a raw query.
///
/// `rows_affected` is the number of rows in `recordset`, not the server's DML
/// count: an `UPDATE` or `INSERT` without an `OUTPUT` clause reports 0.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawQueryResult {
    pub recordset: Vec<serde_json::Map<String, serde_json::Value>>,
    /// Length of `recordset`
    pub rows_affected: u64,
}
