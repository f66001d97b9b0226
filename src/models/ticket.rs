//! Service tickets produced by the mobile app.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    InProgress,
    Completed,
}

/// An operation performed during a service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A spare part consumed during a service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SparePart {
    pub id: String,
    pub name: String,
    pub quantity: f64,
}

/// A technician's work record for one device.
///
/// Tickets are synced wholesale; fields this backend does not know about are
/// kept in `extra` and written back unchanged.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ServiceTicket {
    pub id: String,
    /// `{charismaId}_1001`, `{charismaId}_1002`, ...
    pub service_number: String,
    pub device_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_location: Option<String>,
    pub technician_id: String,
    pub technician_name: String,
    pub start_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<f64>,
    pub status: TicketStatus,
    #[serde(default)]
    pub operations: Vec<Operation>,
    #[serde(default)]
    pub spare_parts: Vec<SparePart>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ServiceTicket {
    /// Put a completed ticket back into progress.
    pub fn reopen(&mut self) {
        self.status = TicketStatus::InProgress;
        self.end_time = None;
        self.duration_minutes = None;
    }
}
