//! User accounts for administrators and field technicians.

use serde::{Deserialize, Serialize};

/// Account role. `gospodar` and `super_user` may log into the portal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Gospodar,
    SuperUser,
    Technician,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Gospodar => "gospodar",
            UserRole::SuperUser => "super_user",
            UserRole::Technician => "technician",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "gospodar" => Some(UserRole::Gospodar),
            "super_user" => Some(UserRole::SuperUser),
            "technician" => Some(UserRole::Technician),
            _ => None,
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, UserRole::Gospodar | UserRole::SuperUser)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WorkdayStatus {
    Open,
    Closed,
}

/// A stored user record, password included.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub charisma_id: String,
    pub username: String,
    pub password: String,
    pub name: String,
    pub role: UserRole,
    pub depot: String,
    pub is_active: bool,
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workday_status: Option<WorkdayStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workday_closed_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workday_opened_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workday_reopen_reason: Option<String>,
}

/// A user as returned by the login endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: String,
    pub charisma_id: String,
    pub username: String,
    pub name: String,
    pub role: UserRole,
    pub depot: String,
    pub is_active: bool,
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workday_status: Option<WorkdayStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workday_closed_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workday_opened_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workday_reopen_reason: Option<String>,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            charisma_id: user.charisma_id.clone(),
            username: user.username.clone(),
            name: user.name.clone(),
            role: user.role,
            depot: user.depot.clone(),
            is_active: user.is_active,
            created_at: user.created_at.clone(),
            workday_status: user.workday_status,
            workday_closed_at: user.workday_closed_at.clone(),
            workday_opened_by: user.workday_opened_by.clone(),
            workday_reopen_reason: user.workday_reopen_reason.clone(),
        }
    }
}

/// Request body for creating a user. Fields are optional so that missing
/// values produce a validation error rather than a body rejection.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[serde(default)]
    pub charisma_id: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub depot: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}
