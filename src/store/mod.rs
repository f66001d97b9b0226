//! JSON-file data store.
//!
//! One [`DataStore`] is opened at startup and shared through the router state.
//! Each collection is an in-memory array mirrored to a pretty-printed JSON file
//! in the data directory.

mod collection;
mod seed;
mod templates;
mod tickets;
mod users;
mod workday;

pub use collection::{Collection, Record};
pub(crate) use collection::write_atomic;

use std::path::Path;

use chrono::Utc;

use crate::auth::constant_time_compare;
use crate::errors::AppError;
use crate::models::{
    OperationTemplate, PublicUser, ServiceTicket, SparePartTemplate, User, WorkdayLogEntry,
};

pub const USERS_FILE: &str = "users.json";
pub const TICKETS_FILE: &str = "tickets.json";
pub const OPERATIONS_FILE: &str = "operations.json";
pub const SPARE_PARTS_FILE: &str = "spare-parts.json";
pub const WORKDAY_LOG_FILE: &str = "workday-log.json";

/// All persisted collections.
pub struct DataStore {
    pub users: Collection<User>,
    pub tickets: Collection<ServiceTicket>,
    pub operations: Collection<OperationTemplate>,
    pub spare_parts: Collection<SparePartTemplate>,
    pub workday_log: Collection<WorkdayLogEntry>,
}

impl DataStore {
    /// Open every collection under `data_dir`, creating the directory and
    /// seeding missing files.
    pub async fn open(data_dir: &Path) -> Result<Self, AppError> {
        tokio::fs::create_dir_all(data_dir).await.map_err(|e| {
            AppError::Storage(format!("Failed to create data directory {:?}: {}", data_dir, e))
        })?;

        Ok(Self {
            users: Collection::load(data_dir.join(USERS_FILE), seed::default_users).await?,
            tickets: Collection::load(data_dir.join(TICKETS_FILE), Vec::new).await?,
            operations: Collection::load(
                data_dir.join(OPERATIONS_FILE),
                seed::default_operations,
            )
            .await?,
            spare_parts: Collection::load(
                data_dir.join(SPARE_PARTS_FILE),
                seed::default_spare_parts,
            )
            .await?,
            workday_log: Collection::load(data_dir.join(WORKDAY_LOG_FILE), Vec::new).await?,
        })
    }

    /// Match an active admin by username and password.
    ///
    /// Technicians never authenticate here even with a correct password.
    pub async fn authenticate_user(&self, username: &str, password: &str) -> Option<PublicUser> {
        let users = self.users.get().await;
        users
            .iter()
            .find(|u| {
                u.username == username
                    && u.is_active
                    && u.role.is_admin()
                    && constant_time_compare(&u.password, password)
            })
            .map(PublicUser::from)
    }
}

impl Record for User {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Record for ServiceTicket {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Record for OperationTemplate {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Record for SparePartTemplate {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Record for WorkdayLogEntry {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Millisecond timestamp used as a record id.
pub(crate) fn timestamp_id() -> String {
    Utc::now().timestamp_millis().to_string()
}

pub(crate) fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

/// Trimmed, non-empty value of an optional request field.
pub(crate) fn required(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}
