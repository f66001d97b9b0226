//! Technician workday state kept on the user record.

use super::users::user_not_found;
use super::{now_rfc3339, required, timestamp_id, DataStore};
use crate::errors::AppError;
use crate::models::{
    CloseWorkdayRequest, OpenWorkdayRequest, User, WorkdayLogEntry, WorkdayStatus,
    MIN_REOPEN_REASON_LEN,
};

impl DataStore {
    pub async fn close_workday(&self, request: &CloseWorkdayRequest) -> Result<User, AppError> {
        let (Some(user_id), Some(closed_at)) =
            (required(&request.user_id), required(&request.closed_at))
        else {
            return Err(AppError::Validation(
                "userId and closedAt are required".to_string(),
            ));
        };

        let user = self
            .users
            .mutate(|users| {
                let user = users
                    .iter_mut()
                    .find(|u| u.id == user_id)
                    .ok_or_else(user_not_found)?;
                user.workday_status = Some(WorkdayStatus::Closed);
                user.workday_closed_at = Some(closed_at.to_string());
                Ok(user.clone())
            })
            .await?;

        tracing::info!("Workday closed for user {} at {}", user_id, closed_at);
        Ok(user)
    }

    /// Reopen a closed workday on an admin's authority and log the reason.
    pub async fn open_workday(&self, request: &OpenWorkdayRequest) -> Result<User, AppError> {
        let (Some(user_id), Some(reason), Some(admin_id)) = (
            required(&request.user_id),
            required(&request.reason),
            required(&request.admin_id),
        ) else {
            return Err(AppError::Validation(
                "userId, reason, and adminId are required".to_string(),
            ));
        };

        if reason.chars().count() < MIN_REOPEN_REASON_LEN {
            return Err(AppError::Validation(format!(
                "Reason must be at least {} characters long",
                MIN_REOPEN_REASON_LEN
            )));
        }

        let (user, admin) = self
            .users
            .mutate(|users| {
                let admin = users
                    .iter()
                    .find(|u| u.id == admin_id)
                    .cloned();
                let user = users
                    .iter_mut()
                    .find(|u| u.id == user_id)
                    .ok_or_else(user_not_found)?;

                let admin = admin.filter(|a| a.role.is_admin()).ok_or_else(|| {
                    AppError::Forbidden("Only admins can reopen workdays".to_string())
                })?;

                user.workday_status = Some(WorkdayStatus::Open);
                user.workday_closed_at = None;
                user.workday_opened_by = Some(admin_id.to_string());
                user.workday_reopen_reason = Some(reason.to_string());
                Ok((user.clone(), admin))
            })
            .await?;

        self.workday_log
            .add(WorkdayLogEntry {
                id: timestamp_id(),
                user_id: user.id.clone(),
                user_name: user.name.clone(),
                admin_id: admin.id.clone(),
                admin_name: admin.name.clone(),
                reason: reason.to_string(),
                timestamp: now_rfc3339(),
            })
            .await?;

        tracing::info!("Workday reopened for user {} by admin {}", user_id, admin_id);
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CreateUserRequest;
    use tempfile::TempDir;

    async fn store_with_technician(temp_dir: &TempDir) -> (DataStore, User) {
        let store = DataStore::open(temp_dir.path()).await.unwrap();
        let tech = store
            .create_user(&CreateUserRequest {
                charisma_id: Some("T007".to_string()),
                username: Some("marko".to_string()),
                password: Some("pw".to_string()),
                name: Some("Marko Markovic".to_string()),
                role: Some("technician".to_string()),
                depot: Some("Novi Sad".to_string()),
            })
            .await
            .unwrap();
        (store, tech)
    }

    #[tokio::test]
    async fn test_close_then_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let (store, tech) = store_with_technician(&temp_dir).await;

        let closed = store
            .close_workday(&CloseWorkdayRequest {
                user_id: Some(tech.id.clone()),
                closed_at: Some("2024-05-01T17:00:00.000Z".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(closed.workday_status, Some(WorkdayStatus::Closed));

        let opened = store
            .open_workday(&OpenWorkdayRequest {
                user_id: Some(tech.id.clone()),
                reason: Some("Hitna intervencija kod klijenta".to_string()),
                admin_id: Some("1".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(opened.workday_status, Some(WorkdayStatus::Open));
        assert!(opened.workday_closed_at.is_none());
        assert_eq!(opened.workday_opened_by.as_deref(), Some("1"));

        let logs = store.workday_log.get().await;
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].admin_name, "Administrator");
        assert_eq!(logs[0].user_name, "Marko Markovic");
    }

    #[tokio::test]
    async fn test_reopen_rules() {
        let temp_dir = TempDir::new().unwrap();
        let (store, tech) = store_with_technician(&temp_dir).await;

        let short = store
            .open_workday(&OpenWorkdayRequest {
                user_id: Some(tech.id.clone()),
                reason: Some("kratko".to_string()),
                admin_id: Some("1".to_string()),
            })
            .await;
        assert!(matches!(short, Err(AppError::Validation(_))));

        let by_technician = store
            .open_workday(&OpenWorkdayRequest {
                user_id: Some("1".to_string()),
                reason: Some("Dovoljno dug razlog".to_string()),
                admin_id: Some(tech.id.clone()),
            })
            .await;
        assert!(matches!(by_technician, Err(AppError::Forbidden(_))));

        let unknown = store
            .open_workday(&OpenWorkdayRequest {
                user_id: Some("nobody".to_string()),
                reason: Some("Dovoljno dug razlog".to_string()),
                admin_id: Some("1".to_string()),
            })
            .await;
        assert!(matches!(unknown, Err(AppError::NotFound(_))));
        assert!(store.workday_log.get().await.is_empty());
    }
}
