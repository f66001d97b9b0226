//! User account operations.

use super::{now_rfc3339, required, timestamp_id, DataStore};
use crate::errors::AppError;
use crate::models::{CreateUserRequest, User, UserRole};

impl DataStore {
    /// Create a user after checking required fields, role and uniqueness of
    /// username and Charisma ID.
    pub async fn create_user(&self, request: &CreateUserRequest) -> Result<User, AppError> {
        let (
            Some(charisma_id),
            Some(username),
            Some(password),
            Some(name),
            Some(role),
            Some(depot),
        ) = (
            required(&request.charisma_id),
            required(&request.username),
            required(&request.password),
            required(&request.name),
            required(&request.role),
            required(&request.depot),
        )
        else {
            return Err(AppError::Validation("Sva polja su obavezna".to_string()));
        };

        let role = UserRole::from_str(role)
            .ok_or_else(|| AppError::Validation("Nevalidna uloga korisnika".to_string()))?;

        let user = User {
            id: timestamp_id(),
            charisma_id: charisma_id.to_string(),
            username: username.to_string(),
            password: password.to_string(),
            name: name.to_string(),
            role,
            depot: depot.to_string(),
            is_active: true,
            created_at: now_rfc3339(),
            workday_status: None,
            workday_closed_at: None,
            workday_opened_by: None,
            workday_reopen_reason: None,
        };

        self.users
            .mutate(|users| {
                if users.iter().any(|u| u.username == user.username) {
                    return Err(AppError::Validation(
                        "Korisničko ime već postoji".to_string(),
                    ));
                }
                if users.iter().any(|u| u.charisma_id == user.charisma_id) {
                    return Err(AppError::Validation("Charisma ID već postoji".to_string()));
                }
                users.push(user.clone());
                Ok(())
            })
            .await?;

        tracing::info!("Created user {} ({})", user.username, user.role.as_str());
        Ok(user)
    }

    /// Flip `isActive`. Returns the user as it is after the change.
    pub async fn toggle_user_active(&self, id: &str) -> Result<User, AppError> {
        self.users
            .mutate(|users| {
                let user = users
                    .iter_mut()
                    .find(|u| u.id == id)
                    .ok_or_else(user_not_found)?;
                user.is_active = !user.is_active;
                Ok(user.clone())
            })
            .await
    }

    /// Delete a user. The last admin-role user cannot be deleted.
    pub async fn delete_user(&self, id: &str) -> Result<User, AppError> {
        self.users
            .mutate(|users| {
                let index = users
                    .iter()
                    .position(|u| u.id == id)
                    .ok_or_else(user_not_found)?;

                let admins = users.iter().filter(|u| u.role.is_admin()).count();
                if users[index].role.is_admin() && admins == 1 {
                    return Err(AppError::Validation(
                        "Ne možete obrisati poslednjeg administratora".to_string(),
                    ));
                }

                Ok(users.remove(index))
            })
            .await
    }
}

pub(super) fn user_not_found() -> AppError {
    AppError::NotFound("Korisnik nije pronađen".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn request(username: &str, charisma_id: &str, role: &str) -> CreateUserRequest {
        CreateUserRequest {
            charisma_id: Some(charisma_id.to_string()),
            username: Some(username.to_string()),
            password: Some("secret".to_string()),
            name: Some("Test Korisnik".to_string()),
            role: Some(role.to_string()),
            depot: Some("Beograd".to_string()),
        }
    }

    #[tokio::test]
    async fn test_create_rejects_duplicates() {
        let temp_dir = TempDir::new().unwrap();
        let store = DataStore::open(temp_dir.path()).await.unwrap();
        let before = store.users.get().await;

        let dup_username = store.create_user(&request("admin", "NEW001", "technician")).await;
        assert!(matches!(dup_username, Err(AppError::Validation(_))));

        let dup_charisma = store.create_user(&request("nova", "ADMIN001", "technician")).await;
        assert!(matches!(dup_charisma, Err(AppError::Validation(_))));

        assert_eq!(store.users.get().await, before);
    }

    #[tokio::test]
    async fn test_create_validates_fields_and_role() {
        let temp_dir = TempDir::new().unwrap();
        let store = DataStore::open(temp_dir.path()).await.unwrap();

        let mut missing = request("nova", "NEW001", "technician");
        missing.depot = Some("  ".to_string());
        assert!(matches!(
            store.create_user(&missing).await,
            Err(AppError::Validation(msg)) if msg == "Sva polja su obavezna"
        ));

        assert!(matches!(
            store.create_user(&request("nova", "NEW001", "owner")).await,
            Err(AppError::Validation(msg)) if msg == "Nevalidna uloga korisnika"
        ));

        let user = store.create_user(&request("nova", "NEW001", "technician")).await.unwrap();
        assert!(user.is_active);
        assert_eq!(store.users.get().await.len(), 3);
    }

    #[tokio::test]
    async fn test_double_toggle_restores_state() {
        let temp_dir = TempDir::new().unwrap();
        let store = DataStore::open(temp_dir.path()).await.unwrap();
        let original = store.users.get().await.into_iter().find(|u| u.id == "1").unwrap();

        let once = store.toggle_user_active("1").await.unwrap();
        assert_eq!(once.is_active, !original.is_active);
        let twice = store.toggle_user_active("1").await.unwrap();
        assert_eq!(twice, original);

        assert!(matches!(
            store.toggle_user_active("missing").await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_last_admin_cannot_be_deleted() {
        let temp_dir = TempDir::new().unwrap();
        let store = DataStore::open(temp_dir.path()).await.unwrap();

        store.delete_user("2").await.unwrap();
        let result = store.delete_user("1").await;
        assert!(matches!(result, Err(AppError::Validation(_))));
        assert_eq!(store.users.get().await.len(), 1);

        // Technicians can still be removed
        let tech = store.create_user(&request("tech", "T001", "technician")).await.unwrap();
        store.delete_user(&tech.id).await.unwrap();
        assert_eq!(store.users.get().await.len(), 1);
    }
}
