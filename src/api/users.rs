//! User management and mobile user sync endpoints.

use axum::extract::{Path, State};
use serde_json::{json, Value};

use super::{done, success, success_with, ApiResult, JsonBody};
use crate::errors::AppError;
use crate::models::{CreateUserRequest, PublicUser, User};
use crate::AppState;

/// POST /api/users - Create a user.
pub async fn create_user(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<CreateUserRequest>,
) -> ApiResult<Value> {
    let user = state.store.create_user(&request).await?;
    success_with(
        "Korisnik uspešno kreiran",
        json!({ "user": PublicUser::from(&user) }),
    )
}

/// PATCH /api/users/{id} - Toggle a user's active flag.
pub async fn toggle_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Value> {
    let user = state.store.toggle_user_active(&id).await?;
    let message = if user.is_active {
        "Korisnik uspešno aktiviran"
    } else {
        "Korisnik uspešno deaktiviran"
    };
    tracing::info!("User {} active={}", user.id, user.is_active);
    success_with(message, json!({ "user": PublicUser::from(&user) }))
}

/// DELETE /api/users/{id} - Delete a user.
pub async fn delete_user(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<()> {
    let user = state.store.delete_user(&id).await?;
    tracing::info!("Deleted user {} ({})", user.id, user.username);
    done("Korisnik uspešno obrisan")
}

/// GET /api/sync/users - Full user records for the mobile app.
pub async fn get_sync_users(State(state): State<AppState>) -> ApiResult<Value> {
    let users = state.store.users.get().await;
    success(json!({ "users": users }))
}

/// POST /api/sync/users - Replace the user collection.
pub async fn post_sync_users(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<Value>,
) -> ApiResult<Value> {
    let users: Vec<User> = match body.get("users") {
        Some(list @ Value::Array(_)) => serde_json::from_value(list.clone())
            .map_err(|e| AppError::Validation(format!("Invalid users data: {}", e)))?,
        _ => return Err(AppError::Validation("Invalid users data".to_string())),
    };

    let count = users.len();
    state.store.users.set(users).await?;
    tracing::info!("Synced {} users", count);
    success_with("Users synced successfully", json!({ "count": count }))
}
