//! Admin login endpoint.

use axum::extract::State;
use serde_json::{json, Value};

use super::{success, ApiResult, JsonBody};
use crate::errors::AppError;
use crate::models::LoginRequest;
use crate::AppState;

/// POST /api/auth - Authenticate an admin user.
pub async fn login(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<LoginRequest>,
) -> ApiResult<Value> {
    let (Some(username), Some(password)) = (
        request.username.as_deref().filter(|u| !u.is_empty()),
        request.password.as_deref().filter(|p| !p.is_empty()),
    ) else {
        return Err(AppError::Validation(
            "Username and password are required".to_string(),
        ));
    };

    match state.store.authenticate_user(username, password).await {
        Some(user) => {
            tracing::info!("User {} logged in", user.username);
            success(json!({ "user": user }))
        }
        None => {
            tracing::warn!("Rejected login for {}", username);
            Err(AppError::Unauthorized(
                "Invalid credentials or insufficient permissions".to_string(),
            ))
        }
    }
}
