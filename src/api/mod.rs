//! REST API module.
//!
//! Contains all API routes and handlers following the admin portal contract.

mod auth;
mod backup;
mod config_sync;
mod database;
mod health;
mod mobile_app;
mod system;
mod templates;
mod tickets;
mod users;
mod workday;

pub use auth::*;
pub use backup::*;
pub use config_sync::*;
pub use database::*;
pub use health::*;
pub use mobile_app::*;
pub use system::*;
pub use templates::*;
pub use tickets::*;
pub use users::*;
pub use workday::*;

use axum::{
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{de::DeserializeOwned, Serialize};

use crate::errors::AppError;

/// Success response envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(message: Option<String>, data: Option<T>) -> Self {
        Self {
            success: true,
            message,
            data,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Response type that can be either success or error.
pub type ApiResult<T> = Result<ApiResponse<T>, AppError>;

/// Create a successful API response carrying only data.
pub fn success<T: Serialize>(data: T) -> ApiResult<T> {
    Ok(ApiResponse::new(None, Some(data)))
}

/// Create a successful API response with a message and data.
pub fn success_with<T: Serialize>(message: impl Into<String>, data: T) -> ApiResult<T> {
    Ok(ApiResponse::new(Some(message.into()), Some(data)))
}

/// Create a successful API response carrying only a message.
pub fn done(message: impl Into<String>) -> ApiResult<()> {
    Ok(ApiResponse::new(Some(message.into()), None))
}

/// JSON body extractor whose rejections use the error envelope.
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => Err(body_error(rejection)),
        }
    }
}

fn body_error(rejection: JsonRejection) -> AppError {
    tracing::debug!("Rejected request body: {}", rejection.body_text());
    AppError::BadRequest(format!("Invalid request body: {}", rejection.body_text()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_omits_empty_fields() {
        let body = serde_json::to_value(ApiResponse::<()>::new(Some("ok".into()), None)).unwrap();
        assert_eq!(body, serde_json::json!({ "success": true, "message": "ok" }));

        let body = serde_json::to_value(ApiResponse::new(None, Some(vec![1, 2]))).unwrap();
        assert_eq!(body, serde_json::json!({ "success": true, "data": [1, 2] }));
    }
}
