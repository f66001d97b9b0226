//! Technician workday endpoints.

use axum::extract::State;
use serde_json::{json, Value};

use super::{success, success_with, ApiResult, JsonBody};
use crate::models::{CloseWorkdayRequest, OpenWorkdayRequest, PublicUser};
use crate::AppState;

/// POST /api/workday/close
pub async fn close_workday(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<CloseWorkdayRequest>,
) -> ApiResult<Value> {
    let user = state.store.close_workday(&request).await?;
    success_with(
        "Workday closed successfully",
        json!({ "user": PublicUser::from(&user) }),
    )
}

/// POST /api/workday/open - Admin reopens a technician's workday.
pub async fn open_workday(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<OpenWorkdayRequest>,
) -> ApiResult<Value> {
    let user = state.store.open_workday(&request).await?;
    success_with(
        "Workday reopened successfully",
        json!({ "user": PublicUser::from(&user) }),
    )
}

/// GET /api/workday/open - Reopen audit log.
pub async fn workday_logs(State(state): State<AppState>) -> ApiResult<Value> {
    let logs = state.store.workday_log.get().await;
    success(json!({ "logs": logs }))
}
