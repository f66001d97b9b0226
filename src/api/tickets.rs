//! Service ticket endpoints.

use axum::extract::{Path, State};
use serde_json::{json, Value};

use super::{success, success_with, ApiResult, JsonBody};
use crate::errors::AppError;
use crate::models::ServiceTicket;
use crate::AppState;

/// GET /api/sync/tickets - All tickets.
pub async fn get_sync_tickets(State(state): State<AppState>) -> ApiResult<Value> {
    let tickets = state.store.tickets.get().await;
    success(json!({ "tickets": tickets }))
}

/// POST /api/sync/tickets - Replace the ticket collection with the mobile app's copy.
pub async fn post_sync_tickets(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<Value>,
) -> ApiResult<Value> {
    let tickets: Vec<ServiceTicket> = match body.get("tickets") {
        Some(list @ Value::Array(_)) => serde_json::from_value(list.clone())
            .map_err(|e| AppError::Validation(format!("Invalid tickets data: {}", e)))?,
        _ => return Err(AppError::Validation("Invalid tickets data".to_string())),
    };

    let count = tickets.len();
    state.store.tickets.set(tickets).await?;
    tracing::info!("Synced {} tickets", count);
    success_with("Tickets synced successfully", json!({ "count": count }))
}

/// POST /api/tickets/{id}/reopen - Reopen a completed ticket.
pub async fn reopen_ticket(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Value> {
    let ticket = state.store.reopen_ticket(&id).await?;
    tracing::info!("Reopened ticket {} ({})", ticket.id, ticket.service_number);
    success_with("Servis je uspešno ponovo otvoren", json!({ "ticket": ticket }))
}
