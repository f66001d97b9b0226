use axum::Json;
use serde_json::{json, Value};

use crate::store::now_rfc3339;

/// GET /api/health - Liveness probe, no auth.
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "success": true,
        "message": "Web Admin Panel API is running",
        "timestamp": now_rfc3339(),
    }))
}
