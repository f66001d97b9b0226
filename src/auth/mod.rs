//! PSK-based API authentication.
//!
//! Implements constant-time comparison to mitigate timing attacks. The same
//! comparison is used for stored user passwords.

use axum::{
    extract::Request,
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use subtle::ConstantTimeEq;

use crate::errors::{codes, ErrorResponse};

/// Header name for the API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// PSK authentication layer function that takes the expected PSK as a parameter.
pub async fn psk_auth_layer(
    expected_psk: Option<String>,
    request: Request,
    next: Next,
) -> Response {
    // If no PSK is configured, allow all requests
    let Some(expected) = expected_psk else {
        return next.run(request).await;
    };

    let provided = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .or_else(|| {
            request
                .headers()
                .get(header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.strip_prefix("Bearer "))
        })
        .map(|s| s.to_string());

    match provided {
        Some(key) if constant_time_compare(&key, &expected) => next.run(request).await,
        Some(_) => unauthorized_response("Invalid API key"),
        None => unauthorized_response("Missing or invalid API key"),
    }
}

/// Perform constant-time string comparison.
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

fn unauthorized_response(message: &str) -> Response {
    let body = ErrorResponse {
        success: false,
        message: message.to_string(),
        code: codes::UNAUTHORIZED.to_string(),
        details: None,
    };

    (StatusCode::UNAUTHORIZED, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{middleware, routing::get, Router};

    async fn guarded(psk: Option<&str>) -> String {
        let psk = psk.map(str::to_string);
        let app = Router::new()
            .route("/ping", get(|| async { "pong" }))
            .layer(middleware::from_fn(move |req, next| {
                psk_auth_layer(psk.clone(), req, next)
            }));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/ping", addr)
    }

    #[test]
    fn test_stored_password_must_match_exactly() {
        assert!(constant_time_compare("admin123", "admin123"));
        assert!(!constant_time_compare("admin123", "Admin123"));
        assert!(!constant_time_compare("admin123", "admin123 "));
        assert!(constant_time_compare("šifra-čćž", "šifra-čćž"));
        assert!(!constant_time_compare("šifra-čćž", "sifra-ccz"));
    }

    #[test]
    fn test_empty_password_matches_only_empty() {
        assert!(constant_time_compare("", ""));
        assert!(!constant_time_compare("", "tech123"));
    }

    #[tokio::test]
    async fn test_layer_accepts_header_or_bearer() {
        let url = guarded(Some("field-key")).await;
        let client = reqwest::Client::new();

        let resp = client
            .get(&url)
            .header(API_KEY_HEADER, "field-key")
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status().as_u16(), 200);

        let resp = client.get(&url).bearer_auth("field-key").send().await.unwrap();
        assert_eq!(resp.status().as_u16(), 200);
    }

    #[tokio::test]
    async fn test_layer_rejects_wrong_or_missing_key() {
        let url = guarded(Some("field-key")).await;
        let client = reqwest::Client::new();

        let resp = client
            .get(&url)
            .header(API_KEY_HEADER, "other-key")
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status().as_u16(), 401);
        let body: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Invalid API key");
        assert_eq!(body["code"], codes::UNAUTHORIZED);

        let resp = client.get(&url).send().await.unwrap();
        assert_eq!(resp.status().as_u16(), 401);
        let body: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(body["message"], "Missing or invalid API key");
    }

    #[tokio::test]
    async fn test_layer_is_open_without_configured_key() {
        let url = guarded(None).await;
        let resp = reqwest::get(&url).await.unwrap();
        assert_eq!(resp.status().as_u16(), 200);
        assert_eq!(resp.text().await.unwrap(), "pong");
    }
}
