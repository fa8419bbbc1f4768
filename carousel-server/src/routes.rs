//! API route handlers.

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;

use carousel_core::deck::{validate_request, ValidationError, MAX_PROMPT_LEN};

use crate::openai;
use crate::AppState;

/// Liveness probe: `{"ok":true}`.
pub async fn health() -> Json<serde_json::Value> {
    Json(json!({ "ok": true }))
}

fn validation_response(err: &ValidationError) -> Response {
    let body = if err.prompt_too_long() {
        json!({
            "error": format!("Prompt is too long (max {MAX_PROMPT_LEN} characters).")
        })
    } else {
        json!({ "error": "Invalid request.", "issues": err.issues })
    };
    (StatusCode::BAD_REQUEST, Json(body)).into_response()
}

fn server_error(message: String) -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": message }))).into_response()
}

/// Generate a deck from a prompt.
///
/// Validates the body, forwards the request to the model provider, and
/// returns the repaired, schema-valid deck. Validation failures are 400s
/// with an issue list; upstream and configuration failures are 500s with a
/// single `error` message.
#[tracing::instrument(name = "generate", skip(state, body))]
pub async fn generate(State(state): State<AppState>, body: Bytes) -> Response {
    // Configuration problems outrank request problems.
    let Some(api_key) = state.config.api_key.clone() else {
        tracing::error!("generation requested but OPENAI_API_KEY is not configured");
        return server_error("Server is missing OPENAI_API_KEY.".to_string());
    };

    let parsed: serde_json::Value = match serde_json::from_slice(&body) {
        Ok(value) => value,
        Err(err) => {
            tracing::debug!(%err, "rejecting non-JSON request body");
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "Invalid request.", "issues": [] })),
            )
                .into_response();
        }
    };

    let request = match validate_request(&parsed) {
        Ok(request) => request,
        Err(err) => {
            tracing::debug!(issues = err.issues.len(), "rejecting invalid request");
            return validation_response(&err);
        }
    };

    match openai::generate_deck(&state.http, &state.config, &api_key, &request).await {
        Ok(deck) => (StatusCode::OK, Json(deck)).into_response(),
        Err(err) => {
            tracing::error!(%err, "deck generation failed");
            server_error(err.to_string())
        }
    }
}
