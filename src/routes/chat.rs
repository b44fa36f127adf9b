use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::{HeaderMap, header::CONTENT_TYPE},
};
use serde_json::{Value, json};

use crate::{
    error::AppError,
    message::{ChatRequest, ChatResponse},
    services::metrics_manager::MetricsData,
    state::SharedState,
};

pub async fn chat_handler(
    State(state): State<SharedState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<ChatResponse>, AppError> {
    let request = validate_request(&headers, &body)?;
    let response = state.bot.generate_reply(&request.message, &state.metrics).await;
    Ok(Json(response))
}

// GET /chat only describes the endpoint.
pub async fn chat_info_handler() -> Json<Value> {
    Json(json!({
        "message": "Send a POST request with a JSON body {\"message\": \"...\"} to chat.",
    }))
}

pub async fn method_not_allowed_handler() -> AppError {
    AppError::MethodNotAllowed
}

/// Content type must be JSON and the body must carry a string `message`.
pub fn validate_request(headers: &HeaderMap, body: &[u8]) -> Result<ChatRequest, AppError> {
    let is_json = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .is_some_and(|mime| mime.trim().eq_ignore_ascii_case("application/json"));
    if !is_json {
        return Err(AppError::UnsupportedMediaType);
    }

    serde_json::from_slice(body).map_err(|e| {
        if e.is_data() {
            AppError::BadRequest("Missing or invalid 'message' field".to_string())
        } else {
            AppError::BadRequest("Request body must be valid JSON".to_string())
        }
    })
}

pub async fn get_metrics_handler(State(state): State<SharedState>) -> Json<MetricsData> {
    Json(state.metrics.get_metrics().await)
}
