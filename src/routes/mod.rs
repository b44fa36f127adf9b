// src/routes/mod.rs
pub mod chat;

use std::{any::Any, path::Path};

use crate::{error::AppError, state::SharedState};
use axum::{
    Router,
    extract::{Request, State},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
};
use chat::{chat_handler, chat_info_handler, get_metrics_handler, method_not_allowed_handler};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub fn create_router(state: SharedState, audio_dir: impl AsRef<Path>) -> Router {
    let admin_routes = Router::new()
        .route("/metrics", get(get_metrics_handler))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .route("/", get(|| async { "Chatbot is running! Use /chat to talk to it." }))
        .route(
            "/chat",
            get(chat_info_handler)
                .post(chat_handler)
                .fallback(method_not_allowed_handler),
        )
        .nest("/admin", admin_routes)
        .route("/health", get(|| async { "OK" }))
        .nest_service("/audio", ServeDir::new(audio_dir.as_ref()))
        .with_state(state)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
}

async fn auth_middleware(
    State(state): State<SharedState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let provided = req.headers().get("x-admin-key").and_then(|v| v.to_str().ok());
    match (&state.admin_key, provided) {
        (Some(key), Some(given)) if key.expose() == given => Ok(next.run(req).await),
        _ => Err(AppError::Unauthorized),
    }
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    AppError::Internal(format!("handler panicked: {detail}")).into_response()
}
