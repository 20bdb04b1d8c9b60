use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::error;
use uuid::Uuid;

use crate::state::AppState;

pub fn create_routes() -> Router<AppState> {
    Router::new()
        .route("/summarize_and_translate/", post(summarize_and_translate))
        .route("/api/health", get(health_check))
}

/// Full application router with tracing and CORS layers
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(create_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn summarize_and_translate(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let request_id = Uuid::new_v4();
    match state.summarizer.handle(request_id, body).await {
        Ok(translated_summary) => Ok(Json(json!({
            "translated_summary": translated_summary
        }))),
        Err(e) => {
            error!(%request_id, "summarize_and_translate failed: {}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"detail": e.to_string()})),
            ))
        }
    }
}

async fn health_check(State(state): State<AppState>) -> Json<Value> {
    let inference_healthy = state.loader.health_check().await.unwrap_or(false);
    Json(json!({
        "status": "ok",
        "inference_service": inference_healthy,
        "deployments": {
            "translator": {"replicas": state.translator.num_replicas()},
            "summarizer": {"replicas": state.summarizer.num_replicas()}
        }
    }))
}
