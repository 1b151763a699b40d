//! Health check handler

use axum::{extract::State, Json};

use crate::AppState;

pub async fn check(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "model_loaded": state.classifiers.is_loaded(),
    }))
}
