//! Single-record prediction handler
//!
//! Teacher-only form prediction: the body carries any subset of the 13
//! feature fields; the schema normalizer fills the rest. The response
//! echoes the raw input alongside the classification.

use axum::{extract::State, Json};
use serde_json::Map;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::{require_teacher, AuthContext};
use crate::model;
use crate::schema;
use crate::table::Table;
use crate::AppState;

pub async fn predict(
    State(state): State<AppState>,
    ctx: AuthContext,
    Json(payload): Json<Map<String, serde_json::Value>>,
) -> AppResult<Json<serde_json::Value>> {
    require_teacher(&ctx)?;

    let Some(classifier) = state.classifiers.current() else {
        return Err(AppError::Validation(
            "Model not available. Please train first.".to_string(),
        ));
    };

    let normalized = schema::normalize(&Table::from_record(&payload));
    let predictions = model::infer(classifier.as_ref(), &normalized)?;
    let prediction = predictions
        .first()
        .ok_or_else(|| AppError::Internal("empty prediction output".to_string()))?;

    Ok(Json(serde_json::json!({
        "prediction": prediction.label.as_str(),
        "probability": prediction.probability,
        "input_features": payload,
    })))
}
