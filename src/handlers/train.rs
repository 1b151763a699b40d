//! Retraining handler
//!
//! Teacher-only. Runs the external trainer to completion, then reloads the
//! classifier artifact and swaps it in; in-flight predictions keep using
//! the artifact they started with.

use axum::{extract::State, Json};

use crate::error::AppResult;
use crate::middleware::auth::{require_teacher, AuthContext};
use crate::AppState;

pub async fn train(
    State(state): State<AppState>,
    ctx: AuthContext,
) -> AppResult<Json<serde_json::Value>> {
    require_teacher(&ctx)?;

    let output = state.trainer.run().await?;

    match state.classifiers.reload() {
        Ok(true) => tracing::info!("classifier swapped after retrain"),
        Ok(false) => tracing::warn!(
            "trainer succeeded but no artifact at {:?}",
            state.classifiers.model_path()
        ),
        Err(e) => tracing::error!("trainer succeeded but artifact reload failed: {}", e),
    }

    Ok(Json(serde_json::json!({
        "ok": true,
        "message": "Retrain finished",
        "stdout": output.stdout,
    })))
}
