//! Student records handler

use axum::{extract::State, Json};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthContext;
use crate::schema::STUDENT_ID;
use crate::scoring::ensure_student_ids;
use crate::AppState;

/// Teacher sees the whole table; a student sees only their own record.
pub async fn list(
    State(state): State<AppState>,
    ctx: AuthContext,
) -> AppResult<Json<serde_json::Value>> {
    let Some(mut table) = state.tables.load()? else {
        // No upload yet. Teachers get an empty listing, students a 404.
        if ctx.is_teacher() {
            return Ok(Json(serde_json::json!([])));
        }
        return Err(AppError::NotFound("No record found for this student".to_string()));
    };
    ensure_student_ids(&mut table);

    if ctx.is_teacher() {
        return Ok(Json(serde_json::Value::Array(
            table
                .records()
                .into_iter()
                .map(serde_json::Value::Object)
                .collect(),
        )));
    }

    let sid = ctx.subject.trim();
    let row = (0..table.row_count()).find(|&row| {
        table
            .get(row, STUDENT_ID)
            .map(|v| v.to_text().trim() == sid)
            .unwrap_or(false)
    });

    match row {
        Some(row) => Ok(Json(serde_json::Value::Object(table.row_record(row)))),
        None => Err(AppError::NotFound("No record found for this student".to_string())),
    }
}
