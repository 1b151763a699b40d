//! Data upload handler
//!
//! Teacher-only multipart upload of the student dataset. The file is
//! validated against the feature schema, scored (classifier when loaded,
//! heuristic otherwise) and rewritten wholesale as the canonical table.

use std::path::Path;

use axum::extract::{Multipart, State};
use axum::Json;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::{require_teacher, AuthContext};
use crate::schema;
use crate::scoring;
use crate::table::{csv, excel, Table};
use crate::AppState;

pub const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

const ALLOWED_EXTENSIONS: [&str; 3] = ["csv", "xlsx", "xls"];

pub async fn upload(
    State(state): State<AppState>,
    ctx: AuthContext,
    mut multipart: Multipart,
) -> AppResult<Json<serde_json::Value>> {
    require_teacher(&ctx)?;

    let mut file: Option<(String, Vec<u8>)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed upload: {e}")))?
    {
        if field.name() == Some("file") {
            let filename = field.file_name().unwrap_or_default().to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::Validation(format!("Could not read upload: {e}")))?;
            file = Some((filename, bytes.to_vec()));
            break;
        }
    }

    let Some((filename, bytes)) = file else {
        return Err(AppError::Validation("No file part".to_string()));
    };
    let filename = sanitize_filename(&filename);
    if filename.is_empty() {
        return Err(AppError::Validation("No file selected".to_string()));
    }
    if bytes.is_empty() {
        return Err(AppError::Validation("Uploaded file is empty".to_string()));
    }

    let ext = filename
        .rsplit_once('.')
        .map(|(_, e)| e.to_ascii_lowercase())
        .unwrap_or_default();
    if !ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
        return Err(AppError::Validation(
            "File type not allowed. Please upload .csv, .xlsx or .xls files".to_string(),
        ));
    }

    // Keep the raw upload as received; the canonical table is only written
    // after validation and scoring succeed.
    let saved_path = state.tables.save_raw_upload(&filename, &bytes)?;
    let table = read_table(&saved_path, &ext, &bytes)?;

    let missing = schema::missing_columns(&table);
    if !missing.is_empty() {
        return Err(AppError::Validation(format!(
            "Missing required columns: {}",
            missing.join(", ")
        )));
    }

    let classifier = state.classifiers.current();
    let scored = scoring::score_table(table, classifier.as_deref());
    state.tables.save(&scored.table)?;

    tracing::info!(
        "upload processed: {} rows, {} pass, {} fail",
        scored.row_count(),
        scored.pass_count,
        scored.fail_count
    );

    Ok(Json(serde_json::json!({
        "ok": true,
        "message": format!(
            "Successfully processed {} student records ({} Pass, {} Fail). File saved as students.csv.",
            scored.row_count(),
            scored.pass_count,
            scored.fail_count
        ),
    })))
}

fn read_table(path: &Path, ext: &str, bytes: &[u8]) -> AppResult<Table> {
    let table = match ext {
        "xlsx" | "xls" => excel::read(path).map_err(AppError::Validation)?,
        _ => {
            let text = String::from_utf8_lossy(bytes);
            csv::parse(&text)
                .ok_or_else(|| AppError::Validation("Uploaded file has no header row".to_string()))?
        }
    };
    if table.is_empty() {
        return Err(AppError::Validation("Uploaded file has no data rows".to_string()));
    }
    Ok(table)
}

/// Strip any path components from the client-supplied filename.
fn sanitize_filename(raw: &str) -> String {
    raw.rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_strips_paths() {
        assert_eq!(sanitize_filename("../../etc/passwd.csv"), "passwd.csv");
        assert_eq!(sanitize_filename("C:\\data\\grades.xlsx"), "grades.xlsx");
        assert_eq!(sanitize_filename("plain.csv"), "plain.csv");
        assert_eq!(sanitize_filename(""), "");
    }
}
