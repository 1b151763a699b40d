//! Login handler

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::identity::{self, ROLE_TEACHER};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub role: Option<String>,
    pub email: Option<String>,
    /// Student identifier; numbers are accepted as well as strings.
    pub id: Option<serde_json::Value>,
    /// Legacy clients send the id under this name.
    pub student_id: Option<serde_json::Value>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub ok: bool,
    pub token: String,
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

/// Login endpoint: teacher against the allow-list, student against the
/// canonical table.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let password = req.password.unwrap_or_default();

    let identity = if req.role.as_deref() == Some(ROLE_TEACHER) {
        let email = req.email.unwrap_or_default();
        identity::authenticate_teacher(&email, &password, &state.config.teachers)?
    } else {
        let id = req
            .id
            .or(req.student_id)
            .map(scalar_to_string)
            .unwrap_or_default();
        let table = state.tables.load()?;
        identity::authenticate_student(&id, &password, &state.config.student_secret, table)?
    };

    let token = identity::issue_token(
        &identity,
        &state.config.jwt_secret,
        state.config.token_ttl_hours,
    )?;

    tracing::info!("login: {} ({})", identity.subject, identity.role);

    let id = if identity.role == ROLE_TEACHER {
        None
    } else {
        Some(identity.subject.clone())
    };

    Ok(Json(LoginResponse {
        ok: true,
        token,
        role: identity.role.to_string(),
        id,
    }))
}

fn scalar_to_string(v: serde_json::Value) -> String {
    match v {
        serde_json::Value::String(s) => s,
        serde_json::Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}
