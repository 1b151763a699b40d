//! Identity Resolver.
//!
//! Maps login credentials to a role claim: teachers against the static
//! allow-list, students by id lookup against the canonical table plus the
//! fixed shared student secret. Claims are short-lived HS256 JWTs and are
//! never persisted server-side.

use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::schema::STUDENT_ID;
use crate::scoring::ensure_student_ids;
use crate::table::Table;

pub const ROLE_TEACHER: &str = "teacher";
pub const ROLE_STUDENT: &str = "student";

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Teacher email or student id
    pub sub: String,
    pub role: String,
    pub exp: usize,
    pub iat: usize,
}

/// A resolved identity, pre-token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub subject: String,
    pub role: &'static str,
}

/// Teacher path: exact allow-list match.
pub fn authenticate_teacher(
    email: &str,
    password: &str,
    allow_list: &[(String, String)],
) -> AppResult<Identity> {
    let email = email.trim();
    let known = allow_list
        .iter()
        .any(|(e, p)| e == email && p == password);
    if !known {
        return Err(AppError::Unauthorized("Invalid teacher credentials".to_string()));
    }
    Ok(Identity { subject: email.to_string(), role: ROLE_TEACHER })
}

/// Student path: id must exist in the canonical table and the password
/// must equal the shared student secret. Password-equals-id is rejected.
pub fn authenticate_student(
    id: &str,
    password: &str,
    student_secret: &str,
    table: Option<Table>,
) -> AppResult<Identity> {
    let id = id.trim();
    if id.is_empty() {
        return Err(AppError::Unauthorized("Student id is required".to_string()));
    }
    if password.is_empty() {
        return Err(AppError::Unauthorized("Password is required".to_string()));
    }

    let mut table = table.ok_or_else(|| {
        AppError::Validation("No student data available on server".to_string())
    })?;
    ensure_student_ids(&mut table);

    let exists = (0..table.row_count()).any(|row| {
        table
            .get(row, STUDENT_ID)
            .map(|v| v.to_text().trim() == id)
            .unwrap_or(false)
    });
    if !exists {
        return Err(AppError::Unauthorized("Unknown student id".to_string()));
    }
    if password != student_secret {
        return Err(AppError::Unauthorized("Invalid student password".to_string()));
    }
    Ok(Identity { subject: id.to_string(), role: ROLE_STUDENT })
}

/// Issue a signed claim for a resolved identity.
pub fn issue_token(identity: &Identity, secret: &str, ttl_hours: u64) -> AppResult<String> {
    let now = Utc::now();
    let exp = now + Duration::hours(ttl_hours as i64);

    let claims = Claims {
        sub: identity.subject.clone(),
        role: identity.role.to_string(),
        exp: exp.timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(e.to_string()))
}
