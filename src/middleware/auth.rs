//! Authentication middleware
//!
//! Validates the Bearer JWT and stashes an [`AuthContext`] in request
//! extensions. Expired, malformed and missing tokens are all rejected
//! uniformly as 401 without telling the caller which it was.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::header::AUTHORIZATION,
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, DecodingKey, Validation};

use crate::error::AppError;
use crate::identity::{Claims, ROLE_TEACHER};
use crate::AppState;

/// Caller context extracted from the JWT
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// Teacher email or student id
    pub subject: String,
    pub role: String,
}

impl AuthContext {
    pub fn is_teacher(&self) -> bool {
        self.role == ROLE_TEACHER
    }
}

/// RBAC: teacher-only operations (upload, train, predict)
pub fn require_teacher(ctx: &AuthContext) -> Result<(), AppError> {
    if !ctx.is_teacher() {
        tracing::warn!(
            "teacher role required but '{}' has role '{}'",
            ctx.subject,
            ctx.role
        );
        return Err(AppError::Forbidden);
    }
    Ok(())
}

/// Middleware: require a valid claim
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_bearer_token(&req)?;

    let token_data = decode::<Claims>(
        &token,
        &DecodingKey::from_secret(state.config.jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::unauthorized())?;

    let claims = token_data.claims;
    req.extensions_mut().insert(AuthContext {
        subject: claims.sub,
        role: claims.role,
    });

    Ok(next.run(req).await)
}

/// Extract bearer token from Authorization header
fn extract_bearer_token(req: &Request) -> Result<String, AppError> {
    let auth_header = req
        .headers()
        .get(AUTHORIZATION)
        .ok_or_else(AppError::unauthorized)?
        .to_str()
        .map_err(|_| AppError::unauthorized())?;

    if !auth_header.starts_with("Bearer ") {
        return Err(AppError::unauthorized());
    }

    Ok(auth_header[7..].to_string())
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .ok_or_else(AppError::unauthorized)
    }
}
