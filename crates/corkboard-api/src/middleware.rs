use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};

use crate::auth::AppState;
use crate::error::ApiError;

/// The authenticated caller, attached as a request extension once the
/// bearer token and its subject have both checked out.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: i64,
    pub username: String,
}

/// Resolve the caller's identity from the Authorization header.
///
/// The token must verify AND its subject must still exist in the
/// credential store — a user removed after issuance loses access even
/// with a well-formed token. Either failure is a 401 before any handler
/// runs.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(ApiError::Unauthorized)?;

    // Tolerate a bare token without the Bearer prefix.
    let token = auth_header.strip_prefix("Bearer ").unwrap_or(auth_header);

    let username = state
        .tokens
        .verify(token)
        .map_err(|_| ApiError::Unauthorized)?;

    let user = state
        .db
        .get_user_by_username(&username)?
        .ok_or(ApiError::Unauthorized)?;

    req.extensions_mut().insert(CurrentUser {
        id: user.id,
        username: user.username,
    });
    Ok(next.run(req).await)
}
