use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::info;

use corkboard_db::Database;
use corkboard_types::api::{
    LoginRequest, RegisterRequest, TokenPairResponse, UserResponse,
};

use crate::error::ApiError;
use crate::password::{dummy_verify, hash_password, verify_password};
use crate::token::TokenSigner;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub tokens: TokenSigner,
}

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.username.is_empty() {
        return Err(ApiError::InvalidInput("username must not be empty"));
    }
    if req.password.is_empty() {
        return Err(ApiError::InvalidInput("password must not be empty"));
    }

    // Case-sensitive exact match, same as login.
    if state.db.get_user_by_username(&req.username)?.is_some() {
        return Err(ApiError::AlreadyExists);
    }

    let password_hash = hash_password(&req.password)?;
    let user = state.db.create_user(&req.username, &password_hash)?;

    info!("registered user {}", user.username);

    Ok(Json(UserResponse {
        id: user.id,
        username: user.username,
    }))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let Some(user) = state.db.get_user_by_username(&req.username)? else {
        // Burn a hash anyway so an unknown username costs the same as a
        // wrong password.
        dummy_verify(&req.password);
        return Err(ApiError::InvalidCredentials);
    };

    if !verify_password(&req.password, &user.password) {
        return Err(ApiError::InvalidCredentials);
    }

    issue_pair(&state.tokens, &user.username).map(Json)
}

#[derive(Debug, Deserialize)]
pub struct RefreshParams {
    pub refresh: String,
}

pub async fn refresh(
    State(state): State<AppState>,
    Query(params): Query<RefreshParams>,
) -> Result<impl IntoResponse, ApiError> {
    let username = state
        .tokens
        .verify(&params.refresh)
        .map_err(|_| ApiError::Unauthorized)?;

    // The subject must still resolve to a live user.
    let user = state
        .db
        .get_user_by_username(&username)?
        .ok_or(ApiError::Unauthorized)?;

    issue_pair(&state.tokens, &user.username).map(Json)
}

fn issue_pair(tokens: &TokenSigner, username: &str) -> Result<TokenPairResponse, ApiError> {
    let access = tokens
        .issue_access(username)
        .map_err(|e| ApiError::Internal(e.into()))?;
    let refresh = tokens
        .issue_refresh(username)
        .map_err(|e| ApiError::Internal(e.into()))?;
    Ok(TokenPairResponse { access, refresh })
}
