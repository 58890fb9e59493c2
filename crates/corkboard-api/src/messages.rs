use anyhow::anyhow;
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::error;

use corkboard_db::models::MessageRow;
use corkboard_types::api::{CreateMessageRequest, MessageResponse, UpdateMessageRequest};

use crate::auth::AppState;
use crate::error::ApiError;
use crate::middleware::CurrentUser;

/// Allow a mutation iff the caller owns the message. Reads need a valid
/// identity but no ownership.
fn authorize_owner(owner: &str, caller: &CurrentUser) -> Result<(), ApiError> {
    if owner == caller.username {
        Ok(())
    } else {
        Err(ApiError::Forbidden)
    }
}

fn to_response(row: MessageRow) -> MessageResponse {
    MessageResponse {
        id: row.id,
        username: row.username,
        message: row.message,
    }
}

pub async fn get_all_messages(
    State(state): State<AppState>,
    Extension(_user): Extension<CurrentUser>,
) -> Result<impl IntoResponse, ApiError> {
    // Run blocking DB work off the async runtime
    let db = state.clone();
    let rows = tokio::task::spawn_blocking(move || db.db.get_messages())
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal(anyhow!("task join error"))
        })??;

    Ok(Json(rows.into_iter().map(to_response).collect::<Vec<_>>()))
}

pub async fn get_message(
    State(state): State<AppState>,
    Path(message_id): Path<i64>,
    Extension(_user): Extension<CurrentUser>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let row = tokio::task::spawn_blocking(move || db.db.get_message(message_id))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal(anyhow!("task join error"))
        })??
        .ok_or(ApiError::NotFound)?;

    Ok(Json(to_response(row)))
}

pub async fn create_message(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<CreateMessageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    // Owner comes from the verified identity, never from the body.
    let db = state.clone();
    let row = tokio::task::spawn_blocking(move || db.db.insert_message(&user.username, &req.message))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal(anyhow!("task join error"))
        })??;

    Ok(Json(to_response(row)))
}

pub async fn update_message(
    State(state): State<AppState>,
    Path(message_id): Path<i64>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<UpdateMessageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let mut row = tokio::task::spawn_blocking(move || db.db.get_message(message_id))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal(anyhow!("task join error"))
        })??
        .ok_or(ApiError::NotFound)?;

    authorize_owner(&row.username, &user)?;

    // Update only when the field is present and non-empty; an empty
    // string skips the write, matching the reference patch semantics.
    if let Some(body) = req.message.filter(|m| !m.is_empty()) {
        let db = state.clone();
        let new_body = body.clone();
        tokio::task::spawn_blocking(move || db.db.update_message_body(message_id, &new_body))
            .await
            .map_err(|e| {
                error!("spawn_blocking join error: {}", e);
                ApiError::Internal(anyhow!("task join error"))
            })??;
        row.message = body;
    }

    Ok(Json(to_response(row)))
}

pub async fn delete_message(
    State(state): State<AppState>,
    Path(message_id): Path<i64>,
    Extension(user): Extension<CurrentUser>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let row = tokio::task::spawn_blocking(move || db.db.get_message(message_id))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal(anyhow!("task join error"))
        })??
        .ok_or(ApiError::NotFound)?;

    authorize_owner(&row.username, &user)?;

    let db = state.clone();
    tokio::task::spawn_blocking(move || db.db.delete_message(message_id))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal(anyhow!("task join error"))
        })??;

    Ok(StatusCode::NO_CONTENT)
}
