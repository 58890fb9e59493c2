use serde::{Deserialize, Serialize};

// -- JWT claims --

/// Claims carried by both token classes. Access and refresh tokens share
/// this shape and the signing key; they differ only in TTL and in how the
/// client uses them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
}

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Access/refresh pair, always issued together at login and at refresh.
#[derive(Debug, Serialize)]
pub struct TokenPairResponse {
    pub access: String,
    pub refresh: String,
}

// -- Messages --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateMessageRequest {
    pub message: String,
}

/// PATCH body. The field is applied only when present and non-empty; an
/// empty string skips the update.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateMessageRequest {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub id: i64,
    pub username: String,
    pub message: String,
}
