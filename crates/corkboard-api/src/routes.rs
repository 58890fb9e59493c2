use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::auth::{self, AppState};
use crate::messages;
use crate::middleware::require_auth;

/// Assemble the full router: open auth endpoints, then the message
/// endpoints behind the identity-resolving middleware.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/refresh", post(auth::refresh))
        .with_state(state.clone());

    let protected_routes = Router::new()
        .route("/messages", get(messages::get_all_messages))
        .route("/message", post(messages::create_message))
        .route(
            "/message/{message_id}",
            get(messages::get_message)
                .patch(messages::update_message)
                .delete(messages::delete_message),
        )
        .layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .with_state(state);

    Router::new().merge(public_routes).merge(protected_routes)
}
