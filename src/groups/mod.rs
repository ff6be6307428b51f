//! User group domain: types, handlers, and result composition.
//!
//! # Data Flow
//! ```text
//! HTTP request
//!     → handlers.rs (authorize → validate → store call → respond)
//!     → types.rs (typed, validated request/response shapes)
//!     → compose.rs (merge add/remove sub-operation payloads)
//! ```

pub mod compose;
pub mod handlers;
pub mod types;

use axum::routing::{get, patch, post};
use axum::Router;

use crate::http::server::AppState;
use self::handlers::*;

/// Build the group API router.
pub fn setup_groups_router(state: AppState) -> Router {
    Router::new()
        .route("/groups", post(create_group).get(list_groups))
        .route("/groups/{id}", patch(edit_group).delete(delete_group))
        .route("/groups/{id}/members", post(update_members))
        .with_state(state)
}
