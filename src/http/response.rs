//! Response envelope and error-to-status mapping.
//!
//! # Responsibilities
//! - Define the request error taxonomy for the whole API
//! - Map every error to an HTTP status and a `{"code", "message"}` body
//! - Provide the success payload type handlers compose
//!
//! # Design Decisions
//! - One enum for the full taxonomy; handlers never touch status codes
//! - Validation and state-conflict errors are 400 (matching the behavior
//!   of the chat platform this API fronts), auth is 401/403, missing
//!   groups are 404
//! - Success payloads are JSON objects so sub-operation results can merge

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::groups::types::UserId;

/// A success payload: a JSON object handlers can merge key-by-key.
pub type ResponseData = serde_json::Map<String, Value>;

/// The empty success payload `{}`.
pub fn empty_success() -> ResponseData {
    ResponseData::new()
}

/// Errors a request can fail with.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    /// Missing or unknown API key.
    #[error("Invalid API key")]
    Unauthorized,

    /// Caller authenticated but lacks permission for this operation.
    #[error("Insufficient permission")]
    Forbidden,

    /// No group with the requested ID is visible to the caller.
    #[error("Invalid user group")]
    GroupNotFound,

    /// A member ID did not resolve to a user in the caller's realm.
    #[error("Invalid user ID: {0}")]
    InvalidUserId(UserId),

    /// A group with this name already exists in the realm.
    #[error("User group '{0}' already exists.")]
    DuplicateGroupName(String),

    /// Edit request carried neither a new name nor a new description.
    #[error("No new data supplied")]
    NoNewData,

    /// Membership update carried neither additions nor removals.
    #[error("Nothing to do. Specify at least one of \"add\" or \"delete\".")]
    NothingToDo,

    /// Tried to add a user who is already a direct member.
    #[error("User {0} is already a member of this group")]
    AlreadyMember(UserId),

    /// Tried to remove a user who is not a direct member.
    #[error("There is no member '{0}' in this user group")]
    NotAMember(UserId),

    /// Malformed request (bad JSON body, bad path parameter, blank name).
    #[error("{0}")]
    BadRequest(String),

    /// Unexpected store failure.
    #[error("Internal server error")]
    Internal(String),
}

impl ApiError {
    /// Machine-readable code for the error envelope.
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Unauthorized => "invalid_api_key",
            ApiError::Forbidden => "forbidden",
            ApiError::GroupNotFound => "group_not_found",
            ApiError::InvalidUserId(_) => "invalid_user_id",
            ApiError::DuplicateGroupName(_) => "duplicate_group_name",
            ApiError::NoNewData => "no_new_data",
            ApiError::NothingToDo => "nothing_to_do",
            ApiError::AlreadyMember(_) => "already_member",
            ApiError::NotAMember(_) => "not_a_member",
            ApiError::BadRequest(_) => "bad_request",
            ApiError::Internal(_) => "internal",
        }
    }

    /// HTTP status this error surfaces as.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::GroupNotFound => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

/// JSON error envelope returned for every failed request.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            // The detail string stays in the log, not the response.
            if let ApiError::Internal(detail) = &self {
                tracing::error!(detail = %detail, "Internal error");
            }
        }
        let body = ErrorBody {
            code: self.code(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Result alias used by handlers and sub-operations.
pub type ApiResult<T> = Result<T, ApiError>;
