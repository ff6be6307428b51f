//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (request ID, typed JSON body parsing)
//!     → [groups handlers do the work]
//!     → response.rs (success payloads, error envelope)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{JsonBody, RequestId, RequestIdExt, RequestIdLayer, X_REQUEST_ID};
pub use server::HttpServer;
