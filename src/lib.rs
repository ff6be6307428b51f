//! User group management service.
//!
//! An HTTP API for managing named groups of users inside a realm
//! (organizational workspace): create, list, edit, and delete groups, and
//! add/remove members in one combined call.
//!
//! # Architecture Overview
//!
//! ```text
//!                  ┌──────────────────────────────────────────────┐
//!                  │                GROUP SERVICE                  │
//!                  │                                               │
//!   HTTP Request   │  ┌─────────┐   ┌──────────┐   ┌───────────┐  │
//!   ───────────────┼─▶│  http   │──▶│   auth   │──▶│  groups   │  │
//!                  │  │ server  │   │  guards  │   │ handlers  │  │
//!                  │  └─────────┘   └──────────┘   └─────┬─────┘  │
//!                  │                                      │        │
//!                  │                                      ▼        │
//!   HTTP Response  │  ┌─────────┐                  ┌───────────┐  │
//!   ◀──────────────┼──│response │◀─────────────────│   store   │  │
//!                  │  │envelope │                  │   seam    │  │
//!                  │  └─────────┘                  └───────────┘  │
//!                  │                                               │
//!                  │  ┌─────────────────────────────────────────┐ │
//!                  │  │          Cross-Cutting Concerns          │ │
//!                  │  │  ┌────────┐ ┌─────────────┐ ┌─────────┐ │ │
//!                  │  │  │ config │ │observability│ │lifecycle│ │ │
//!                  │  │  └────────┘ └─────────────┘ └─────────┘ │ │
//!                  │  └─────────────────────────────────────────┘ │
//!                  └──────────────────────────────────────────────┘
//! ```

// Core subsystems
pub mod config;
pub mod groups;
pub mod http;
pub mod store;

// Cross-cutting concerns
pub mod auth;
pub mod lifecycle;
pub mod observability;

pub use config::ServerConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
