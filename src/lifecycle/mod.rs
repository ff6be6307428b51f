//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Validate → Seed store → Start listener
//!
//! Shutdown (shutdown.rs):
//!     Signal or trigger → Stop accepting → Drain connections → Exit
//! ```

pub mod shutdown;

pub use shutdown::Shutdown;
