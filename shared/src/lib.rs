//! Shared types for the dine-in ordering service
//!
//! Types used by both the server and its connected clients: the real-time
//! event catalog and message envelope, plus the staff role hierarchy.

pub mod message;
pub mod models;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};

// Event channel re-exports (for convenient access)
pub use message::{EventMessage, EventName};
pub use models::{UserRole, has_sufficient_role};
