//! Shared domain models

pub mod role;

pub use role::{UserRole, has_sufficient_role};
