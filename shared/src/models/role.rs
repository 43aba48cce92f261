//! Staff role hierarchy
//!
//! Roles form a total order; an operation requiring role R is permitted for
//! any caller whose role ranks at or above R. Authentication itself lives in
//! the auth collaborator — the core service only exposes the policy.

use serde::{Deserialize, Serialize};

/// Staff role, ordered from least to most privileged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Employee,
    Manager,
    Superadmin,
}

impl UserRole {
    /// Numeric rank within the hierarchy
    fn rank(&self) -> u8 {
        match self {
            UserRole::Employee => 1,
            UserRole::Manager => 2,
            UserRole::Superadmin => 3,
        }
    }
}

/// Role policy: does `actual` satisfy an endpoint requiring `required`?
pub fn has_sufficient_role(actual: UserRole, required: UserRole) -> bool {
    actual.rank() >= required.rank()
}
