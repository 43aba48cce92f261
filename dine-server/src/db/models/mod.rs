//! Database Models

// Serde helpers
pub mod serde_helpers;

pub mod order;
pub mod service_call;
pub mod table;

// Re-exports
pub use order::{Order, OrderCreate, OrderItem, OrderStatus};
pub use service_call::{ServiceCall, ServiceCallCreate, ServiceCallStatus};
pub use table::{Table, TableStatus};
