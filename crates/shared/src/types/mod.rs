//! Common types used across the application.

pub mod context;
pub mod pagination;

pub use context::{Role, TenantContext};
pub use pagination::{PageRequest, PageResponse};
