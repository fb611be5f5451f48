//! Shared types, errors, and configuration for Scolara.
//!
//! This crate provides common types used across all other crates:
//! - Application-wide error types
//! - Tenant/role caller context
//! - JWT claims and token service
//! - Pagination types for list endpoints
//! - Configuration management

pub mod auth;
pub mod config;
pub mod error;
pub mod jwt;
pub mod types;

pub use auth::Claims;
pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use jwt::{JwtConfig, JwtError, JwtService};
pub use types::context::{Role, TenantContext};
pub use types::pagination::{PageRequest, PageResponse};
