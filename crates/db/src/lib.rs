//! Database layer with `SeaORM` entities and repositories.
//!
//! This crate provides:
//! - `SeaORM` entity definitions
//! - Repository abstractions for data access
//! - Database migrations
//! - The chunked batch runner behind bulk operations

pub mod batch;
pub mod entities;
pub mod migration;
pub mod repositories;

pub use repositories::{
    AuditRepository, EnrollmentRepository, InvoiceRepository, RecordsRepository, TenantRepository,
};

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

use scolara_shared::config::DatabaseConfig;

/// Establishes a connection pool to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(&config.url);
    options
        .max_connections(config.max_connections)
        .min_connections(config.min_connections);
    Database::connect(options).await
}
