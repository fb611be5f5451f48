//! Tenant repository for tenant-level settings.

use std::sync::Arc;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use scolara_shared::AppError;

use crate::entities::{academic_periods, tenants};

/// Error types for tenant operations.
#[derive(Debug, thiserror::Error)]
pub enum TenantError {
    /// Tenant not found.
    #[error("Tenant not found: {0}")]
    NotFound(Uuid),

    /// Period absent or belonging to another tenant.
    #[error("Period not found: {0}")]
    PeriodNotFound(Uuid),

    /// No current period is configured for the tenant.
    #[error("Tenant {0} has no current period configured")]
    NoCurrentPeriod(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<TenantError> for AppError {
    fn from(err: TenantError) -> Self {
        let msg = err.to_string();
        match err {
            TenantError::NotFound(_) | TenantError::PeriodNotFound(_) => Self::NotFound(msg),
            TenantError::NoCurrentPeriod(_) => Self::Validation(msg),
            TenantError::Database(_) => Self::Database(msg),
        }
    }
}

/// Tenant repository.
#[derive(Debug, Clone)]
pub struct TenantRepository {
    db: Arc<DatabaseConnection>,
}

impl TenantRepository {
    /// Creates a new tenant repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Points the tenant's current period at the given period.
    ///
    /// # Errors
    ///
    /// Returns an error if the period does not belong to the tenant.
    pub async fn set_current_period(
        &self,
        tenant_id: Uuid,
        period_id: Uuid,
    ) -> Result<tenants::Model, TenantError> {
        let txn = self.db.begin().await?;

        let tenant = tenants::Entity::find()
            .filter(tenants::Column::Id.eq(tenant_id))
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(TenantError::NotFound(tenant_id))?;

        academic_periods::Entity::find()
            .filter(academic_periods::Column::Id.eq(period_id))
            .filter(academic_periods::Column::TenantId.eq(tenant_id))
            .one(&txn)
            .await?
            .ok_or(TenantError::PeriodNotFound(period_id))?;

        let mut active: tenants::ActiveModel = tenant.into();
        active.current_period_id = Set(Some(period_id));
        active.updated_at = Set(Utc::now().into());
        let tenant = active.update(&txn).await?;

        txn.commit().await?;
        Ok(tenant)
    }

    /// Resolves the tenant's current period, used as the default for
    /// enrollments and invoice generation.
    ///
    /// # Errors
    ///
    /// Returns an error if the tenant is missing or has no current period.
    pub async fn current_period(&self, tenant_id: Uuid) -> Result<Uuid, TenantError> {
        let tenant = tenants::Entity::find()
            .filter(tenants::Column::Id.eq(tenant_id))
            .one(self.db.as_ref())
            .await?
            .ok_or(TenantError::NotFound(tenant_id))?;
        tenant
            .current_period_id
            .ok_or(TenantError::NoCurrentPeriod(tenant_id))
    }
}
