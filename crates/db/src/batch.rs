//! Chunked transactional batch runner.
//!
//! Bulk operations feed their items through [`run`], which owns the
//! transaction boundaries:
//!
//! - [`Atomicity::PerItem`]: items are processed in chunks, each chunk in its
//!   own transaction. Within a chunk every item runs under a savepoint, so a
//!   failed item rolls back alone while its neighbours commit.
//! - [`Atomicity::WholeBatch`]: every item runs in a single transaction; the
//!   first failure rolls back the whole batch and becomes the batch's error.

use futures::future::BoxFuture;
use sea_orm::{DatabaseConnection, DatabaseTransaction, DbErr, TransactionTrait};

use scolara_core::batch::{Atomicity, BatchOutcome, CHUNK_SIZE};
use scolara_shared::AppError;

fn db_err(err: DbErr) -> AppError {
    AppError::Database(err.to_string())
}

/// Runs `op` over `items` under the given atomicity policy.
///
/// `key_of` extracts the identifier reported for failed items.
///
/// # Errors
///
/// Returns an error if a transaction cannot be opened or committed, or, in
/// whole-batch mode, if any item fails.
pub async fn run<I, T, K, F>(
    db: &DatabaseConnection,
    atomicity: Atomicity,
    items: Vec<I>,
    key_of: impl Fn(&I) -> K,
    op: F,
) -> Result<BatchOutcome<T, K>, AppError>
where
    F: for<'a> Fn(&'a DatabaseTransaction, I) -> BoxFuture<'a, Result<T, AppError>>,
{
    match atomicity {
        Atomicity::WholeBatch => run_whole_batch(db, items, op).await,
        Atomicity::PerItem => run_per_item(db, items, key_of, op).await,
    }
}

async fn run_whole_batch<I, T, K, F>(
    db: &DatabaseConnection,
    items: Vec<I>,
    op: F,
) -> Result<BatchOutcome<T, K>, AppError>
where
    F: for<'a> Fn(&'a DatabaseTransaction, I) -> BoxFuture<'a, Result<T, AppError>>,
{
    let txn = db.begin().await.map_err(db_err)?;
    let mut outcome = BatchOutcome::new();

    for item in items {
        match op(&txn, item).await {
            Ok(value) => outcome.push_success(value),
            Err(err) => {
                txn.rollback().await.map_err(db_err)?;
                return Err(err);
            }
        }
    }

    txn.commit().await.map_err(db_err)?;
    Ok(outcome)
}

async fn run_per_item<I, T, K, F>(
    db: &DatabaseConnection,
    items: Vec<I>,
    key_of: impl Fn(&I) -> K,
    op: F,
) -> Result<BatchOutcome<T, K>, AppError>
where
    F: for<'a> Fn(&'a DatabaseTransaction, I) -> BoxFuture<'a, Result<T, AppError>>,
{
    let mut outcome = BatchOutcome::new();
    let mut remaining = items.into_iter();

    loop {
        let chunk: Vec<I> = remaining.by_ref().take(CHUNK_SIZE).collect();
        if chunk.is_empty() {
            break;
        }

        let txn = db.begin().await.map_err(db_err)?;
        for item in chunk {
            let key = key_of(&item);
            // Nested begin opens a savepoint, isolating this item's writes.
            let savepoint = txn.begin().await.map_err(db_err)?;
            match op(&savepoint, item).await {
                Ok(value) => {
                    savepoint.commit().await.map_err(db_err)?;
                    outcome.push_success(value);
                }
                Err(err) => {
                    savepoint.rollback().await.map_err(db_err)?;
                    outcome.push_error(key, err.error_code(), err.to_string());
                }
            }
        }
        txn.commit().await.map_err(db_err)?;
    }

    Ok(outcome)
}

#[cfg(test)]
#[path = "batch_tests.rs"]
mod tests;
