//! Tests for the transactional batch runner.
//!
//! The runner is driven against a mock connection. The ops here succeed or
//! fail on their own without touching SQL, which isolates the chunking and
//! error-recording behaviour from any particular repository.

use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};

use scolara_core::batch::{Atomicity, CHUNK_SIZE};
use scolara_shared::AppError;

use super::run;

fn mock_db() -> DatabaseConnection {
    MockDatabase::new(DatabaseBackend::Postgres).into_connection()
}

#[tokio::test]
async fn test_per_item_records_failure_and_keeps_siblings() {
    let db = mock_db();
    let items: Vec<u32> = (0..3).collect();

    let outcome = run(&db, Atomicity::PerItem, items, |n| *n, |_txn, n| {
        Box::pin(async move {
            if n == 1 {
                Err(AppError::Conflict(format!("item {n} already exists")))
            } else {
                Ok(n)
            }
        })
    })
    .await
    .unwrap();

    assert_eq!(outcome.succeeded, vec![0, 2]);
    assert_eq!(outcome.error_count(), 1);
    assert_eq!(outcome.errors[0].key, 1);
    assert_eq!(outcome.errors[0].code, "CONFLICT");
}

#[tokio::test]
async fn test_per_item_continues_past_chunk_boundary() {
    let db = mock_db();
    let boundary = u32::try_from(CHUNK_SIZE).unwrap();
    // One more item than a chunk holds, so the last item lands in a second
    // chunk with its own transaction.
    let items: Vec<u32> = (0..=boundary).collect();

    let outcome = run(&db, Atomicity::PerItem, items, |n| *n, |_txn, n| {
        Box::pin(async move {
            if n == 2 {
                Err(AppError::Validation("rejected".to_string()))
            } else {
                Ok(n)
            }
        })
    })
    .await
    .unwrap();

    assert_eq!(outcome.success_count(), CHUNK_SIZE);
    assert_eq!(outcome.error_count(), 1);
    assert_eq!(outcome.errors[0].key, 2);
    assert!(outcome.succeeded.contains(&boundary));
}

#[tokio::test]
async fn test_whole_batch_aborts_on_first_failure() {
    let db = mock_db();
    let items: Vec<u32> = (0..3).collect();

    let result = run(&db, Atomicity::WholeBatch, items, |n| *n, |_txn, n| {
        Box::pin(async move {
            if n == 1 {
                Err(AppError::Conflict("duplicate".to_string()))
            } else {
                Ok(n)
            }
        })
    })
    .await;

    assert!(matches!(result, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn test_empty_batch_is_a_no_op() {
    let db = mock_db();

    let outcome = run(&db, Atomicity::PerItem, Vec::<u32>::new(), |n| *n, |_txn, n| {
        Box::pin(async move { Ok(n) })
    })
    .await
    .unwrap();

    assert_eq!(outcome.success_count(), 0);
    assert_eq!(outcome.error_count(), 0);
}
