//! Batch processing primitives.
//!
//! Bulk operations run in fixed-size chunks. The atomicity policy decides
//! what happens when an item fails: per-item mode records the failure and
//! keeps going, whole-batch mode aborts everything.

use serde::{Deserialize, Serialize};

/// Number of items processed per transaction chunk.
pub const CHUNK_SIZE: usize = 10;

/// Failure policy for a bulk operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Atomicity {
    /// Failed items are reported; the rest of the batch still commits.
    PerItem,
    /// Any failure rolls back the entire batch.
    WholeBatch,
}

/// One failed item within a batch, keyed by the caller's item identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchItemError<K> {
    /// Identifier of the failed item (e.g. a student id or input index).
    pub key: K,
    /// Stable error code.
    pub code: String,
    /// Human-readable message.
    pub message: String,
}

/// Result of a bulk operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchOutcome<T, K> {
    /// Successfully processed items, in input order.
    pub succeeded: Vec<T>,
    /// Failed items with their error codes.
    pub errors: Vec<BatchItemError<K>>,
}

impl<T, K> BatchOutcome<T, K> {
    /// Creates an empty outcome.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            succeeded: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Number of items that succeeded.
    #[must_use]
    pub fn success_count(&self) -> usize {
        self.succeeded.len()
    }

    /// Number of items that failed.
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// Records a successful item.
    pub fn push_success(&mut self, item: T) {
        self.succeeded.push(item);
    }

    /// Records a failed item.
    pub fn push_error(&mut self, key: K, code: impl Into<String>, message: impl Into<String>) {
        self.errors.push(BatchItemError {
            key,
            code: code.into(),
            message: message.into(),
        });
    }

    /// Merges another outcome into this one, preserving order.
    pub fn merge(&mut self, other: Self) {
        self.succeeded.extend(other.succeeded);
        self.errors.extend(other.errors);
    }
}

impl<T, K> Default for BatchOutcome<T, K> {
    fn default() -> Self {
        Self::new()
    }
}

/// Splits a slice into `CHUNK_SIZE`-sized chunks for transactional processing.
pub fn chunks<I>(items: &[I]) -> std::slice::Chunks<'_, I> {
    items.chunks(CHUNK_SIZE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_counts() {
        let mut outcome: BatchOutcome<u32, usize> = BatchOutcome::new();
        outcome.push_success(1);
        outcome.push_success(2);
        outcome.push_error(7, "VALIDATION_ERROR", "bad item");

        assert_eq!(outcome.success_count(), 2);
        assert_eq!(outcome.error_count(), 1);
        assert_eq!(outcome.errors[0].key, 7);
        assert_eq!(outcome.errors[0].code, "VALIDATION_ERROR");
    }

    #[test]
    fn test_merge_preserves_order() {
        let mut a: BatchOutcome<u32, usize> = BatchOutcome::new();
        a.push_success(1);
        let mut b: BatchOutcome<u32, usize> = BatchOutcome::new();
        b.push_success(2);
        b.push_error(5, "NOT_FOUND", "missing");

        a.merge(b);
        assert_eq!(a.succeeded, vec![1, 2]);
        assert_eq!(a.error_count(), 1);
    }

    #[test]
    fn test_chunking() {
        let items: Vec<u32> = (0..25).collect();
        let parts: Vec<_> = chunks(&items).collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0].len(), 10);
        assert_eq!(parts[1].len(), 10);
        assert_eq!(parts[2].len(), 5);
    }

    #[test]
    fn test_chunking_empty() {
        let items: Vec<u32> = Vec::new();
        assert_eq!(chunks(&items).count(), 0);
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Every item lands in exactly one chunk, in order.
            #[test]
            fn prop_chunks_partition(len in 0usize..500) {
                let items: Vec<usize> = (0..len).collect();
                let flattened: Vec<usize> =
                    chunks(&items).flatten().copied().collect();
                prop_assert_eq!(flattened, items);
            }

            /// All chunks are full except possibly the last.
            #[test]
            fn prop_chunks_sized(len in 1usize..500) {
                let items: Vec<usize> = (0..len).collect();
                let parts: Vec<_> = chunks(&items).collect();
                for part in &parts[..parts.len() - 1] {
                    prop_assert_eq!(part.len(), CHUNK_SIZE);
                }
                let last = parts.last().unwrap();
                prop_assert!(!last.is_empty() && last.len() <= CHUNK_SIZE);
            }

            /// Success and error counts always sum to the number of items fed in.
            #[test]
            fn prop_counts_add_up(
                results in prop::collection::vec(any::<bool>(), 0..100)
            ) {
                let mut outcome: BatchOutcome<usize, usize> = BatchOutcome::new();
                for (i, ok) in results.iter().enumerate() {
                    if *ok {
                        outcome.push_success(i);
                    } else {
                        outcome.push_error(i, "VALIDATION_ERROR", "rejected");
                    }
                }
                prop_assert_eq!(
                    outcome.success_count() + outcome.error_count(),
                    results.len()
                );
            }
        }
    }
}
