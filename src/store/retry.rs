use log::{error, warn};

use super::{ReadSet, RecordKey, Store, Write};
use crate::errors::{EngineError, EngineResult};

/// Run `apply` atomically against `store`, retrying on conflict.
///
/// The body may run more than once, so it must derive everything from the
/// `ReadSet` it is handed. Errors other than `Conflict` abort immediately.
pub fn run_atomic_transaction<S, F>(
    store: &S,
    read_keys: &[RecordKey],
    max_attempts: u32,
    mut apply: F,
) -> EngineResult<()>
where
    S: Store + ?Sized,
    F: FnMut(&ReadSet) -> EngineResult<Vec<Write>>,
{
    let max_attempts = max_attempts.max(1);

    for attempt in 1..=max_attempts {
        match store.try_commit(read_keys, &mut apply) {
            Err(EngineError::Conflict) if attempt < max_attempts => {
                warn!(
                    "Transaction conflict on {} keys, retrying (attempt {}/{})",
                    read_keys.len(),
                    attempt,
                    max_attempts
                );
            }
            Err(EngineError::Conflict) => break,
            other => return other,
        }
    }

    error!("Transaction gave up after {} conflicting attempts", max_attempts);
    Err(EngineError::RetriesExhausted { attempts: max_attempts })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{Record, RecordKind, TransactionBody};
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Conflicts for the first `failures` attempts, then commits nothing
    struct FlakyStore {
        failures: u32,
        attempts: AtomicU32,
    }

    impl Store for FlakyStore {
        fn get(&self, key: &RecordKey) -> EngineResult<Record> {
            Err(EngineError::not_found(key.kind, key.id.clone()))
        }

        fn try_commit(&self, _keys: &[RecordKey], apply: &mut TransactionBody<'_>) -> EngineResult<()> {
            let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
            apply(&ReadSet::new())?;
            if attempt <= self.failures {
                Err(EngineError::Conflict)
            } else {
                Ok(())
            }
        }
    }

    #[test]
    fn test_conflicts_are_retried() {
        let store = FlakyStore { failures: 2, attempts: AtomicU32::new(0) };
        let mut runs = 0;

        run_atomic_transaction(&store, &[], 5, |_| {
            runs += 1;
            Ok(Vec::new())
        })
        .unwrap();

        assert_eq!(runs, 3);
    }

    #[test]
    fn test_retry_bound_is_terminal() {
        let store = FlakyStore { failures: 10, attempts: AtomicU32::new(0) };

        let err = run_atomic_transaction(&store, &[], 3, |_| Ok(Vec::new())).unwrap_err();

        assert!(matches!(err, EngineError::RetriesExhausted { attempts: 3 }));
        assert_eq!(store.attempts.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_body_errors_are_not_retried() {
        let store = FlakyStore { failures: 0, attempts: AtomicU32::new(0) };

        let err = run_atomic_transaction(&store, &[], 5, |_| {
            Err(EngineError::not_found(RecordKind::Tournament, "t1"))
        })
        .unwrap_err();

        assert!(matches!(err, EngineError::NotFound { .. }));
        assert_eq!(store.attempts.load(Ordering::SeqCst), 1);
    }
}
