use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use anyhow::anyhow;

use super::{ReadSet, Record, RecordKey, Store, TransactionBody, Write};
use crate::errors::{EngineError, EngineResult};

#[derive(Debug, Clone)]
struct Versioned {
    version: u64,
    record: Record,
}

/// In-process store using optimistic versioning.
///
/// An attempt snapshots the versions of its read keys, runs the body without
/// holding the lock, and commits only if none of those versions moved.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<RecordKey, Versioned>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lock().map(|records| records.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove a record outside of any transaction
    pub fn delete(&self, key: &RecordKey) -> EngineResult<Option<Record>> {
        Ok(self.lock()?.remove(key).map(|v| v.record))
    }

    fn lock(&self) -> EngineResult<MutexGuard<'_, HashMap<RecordKey, Versioned>>> {
        self.records
            .lock()
            .map_err(|_| EngineError::Store(anyhow!("memory store lock poisoned")))
    }

    fn snapshot(&self, read_keys: &[RecordKey]) -> EngineResult<(ReadSet, Vec<Option<u64>>)> {
        let records = self.lock()?;
        let mut reads = ReadSet::new();
        let mut versions = Vec::with_capacity(read_keys.len());

        for key in read_keys {
            let entry = records.get(key);
            versions.push(entry.map(|v| v.version));
            reads.insert(key.clone(), entry.map(|v| v.record.clone()));
        }

        Ok((reads, versions))
    }
}

impl Store for MemoryStore {
    fn get(&self, key: &RecordKey) -> EngineResult<Record> {
        self.lock()?
            .get(key)
            .map(|v| v.record.clone())
            .ok_or_else(|| EngineError::not_found(key.kind, key.id.clone()))
    }

    fn try_commit(&self, read_keys: &[RecordKey], apply: &mut TransactionBody<'_>) -> EngineResult<()> {
        let (reads, versions) = self.snapshot(read_keys)?;
        let writes = apply(&reads)?;

        let mut records = self.lock()?;

        let unchanged = read_keys
            .iter()
            .zip(&versions)
            .all(|(key, seen)| records.get(key).map(|v| v.version) == *seen);
        if !unchanged {
            return Err(EngineError::Conflict);
        }

        for write in &writes {
            if let Write::Create(record) = write {
                if records.contains_key(&record.key()) {
                    return Err(EngineError::Conflict);
                }
            }
        }

        for write in writes {
            let record = match write {
                Write::Put(record) | Write::Create(record) => record,
            };
            let key = record.key();
            let version = records.get(&key).map_or(1, |v| v.version + 1);
            records.insert(key, Versioned { version, record });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Sport;
    use crate::rating::RatingRecord;
    use crate::store::run_atomic_transaction;

    fn counter_key() -> RecordKey {
        RecordKey::rating(RatingRecord::key_for("ana", Sport::Tennis))
    }

    fn bump(store: &MemoryStore) -> EngineResult<()> {
        let key = counter_key();
        run_atomic_transaction(store, std::slice::from_ref(&key), 1000, |reads| {
            let mut record = reads
                .rating(&key)?
                .unwrap_or_else(|| RatingRecord::new("ana", Sport::Tennis, 0));
            record.value += 1;
            Ok(vec![Write::Put(Record::Rating(record))])
        })
    }

    #[test]
    fn test_get_missing_is_not_found() {
        let store = MemoryStore::new();
        let err = store.get(&counter_key()).unwrap_err();
        assert!(matches!(err, EngineError::NotFound { .. }));
    }

    #[test]
    fn test_stale_snapshot_conflicts() {
        let store = MemoryStore::new();
        let key = counter_key();
        bump(&store).unwrap();

        let err = store
            .try_commit(std::slice::from_ref(&key), &mut |_reads: &ReadSet| {
                // A concurrent writer lands between snapshot and commit
                bump(&store)?;
                Ok(vec![Write::Put(Record::Rating(RatingRecord::new("ana", Sport::Tennis, 99)))])
            })
            .unwrap_err();

        assert!(err.is_conflict());
        let stored = store.get(&key).unwrap().into_rating().unwrap();
        assert_eq!(stored.value, 2);
    }

    #[test]
    fn test_failed_body_writes_nothing() {
        let store = MemoryStore::new();
        let key = counter_key();

        let result = store.try_commit(std::slice::from_ref(&key), &mut |_reads: &ReadSet| {
            Err(EngineError::invalid_input("nope"))
        });

        assert!(result.is_err());
        assert!(store.is_empty());
    }

    #[test]
    fn test_concurrent_increments_are_not_lost() {
        let store = MemoryStore::new();

        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    for _ in 0..25 {
                        bump(&store).unwrap();
                    }
                });
            }
        });

        let stored = store.get(&counter_key()).unwrap().into_rating().unwrap();
        assert_eq!(stored.value, 200);
    }
}
