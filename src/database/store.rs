use anyhow::Context;
use log::debug;
use rusqlite::{ErrorCode, TransactionBehavior};

use super::connection::{create_pool, get_connection, DbPool};
use super::models::RecordRow;
use super::{records, setup};
use crate::errors::{codec_context, read_context, write_context, EngineError, EngineResult};
use crate::store::{ReadSet, Record, RecordKey, RecordKind, Store, TransactionBody, Write};

/// SQLite-backed store.
///
/// Every commit attempt is a `BEGIN IMMEDIATE` transaction, so the write lock
/// is held across the whole read-compute-write. A busy or locked database is
/// reported as `Conflict` and left to the retry loop.
pub struct SqliteStore {
    pool: DbPool,
}

impl SqliteStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Open (and if needed initialise) the database at `path`
    pub fn open(path: &str) -> anyhow::Result<Self> {
        let pool = create_pool(path)?;
        let mut conn = get_connection(&pool)?;
        setup::ensure_schema(&mut conn)?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    pub fn list(&self, kind: RecordKind) -> EngineResult<Vec<Record>> {
        let conn = get_connection(&self.pool)?;
        let rows = records::list_by_kind(&conn, kind.as_str())
            .with_context(|| format!("Failed to list {} records", kind))?;

        rows.iter().map(|row| decode(kind, row)).collect()
    }
}

impl Store for SqliteStore {
    fn get(&self, key: &RecordKey) -> EngineResult<Record> {
        let conn = get_connection(&self.pool)?;
        let row = records::find(&conn, key.kind.as_str(), &key.id)
            .with_context(|| read_context(key.kind, &key.id))?;

        match row {
            Some(row) => decode(key.kind, &row),
            None => Err(EngineError::not_found(key.kind, key.id.clone())),
        }
    }

    fn try_commit(&self, read_keys: &[RecordKey], apply: &mut TransactionBody<'_>) -> EngineResult<()> {
        let mut conn = get_connection(&self.pool)?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(classify_sqlite)?;

        let mut reads = ReadSet::new();
        for key in read_keys {
            let row = records::find(&tx, key.kind.as_str(), &key.id).map_err(classify)?;
            let record = row.map(|row| decode(key.kind, &row)).transpose()?;
            reads.insert(key.clone(), record);
        }

        let writes = apply(&reads)?;

        for write in &writes {
            let record = write.record();
            let key = record.key();
            let body = encode(record)?;
            let result = match write {
                Write::Put(_) => records::upsert(&tx, key.kind.as_str(), &key.id, &body),
                Write::Create(_) => records::insert(&tx, key.kind.as_str(), &key.id, &body),
            };
            result
                .with_context(|| write_context(key.kind, &key.id))
                .map_err(classify)?;
        }

        tx.commit().map_err(classify_sqlite)?;
        debug!("Committed {} writes over {} read keys", writes.len(), read_keys.len());
        Ok(())
    }
}

fn encode(record: &Record) -> EngineResult<String> {
    let body = serde_json::to_string(record).with_context(|| codec_context(record.kind()))?;
    Ok(body)
}

fn decode(kind: RecordKind, row: &RecordRow) -> EngineResult<Record> {
    let record: Record = serde_json::from_str(&row.body).with_context(|| codec_context(kind))?;

    if record.kind() != kind {
        return Err(EngineError::InvariantViolation(format!(
            "row '{}' stored as {} but holds a {} record",
            row.id,
            row.kind,
            record.kind()
        )));
    }
    Ok(record)
}

fn is_contention(err: &rusqlite::Error) -> bool {
    matches!(
        err.sqlite_error_code(),
        Some(ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked | ErrorCode::ConstraintViolation)
    )
}

fn classify_sqlite(err: rusqlite::Error) -> EngineError {
    if is_contention(&err) {
        EngineError::Conflict
    } else {
        EngineError::Store(err.into())
    }
}

fn classify(err: anyhow::Error) -> EngineError {
    match err.downcast_ref::<rusqlite::Error>() {
        Some(inner) if is_contention(inner) => EngineError::Conflict,
        _ => EngineError::Store(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Sport;
    use crate::rating::RatingRecord;
    use crate::store::run_atomic_transaction;

    fn temp_store(name: &str) -> (SqliteStore, std::path::PathBuf) {
        let path = std::env::temp_dir().join(format!("rackt_rank_{}_{}.db", name, uuid::Uuid::new_v4()));
        let store = SqliteStore::open(path.to_str().unwrap()).unwrap();
        (store, path)
    }

    fn cleanup(path: std::path::PathBuf) {
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_commit_then_get() {
        let (store, path) = temp_store("commit");
        let record = RatingRecord::new("ana", Sport::Badminton, 1250);
        let key = RecordKey::rating(record.key());

        run_atomic_transaction(&store, std::slice::from_ref(&key), 3, |reads| {
            assert!(reads.get(&key).is_none());
            Ok(vec![Write::Put(Record::Rating(record.clone()))])
        })
        .unwrap();

        let stored = store.get(&key).unwrap().into_rating().unwrap();
        assert_eq!(stored, record);
        assert_eq!(store.list(RecordKind::Rating).unwrap().len(), 1);

        cleanup(path);
    }

    #[test]
    fn test_failed_body_rolls_back() {
        let (store, path) = temp_store("rollback");
        let record = RatingRecord::new("ana", Sport::Tennis, 1200);
        let key = RecordKey::rating(record.key());

        let result = store.try_commit(&[], &mut |_reads: &ReadSet| {
            Err(EngineError::invalid_input("rejected"))
        });
        assert!(result.is_err());

        let err = store.get(&key).unwrap_err();
        assert!(matches!(err, EngineError::NotFound { .. }));

        cleanup(path);
    }

    #[test]
    fn test_duplicate_create_conflicts() {
        let (store, path) = temp_store("create");
        let record = Record::Rating(RatingRecord::new("ana", Sport::Padel, 1200));

        store
            .try_commit(&[], &mut |_reads: &ReadSet| Ok(vec![Write::Create(record.clone())]))
            .unwrap();
        let err = store
            .try_commit(&[], &mut |_reads: &ReadSet| Ok(vec![Write::Create(record.clone())]))
            .unwrap_err();

        assert!(err.is_conflict());
        cleanup(path);
    }
}
