//! Persistence port consumed by the engine.
//!
//! A store exposes point reads and a single-attempt atomic read-modify-write.
//! [`run_atomic_transaction`] layers the bounded retry on top, so backends only
//! have to report [`EngineError::Conflict`] when an attempt loses a race.

pub mod memory;
pub mod retry;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::domain::{MatchRecord, Tournament};
use crate::errors::{EngineError, EngineResult};
use crate::rating::RatingRecord;

pub use memory::MemoryStore;
pub use retry::run_atomic_transaction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordKind {
    Rating,
    Match,
    Tournament,
    TournamentMatch,
}

impl RecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Rating => "rating",
            RecordKind::Match => "match",
            RecordKind::Tournament => "tournament",
            RecordKind::TournamentMatch => "tournament_match",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordKey {
    pub kind: RecordKind,
    pub id: String,
}

impl RecordKey {
    pub fn new(kind: RecordKind, id: impl Into<String>) -> Self {
        Self { kind, id: id.into() }
    }

    pub fn rating(id: impl Into<String>) -> Self {
        Self::new(RecordKind::Rating, id)
    }

    pub fn match_record(id: impl Into<String>) -> Self {
        Self::new(RecordKind::Match, id)
    }

    pub fn tournament(id: impl Into<String>) -> Self {
        Self::new(RecordKind::Tournament, id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "body", rename_all = "lowercase")]
pub enum Record {
    Rating(RatingRecord),
    Match(MatchRecord),
    Tournament(Tournament),
}

impl Record {
    pub fn kind(&self) -> RecordKind {
        match self {
            Record::Rating(_) => RecordKind::Rating,
            Record::Match(_) => RecordKind::Match,
            Record::Tournament(_) => RecordKind::Tournament,
        }
    }

    pub fn key(&self) -> RecordKey {
        match self {
            Record::Rating(r) => RecordKey::rating(r.key()),
            Record::Match(m) => RecordKey::match_record(m.id.clone()),
            Record::Tournament(t) => RecordKey::tournament(t.id.clone()),
        }
    }

    pub fn into_rating(self) -> EngineResult<RatingRecord> {
        match self {
            Record::Rating(r) => Ok(r),
            other => Err(kind_mismatch(RecordKind::Rating, &other)),
        }
    }

    pub fn into_match(self) -> EngineResult<MatchRecord> {
        match self {
            Record::Match(m) => Ok(m),
            other => Err(kind_mismatch(RecordKind::Match, &other)),
        }
    }

    pub fn into_tournament(self) -> EngineResult<Tournament> {
        match self {
            Record::Tournament(t) => Ok(t),
            other => Err(kind_mismatch(RecordKind::Tournament, &other)),
        }
    }
}

fn kind_mismatch(expected: RecordKind, found: &Record) -> EngineError {
    EngineError::InvariantViolation(format!(
        "expected a {} record, found a {} record",
        expected,
        found.kind()
    ))
}

/// Snapshot of the records read at the start of a transaction attempt.
/// Keys that did not exist map to `None`.
#[derive(Debug, Clone, Default)]
pub struct ReadSet {
    records: HashMap<RecordKey, Option<Record>>,
}

impl ReadSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: RecordKey, record: Option<Record>) {
        self.records.insert(key, record);
    }

    pub fn get(&self, key: &RecordKey) -> Option<&Record> {
        self.records.get(key).and_then(Option::as_ref)
    }

    /// Fetch a record that must exist inside this transaction
    pub fn require(&self, key: &RecordKey) -> EngineResult<&Record> {
        self.get(key)
            .ok_or_else(|| EngineError::not_found(key.kind, key.id.clone()))
    }

    pub fn rating(&self, key: &RecordKey) -> EngineResult<Option<RatingRecord>> {
        self.get(key).cloned().map(Record::into_rating).transpose()
    }

    pub fn tournament(&self, key: &RecordKey) -> EngineResult<Tournament> {
        self.require(key)?.clone().into_tournament()
    }
}

/// Mutation produced by a transaction body
#[derive(Debug, Clone, PartialEq)]
pub enum Write {
    /// Insert or replace
    Put(Record),
    /// Insert only; fails the attempt if the key already exists
    Create(Record),
}

impl Write {
    pub fn record(&self) -> &Record {
        match self {
            Write::Put(r) | Write::Create(r) => r,
        }
    }
}

pub type TransactionBody<'a> = dyn FnMut(&ReadSet) -> EngineResult<Vec<Write>> + 'a;

/// Storage backend the engine runs against
pub trait Store: Send + Sync {
    fn get(&self, key: &RecordKey) -> EngineResult<Record>;

    /// One attempt at an atomic read-modify-write over `read_keys`.
    ///
    /// Either every write lands or none does. Returns `Conflict` when a
    /// concurrent writer got there first; callers decide whether to retry.
    fn try_commit(&self, read_keys: &[RecordKey], apply: &mut TransactionBody<'_>) -> EngineResult<()>;
}
