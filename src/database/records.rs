use anyhow::{Context, Result};
use chrono::{NaiveDateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use super::models::RecordRow;

pub fn find(conn: &Connection, kind: &str, id: &str) -> Result<Option<RecordRow>> {
    let sql = "SELECT kind, id, version, body, updated_at FROM records WHERE kind = ?1 AND id = ?2";

    conn.query_row(sql, params![kind, id], parse_record_row)
        .optional()
        .context("Failed to query record by key")
}

pub fn insert(conn: &Connection, kind: &str, id: &str, body: &str) -> Result<()> {
    let sql = "INSERT INTO records (kind, id, version, body, updated_at) VALUES (?1, ?2, 1, ?3, ?4)";

    conn.execute(sql, params![kind, id, body, now()])
        .context("Failed to insert record")
        .map(|_| ())
}

pub fn upsert(conn: &Connection, kind: &str, id: &str, body: &str) -> Result<()> {
    let sql = "INSERT INTO records (kind, id, version, body, updated_at) VALUES (?1, ?2, 1, ?3, ?4)
        ON CONFLICT (kind, id) DO UPDATE SET version = version + 1, body = excluded.body, updated_at = excluded.updated_at";

    conn.execute(sql, params![kind, id, body, now()])
        .context("Failed to upsert record")
        .map(|_| ())
}

pub fn list_by_kind(conn: &Connection, kind: &str) -> Result<Vec<RecordRow>> {
    let sql = "SELECT kind, id, version, body, updated_at FROM records WHERE kind = ?1 ORDER BY id";

    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params![kind], parse_record_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}

fn parse_record_row(row: &rusqlite::Row) -> rusqlite::Result<RecordRow> {
    Ok(RecordRow {
        kind: row.get(0)?,
        id: row.get(1)?,
        version: row.get(2)?,
        body: row.get(3)?,
        updated_at: row.get(4)?,
    })
}

fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}
