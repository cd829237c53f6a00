use anyhow::{Context, Result};

use super::connection::DbConn;

pub fn reset_database(conn: &mut DbConn) -> Result<()> {
    let schema_sql = include_str!("schema.sql");
    let statements = split_sql_statements(schema_sql);

    for (idx, statement) in statements.iter().enumerate() {
        execute_sql(conn, statement)
            .with_context(|| format!("Failed to execute statement {}", idx + 1))?;
    }

    log::info!("Database schema reset successfully");
    Ok(())
}

/// Create the schema only when the records table is missing
pub fn ensure_schema(conn: &mut DbConn) -> Result<()> {
    let exists: bool = conn
        .query_row(
            "SELECT EXISTS (SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'records')",
            [],
            |row| row.get(0),
        )
        .context("Failed to inspect database schema")?;

    if exists {
        return Ok(());
    }
    reset_database(conn)
}

fn split_sql_statements(sql: &str) -> Vec<String> {
    sql.split(';')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn execute_sql(conn: &mut DbConn, sql: &str) -> Result<()> {
    conn.execute(sql, [])
        .context("Failed to execute SQL statement")
        .map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_sql_statements_drops_blanks() {
        let statements = split_sql_statements("CREATE TABLE a (x);\n\n ;DROP TABLE b;");
        assert_eq!(statements, vec!["CREATE TABLE a (x)", "DROP TABLE b"]);
    }
}
