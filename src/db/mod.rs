// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Database layer (SQLite via sqlx).

pub mod store;

pub use store::Db;

use crate::error::AppError;
use sqlx::SqlitePool;

struct Migration {
    name: &'static str,
    up_sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    name: "0001_init",
    up_sql: include_str!("../../migrations/0001_init.sql"),
}];

async fn init_migrations_table(pool: &SqlitePool) -> Result<(), AppError> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS _migrations (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            applied_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )",
    )
    .execute(pool)
    .await?;
    Ok(())
}

async fn is_migration_applied(pool: &SqlitePool, name: &str) -> Result<bool, AppError> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _migrations WHERE name = ?")
        .bind(name)
        .fetch_one(pool)
        .await?;
    Ok(count > 0)
}

/// Split a migration file into individual statements, dropping comment lines.
fn parse_sql_statements(sql: &str) -> Vec<String> {
    sql.lines()
        .filter(|line| {
            let trimmed = line.trim();
            !trimmed.is_empty() && !trimmed.starts_with("--")
        })
        .collect::<Vec<_>>()
        .join("\n")
        .split(';')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Apply all pending migrations, recording each in the `_migrations` ledger.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), AppError> {
    init_migrations_table(pool).await?;

    for migration in MIGRATIONS {
        if is_migration_applied(pool, migration.name).await? {
            tracing::debug!(migration = migration.name, "Migration already applied");
            continue;
        }

        tracing::info!(migration = migration.name, "Applying migration");
        for statement in parse_sql_statements(migration.up_sql) {
            sqlx::query(&statement).execute(pool).await.map_err(|e| {
                AppError::Database(format!(
                    "migration {} failed on statement {:?}: {}",
                    migration.name, statement, e
                ))
            })?;
        }

        sqlx::query("INSERT INTO _migrations (name) VALUES (?)")
            .bind(migration.name)
            .execute(pool)
            .await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_sql_statements_splits_and_strips_comments() {
        let sql = "-- comment\nCREATE TABLE a (id INTEGER);\n\nCREATE TABLE b (id INTEGER);\n";
        let statements = parse_sql_statements(sql);
        assert_eq!(statements.len(), 2);
        assert!(statements[0].starts_with("CREATE TABLE a"));
        assert!(statements[1].starts_with("CREATE TABLE b"));
    }

    #[test]
    fn schema_migration_parses() {
        let statements = parse_sql_statements(MIGRATIONS[0].up_sql);
        assert!(!statements.is_empty());
        assert!(statements.iter().all(|s| !s.contains("--")));
    }
}
