//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.
//! Records are stored as their JSON payload next to a few indexed columns.

use crate::model::MetricsRecord;
use crate::state::{OutcomeStatus, RepositoryOutcome};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageError, StorageResult};
use crate::storage::{RunRecord, RunStatus};
use crate::OpegError;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::HashMap;
use std::path::Path;

const RUN_COLUMNS: &str = "id, started_at, finished_at, config_hash, event_name, status";

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(OpegError)` - Failed to open database
    pub fn new(path: &Path) -> Result<Self, OpegError> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> Result<Self, OpegError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

fn run_from_row(row: &Row<'_>) -> rusqlite::Result<RunRecord> {
    Ok(RunRecord {
        id: row.get(0)?,
        started_at: row.get(1)?,
        finished_at: row.get(2)?,
        config_hash: row.get(3)?,
        event_name: row.get(4)?,
        status: RunStatus::from_db_string(&row.get::<_, String>(5)?)
            .unwrap_or(RunStatus::Running),
    })
}

impl Storage for SqliteStorage {
    // ===== Run Management =====

    fn create_run(&mut self, event_name: &str, config_hash: &str) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO runs (started_at, config_hash, event_name, status) VALUES (?1, ?2, ?3, ?4)",
            params![now, config_hash, event_name, RunStatus::Running.to_db_string()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord> {
        let query = format!("SELECT {} FROM runs WHERE id = ?1", RUN_COLUMNS);
        self.conn
            .query_row(&query, params![run_id], run_from_row)
            .optional()?
            .ok_or(StorageError::RunNotFound(run_id))
    }

    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>> {
        let query = format!("SELECT {} FROM runs ORDER BY id DESC LIMIT 1", RUN_COLUMNS);
        let run = self.conn.query_row(&query, [], run_from_row).optional()?;
        Ok(run)
    }

    fn update_run_status(&mut self, run_id: i64, status: RunStatus) -> StorageResult<()> {
        let updated = self.conn.execute(
            "UPDATE runs SET status = ?1 WHERE id = ?2",
            params![status.to_db_string(), run_id],
        )?;
        if updated == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    fn complete_run(&mut self, run_id: i64) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let updated = self.conn.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2 WHERE id = ?3",
            params![RunStatus::Completed.to_db_string(), now, run_id],
        )?;
        if updated == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    // ===== Results =====

    fn save_record(
        &mut self,
        run_id: i64,
        position: usize,
        record: &MetricsRecord,
    ) -> StorageResult<()> {
        let payload = serde_json::to_string(record)?;
        self.conn.execute(
            "INSERT OR REPLACE INTO records (run_id, position, name, url, opeg, payload)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                run_id,
                position as i64,
                record.name,
                record.address,
                record.opeg_score.map(|s| s as i64),
                payload
            ],
        )?;
        Ok(())
    }

    fn save_outcome(
        &mut self,
        run_id: i64,
        position: usize,
        outcome: &RepositoryOutcome,
    ) -> StorageResult<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO outcomes
             (run_id, position, identifier, address, status, reason, attempts)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                run_id,
                position as i64,
                outcome.identifier,
                outcome.address,
                outcome.status.to_db_string(),
                outcome.status.reason(),
                outcome.status.attempts(),
            ],
        )?;
        Ok(())
    }

    fn load_records(&self, run_id: i64) -> StorageResult<Vec<MetricsRecord>> {
        let mut stmt = self
            .conn
            .prepare("SELECT payload FROM records WHERE run_id = ?1 ORDER BY position")?;
        let payloads = stmt
            .query_map(params![run_id], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        let mut records = Vec::with_capacity(payloads.len());
        for payload in payloads {
            records.push(serde_json::from_str(&payload)?);
        }
        Ok(records)
    }

    fn load_outcomes(&self, run_id: i64) -> StorageResult<Vec<RepositoryOutcome>> {
        let mut stmt = self.conn.prepare(
            "SELECT identifier, address, status, reason, attempts
             FROM outcomes WHERE run_id = ?1 ORDER BY position",
        )?;
        let rows = stmt
            .query_map(params![run_id], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, Option<String>>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, Option<String>>(3)?,
                    row.get::<_, u32>(4)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(identifier, address, status, reason, attempts)| {
                let parsed = OutcomeStatus::from_db_parts(&status, reason, attempts)
                    .ok_or(StorageError::UnknownStatus(status))?;
                Ok(RepositoryOutcome::new(identifier, address, parsed))
            })
            .collect()
    }

    // ===== Statistics =====

    fn count_outcomes_by_status(&self, run_id: i64) -> StorageResult<HashMap<String, u64>> {
        let mut stmt = self.conn.prepare(
            "SELECT status, COUNT(*) FROM outcomes WHERE run_id = ?1 GROUP BY status",
        )?;
        let rows = stmt.query_map(params![run_id], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;

        let mut counts = HashMap::new();
        for row in rows {
            let (status, count) = row?;
            counts.insert(status, count as u64);
        }
        Ok(counts)
    }
}
