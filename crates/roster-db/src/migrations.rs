//! Database migration runner.
//!
//! Embeds the SQL migration files at compile time and executes them on
//! database open. All statements use `IF NOT EXISTS` for idempotent re-running.

use crate::RecordStore;
use crate::error::StorageError;

/// Initial schema: accounts, students, score records.
const MIGRATION_001: &str = include_str!("../migrations/001_initial.sql");

impl RecordStore {
    /// Run all embedded migrations in sequence.
    pub(crate) async fn run_migrations(&self) -> Result<(), StorageError> {
        let conn = self.lock().await;
        conn.execute_batch(MIGRATION_001)
            .await
            .map_err(|e| StorageError::Migration(format!("001_initial: {e}")))?;
        Ok(())
    }
}
