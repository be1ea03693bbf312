//! # roster-db
//!
//! libSQL record store and consistency coordinator for mentor-owned student
//! records.
//!
//! Keeps each student's profile row and its score row mutually consistent:
//! creation inserts both, score updates recompute the derived fields, and
//! deletion removes both, each inside a single transaction. Uniqueness and
//! mentor references are checked inside that same transaction, with schema
//! constraints as the backstop.

pub mod error;
pub mod helpers;
mod migrations;
pub mod repos;
pub mod service;
pub mod updates;
pub mod validator;

#[cfg(test)]
mod test_support;

use std::ops::Deref;

use error::{RecordError, StorageError};
use libsql::{Builder, TransactionBehavior};
use roster_config::DatabaseConfig;
use tokio::sync::{Mutex, MutexGuard};

/// Central database handle for the record store.
///
/// Holds a single connection behind an async mutex. Writers keep the lock for
/// the whole transaction, so operations within one process are serialised and
/// no reader can observe a half-applied write.
pub struct RecordStore {
    #[allow(dead_code)]
    db: libsql::Database,
    conn: Mutex<libsql::Connection>,
}

impl RecordStore {
    /// Open a local database at the given path (`":memory:"` for tests) with
    /// the default busy timeout.
    ///
    /// Runs migrations automatically on open.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the database cannot be opened or
    /// migrations fail.
    pub async fn open_local(path: &str) -> Result<Self, StorageError> {
        Self::open(&DatabaseConfig {
            path: path.to_string(),
            ..DatabaseConfig::default()
        })
        .await
    }

    /// Open the configured database.
    ///
    /// Another connection holding the write lock (a second store on the same
    /// file, or another process) is waited on for up to
    /// `config.busy_timeout_ms` before `BEGIN IMMEDIATE` gives up.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the database cannot be opened or
    /// migrations fail.
    pub async fn open(config: &DatabaseConfig) -> Result<Self, StorageError> {
        let path = config.path.as_str();
        let db = Builder::new_local(path).build().await?;
        let conn = db.connect()?;
        conn.busy_timeout(config.busy_timeout())?;

        // Enable foreign keys (must be per-connection in SQLite)
        conn.execute("PRAGMA foreign_keys = ON", ())
            .await
            .map_err(|e| StorageError::Migration(format!("PRAGMA foreign_keys: {e}")))?;

        let store = Self {
            db,
            conn: Mutex::new(conn),
        };
        store.run_migrations().await?;
        tracing::debug!(path, "record store opened");
        Ok(store)
    }

    /// Wait for exclusive use of the connection.
    pub async fn lock(&self) -> MutexGuard<'_, libsql::Connection> {
        self.conn.lock().await
    }

    /// Start an immediate (write-locking) transaction.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if `BEGIN IMMEDIATE` fails.
    pub async fn begin(&self) -> Result<StoreTx<'_>, StorageError> {
        let guard = self.lock().await;
        let tx = guard
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .await?;
        Ok(StoreTx { tx, _guard: guard })
    }
}

/// An open transaction that also holds the connection lock.
///
/// Finish it with [`StoreTx::finish`], which commits on `Ok` and rolls back
/// on `Err`.
pub struct StoreTx<'a> {
    tx: libsql::Transaction,
    _guard: MutexGuard<'a, libsql::Connection>,
}

impl StoreTx<'_> {
    /// Commit if `result` is `Ok`, otherwise roll back and return the error.
    ///
    /// # Errors
    ///
    /// Returns the original error, or `RecordError::Storage` if the commit
    /// itself fails.
    pub async fn finish<T>(self, result: Result<T, RecordError>) -> Result<T, RecordError> {
        match result {
            Ok(value) => {
                self.tx.commit().await?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback) = self.tx.rollback().await {
                    tracing::warn!(error = %rollback, "rollback failed after {err}");
                }
                Err(err)
            }
        }
    }
}

impl Deref for StoreTx<'_> {
    type Target = libsql::Connection;

    fn deref(&self) -> &Self::Target {
        &self.tx
    }
}
