//! Consistency coordinator.
//!
//! `RosterService` wraps the `RecordStore` together with the score range and
//! account policies. All repo methods are implemented as `impl RosterService`
//! blocks in `crate::repos`.
//!
//! Every mutation follows this protocol:
//! 1. Begin an immediate transaction (holding the connection lock)
//! 2. Validate against the rows visible inside that transaction
//! 3. Execute SQL, recomputing derived score fields where scores change
//! 4. Commit, or roll back on the first error

use roster_config::{AccountsConfig, RosterConfig, ScoresConfig};

use crate::RecordStore;
use crate::error::StorageError;

pub struct RosterService {
    store: RecordStore,
    scores: ScoresConfig,
    accounts: AccountsConfig,
}

impl RosterService {
    /// Create a service over a local database with default policies.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the database cannot be opened.
    pub async fn new_local(db_path: &str) -> Result<Self, StorageError> {
        let store = RecordStore::open_local(db_path).await?;
        Ok(Self::from_store(store, &RosterConfig::default()))
    }

    /// Create a service from loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the configured database cannot be opened.
    pub async fn from_config(config: &RosterConfig) -> Result<Self, StorageError> {
        if config.database.is_in_memory() {
            tracing::warn!("in-memory database configured; records will not persist");
        }
        let store = RecordStore::open(&config.database).await?;
        Ok(Self::from_store(store, config))
    }

    /// Wrap an already-open store.
    #[must_use]
    pub fn from_store(store: RecordStore, config: &RosterConfig) -> Self {
        Self {
            store,
            scores: config.scores.clone(),
            accounts: config.accounts.clone(),
        }
    }

    /// Access the underlying record store.
    #[must_use]
    pub const fn store(&self) -> &RecordStore {
        &self.store
    }

    /// Score range policy applied by `update_scores`.
    #[must_use]
    pub const fn score_policy(&self) -> &ScoresConfig {
        &self.scores
    }

    /// Account registration defaults.
    #[must_use]
    pub const fn account_policy(&self) -> &AccountsConfig {
        &self.accounts
    }
}
