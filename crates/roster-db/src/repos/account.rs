//! Account repository: registration and lookup of mentor accounts.

use argon2::Argon2;
use argon2::password_hash::{PasswordHasher, SaltString, rand_core::OsRng};
use chrono::Utc;

use roster_core::entities::{Account, NewAccount};
use roster_core::enums::Role;
use roster_core::ids::PREFIX_ACCOUNT;

use crate::error::{RecordError, StorageError};
use crate::helpers::{generate_id, get_bool, parse_datetime, parse_enum};
use crate::service::RosterService;
use crate::validator;

const SELECT_COLS: &str =
    "id, name, username, email, role, verified, pin_to_be_changed, created_at";

fn row_to_account(row: &libsql::Row) -> Result<Account, StorageError> {
    Ok(Account {
        id: row.get(0)?,
        name: row.get(1)?,
        username: row.get(2)?,
        email: row.get(3)?,
        role: parse_enum(&row.get::<String>(4)?)?,
        verified: get_bool(row, 5)?,
        pin_to_be_changed: get_bool(row, 6)?,
        created_at: parse_datetime(&row.get::<String>(7)?)?,
    })
}

/// Argon2id with a random salt, encoded as a PHC string.
fn hash_password(password: &str) -> Result<String, StorageError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| StorageError::Hashing(e.to_string()))
}

async fn insert_account(
    conn: &libsql::Connection,
    input: &NewAccount,
    role: Role,
    password_hash: &str,
) -> Result<Account, RecordError> {
    validator::validate_new_account(conn, input).await?;

    let now = Utc::now();
    let id = generate_id(conn, PREFIX_ACCOUNT).await?;
    conn.execute(
        "INSERT INTO accounts (id, name, username, email, password_hash, role, verified, pin_to_be_changed, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, 1, ?7)",
        libsql::params![
            id.as_str(),
            input.name.as_str(),
            input.username.as_str(),
            input.email.as_str(),
            password_hash,
            role.as_str(),
            now.to_rfc3339()
        ],
    )
    .await?;

    Ok(Account {
        id,
        name: input.name.clone(),
        username: input.username.clone(),
        email: input.email.clone(),
        role,
        verified: false,
        pin_to_be_changed: true,
        created_at: now,
    })
}

impl RosterService {
    /// Register an account. The password is hashed before the transaction
    /// starts and is never stored or logged in plaintext.
    ///
    /// # Errors
    ///
    /// `RecordError::Validation` for a blank field or a taken username/email.
    pub async fn register_account(&self, input: NewAccount) -> Result<Account, RecordError> {
        tracing::debug!(username = %input.username, "register_account");
        validator::validate_account_fields(&input)?;
        let password_hash = hash_password(&input.password)?;
        let role = input.role.unwrap_or(self.account_policy().default_role);

        let tx = self.store().begin().await?;
        let result = insert_account(&tx, &input, role, &password_hash).await;
        let account = tx.finish(result).await?;

        tracing::info!(account_id = %account.id, username = %account.username, "account registered");
        Ok(account)
    }

    /// Look up an account by username.
    ///
    /// # Errors
    ///
    /// `RecordError::NotFound` if no account has this username.
    pub async fn get_account(&self, username: &str) -> Result<Account, RecordError> {
        let conn = self.store().lock().await;
        let mut rows = conn
            .query(
                &format!("SELECT {SELECT_COLS} FROM accounts WHERE username = ?1"),
                [username],
            )
            .await?;
        let row = rows
            .next()
            .await?
            .ok_or_else(|| RecordError::not_found(username))?;
        Ok(row_to_account(&row)?)
    }
}
