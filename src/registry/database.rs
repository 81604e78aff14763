//! Account Registry Module
//!
//! This module persists the durable record of each smart account (owner,
//! nonce and variant) so a restarted node resumes with the same replay state.
//!
//! # Storage
//! One SQLite table keyed by account address. Addresses are stored as
//! 0x-prefixed hex, nonces as decimal strings.

use crate::{AccountRecord, AccountVariant};
use ethers::types::{Address, U256};
use sqlx::Row;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions, SqliteRow};
use tracing::debug;

/// Account registry backed by SQLite
#[derive(Clone)]
pub struct Registry {
    pool: SqlitePool,
}

impl Registry {
    /// Connects to the database at `url` and creates the schema if needed
    ///
    /// # Arguments
    /// * `url` - SQLite connection URL (e.g. "sqlite://accounts.db?mode=rwc"
    ///   or "sqlite::memory:")
    pub async fn connect(url: &str) -> anyhow::Result<Self> {
        // A single connection keeps in-memory databases shared
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(url)
            .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS accounts (
                address TEXT PRIMARY KEY NOT NULL,
                owner   TEXT NOT NULL,
                nonce   TEXT NOT NULL,
                variant TEXT NOT NULL
            )",
        )
        .execute(&pool)
        .await?;

        Ok(Self { pool })
    }

    /// Insert or update an account record
    ///
    /// The owner and variant of an existing row are never rewritten; only the
    /// nonce moves.
    pub async fn store(&self, record: &AccountRecord) -> anyhow::Result<()> {
        debug!("Storing account {:?} at nonce {}", record.address, record.nonce);
        sqlx::query(
            "INSERT INTO accounts (address, owner, nonce, variant) VALUES (?, ?, ?, ?)
             ON CONFLICT(address) DO UPDATE SET nonce = excluded.nonce",
        )
        .bind(format!("{:?}", record.address))
        .bind(format!("{:?}", record.owner))
        .bind(record.nonce.to_string())
        .bind(record.variant.as_str())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn load(&self, address: &Address) -> anyhow::Result<Option<AccountRecord>> {
        let row = sqlx::query("SELECT address, owner, nonce, variant FROM accounts WHERE address = ?")
            .bind(format!("{:?}", address))
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(decode_record).transpose()
    }

    pub async fn load_all(&self) -> anyhow::Result<Vec<AccountRecord>> {
        let rows = sqlx::query("SELECT address, owner, nonce, variant FROM accounts")
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(decode_record).collect()
    }
}

fn decode_record(row: &SqliteRow) -> anyhow::Result<AccountRecord> {
    let address: String = row.try_get("address")?;
    let owner: String = row.try_get("owner")?;
    let nonce: String = row.try_get("nonce")?;
    let variant: String = row.try_get("variant")?;

    Ok(AccountRecord {
        address: address.parse()?,
        owner: owner.parse()?,
        nonce: U256::from_dec_str(&nonce)?,
        variant: variant.parse::<AccountVariant>()?,
    })
}
