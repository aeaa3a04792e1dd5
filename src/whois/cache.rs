//! WHOIS cache management.
//!
//! Registrant records are persisted in a single SQLite table keyed by root
//! domain. Writes replace the whole row. The cache is an explicit value: it is
//! opened once at the start of a run, handed to the enrichment pipeline by
//! reference, and consumed by `close()` at the end.

use std::fs::OpenOptions;
use std::io::ErrorKind;
use std::path::Path;

use log::{debug, error, info};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Row, SqlitePool};

use crate::config::CACHE_POOL_MAX_CONNECTIONS;
use crate::error_handling::DatabaseError;

use super::types::{whois_data_valid, RegistrantRecord};

const CREATE_TABLE_SQL: &str = "CREATE TABLE IF NOT EXISTS whois (
    domain TEXT PRIMARY KEY,
    registrantName TEXT,
    registrantOrganization TEXT,
    registrantCountry TEXT
)";

/// Durable domain -> registrant record store.
#[derive(Debug)]
pub struct WhoisCache {
    pool: SqlitePool,
}

impl WhoisCache {
    /// Opens (creating if needed) the cache file at `path`.
    ///
    /// Creates the database file if it doesn't exist, enables WAL mode and
    /// ensures the `whois` table exists.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::FileCreationError` if the file cannot be created,
    /// or `DatabaseError::SqlError` if connecting or creating the table fails.
    pub async fn open(path: &Path) -> Result<Self, DatabaseError> {
        match OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .open(path)
        {
            Ok(_) => info!("WHOIS cache created at {}", path.display()),
            Err(ref e) if e.kind() == ErrorKind::AlreadyExists => {
                debug!("WHOIS cache already exists at {}", path.display())
            }
            Err(e) => {
                error!("Failed to create WHOIS cache file: {e}");
                return Err(DatabaseError::FileCreationError(e.to_string()));
            }
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(CACHE_POOL_MAX_CONNECTIONS)
            .connect(&format!("sqlite:{}", path.to_string_lossy()))
            .await
            .map_err(|e| {
                error!("Failed to connect to WHOIS cache: {e}");
                DatabaseError::SqlError(e)
            })?;

        sqlx::query("PRAGMA journal_mode=WAL")
            .execute(&pool)
            .await
            .map_err(|e| {
                error!("Failed to set WAL mode: {e}");
                DatabaseError::SqlError(e)
            })?;

        Self::with_pool(pool).await
    }

    /// Opens a private in-memory cache. Nothing survives `close()`.
    pub async fn open_in_memory() -> Result<Self, DatabaseError> {
        // Every connection to sqlite::memory: is a separate database
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;
        Self::with_pool(pool).await
    }

    async fn with_pool(pool: SqlitePool) -> Result<Self, DatabaseError> {
        sqlx::query(CREATE_TABLE_SQL).execute(&pool).await?;
        Ok(Self { pool })
    }

    /// Looks up the cached record for an exact domain string.
    pub async fn read(&self, domain: &str) -> Result<Option<RegistrantRecord>, DatabaseError> {
        let row = sqlx::query(
            "SELECT domain, registrantName, registrantOrganization, registrantCountry
             FROM whois WHERE domain = ?",
        )
        .bind(domain)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        // Columns are nullable; a NULL reads back as an empty field
        let text = |column: &str| -> Result<String, sqlx::Error> {
            Ok(row
                .try_get::<Option<String>, _>(column)?
                .unwrap_or_default())
        };

        Ok(Some(RegistrantRecord {
            domain: text("domain")?,
            registrant_name: text("registrantName")?,
            registrant_organization: text("registrantOrganization")?,
            registrant_country: text("registrantCountry")?,
        }))
    }

    /// Upserts `record`, replacing any existing row for its domain wholesale.
    ///
    /// Blank records are refused (returns `Ok(false)`) so that a failed lookup
    /// is retried on a later run instead of being remembered.
    pub async fn write(&self, record: &RegistrantRecord) -> Result<bool, DatabaseError> {
        if !whois_data_valid(record) {
            debug!("Not caching blank WHOIS record for {}", record.domain);
            return Ok(false);
        }

        sqlx::query(
            "REPLACE INTO whois (domain, registrantName, registrantOrganization, registrantCountry)
             VALUES (?, ?, ?, ?)",
        )
        .bind(&record.domain)
        .bind(&record.registrant_name)
        .bind(&record.registrant_organization)
        .bind(&record.registrant_country)
        .execute(&self.pool)
        .await?;

        Ok(true)
    }

    /// Number of cached domains.
    pub async fn entry_count(&self) -> Result<i64, DatabaseError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM whois")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Closes the underlying pool, waiting for in-flight statements.
    pub async fn close(self) {
        self.pool.close().await;
    }
}
