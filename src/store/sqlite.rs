// src/store/sqlite.rs

//! SQLite seen-set store.

use std::path::Path;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

use crate::error::Result;
use crate::identity::identity_of;
use crate::models::{Listing, SeenListing};
use crate::store::SeenStore;

/// Timestamp format matching SQLite's CURRENT_TIMESTAMP, so stored
/// values order lexicographically.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn now_timestamp() -> String {
    Utc::now().format(TIMESTAMP_FORMAT).to_string()
}

/// SQLite-backed seen-set store.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (creating if necessary) the database at the given path and
    /// ensure the schema exists.
    pub async fn connect(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        if !path.exists() {
            std::fs::File::create(path)?;
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&format!("sqlite:{}", path.display()))
            .await?;

        let store = Self { pool };
        store.init().await?;
        Ok(store)
    }

    /// Create the table and indexes if they don't exist.
    async fn init(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS listings (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                listing_id TEXT UNIQUE NOT NULL,
                source TEXT NOT NULL,
                location TEXT NOT NULL,
                year INTEGER,
                make TEXT NOT NULL,
                model TEXT NOT NULL,
                stock_number TEXT,
                url TEXT,
                arrival_date TEXT,
                first_seen TEXT NOT NULL,
                last_checked TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_listing_id ON listings(listing_id)")
            .execute(&self.pool)
            .await?;
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_first_seen ON listings(first_seen)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

#[async_trait]
impl SeenStore for SqliteStore {
    async fn has(&self, identity: &str) -> Result<bool> {
        let row = sqlx::query("SELECT 1 FROM listings WHERE listing_id = ? LIMIT 1")
            .bind(identity)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }

    async fn add(&self, listing: &Listing) -> Result<bool> {
        let identity = identity_of(listing);
        let now = now_timestamp();

        let result = sqlx::query(
            r#"
            INSERT INTO listings
                (listing_id, source, location, year, make, model,
                 stock_number, url, arrival_date, first_seen, last_checked)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&identity)
        .bind(&listing.source)
        .bind(&listing.location)
        .bind(listing.year.map(i64::from))
        .bind(&listing.make)
        .bind(&listing.model)
        .bind(&listing.stock_number)
        .bind(&listing.url)
        .bind(&listing.arrival_date)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(true),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                log::debug!("Listing already tracked: {}", identity);
                Ok(false)
            }
            Err(error) => Err(error.into()),
        }
    }

    async fn touch(&self, identity: &str) -> Result<()> {
        sqlx::query("UPDATE listings SET last_checked = ? WHERE listing_id = ?")
            .bind(now_timestamp())
            .bind(identity)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM listings")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn all(&self) -> Result<Vec<SeenListing>> {
        let rows = sqlx::query_as::<_, SeenListing>(
            r#"
            SELECT listing_id, source, location, year, make, model,
                   stock_number, url, arrival_date, first_seen, last_checked
            FROM listings
            ORDER BY first_seen DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn purge_older_than(&self, days: i64) -> Result<u64> {
        let cutoff = (Utc::now() - Duration::days(days))
            .format(TIMESTAMP_FORMAT)
            .to_string();

        let result = sqlx::query("DELETE FROM listings WHERE first_seen < ?")
            .bind(&cutoff)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    async fn open_store(tmp: &TempDir) -> SqliteStore {
        SqliteStore::connect(tmp.path().join("test.db")).await.unwrap()
    }

    fn sample_listing() -> Listing {
        Listing {
            source: "Pick-n-Pull".to_string(),
            location: "Calgary".to_string(),
            year: Some(2015),
            make: "Dodge".to_string(),
            model: "Ram 1500".to_string(),
            url: Some("https://x/1".to_string()),
            ..Listing::default()
        }
    }

    #[tokio::test]
    async fn test_add_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let store = open_store(&tmp).await;
        let listing = sample_listing();

        assert!(store.add(&listing).await.unwrap());
        assert_eq!(store.count().await.unwrap(), 1);

        // Second insert of the same identity is a no-op, not an error
        assert!(!store.add(&listing).await.unwrap());
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_has() {
        let tmp = TempDir::new().unwrap();
        let store = open_store(&tmp).await;
        let listing = sample_listing();

        assert!(!store.has("https://x/1").await.unwrap());
        store.add(&listing).await.unwrap();
        assert!(store.has("https://x/1").await.unwrap());
    }

    #[tokio::test]
    async fn test_touch_preserves_first_seen() {
        let tmp = TempDir::new().unwrap();
        let store = open_store(&tmp).await;
        store.add(&sample_listing()).await.unwrap();

        let before = store.all().await.unwrap();
        store.touch("https://x/1").await.unwrap();
        let after = store.all().await.unwrap();

        assert_eq!(after.len(), 1);
        assert_eq!(before[0].first_seen, after[0].first_seen);
    }

    #[tokio::test]
    async fn test_all_returns_rows() {
        let tmp = TempDir::new().unwrap();
        let store = open_store(&tmp).await;

        let mut second = sample_listing();
        second.url = Some("https://x/2".to_string());

        store.add(&sample_listing()).await.unwrap();
        store.add(&second).await.unwrap();

        let rows = store.all().await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].source, "Pick-n-Pull");
        assert_eq!(rows[0].year, Some(2015));
    }

    #[tokio::test]
    async fn test_purge_older_than() {
        let tmp = TempDir::new().unwrap();
        let store = open_store(&tmp).await;
        store.add(&sample_listing()).await.unwrap();

        // Fresh row survives the sweep
        assert_eq!(store.purge_older_than(90).await.unwrap(), 0);

        // Age the row past the horizon, then sweep again
        sqlx::query("UPDATE listings SET first_seen = '2020-01-01 00:00:00'")
            .execute(&store.pool)
            .await
            .unwrap();
        assert_eq!(store.purge_older_than(90).await.unwrap(), 1);
        assert_eq!(store.count().await.unwrap(), 0);
    }
}
