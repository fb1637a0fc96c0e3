use crate::error::Result;
use sqlx::{Pool, Sqlite, SqlitePool, sqlite::SqliteConnectOptions};
use std::str::FromStr;
use tracing::{debug, trace};

/// An object that represents a connection to the sightings database
#[derive(Clone, Debug)]
pub struct Database(Pool<Sqlite>);

impl From<Pool<Sqlite>> for Database {
    /// **WARNING**: This is primarily intended for tests. You should probably
    /// use [Database::open()] instead of creating the pool yourself, since
    /// [Database::open()] will perform database schema migration automatically.
    fn from(value: Pool<Sqlite>) -> Self {
        Self(value)
    }
}

impl Database {
    /// Open a connection to the specified database. `url` may either be a sqlx
    /// sqlite url (e.g. `sqlite://bodega_cats.db`) or a plain path to the
    /// database file. The file is created if it doesn't exist yet. This will
    /// also perform any necessary sql migrations to ensure that the database
    /// is up to date with the latest schema changes.
    pub async fn open(url: &str) -> Result<Self> {
        debug!(url, "Opening database");
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let dbpool = SqlitePool::connect_with(options).await?;
        trace!("Running database migrations");
        sqlx::migrate!("../db/migrations").run(&dbpool).await?;
        Ok(Database(dbpool))
    }

    /// gets a reference to the underlying sqlx connection pool
    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test(tokio::test)]
    async fn test_open_creates_database() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("cats.sqlite");
        let url = format!("sqlite://{}", path.to_string_lossy());
        let db = Database::open(&url).await.expect("Failed to open database");
        assert!(path.exists());

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM bc_sightings")
            .fetch_one(db.pool())
            .await
            .expect("sightings table is missing");
        assert_eq!(count, 0);
        db.pool().close().await;

        // a plain path works too, and re-running the migrations is harmless
        let db = Database::open(&path.to_string_lossy())
            .await
            .expect("Failed to reopen database");
        db.pool().close().await;
    }
}
