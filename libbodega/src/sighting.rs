//! Objects to manage the recorded cat sightings
use crate::{
    Database,
    error::{Error, Result},
};
use serde::{Deserialize, Serialize};
use sqlx::{QueryBuilder, Sqlite, prelude::*, sqlite::SqliteQueryResult};
use time::OffsetDateTime;

/// A single observation of a cat near a bodega, along with the photo that was
/// uploaded for it and where it was taken.
#[derive(Debug, sqlx::FromRow, Deserialize, Serialize, PartialEq, Clone)]
pub struct Sighting {
    /// A unique ID that identifies this sighting in the database
    pub id: i64,

    /// An optional name for the cat
    #[sqlx(default)]
    pub name: Option<String>,

    /// An optional longer description of the cat or the sighting
    #[sqlx(default)]
    pub description: Option<String>,

    /// The latitude where the cat was seen, in decimal degrees
    pub latitude: f64,

    /// The longitude where the cat was seen, in decimal degrees
    pub longitude: f64,

    /// The public url of the stored photo
    pub image_url: String,

    /// The name of the bodega where the cat lives
    #[sqlx(default)]
    pub bodega_name: Option<String>,

    /// The time when this sighting was recorded
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Sighting {
    fn invalid_id() -> i64 {
        -1
    }

    fn build_query(id: Option<i64>) -> QueryBuilder<'static, Sqlite> {
        let mut qb = QueryBuilder::new(
            r#"SELECT id, name, description, latitude, longitude, image_url,
            bodega_name, created_at FROM bc_sightings"#,
        );
        if let Some(id) = id {
            qb.push(" WHERE id = ").push_bind(id);
        }
        qb.push(" ORDER BY id ASC");
        qb
    }

    /// Creates a new sighting object with the given data. It will initially
    /// have an invalid ID until it is inserted into the database. The
    /// creation time is set to the current time.
    pub fn new(
        name: Option<String>,
        description: Option<String>,
        bodega_name: Option<String>,
        latitude: f64,
        longitude: f64,
        image_url: String,
    ) -> Self {
        Self {
            id: Self::invalid_id(),
            name,
            description,
            latitude,
            longitude,
            image_url,
            bodega_name,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    /// Loads the sighting with the given id from the database
    pub async fn load(id: i64, db: &Database) -> Result<Self> {
        Self::build_query(Some(id))
            .build_query_as()
            .fetch_one(db.pool())
            .await
            .map_err(|e| e.into())
    }

    /// Loads all sightings from the database, in the order they were recorded
    pub async fn load_all(db: &Database) -> Result<Vec<Self>> {
        Self::build_query(None)
            .build_query_as()
            .fetch_all(db.pool())
            .await
            .map_err(|e| e.into())
    }

    pub async fn count(db: &Database) -> Result<i64> {
        sqlx::query("SELECT COUNT(*) as nsightings FROM bc_sightings")
            .fetch_one(db.pool())
            .await?
            .try_get("nsightings")
            .map_err(|e| e.into())
    }

    /// Add this sighting to the database. If this call completes successfully,
    /// the id of this object will be updated to the ID of the inserted row in
    /// the database
    pub async fn insert(&mut self, db: &Database) -> Result<SqliteQueryResult> {
        if self.id != Self::invalid_id() {
            return Err(Error::InvalidInsertObjectAlreadyExists(self.id));
        }

        sqlx::query(
            r#"INSERT INTO bc_sightings
          (name, description, latitude, longitude, image_url, bodega_name, created_at)
          VALUES (?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(&self.name)
        .bind(&self.description)
        .bind(self.latitude)
        .bind(self.longitude)
        .bind(&self.image_url)
        .bind(&self.bodega_name)
        .bind(self.created_at)
        .execute(db.pool())
        .await
        .inspect(|r| self.id = r.last_insert_rowid())
        .map_err(|e| e.into())
    }
}
