use crate::{UPLOADS_URL, config::EnvConfig};
use anyhow::{Context, Result};
use libbodega::{Database, storage::ImageStore};
use std::sync::Arc;
use tracing::trace;

#[derive(Debug)]
pub struct SharedState {
    pub db: Database,
    pub storage: ImageStore,
    pub config: EnvConfig,
}

impl SharedState {
    pub async fn new(env: EnvConfig) -> Result<Self> {
        trace!("Creating shared app state");
        let db = Database::open(&env.database)
            .await
            .with_context(|| format!("Unable to open database {}", &env.database))?;
        let storage = ImageStore::create(&env.upload_dir, UPLOADS_URL)
            .await
            .with_context(|| {
                format!(
                    "Unable to create upload directory {}",
                    env.upload_dir.display()
                )
            })?;
        Ok(Self {
            db,
            storage,
            config: env,
        })
    }

    #[cfg(test)]
    pub fn test(pool: sqlx::Pool<sqlx::Sqlite>, upload_dir: &std::path::Path) -> Self {
        tracing::debug!("Creating test shared app state");
        Self {
            db: Database::from(pool),
            storage: ImageStore::new(upload_dir, UPLOADS_URL),
            config: EnvConfig {
                upload_dir: upload_dir.to_path_buf(),
                database: "test-database.sqlite".to_string(),
                ..Default::default()
            },
        }
    }
}

pub type AppState = Arc<SharedState>;
