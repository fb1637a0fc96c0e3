use anyhow::{Context, Result, anyhow};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer};
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};
use tracing::{debug, warn};

#[derive(Debug, Deserialize, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub(crate) struct ListenConfig {
    pub(crate) host: String,
    pub(crate) port: u16,
}

const DEFAULT_HTTP_PORT: u16 = 5050;
const DEFAULT_HOST: &str = "127.0.0.1";
fn default_listen() -> ListenConfig {
    ListenConfig {
        host: DEFAULT_HOST.to_string(),
        port: DEFAULT_HTTP_PORT,
    }
}

// This handles the case where the `listen` block is PRESENT, but a field may be missing.
fn deserialize_listen_with_default_port<'de, D>(deserializer: D) -> Result<ListenConfig, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(deny_unknown_fields)]
    struct PartialListenConfig {
        host: Option<String>,
        port: Option<u16>,
    }

    let partial_config = PartialListenConfig::deserialize(deserializer)?;

    Ok(ListenConfig {
        host: partial_config
            .host
            .unwrap_or_else(|| DEFAULT_HOST.to_string()),
        port: partial_config.port.unwrap_or(DEFAULT_HTTP_PORT),
    })
}

const DEFAULT_DATABASE: &str = "sqlite://bodega_cats.db";
fn default_database() -> String {
    DEFAULT_DATABASE.to_string()
}

const DEFAULT_UPLOAD_DIR: &str = "static/uploads";
fn default_upload_dir() -> PathBuf {
    PathBuf::from(DEFAULT_UPLOAD_DIR)
}

/// 16 MiB
const DEFAULT_MAX_CONTENT_LENGTH: usize = 16 * 1024 * 1024;
fn default_max_content_length() -> usize {
    DEFAULT_MAX_CONTENT_LENGTH
}

const DEV_SECRET_KEY: &str = "dev-secret-key-change-in-production";

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnvConfig {
    #[serde(default = "default_listen")]
    #[serde(deserialize_with = "deserialize_listen_with_default_port")]
    pub(crate) listen: ListenConfig,
    #[serde(default = "default_database")]
    pub(crate) database: String,
    #[serde(default = "default_upload_dir")]
    pub(crate) upload_dir: PathBuf,
    #[serde(default = "default_max_content_length")]
    pub(crate) max_content_length: usize,
    // Read from SECRET_KEY by init(). Nothing signs data with it yet since the
    // service has no sessions.
    #[serde(skip)]
    pub(crate) secret_key: SecretString,
}

impl PartialEq for EnvConfig {
    fn eq(&self, other: &Self) -> bool {
        self.listen == other.listen
            && self.database == other.database
            && self.upload_dir == other.upload_dir
            && self.max_content_length == other.max_content_length
            && self.secret_key.expose_secret() == other.secret_key.expose_secret()
    }
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            database: default_database(),
            upload_dir: default_upload_dir(),
            max_content_length: default_max_content_length(),
            secret_key: Default::default(),
        }
    }
}

impl EnvConfig {
    /// Loads the configuration for environment `envname` from a yaml file
    /// that maps environment names to configuration blocks
    pub(crate) async fn load<P: AsRef<Path>>(path: P, envname: &str) -> Result<Self> {
        let path = path.as_ref();
        debug!(?path, envname, "Loading configuration");
        let contents = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
        Self::parse(&contents, envname)
    }

    fn parse(contents: &str, envname: &str) -> Result<Self> {
        let mut configs: HashMap<String, EnvConfig> =
            serde_yaml::from_str(contents).with_context(|| "Couldn't parse config file")?;
        configs
            .remove(envname)
            .ok_or_else(|| anyhow!("No configuration found for environment '{envname}'"))
    }

    /// Applies settings that come from the process environment
    pub(crate) fn init(&mut self) -> Result<()> {
        self.init_with(|key| std::env::var(key).ok())
    }

    fn init_with<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("DATABASE_URL").filter(|url| !url.is_empty()) {
            debug!("Using database from environment variable DATABASE_URL");
            self.database = url;
        }
        self.secret_key = match lookup("SECRET_KEY").filter(|key| !key.is_empty()) {
            Some(key) => key.into(),
            None => {
                warn!("SECRET_KEY is not set, falling back to the development key");
                DEV_SECRET_KEY.to_string().into()
            }
        };
        if self.max_content_length == 0 {
            return Err(anyhow!("max_content_length must be greater than zero"));
        }
        Ok(())
    }
}
