//! Storage of uploaded photos on the local filesystem
use crate::error::Result;
use std::path::{Path, PathBuf};
use tracing::debug;
use uuid::Uuid;

/// File extensions (lower case) that are accepted for uploaded photos
pub const ALLOWED_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "gif"];

/// Returns the lower-cased extension of `filename` if it is one of the
/// [ALLOWED_EXTENSIONS]. The extension is everything after the final `.`
pub fn allowed_extension(filename: &str) -> Option<String> {
    let (_, ext) = filename.rsplit_once('.')?;
    let ext = ext.to_lowercase();
    ALLOWED_EXTENSIONS.contains(&ext.as_str()).then_some(ext)
}

/// Generates a new filename with the given extension that will not collide
/// with any previously generated filename
pub fn unique_filename(ext: &str) -> String {
    format!("{}.{ext}", Uuid::new_v4())
}

/// A directory that holds uploaded photos, along with the url prefix under
/// which those photos are served to clients.
#[derive(Clone, Debug)]
pub struct ImageStore {
    dir: PathBuf,
    url_prefix: String,
}

impl ImageStore {
    /// Creates a store backed by `dir` without touching the filesystem. Use
    /// [ImageStore::create()] if the directory might not exist yet.
    pub fn new<P: Into<PathBuf>>(dir: P, url_prefix: &str) -> Self {
        Self {
            dir: dir.into(),
            url_prefix: url_prefix.trim_end_matches('/').to_string(),
        }
    }

    /// Creates a store backed by `dir`, creating the directory and any
    /// missing parents
    pub async fn create<P: Into<PathBuf>>(dir: P, url_prefix: &str) -> Result<Self> {
        let store = Self::new(dir, url_prefix);
        debug!(dir = ?store.dir, "Creating upload directory");
        tokio::fs::create_dir_all(&store.dir).await?;
        Ok(store)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The location on disk of the stored file with the given name
    pub fn path(&self, filename: &str) -> PathBuf {
        self.dir.join(filename)
    }

    /// The public url of the stored file with the given name
    pub fn url(&self, filename: &str) -> String {
        format!("{}/{filename}", self.url_prefix)
    }

    /// Writes `data` to a new file with the given extension and returns the
    /// generated filename
    pub async fn save(&self, ext: &str, data: &[u8]) -> Result<String> {
        let filename = unique_filename(ext);
        let path = self.path(&filename);
        debug!(?path, len = data.len(), "Saving uploaded image");
        tokio::fs::write(&path, data).await?;
        Ok(filename)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn test_allowed_extension() {
        assert_eq!(allowed_extension("cat.png"), Some("png".to_string()));
        assert_eq!(allowed_extension("cat.JPG"), Some("jpg".to_string()));
        assert_eq!(allowed_extension("cat.Jpeg"), Some("jpeg".to_string()));
        assert_eq!(allowed_extension("my.cat.gif"), Some("gif".to_string()));
        assert_eq!(allowed_extension("cat.bmp"), None);
        assert_eq!(allowed_extension("cat.png.exe"), None);
        assert_eq!(allowed_extension("png"), None);
        assert_eq!(allowed_extension("cat."), None);
        assert_eq!(allowed_extension(""), None);
    }

    #[test]
    fn test_unique_filename() {
        let a = unique_filename("jpg");
        let b = unique_filename("jpg");
        assert_ne!(a, b);
        assert!(a.ends_with(".jpg"));
        let stem = a.trim_end_matches(".jpg");
        assert!(Uuid::parse_str(stem).is_ok());
    }

    #[test]
    fn test_url() {
        let store = ImageStore::new("/tmp/uploads", "/api/uploads/");
        assert_eq!(store.url("cat.png"), "/api/uploads/cat.png");
        assert_eq!(store.path("cat.png"), PathBuf::from("/tmp/uploads/cat.png"));
        let store = ImageStore::new("/tmp/uploads", "/api/uploads");
        assert_eq!(store.url("cat.png"), "/api/uploads/cat.png");
    }

    #[test(tokio::test)]
    async fn test_save() {
        let tmp = tempfile::tempdir().expect("Failed to create temp dir");
        let store = ImageStore::create(tmp.path().join("static").join("uploads"), "/uploads")
            .await
            .expect("Failed to create store");
        assert!(store.dir().is_dir());

        let first = store.save("png", b"not really a png").await.expect("Failed to save");
        let second = store.save("png", b"another one").await.expect("Failed to save");
        assert_ne!(first, second);
        assert_eq!(
            std::fs::read(store.path(&first)).expect("Failed to read back"),
            b"not really a png"
        );
        assert_eq!(
            std::fs::read(store.path(&second)).expect("Failed to read back"),
            b"another one"
        );
    }
}
