//! Objects related to reporting errors from this library

/// A list of error types that can occur within this library
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    // upload validation errors
    #[error("No image file provided")]
    UploadMissingImage,

    #[error("No file selected")]
    UploadEmptyFilename,

    #[error("File type not allowed.")]
    UploadFileTypeNotAllowed(String),

    #[error("Invalid or missing latitude/longitude")]
    UploadInvalidCoordinates,

    #[error("can't insert the object, it already exists in the database with id = {}", .0)]
    InvalidInsertObjectAlreadyExists(i64),

    #[error(transparent)]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Background task failed: {0}")]
    BackgroundTask(#[from] tokio::task::JoinError),

    #[error(transparent)]
    DatabaseError(#[from] sqlx::Error),

    #[error(transparent)]
    DatabaseMigrationError(#[from] sqlx::migrate::MigrateError),
}

impl Error {
    /// Returns true if the error was caused by the data the user submitted
    /// rather than by a failure on the server side
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::UploadMissingImage
                | Self::UploadEmptyFilename
                | Self::UploadFileTypeNotAllowed(_)
                | Self::UploadInvalidCoordinates
        )
    }
}

/// A convenience type alias for a [Result] with [Error] as its error type
pub type Result<T, E = Error> = std::result::Result<T, E>;
