use axum::{
    Json,
    extract::multipart::{MultipartError, MultipartRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::warn;

#[derive(thiserror::Error, Debug)]
pub(crate) enum Error {
    #[error(transparent)]
    Libbodega(#[from] libbodega::Error),
    #[error("The upload could not be read: {0}")]
    MultipartRejection(#[from] MultipartRejection),
    #[error("The upload could not be read: {0}")]
    Multipart(#[from] MultipartError),
}

impl Error {
    pub(crate) fn to_client_status(&self) -> (StatusCode, String) {
        match self {
            Error::Libbodega(e) if e.is_user_error() => (StatusCode::BAD_REQUEST, e.to_string()),
            Error::Libbodega(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
            Error::MultipartRejection(e) => self.multipart_status(e.status()),
            Error::Multipart(e) => self.multipart_status(e.status()),
        }
    }

    fn multipart_status(&self, status: StatusCode) -> (StatusCode, String) {
        match status {
            StatusCode::PAYLOAD_TOO_LARGE => (status, UPLOAD_TOO_LARGE.to_string()),
            _ => (status, self.to_string()),
        }
    }
}

pub(crate) const UPLOAD_TOO_LARGE: &str = "Upload exceeds the maximum request size";

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

// Tell axum how to convert `Error` into a response.
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        warn!("Got error for response: {self:?}");
        let (status, error) = self.to_client_status();
        (status, Json(ErrorBody { error })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_status() {
        let (status, msg) = Error::from(libbodega::Error::UploadMissingImage).to_client_status();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(msg, "No image file provided");

        let (status, msg) = Error::from(libbodega::Error::UploadFileTypeNotAllowed(
            "cat.bmp".to_string(),
        ))
        .to_client_status();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(msg, "File type not allowed.");

        let (status, msg) =
            Error::from(libbodega::Error::InvalidInsertObjectAlreadyExists(4)).to_client_status();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            msg,
            "can't insert the object, it already exists in the database with id = 4"
        );
    }
}
