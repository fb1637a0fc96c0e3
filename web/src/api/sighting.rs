use crate::{error, state::AppState};
use axum::{
    Router,
    extract::{Multipart, State, multipart::MultipartRejection},
    http::StatusCode,
    response::Json,
    routing::get,
};
use libbodega::{sighting::Sighting, upload::SightingUpload};
use tracing::trace;

pub fn router() -> Router<AppState> {
    Router::new().route("/cats", get(list_sightings).post(add_sighting))
}

async fn list_sightings(
    State(state): State<AppState>,
) -> Result<Json<Vec<Sighting>>, error::Error> {
    let sightings = Sighting::load_all(&state.db).await?;
    Ok(Json(sightings))
}

async fn add_sighting(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<Sighting>), error::Error> {
    let upload = read_upload(multipart?).await?;
    let sighting = upload.store(&state.storage, &state.db).await?;
    Ok((StatusCode::CREATED, Json(sighting)))
}

/// Collects the parts of a multipart submission. A part named `image` only
/// counts as the image file if it was sent with a filename.
async fn read_upload(mut multipart: Multipart) -> Result<SightingUpload, error::Error> {
    let mut upload = SightingUpload::default();
    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_string) else {
            trace!("Skipping unnamed multipart field");
            continue;
        };
        match (name.as_str(), field.file_name().map(str::to_string)) {
            ("image", Some(filename)) => {
                let data = field.bytes().await?;
                upload.set_image(filename, data.to_vec());
            }
            (_, Some(filename)) => trace!(%name, %filename, "Skipping unexpected file"),
            _ => upload.set_field(&name, field.text().await?),
        }
    }
    Ok(upload)
}
