//! Turning an uploaded photo and its form fields into a recorded sighting
use crate::{
    Database,
    error::{Error, Result},
    normalize,
    sighting::Sighting,
    storage::{ImageStore, allowed_extension},
};
use tracing::{debug, trace};

/// An uploaded image file, as received from the client
#[derive(Debug, Clone, PartialEq)]
pub struct ImageFile {
    /// The filename that the client sent with the file. Only its extension is
    /// used; the stored file always gets a newly generated name.
    pub filename: String,
    pub data: Vec<u8>,
}

/// The raw contents of a sighting submission, collected field by field
/// before anything has been checked.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SightingUpload {
    pub image: Option<ImageFile>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub bodega_name: Option<String>,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
}

/// A submission that passed validation and is ready to be stored
#[derive(Debug, PartialEq)]
pub struct ValidatedUpload<'a> {
    pub image: &'a [u8],
    pub extension: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub bodega_name: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

/// Trims the given text and treats an empty result as no value at all
pub fn normalize_text(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Parses a latitude or longitude given in decimal degrees. The value only
/// needs to be a finite number; the range is not checked.
pub fn parse_coordinate(value: Option<&str>) -> Result<f64> {
    value
        .and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|n| n.is_finite())
        .ok_or(Error::UploadInvalidCoordinates)
}

impl SightingUpload {
    /// Records the value of a text field of the submission. If a field is
    /// sent more than once, the first value is kept. Unknown fields are
    /// ignored.
    pub fn set_field(&mut self, field: &str, value: String) {
        let slot = match field {
            "name" => &mut self.name,
            "description" => &mut self.description,
            "bodega_name" => &mut self.bodega_name,
            "latitude" => &mut self.latitude,
            "longitude" => &mut self.longitude,
            _ => {
                trace!(field, "Ignoring unknown upload field");
                return;
            }
        };
        if slot.is_some() {
            debug!(field, "Ignoring repeated upload field");
            return;
        }
        *slot = Some(value);
    }

    /// Records the image file of the submission. Only the first image is
    /// kept if the client sent more than one.
    pub fn set_image(&mut self, filename: String, data: Vec<u8>) {
        if self.image.is_some() {
            debug!(%filename, "Ignoring additional image in upload");
            return;
        }
        self.image = Some(ImageFile { filename, data });
    }

    /// Checks that the submission has a usable image and valid coordinates.
    pub fn validate(&self) -> Result<ValidatedUpload<'_>> {
        let image = self.image.as_ref().ok_or(Error::UploadMissingImage)?;
        if image.filename.is_empty() {
            return Err(Error::UploadEmptyFilename);
        }
        let extension = allowed_extension(&image.filename)
            .ok_or_else(|| Error::UploadFileTypeNotAllowed(image.filename.clone()))?;
        let latitude = parse_coordinate(self.latitude.as_deref())?;
        let longitude = parse_coordinate(self.longitude.as_deref())?;
        Ok(ValidatedUpload {
            image: &image.data,
            extension,
            name: normalize_text(self.name.clone()),
            description: normalize_text(self.description.clone()),
            bodega_name: normalize_text(self.bodega_name.clone()),
            latitude,
            longitude,
        })
    }

    /// Validates the submission, saves and downsamples the image, then
    /// records a new sighting for it.
    ///
    /// Nothing is written unless validation succeeds. If a later step fails,
    /// the steps that already completed are not undone, so a stored image may
    /// remain without a matching sighting.
    pub async fn store(&self, storage: &ImageStore, db: &Database) -> Result<Sighting> {
        let upload = self.validate()?;
        let filename = storage.save(&upload.extension, upload.image).await?;
        normalize::downsample_file(storage.path(&filename)).await?;
        let mut sighting = Sighting::new(
            upload.name,
            upload.description,
            upload.bodega_name,
            upload.latitude,
            upload.longitude,
            storage.url(&filename),
        );
        sighting.insert(db).await?;
        debug!(id = sighting.id, image_url = %sighting.image_url, "Recorded sighting");
        Ok(sighting)
    }
}
