//! Shrinking and re-encoding uploaded photos so that stored files stay small
use crate::error::Result;
use image::{
    DynamicImage, GenericImageView, ImageFormat, ImageReader,
    codecs::{
        jpeg::JpegEncoder,
        png::{CompressionType, FilterType as PngFilter, PngEncoder},
    },
    imageops::FilterType,
};
use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};
use tracing::debug;

/// The maximum width of a stored photo, in pixels
pub const MAX_WIDTH: u32 = 800;

/// The maximum height of a stored photo, in pixels
pub const MAX_HEIGHT: u32 = 600;

/// The quality used when re-encoding jpeg photos
pub const JPEG_QUALITY: u8 = 85;

/// Shrinks the image at `path` in place so that it fits within
/// [MAX_WIDTH] x [MAX_HEIGHT], keeping its aspect ratio. Images that already
/// fit are not enlarged, but are still re-encoded. The output format is
/// chosen from the file extension while the input format is detected from
/// the file contents. Returns the final dimensions of the image.
pub fn downsample(path: &Path) -> Result<(u32, u32)> {
    let img = ImageReader::open(path)?.with_guessed_format()?.decode()?;
    let (width, height) = img.dimensions();
    let img = if width > MAX_WIDTH || height > MAX_HEIGHT {
        img.resize(MAX_WIDTH, MAX_HEIGHT, FilterType::Lanczos3)
    } else {
        img
    };
    debug!(
        ?path,
        from = ?(width, height),
        to = ?img.dimensions(),
        "Downsampling image"
    );

    let format = ImageFormat::from_path(path)?;
    let mut out = BufWriter::new(File::create(path)?);
    match format {
        ImageFormat::Jpeg => {
            // jpeg has no alpha channel
            let encoder = JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY);
            DynamicImage::from(img.to_rgb8()).write_with_encoder(encoder)?;
        }
        ImageFormat::Png => {
            let encoder =
                PngEncoder::new_with_quality(&mut out, CompressionType::Best, PngFilter::Adaptive);
            img.write_with_encoder(encoder)?;
        }
        other => DynamicImage::from(img.to_rgba8()).write_to(&mut out, other)?,
    }
    out.flush()?;
    Ok(img.dimensions())
}

/// Runs [downsample()] on the blocking thread pool
pub async fn downsample_file(path: PathBuf) -> Result<(u32, u32)> {
    tokio::task::spawn_blocking(move || downsample(&path)).await?
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb, Rgba};
    use test_log::test;

    fn write_image(path: &Path, width: u32, height: u32) {
        let img = ImageBuffer::from_fn(width, height, |x, y| {
            Rgba([(x % 256) as u8, (y % 256) as u8, 128, 255])
        });
        let img = DynamicImage::from(img);
        match ImageFormat::from_path(path).expect("Unknown format") {
            ImageFormat::Jpeg => DynamicImage::from(img.to_rgb8()).save(path),
            _ => img.save(path),
        }
        .expect("Failed to write test image");
    }

    fn dimensions(path: &Path) -> (u32, u32) {
        image::open(path).expect("Failed to open result").dimensions()
    }

    #[test]
    fn test_downsample_large_png() {
        let tmp = tempfile::tempdir().expect("Failed to create temp dir");
        let path = tmp.path().join("large.png");
        write_image(&path, 1600, 1000);
        assert_eq!(downsample(&path).expect("Failed to downsample"), (800, 500));
        assert_eq!(dimensions(&path), (800, 500));
    }

    #[test]
    fn test_downsample_tall_jpeg() {
        let tmp = tempfile::tempdir().expect("Failed to create temp dir");
        let path = tmp.path().join("tall.jpg");
        write_image(&path, 900, 1800);
        assert_eq!(downsample(&path).expect("Failed to downsample"), (300, 600));
        assert_eq!(dimensions(&path), (300, 600));
        assert_eq!(
            image::ImageReader::open(&path)
                .and_then(|r| r.with_guessed_format())
                .expect("Failed to read result")
                .format(),
            Some(ImageFormat::Jpeg)
        );
    }

    #[test]
    fn test_downsample_small_gif() {
        let tmp = tempfile::tempdir().expect("Failed to create temp dir");
        let path = tmp.path().join("small.gif");
        write_image(&path, 64, 48);
        assert_eq!(downsample(&path).expect("Failed to downsample"), (64, 48));
        assert_eq!(dimensions(&path), (64, 48));
    }

    #[test]
    fn test_downsample_mislabeled() {
        // png data uploaded with a .jpeg name gets stored as a real jpeg
        let tmp = tempfile::tempdir().expect("Failed to create temp dir");
        let png = tmp.path().join("cat.png");
        write_image(&png, 1000, 700);
        let path = tmp.path().join("cat.jpeg");
        std::fs::rename(&png, &path).expect("Failed to rename");
        let (w, h) = downsample(&path).expect("Failed to downsample");
        assert!(w <= MAX_WIDTH && h <= MAX_HEIGHT);
        assert_eq!(dimensions(&path), (w, h));
    }

    #[test]
    fn test_downsample_garbage() {
        let tmp = tempfile::tempdir().expect("Failed to create temp dir");
        let path = tmp.path().join("cat.png");
        std::fs::write(&path, b"this is not an image").expect("Failed to write");
        assert!(downsample(&path).is_err());
    }

    #[test(tokio::test)]
    async fn test_downsample_file() {
        let tmp = tempfile::tempdir().expect("Failed to create temp dir");
        let path = tmp.path().join("wide.png");
        let img: ImageBuffer<Rgb<u8>, Vec<u8>> = ImageBuffer::new(2400, 600);
        img.save(&path).expect("Failed to write test image");
        assert_eq!(
            downsample_file(path.clone())
                .await
                .expect("Failed to downsample"),
            (800, 200)
        );
    }
}
