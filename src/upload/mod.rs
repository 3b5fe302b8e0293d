/// Upload pipeline
///
/// This module handles:
/// - Validating the file the user picked (presence, size, type)
/// - Reading it off the UI thread and checking it decodes as an image
/// - Encoding it as a data URL and building the photo record

pub mod encode;

use chrono::Utc;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use crate::state::PhotoRecord;
use encode::encode_data_url;

/// Largest accepted upload (5 MiB)
pub const MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;

/// Extensions offered by the file picker
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "bmp"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("no file selected")]
    NoFileSelected,
    #[error("file too large ({size} bytes, limit is {limit})")]
    FileTooLarge { size: u64, limit: u64 },
    #[error("{path} is not an image")]
    NotAnImage { path: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReadError {
    #[error("could not read {path}: {message}")]
    Io { path: String, message: String },
    #[error("could not decode image: {0}")]
    Decode(String),
    #[error("background read failed: {0}")]
    Task(String),
}

/// Why an upload did not produce a photo
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Read(#[from] ReadError),
}

/// A picked file that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub path: PathBuf,
    pub size: u64,
}

/// Check the picked file before reading it.
pub fn validate(file: Option<&Path>) -> Result<SelectedFile, UploadError> {
    let path = file.ok_or(ValidationError::NoFileSelected)?;

    let size = std::fs::metadata(path)
        .map_err(|e| io_error(path, &e))?
        .len();
    if size > MAX_UPLOAD_BYTES {
        return Err(ValidationError::FileTooLarge {
            size,
            limit: MAX_UPLOAD_BYTES,
        }
        .into());
    }

    let is_image = mime_guess::from_path(path)
        .first()
        .is_some_and(|mime| mime.type_() == mime::IMAGE);
    if !is_image {
        return Err(ValidationError::NotAnImage {
            path: path.display().to_string(),
        }
        .into());
    }

    Ok(SelectedFile {
        path: path.to_path_buf(),
        size,
    })
}

/// Read a validated file and turn it into a photo record.
/// The read and the decode check run off the UI thread.
pub async fn read_photo(file: SelectedFile, description: String) -> Result<PhotoRecord, UploadError> {
    let bytes = tokio::fs::read(&file.path)
        .await
        .map_err(|e| io_error(&file.path, &e))?;
    debug!(path = %file.path.display(), bytes = bytes.len(), "upload read");

    // Decoding a full-size photo is CPU-bound
    let data = tokio::task::spawn_blocking(move || encode_image(&bytes))
        .await
        .map_err(|e| ReadError::Task(e.to_string()))??;

    let record = PhotoRecord::new(data, &description, Utc::now());
    info!(id = %record.id, size = file.size, "upload encoded");
    Ok(record)
}

/// Verify `bytes` decode as an image and encode them as a data URL
fn encode_image(bytes: &[u8]) -> Result<String, ReadError> {
    let format = image::guess_format(bytes).map_err(|e| ReadError::Decode(e.to_string()))?;
    image::load_from_memory_with_format(bytes, format)
        .map_err(|e| ReadError::Decode(e.to_string()))?;

    Ok(encode_data_url(format.to_mime_type(), bytes))
}

fn io_error(path: &Path, error: &std::io::Error) -> ReadError {
    ReadError::Io {
        path: path.display().to_string(),
        message: error.to_string(),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::upload::encode::decode_data_url;
    use image::{ImageFormat, Rgb, RgbImage};
    use std::io::{Cursor, Write};
    use tempfile::NamedTempFile;

    /// A small PNG with some noise so it is not trivially compressible
    pub(crate) fn png_bytes() -> Vec<u8> {
        let img = RgbImage::from_fn(24, 24, |x, y| Rgb([(x * 10) as u8, (y * 10) as u8, ((x ^ y) * 7) as u8]));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png).unwrap();
        bytes
    }

    pub(crate) fn temp_file(suffix: &str, bytes: &[u8]) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(bytes).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_no_file_selected() {
        assert_eq!(
            validate(None),
            Err(UploadError::Validation(ValidationError::NoFileSelected))
        );
    }

    #[test]
    fn test_file_too_large() {
        let file = tempfile::Builder::new().suffix(".jpg").tempfile().unwrap();
        file.as_file().set_len(6 * 1024 * 1024).unwrap();

        assert!(matches!(
            validate(Some(file.path())),
            Err(UploadError::Validation(ValidationError::FileTooLarge { .. }))
        ));
    }

    #[test]
    fn test_limit_is_inclusive() {
        let file = tempfile::Builder::new().suffix(".png").tempfile().unwrap();
        file.as_file().set_len(MAX_UPLOAD_BYTES).unwrap();
        assert!(validate(Some(file.path())).is_ok());
    }

    #[test]
    fn test_rejects_non_images() {
        let file = temp_file(".txt", b"hello");
        assert!(matches!(
            validate(Some(file.path())),
            Err(UploadError::Validation(ValidationError::NotAnImage { .. }))
        ));
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("gone.png");
        assert!(matches!(
            validate(Some(&missing)),
            Err(UploadError::Read(ReadError::Io { .. }))
        ));
    }

    #[tokio::test]
    async fn test_read_photo_encodes_data_url() {
        let bytes = png_bytes();
        let file = temp_file(".png", &bytes);
        let selected = validate(Some(file.path())).unwrap();

        let record = read_photo(selected, "sunset".to_string()).await.unwrap();
        assert_eq!(record.description, "sunset");
        assert!(!record.display_time.is_empty());

        let (mime, decoded) = decode_data_url(&record.data).unwrap();
        assert_eq!(mime, "image/png");
        assert_eq!(decoded, bytes);
    }

    #[tokio::test]
    async fn test_read_photo_rejects_garbage() {
        let file = temp_file(".png", b"definitely not a png");
        let selected = validate(Some(file.path())).unwrap();

        let result = read_photo(selected, String::new()).await;
        assert!(matches!(result, Err(UploadError::Read(ReadError::Decode(_)))));
    }
}
