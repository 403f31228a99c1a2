//! Text/image analysis submission and detection history.

use std::path::Path;

use reqwest::multipart::{Form, Part};

use super::{ApiClient, Endpoint};
use crate::error::ApiError;
use crate::history::PageWindow;
use crate::types::DetectionResult;

pub const EMPTY_TEXT_MESSAGE: &str = "Please enter some text to analyze";
pub const MISSING_IMAGE_MESSAGE: &str = "Please select an image to analyze";
pub const UNSUPPORTED_IMAGE_MESSAGE: &str = "Please select an image file (PNG, JPEG, GIF, WebP or BMP)";

/// A single image file ready for upload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// Wrap in-memory bytes, inferring the MIME type from `file_name`.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for an empty payload or a non-image extension.
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Result<Self, ApiError> {
        let file_name = file_name.into();
        if bytes.is_empty() {
            return Err(ApiError::validation(MISSING_IMAGE_MESSAGE));
        }
        let mime = image_mime(&file_name).ok_or_else(|| ApiError::validation(UNSUPPORTED_IMAGE_MESSAGE))?;
        Ok(Self { file_name, mime, bytes })
    }

    /// Read an image from disk.
    ///
    /// # Errors
    ///
    /// Returns `Validation` if the file cannot be read, is empty, or is not
    /// a supported image type.
    pub async fn from_path(path: &Path) -> Result<Self, ApiError> {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| ApiError::validation(MISSING_IMAGE_MESSAGE))?;
        if image_mime(&file_name).is_none() {
            return Err(ApiError::validation(UNSUPPORTED_IMAGE_MESSAGE));
        }
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| ApiError::validation(format!("Could not read {}: {e}", path.display())))?;
        Self::new(file_name, bytes)
    }
}

fn image_mime(file_name: &str) -> Option<&'static str> {
    let extension = Path::new(file_name).extension()?.to_str()?.to_ascii_lowercase();
    match extension.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "bmp" => Some("image/bmp"),
        _ => None,
    }
}

impl ApiClient {
    /// Submit text to `POST /detection/analyze/text`.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for blank text without touching the network, the
    /// request failure, or a decode error for an out-of-range result.
    pub async fn analyze_text(&self, text: &str) -> Result<DetectionResult, ApiError> {
        if text.trim().is_empty() {
            return Err(ApiError::validation(EMPTY_TEXT_MESSAGE));
        }
        let request = self.request(Endpoint::AnalyzeText).json(&serde_json::json!({ "text": text }));
        let result = self.fetch_json(Endpoint::AnalyzeText, request).await?;
        checked(Endpoint::AnalyzeText, result)
    }

    /// Upload an image to `POST /detection/analyze/image` as multipart field `file`.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for an empty upload, the request failure, or a
    /// decode error for an out-of-range result.
    pub async fn analyze_image(&self, upload: &ImageUpload) -> Result<DetectionResult, ApiError> {
        if upload.bytes.is_empty() {
            return Err(ApiError::validation(MISSING_IMAGE_MESSAGE));
        }
        let part = Part::bytes(upload.bytes.clone())
            .file_name(upload.file_name.clone())
            .mime_str(upload.mime)
            .map_err(|_| ApiError::validation(UNSUPPORTED_IMAGE_MESSAGE))?;
        let request = self.request(Endpoint::AnalyzeImage).multipart(Form::new().part("file", part));
        let result = self.fetch_json(Endpoint::AnalyzeImage, request).await?;
        checked(Endpoint::AnalyzeImage, result)
    }

    /// Fetch one window of past detections from `GET /detection?skip=&limit=`.
    ///
    /// # Errors
    ///
    /// Returns the request failure or a decode error.
    pub async fn list_detections(&self, window: PageWindow) -> Result<Vec<DetectionResult>, ApiError> {
        let request = self
            .request(Endpoint::ListDetections)
            .query(&[("skip", window.skip), ("limit", u64::from(window.limit))]);
        let results: Vec<DetectionResult> = self.fetch_json(Endpoint::ListDetections, request).await?;
        results.into_iter().map(|result| checked(Endpoint::ListDetections, result)).collect()
    }
}

fn checked(endpoint: Endpoint, result: DetectionResult) -> Result<DetectionResult, ApiError> {
    result
        .validate()
        .map_err(|reason| ApiError::Decode { endpoint: endpoint.label(), reason })?;
    Ok(result)
}
