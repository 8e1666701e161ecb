//! Image uploads for the chat
//!
//! No image understanding happens here: an upload is read into a data URL for
//! display and answered with a fixed placeholder analysis.

use anyhow::{Context, Result};
use base64::Engine;
use std::path::Path;

/// Text shown as the "analysis" of an uploaded image
pub const PLACEHOLDER_ANALYSIS: &str = "I've received your image. Visual analysis of hazards in photos is not available yet, but I can assess the location it was taken at. Select that spot on the map and ask me about its hazards.";

/// User-selected image held in memory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

/// MIME type for a supported image extension
pub fn mime_for_extension(ext: &str) -> Option<&'static str> {
    match ext.to_ascii_lowercase().as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "bmp" => Some("image/bmp"),
        _ => None,
    }
}

impl ImageUpload {
    /// Read an image file, rejecting unsupported extensions
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        let mime_type = mime_for_extension(ext)
            .ok_or_else(|| anyhow::anyhow!("unsupported image type: {}", path.display()))?;

        let bytes = std::fs::read(path)
            .with_context(|| format!("failed to read image: {}", path.display()))?;

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Ok(ImageUpload {
            file_name,
            mime_type,
            bytes,
        })
    }

    /// `data:<mime>;base64,<payload>`
    pub fn data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.mime_type,
            base64::engine::general_purpose::STANDARD.encode(&self.bytes)
        )
    }
}
