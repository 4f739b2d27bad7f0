use std::io::Cursor;

use base64::Engine;
use image::{ImageFormat, ImageReader};

pub const MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

pub const ALLOWED_FORMATS: &[ImageFormat] = &[
    ImageFormat::Jpeg,
    ImageFormat::Png,
    ImageFormat::Gif,
    ImageFormat::WebP,
];

/// A decoded upload ready to be stored in the `images` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub content_type: String,
    pub data: Vec<u8>,
}

/// Decode a `data:image/<type>;base64,<payload>` URI.
///
/// The declared media type is ignored; the stored content type comes from
/// the magic bytes of the payload.
pub fn decode_data_uri(uri: &str) -> Result<ImageUpload, String> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| "Image must be a base64 data URI".to_string())?;

    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| "Malformed data URI".to_string())?;

    if !header.ends_with(";base64") {
        return Err("Image data must be base64 encoded".to_string());
    }

    // Base64 inflates by 4/3; reject early before allocating the decoded buffer.
    if payload.len() / 4 * 3 > MAX_FILE_SIZE + 3 {
        return Err(format!(
            "Image too large. Maximum size is {} bytes",
            MAX_FILE_SIZE
        ));
    }

    let data = base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(|e| format!("Invalid base64 image data: {}", e))?;

    if data.len() > MAX_FILE_SIZE {
        return Err(format!(
            "Image too large. Maximum size is {} bytes",
            MAX_FILE_SIZE
        ));
    }

    let content_type = detect_content_type(&data)?;

    Ok(ImageUpload { content_type, data })
}

/// Detect format from magic bytes and check it is allowed.
/// Returns the MIME type on success.
pub fn detect_content_type(data: &[u8]) -> Result<String, String> {
    let reader = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| format!("Failed to read image: {}", e))?;

    let format = reader
        .format()
        .ok_or_else(|| "Could not detect image format".to_string())?;

    if !ALLOWED_FORMATS.contains(&format) {
        return Err(format!(
            "Unsupported image format: {:?}. Allowed: JPEG, PNG, GIF, WebP",
            format
        ));
    }

    Ok(format.to_mime_type().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    // 1x1 transparent PNG
    const PNG_1X1: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

    #[test]
    fn test_decode_png() {
        let upload = decode_data_uri(&format!("data:image/png;base64,{}", PNG_1X1)).unwrap();
        assert_eq!(upload.content_type, "image/png");
        assert!(upload.data.starts_with(b"\x89PNG"));
    }

    #[test]
    fn test_declared_type_is_not_trusted() {
        let upload = decode_data_uri(&format!("data:image/jpeg;base64,{}", PNG_1X1)).unwrap();
        assert_eq!(upload.content_type, "image/png");
    }

    #[test]
    fn test_rejects_plain_base64() {
        assert!(decode_data_uri(PNG_1X1).is_err());
    }

    #[test]
    fn test_rejects_non_base64_data_uri() {
        assert!(decode_data_uri("data:image/png,rawbytes").is_err());
    }

    #[test]
    fn test_rejects_invalid_base64() {
        assert!(decode_data_uri("data:image/png;base64,@@@@").is_err());
    }

    #[test]
    fn test_rejects_non_image_payload() {
        let text = base64::engine::general_purpose::STANDARD.encode("just some text");
        assert!(decode_data_uri(&format!("data:image/png;base64,{}", text)).is_err());
    }

    #[test]
    fn test_rejects_oversize_payload() {
        let payload = "A".repeat(MAX_FILE_SIZE / 3 * 4 + 64);
        let err = decode_data_uri(&format!("data:image/png;base64,{}", payload)).unwrap_err();
        assert!(err.contains("too large"));
    }
}
