use base64::{engine::general_purpose, Engine as _};
use once_cell::sync::Lazy;
use regex::Regex;

#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("input is not a recognizable image")]
    UnrecognizedFormat,
    #[error("input is not an image (detected {0})")]
    NotAnImage(String),
    #[error("invalid base64 payload in data URI: {0}")]
    InvalidDataUri(#[from] base64::DecodeError),
}

static DATA_URI_PREFIX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^data:image/(png|jpeg|jpg|webp);base64,").expect("data uri regex"));

pub fn detect_mime_type(data: &[u8]) -> Option<String> {
    if data.len() > 12 {
        let ftyp = &data[4..12];
        if ftyp.starts_with(b"ftyp") {
            let brand = &ftyp[4..8];
            if brand == b"heic" || brand == b"heif" || brand == b"hevc" {
                return Some("image/heic".to_string());
            }
        }
    }

    infer::get(data).map(|kind| kind.mime_type().to_string())
}

fn normalize_image_mime(mime_type: &str) -> String {
    let lowered = mime_type.trim().to_ascii_lowercase();
    match lowered.as_str() {
        "image/jpg" => "image/jpeg".to_string(),
        _ => lowered,
    }
}

/// A selfie normalized for transmission: raw bytes plus the declared
/// media type. Accepts either file bytes or a browser-style data URI.
#[derive(Debug, Clone)]
pub struct SourceImage {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl SourceImage {
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, MediaError> {
        let mime_type = detect_mime_type(&bytes)
            .or_else(|| {
                image::guess_format(&bytes)
                    .ok()
                    .map(|format| format.to_mime_type().to_string())
            })
            .ok_or(MediaError::UnrecognizedFormat)?;
        let mime_type = normalize_image_mime(&mime_type);
        if !mime_type.starts_with("image/") {
            return Err(MediaError::NotAnImage(mime_type));
        }
        Ok(SourceImage { bytes, mime_type })
    }

    pub fn from_input(input: &[u8]) -> Result<Self, MediaError> {
        if let Ok(text) = std::str::from_utf8(input) {
            if let Some(prefix) = DATA_URI_PREFIX_RE.find(text.trim_start()) {
                let encoded = &text.trim_start()[prefix.end()..];
                let bytes = general_purpose::STANDARD.decode(encoded.trim())?;
                return Self::from_bytes(bytes);
            }
        }
        Self::from_bytes(input.to_vec())
    }

    pub fn to_base64(&self) -> String {
        general_purpose::STANDARD.encode(&self.bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Smallest valid PNG header + IHDR chunk start, enough for sniffing.
    const PNG_MAGIC: &[u8] = &[
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
        0x52,
    ];
    const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46, 0x49, 0x46, 0x00];

    #[test]
    fn detects_png_and_jpeg_bytes() {
        assert_eq!(detect_mime_type(PNG_MAGIC).as_deref(), Some("image/png"));
        assert_eq!(detect_mime_type(JPEG_MAGIC).as_deref(), Some("image/jpeg"));
    }

    #[test]
    fn accepts_raw_image_bytes() {
        let source = SourceImage::from_input(PNG_MAGIC).expect("png input");
        assert_eq!(source.mime_type, "image/png");
        assert_eq!(source.bytes, PNG_MAGIC);
    }

    #[test]
    fn strips_the_data_uri_prefix_before_decoding() {
        let encoded = general_purpose::STANDARD.encode(JPEG_MAGIC);
        let uri = format!("data:image/jpeg;base64,{encoded}");
        let source = SourceImage::from_input(uri.as_bytes()).expect("data uri input");
        assert_eq!(source.mime_type, "image/jpeg");
        assert_eq!(source.bytes, JPEG_MAGIC);
    }

    #[test]
    fn rejects_text_that_is_not_an_image() {
        let err = SourceImage::from_input(b"just some text, definitely not pixels");
        assert!(matches!(err, Err(MediaError::UnrecognizedFormat)));
    }

    #[test]
    fn rejects_non_image_binary_payloads() {
        // %PDF magic: recognized by the sniffer, but not an image.
        let err = SourceImage::from_input(b"%PDF-1.7 some document body");
        assert!(matches!(err, Err(MediaError::NotAnImage(_))));
    }

    #[test]
    fn rejects_garbage_base64_in_a_data_uri() {
        let err = SourceImage::from_input(b"data:image/png;base64,@@not-base64@@");
        assert!(matches!(err, Err(MediaError::InvalidDataUri(_))));
    }

    #[test]
    fn round_trips_bytes_through_base64() {
        let source = SourceImage::from_bytes(PNG_MAGIC.to_vec()).expect("png");
        let decoded = general_purpose::STANDARD.decode(source.to_base64()).unwrap();
        assert_eq!(decoded, PNG_MAGIC);
    }
}
