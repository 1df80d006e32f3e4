//! Base64 image payload decoding

use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD, URL_SAFE, URL_SAFE_NO_PAD};
use base64::Engine;

/// Raw bytes of a face photo decoded from the request body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload(Vec<u8>);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ImageDecodeError {
    #[error("payload is not valid base64: {0}")]
    InvalidBase64(String),

    #[error("payload decodes to zero bytes")]
    Empty,
}

impl ImagePayload {
    /// Decode base64 text, accepting the standard and URL-safe alphabets
    /// with or without padding.
    ///
    /// ASCII whitespace is ignored and a `data:<mime>;base64,` prefix is
    /// stripped. No image format check happens here.
    pub fn from_base64(text: &str) -> Result<Self, ImageDecodeError> {
        let body = strip_data_url(text.trim());
        let compact: String = body.chars().filter(|c| !c.is_ascii_whitespace()).collect();

        let mut last_err = None;
        for engine in [&STANDARD, &STANDARD_NO_PAD, &URL_SAFE, &URL_SAFE_NO_PAD] {
            match engine.decode(&compact) {
                Ok(bytes) if bytes.is_empty() => return Err(ImageDecodeError::Empty),
                Ok(bytes) => return Ok(Self(bytes)),
                Err(err) => last_err = Some(err),
            }
        }

        Err(ImageDecodeError::InvalidBase64(
            last_err.map(|e| e.to_string()).unwrap_or_default(),
        ))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

fn strip_data_url(text: &str) -> &str {
    if !text.starts_with("data:") {
        return text;
    }
    match text.split_once(";base64,") {
        Some((_, data)) => data,
        None => text,
    }
}
