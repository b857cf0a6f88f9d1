use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::Bytes;
use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

use crate::model::CapturedImage;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ImageError {
    #[error("image is empty")]
    Empty,
    #[error("invalid base64")]
    InvalidBase64,
    #[error("unsupported image type: {0}")]
    UnsupportedType(String),
}

fn supported_mime(ct: &str) -> Option<&'static str> {
    let essence = ct.split(';').next().unwrap_or(ct).trim().to_ascii_lowercase();
    match essence.as_str() {
        "image/jpeg" | "image/jpg" => Some("image/jpeg"),
        "image/png" => Some("image/png"),
        "image/webp" => Some("image/webp"),
        "image/heic" => Some("image/heic"),
        _ => None,
    }
}

/// Raw upload body. A missing content type is taken as JPEG.
pub fn image_from_bytes(content_type: Option<&str>, body: Bytes) -> Result<CapturedImage, ImageError> {
    let ct = content_type.unwrap_or("image/jpeg");
    let mime = supported_mime(ct).ok_or_else(|| ImageError::UnsupportedType(ct.to_string()))?;
    if body.is_empty() {
        return Err(ImageError::Empty);
    }
    Ok(CapturedImage {
        mime_type: mime.to_string(),
        data_b64: STANDARD.encode(&body),
    })
}

/// Either a `data:image/...;base64,` URL or bare base64 (taken as JPEG).
pub fn image_from_base64(raw: &str) -> Result<CapturedImage, ImageError> {
    lazy_static! {
        static ref DATA_URL_RE: Regex =
            Regex::new(r"(?s)^data:(?P<mime>[^;,]+);base64,(?P<data>.*)$").unwrap();
    }

    let raw = raw.trim();
    let (mime, data) = match DATA_URL_RE.captures(raw) {
        Some(caps) => {
            let declared = &caps["mime"];
            let mime = supported_mime(declared)
                .ok_or_else(|| ImageError::UnsupportedType(declared.to_string()))?;
            (mime, caps.name("data").map_or("", |m| m.as_str()))
        }
        None => ("image/jpeg", raw),
    };

    let data: String = data.chars().filter(|c| !c.is_whitespace()).collect();
    if data.is_empty() {
        return Err(ImageError::Empty);
    }
    let decoded = STANDARD.decode(&data).map_err(|_| ImageError::InvalidBase64)?;
    if decoded.is_empty() {
        return Err(ImageError::Empty);
    }

    Ok(CapturedImage {
        mime_type: mime.to_string(),
        data_b64: data,
    })
}
