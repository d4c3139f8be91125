//! Body extraction for the supported email containers.
//!
//! Each format has its own parser; both converge on a single plain-text
//! string so the rasterizer never needs to know where the text came from.

pub mod eml;
pub mod html;
pub mod msg;

use std::path::Path;

use crate::error::CoreError;
use crate::format::EmailFormat;

/// Extract the readable message body from raw container bytes.
pub fn extract_body(bytes: &[u8], format: EmailFormat) -> Result<String, CoreError> {
    match format {
        EmailFormat::Msg => msg::extract(bytes),
        EmailFormat::Eml => eml::extract(bytes),
    }
}

/// Read a staged upload from disk and extract its body.
pub fn extract_body_from_path(path: &Path, format: EmailFormat) -> Result<String, CoreError> {
    let bytes = std::fs::read(path)?;
    extract_body(&bytes, format)
}
