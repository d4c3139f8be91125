//! Supported email container formats and filename-based detection.

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Outlook compound-document message extension.
pub const EXT_MSG: &str = "msg";

/// RFC 5322 / MIME message extension.
pub const EXT_EML: &str = "eml";

/// Email container formats accepted by the converter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailFormat {
    /// Outlook `.msg` (OLE compound file with MAPI property streams).
    Msg,
    /// Plain-text `.eml` (headers plus MIME body).
    Eml,
}

impl EmailFormat {
    /// Detect the format from the suffix of an uploaded filename.
    ///
    /// Matching is case-insensitive and only looks at the final extension,
    /// so `Report.final.EML` is accepted and `notes.eml.txt` is not.
    pub fn from_filename(filename: &str) -> Result<Self, CoreError> {
        let ext = filename
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .ok_or_else(|| CoreError::UnsupportedFormat(filename.to_string()))?;

        match ext.as_str() {
            EXT_MSG => Ok(Self::Msg),
            EXT_EML => Ok(Self::Eml),
            _ => Err(CoreError::UnsupportedFormat(filename.to_string())),
        }
    }

    /// Canonical lowercase extension, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Msg => EXT_MSG,
            Self::Eml => EXT_EML,
        }
    }
}

impl std::fmt::Display for EmailFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}
