//! One upload in, one JPEG out.

use std::path::Path;

use crate::error::CoreError;
use crate::extract;
use crate::format::EmailFormat;
use crate::render::{self, RenderSettings, RenderedImage};
use crate::scratch::ScratchSpace;

/// Where a conversion may stage files, and what to call its directory.
#[derive(Debug, Clone, Copy)]
pub struct ScratchTarget<'a> {
    pub root: &'a Path,
    pub tag: &'a str,
}

/// Stage the upload, extract its body, and rasterize it.
///
/// Blocking: run it on a blocking thread from async code. The scratch
/// directory is gone by the time this returns, whatever the outcome. The
/// encoded image stays in memory and is never written to disk.
pub fn convert_upload(
    format: EmailFormat,
    bytes: &[u8],
    scratch: ScratchTarget<'_>,
    settings: &RenderSettings,
) -> Result<RenderedImage, CoreError> {
    let space = ScratchSpace::create(scratch.root, scratch.tag)?;
    let input = space.stage_input(format, bytes)?;

    let body = extract::extract_body_from_path(&input, format)?;
    render::render(&body, settings)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn is_empty_dir(path: &Path) -> bool {
        std::fs::read_dir(path).unwrap().next().is_none()
    }

    #[test]
    fn converts_eml_and_cleans_up() {
        let root = tempfile::tempdir().expect("create root");
        let raw = b"Subject: hi\r\nContent-Type: text/plain\r\n\r\nHello from the test suite";

        let image = convert_upload(
            EmailFormat::Eml,
            raw,
            ScratchTarget { root: root.path(), tag: "ok" },
            &RenderSettings::default(),
        )
        .unwrap();

        assert_eq!(image.lines, 1);
        assert!(image.bytes.starts_with(&[0xFF, 0xD8]), "JPEG start-of-image marker");
        assert!(is_empty_dir(root.path()));
    }

    #[test]
    fn failed_extraction_still_cleans_up() {
        let root = tempfile::tempdir().expect("create root");

        let result = convert_upload(
            EmailFormat::Msg,
            b"definitely not a compound file",
            ScratchTarget { root: root.path(), tag: "bad" },
            &RenderSettings::default(),
        );

        assert_matches!(result, Err(CoreError::Parse(_)));
        assert!(is_empty_dir(root.path()));
    }
}
