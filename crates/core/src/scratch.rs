//! Per-request scratch directories.
//!
//! Every conversion stages its upload in a directory of its own. The directory is removed when the [`ScratchSpace`] is dropped, so
//! early returns and errors clean up the same way success does.

use std::path::{Path, PathBuf};

use crate::error::CoreError;
use crate::format::EmailFormat;

/// Directory name prefix for scratch spaces.
pub const SCRATCH_PREFIX: &str = "mailsnap-";

const MAX_TAG_LEN: usize = 64;

/// A uniquely named directory owned by a single request.
#[derive(Debug)]
pub struct ScratchSpace {
    dir: tempfile::TempDir,
}

impl ScratchSpace {
    /// Create a fresh scratch directory under `root`, tagged with `tag`
    /// (usually the request id) so stray directories can be traced back.
    pub fn create(root: &Path, tag: &str) -> Result<Self, CoreError> {
        std::fs::create_dir_all(root)?;
        let prefix = format!("{SCRATCH_PREFIX}{}-", sanitize_tag(tag));
        let dir = tempfile::Builder::new().prefix(&prefix).tempdir_in(root)?;
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write the uploaded bytes as `input.<ext>` and return the path.
    ///
    /// The client-supplied filename is never used on disk.
    pub fn stage_input(&self, format: EmailFormat, bytes: &[u8]) -> Result<PathBuf, CoreError> {
        let path = self.path().join(format!("input.{}", format.extension()));
        std::fs::write(&path, bytes)?;
        Ok(path)
    }
}

/// Keep only characters that are safe in a directory name.
fn sanitize_tag(tag: &str) -> String {
    tag.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
        .take(MAX_TAG_LEN)
        .collect()
}
