//! Writing units to disk

use std::fs;
use std::path::Path;

use super::OutputError;

/// Destination of generated text
pub trait ArtifactWriter {
    fn write(&self, path: &Path, text: &str) -> Result<(), OutputError>;
}

/// Writes to the filesystem, creating parent directories
pub struct FsWriter;

impl ArtifactWriter for FsWriter {
    fn write(&self, path: &Path, text: &str) -> Result<(), OutputError> {
        let wrap = |source| OutputError::Write {
            path: path.display().to_string(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(wrap)?;
        }
        fs::write(path, text).map_err(wrap)
    }
}

/// Copy a published file to its mirror location
pub(crate) fn mirror(from: &Path, to: &Path) -> Result<(), OutputError> {
    let wrap = |source| OutputError::Mirror {
        path: to.display().to_string(),
        source,
    };
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent).map_err(wrap)?;
    }
    fs::copy(from, to).map(|_| ()).map_err(wrap)
}
