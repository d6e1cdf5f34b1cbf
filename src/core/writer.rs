//! Writes exact file contents to disk.

use std::fs;
use std::io;
use std::path::Path;

/// Collaborator that makes a file contain exactly the given contents.
pub trait BlockWriter {
    fn write(&self, path: &Path, contents: &str) -> io::Result<()>;
}

/// Filesystem writer: creates parent directories, writes a temp file, renames it into place.
pub struct FsWriter;

impl BlockWriter for FsWriter {
    fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, contents)?;
        fs::rename(tmp, path)?;
        Ok(())
    }
}
