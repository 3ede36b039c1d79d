//! Small helpers for reading and atomically rewriting project files

use crate::error::{FileOp, FileRole, IoError};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Read a file, returning `None` when it does not exist
pub(crate) fn read_optional(path: &Path, role: FileRole) -> Result<Option<String>, IoError> {
    match fs::read_to_string(path) {
        Ok(contents) => Ok(Some(contents)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(IoError::new(FileOp::Read, role, path, e)),
    }
}

/// Read a file that must exist
pub(crate) fn read_required(path: &Path, role: FileRole) -> Result<String, IoError> {
    fs::read_to_string(path).map_err(|e| IoError::new(FileOp::Read, role, path, e))
}

/// Write `contents` next to `path` and rename it into place
pub(crate) fn write_atomic(path: &Path, role: FileRole, contents: &str) -> Result<(), IoError> {
    let tmp = temp_path(path);
    fs::write(&tmp, contents).map_err(|e| IoError::new(FileOp::WriteTemp, role, &tmp, e))?;
    fs::rename(&tmp, path).map_err(|e| {
        let _ = fs::remove_file(&tmp);
        IoError::new(FileOp::Replace, role, path, e)
    })
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
