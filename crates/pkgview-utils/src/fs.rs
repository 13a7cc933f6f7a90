use std::{
    fs, io,
    path::{Path, PathBuf},
};

use walkdir::WalkDir;

use crate::error::{FileSystemError, FileSystemResult};

/// Recursively collects the files under `dir` whose extension is `extension`.
///
/// Entries are visited in file-name order at every level so the result is
/// deterministic. Symlinks are followed; a link back into one of its own
/// ancestors is skipped. A missing `dir` yields an empty list and unreadable
/// sub-directories are skipped.
///
/// # Errors
///
/// Returns [`FileSystemError::ReadDirectory`] if `dir` exists but cannot be read.
pub fn collect_files_sorted<P: AsRef<Path>>(
    dir: P,
    extension: &str,
) -> FileSystemResult<Vec<PathBuf>> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).follow_links(true).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) if err.depth() == 0 => {
                let source = err
                    .into_io_error()
                    .unwrap_or_else(|| io::Error::other("unreadable directory"));
                return Err(FileSystemError::ReadDirectory {
                    path: dir.to_path_buf(),
                    source,
                });
            }
            Err(_) => continue,
        };

        if entry.file_type().is_file()
            && entry.path().extension().is_some_and(|ext| ext == extension)
        {
            files.push(entry.into_path());
        }
    }

    Ok(files)
}

/// Reads a file to a string, attaching the path to the error.
pub fn read_to_string<P: AsRef<Path>>(path: P) -> FileSystemResult<String> {
    let path = path.as_ref();
    fs::read_to_string(path).map_err(|err| {
        FileSystemError::ReadFile {
            path: path.to_path_buf(),
            source: err,
        }
    })
}
