// SPDX-License-Identifier: Apache-2.0

//! Zip archives of per-course output directories.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;
use zip::CompressionMethod;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::error::DocumentError;

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> DocumentError + '_ {
    move |source| DocumentError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Zips the files directly inside `dir` into `<dir>.zip`.
///
/// Entries are stored by file name, sorted, and the archive is replaced if
/// it already exists.
///
/// # Errors
///
/// Returns `DocumentError::Io` on filesystem errors and
/// `DocumentError::Zip` if the archive cannot be written.
pub fn zip_directory(dir: &Path) -> Result<PathBuf, DocumentError> {
    let archive_path = dir.with_extension("zip");

    let mut entries: Vec<PathBuf> = fs::read_dir(dir)
        .map_err(io_error(dir))?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect();
    entries.sort();

    let file = File::create(&archive_path).map_err(io_error(&archive_path))?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for path in &entries {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let bytes = fs::read(path).map_err(io_error(path))?;
        zip.start_file(name, options)?;
        zip.write_all(&bytes).map_err(io_error(&archive_path))?;
    }

    zip.finish()?;
    debug!(archive = %archive_path.display(), files = entries.len(), "Archive written");
    Ok(archive_path)
}
