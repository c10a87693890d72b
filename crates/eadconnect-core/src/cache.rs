// SPDX-License-Identifier: Apache-2.0

//! JSON file persistence for local state.
//!
//! Token files and the grade snapshot are small JSON documents written
//! atomically: the payload goes to a sibling temp file which is then renamed
//! over the target.

use std::fs;
use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::StoreError;

fn io_error(path: &Path, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Read a JSON document from disk.
///
/// # Returns
///
/// The deserialized value, or `None` if the file doesn't exist.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StoreError> {
    if !path.exists() {
        return Ok(None);
    }

    let contents = fs::read_to_string(path).map_err(|e| io_error(path, e))?;
    let value = serde_json::from_str(&contents).map_err(|source| StoreError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(Some(value))
}

/// Write a JSON document to disk atomically.
///
/// Creates parent directories if they don't exist.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or the file cannot
/// be written or renamed into place.
pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;
    }

    let contents = serde_json::to_string_pretty(value).map_err(|source| StoreError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let temp_path = path.with_extension("json.tmp");
    fs::write(&temp_path, contents).map_err(|e| io_error(&temp_path, e))?;
    fs::rename(&temp_path, path).map_err(|e| io_error(path, e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    #[test]
    fn test_read_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let read: Option<Value> = read_json(&dir.path().join("missing.json")).unwrap();
        assert!(read.is_none());
    }

    #[test]
    fn test_write_creates_parent_dirs_and_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("state.json");

        write_json_atomic(&path, &json!({"Math": "8.5"})).unwrap();

        let read: Option<Value> = read_json(&path).unwrap();
        assert_eq!(read, Some(json!({"Math": "8.5"})));
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_write_replaces_existing_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");

        write_json_atomic(&path, &json!({"a": 1})).unwrap();
        write_json_atomic(&path, &json!({"b": 2})).unwrap();

        let read: Option<Value> = read_json(&path).unwrap();
        assert_eq!(read, Some(json!({"b": 2})));
    }

    #[test]
    fn test_read_corrupt_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, "{not json").unwrap();

        let result: Result<Option<Value>, _> = read_json(&path);
        assert!(matches!(result, Err(StoreError::Parse { .. })));
    }
}
