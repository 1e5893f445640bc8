//! Store path validation.
//!
//! Collection paths are `/`-separated segments with no empty segment. Write
//! paths are relative to a collection and name exactly one field of one
//! record: `<id>/<field>`.

use crate::StoreError;

/// Check that `path` names a collection.
pub fn validate_collection_path(path: &str) -> Result<(), StoreError> {
    if path.is_empty() || path.split('/').any(str::is_empty) {
        return Err(StoreError::InvalidPath { path: path.to_owned() });
    }
    Ok(())
}

/// Split a write path into `(record id, field)`.
pub fn split_write_path(path: &str) -> Result<(&str, &str), StoreError> {
    match path.split_once('/') {
        Some((id, field)) if !id.is_empty() && !field.is_empty() && !field.contains('/') => {
            Ok((id, field))
        },
        _ => Err(StoreError::InvalidPath { path: path.to_owned() }),
    }
}
