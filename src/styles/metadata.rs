//! Per-style metadata records.
//!
//! Replace and update both overwrite the whole record. Update does not merge
//! fields into the stored document.

use crate::error::{ApiError, ApiResult};
use crate::styles::lock::{LockKey, StyleLockManager};
use crate::styles::model::StyleMetadata;
use crate::styles::options::StyleStorageOptions;
use crate::styles::storage::{read_json_if_exists, write_json};
use std::sync::Arc;

pub trait MetadataStorage: Send + Sync {
    /// Write the record, creating the style directory if needed.
    fn add(&self, base_resource: &str, style_id: &str, metadata: &StyleMetadata) -> ApiResult<()>;

    /// Write the record only if none is stored yet; the check and the write
    /// happen under one lock. Returns whether it was written.
    fn add_if_missing(
        &self,
        base_resource: &str,
        style_id: &str,
        metadata: &StyleMetadata,
    ) -> ApiResult<bool>;

    fn get(&self, base_resource: &str, style_id: &str) -> ApiResult<StyleMetadata>;

    fn exists(&self, base_resource: &str, style_id: &str) -> ApiResult<bool>;

    fn replace(&self, base_resource: &str, style_id: &str, metadata: &StyleMetadata)
    -> ApiResult<()>;

    /// Overwrite an existing record. `NotFound` if there is none.
    fn update(&self, base_resource: &str, style_id: &str, metadata: &StyleMetadata)
    -> ApiResult<()>;
}

pub struct FileMetadataStorage {
    options: StyleStorageOptions,
    locks: Arc<StyleLockManager>,
}

impl FileMetadataStorage {
    pub fn new(options: StyleStorageOptions, locks: Arc<StyleLockManager>) -> Self {
        Self { options, locks }
    }

    fn write(
        &self,
        base_resource: &str,
        style_id: &str,
        metadata: &StyleMetadata,
    ) -> ApiResult<()> {
        let path = self.options.metadata_path(base_resource, style_id)?;
        self.locks
            .run_exclusive(LockKey::style(base_resource, style_id), || {
                write_json(&path, metadata)
            })?;
        tracing::debug!(base_resource, style_id, "style metadata written");
        Ok(())
    }
}

impl MetadataStorage for FileMetadataStorage {
    fn add(&self, base_resource: &str, style_id: &str, metadata: &StyleMetadata) -> ApiResult<()> {
        self.write(base_resource, style_id, metadata)
    }

    fn add_if_missing(
        &self,
        base_resource: &str,
        style_id: &str,
        metadata: &StyleMetadata,
    ) -> ApiResult<bool> {
        let path = self.options.metadata_path(base_resource, style_id)?;
        let written = self
            .locks
            .run_exclusive(LockKey::style(base_resource, style_id), || {
                if path.is_file() {
                    return Ok(false);
                }
                write_json(&path, metadata).map(|()| true)
            })?;
        if written {
            tracing::debug!(base_resource, style_id, "style metadata created");
        }
        Ok(written)
    }

    fn get(&self, base_resource: &str, style_id: &str) -> ApiResult<StyleMetadata> {
        let path = self.options.metadata_path(base_resource, style_id)?;
        self.locks
            .run_exclusive(LockKey::style(base_resource, style_id), || {
                read_json_if_exists::<StyleMetadata>(&path)
            })?
            .ok_or_else(|| ApiError::not_found(format!("metadata of {base_resource}/{style_id}")))
    }

    fn exists(&self, base_resource: &str, style_id: &str) -> ApiResult<bool> {
        Ok(self
            .options
            .metadata_path(base_resource, style_id)?
            .is_file())
    }

    fn replace(
        &self,
        base_resource: &str,
        style_id: &str,
        metadata: &StyleMetadata,
    ) -> ApiResult<()> {
        self.write(base_resource, style_id, metadata)
    }

    fn update(
        &self,
        base_resource: &str,
        style_id: &str,
        metadata: &StyleMetadata,
    ) -> ApiResult<()> {
        let path = self.options.metadata_path(base_resource, style_id)?;
        self.locks
            .run_exclusive(LockKey::style(base_resource, style_id), || {
                if !path.is_file() {
                    return Err(ApiError::not_found(format!(
                        "metadata of {base_resource}/{style_id}"
                    )));
                }
                write_json(&path, metadata)
            })?;
        tracing::debug!(base_resource, style_id, "style metadata updated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn storage(dir: &TempDir) -> FileMetadataStorage {
        FileMetadataStorage::new(
            StyleStorageOptions::new(dir.path()),
            Arc::new(StyleLockManager::new()),
        )
    }

    fn record(title: &str) -> StyleMetadata {
        StyleMetadata {
            id: "night".to_string(),
            title: Some(title.to_string()),
            keywords: vec!["roads".to_string(), "dark".to_string()],
            ..StyleMetadata::default()
        }
    }

    #[test]
    fn replace_twice_is_byte_identical() {
        let dir = TempDir::new().unwrap();
        let storage = storage(&dir);
        let path = dir.path().join("roads/night/metadata.json");

        storage.replace("roads", "night", &record("Night")).unwrap();
        let first = fs::read(&path).unwrap();
        storage.replace("roads", "night", &record("Night")).unwrap();
        let second = fs::read(&path).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn update_overwrites_instead_of_merging() {
        let dir = TempDir::new().unwrap();
        let storage = storage(&dir);
        storage.add("roads", "night", &record("Night")).unwrap();

        let partial = StyleMetadata {
            id: "night".to_string(),
            description: Some("Dark basemap".to_string()),
            ..StyleMetadata::default()
        };
        storage.update("roads", "night", &partial).unwrap();
        let stored = storage.get("roads", "night").unwrap();
        assert_eq!(stored, partial);
        assert!(stored.title.is_none());
        assert!(stored.keywords.is_empty());
    }

    #[test]
    fn add_if_missing_keeps_an_existing_record() {
        let dir = TempDir::new().unwrap();
        let storage = storage(&dir);
        assert!(storage.add_if_missing("roads", "night", &record("First")).unwrap());
        storage.replace("roads", "night", &record("Edited")).unwrap();

        assert!(!storage.add_if_missing("roads", "night", &record("Second")).unwrap());
        let stored = storage.get("roads", "night").unwrap();
        assert_eq!(stored.title.as_deref(), Some("Edited"));
    }

    #[test]
    fn update_of_missing_record_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let storage = storage(&dir);
        let err = storage.update("roads", "night", &record("Night")).unwrap_err();
        assert!(err.is_not_found());
        assert!(!dir.path().join("roads/night").exists());
    }

    #[test]
    fn missing_record_is_not_found() {
        let dir = TempDir::new().unwrap();
        let storage = storage(&dir);
        assert!(!storage.exists("roads", "night").unwrap());
        assert!(storage.get("roads", "night").unwrap_err().is_not_found());
    }
}
