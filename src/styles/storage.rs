//! Stylesheets and default-style records on the filesystem.
//!
//! Every read or write of a style directory happens inside the lock for
//! `(base_resource, style_id)`; the default-style record has its own key.
//! Locks are never nested.

use crate::error::{ApiError, ApiResult};
use crate::styles::format::StylesheetFormat;
use crate::styles::lock::{LockKey, StyleLockManager};
use crate::styles::model::{
    DefaultStyle, OgcStyle, OgcStyles, StyleMetadata, StylesheetAddParameters,
};
use crate::styles::options::StyleStorageOptions;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;
use tempfile::NamedTempFile;

pub trait StyleStorage: Send + Sync {
    fn style_exists(&self, base_resource: &str, style_id: &str) -> ApiResult<bool>;

    fn stylesheet_exists(
        &self,
        base_resource: &str,
        style_id: &str,
        format: StylesheetFormat,
    ) -> ApiResult<bool>;

    /// Formats stored for a style, in [`StylesheetFormat`] order. Empty when
    /// the style does not exist.
    fn available_formats(
        &self,
        base_resource: &str,
        style_id: &str,
    ) -> ApiResult<Vec<StylesheetFormat>>;

    /// Store a new stylesheet. `Conflict` if that format already exists.
    fn add_stylesheet(
        &self,
        base_resource: &str,
        parameters: &StylesheetAddParameters,
    ) -> ApiResult<()>;

    /// Overwrite an existing stylesheet of `style_id`. `NotFound` if it does
    /// not exist yet.
    fn replace_stylesheet(
        &self,
        base_resource: &str,
        style_id: &str,
        parameters: &StylesheetAddParameters,
    ) -> ApiResult<()>;

    /// Remove the style directory with all its stylesheets and metadata. A
    /// default-style record naming the style is cleared.
    fn delete_style(&self, base_resource: &str, style_id: &str) -> ApiResult<()>;

    fn get_style(&self, base_resource: &str, style_id: &str, base_url: &str)
    -> ApiResult<OgcStyle>;

    /// All styles of a base resource and the resolved default. `NotFound` if
    /// the base resource has no directory.
    fn get_styles(&self, base_resource: &str, base_url: &str) -> ApiResult<OgcStyles>;

    fn get_stylesheet(
        &self,
        base_resource: &str,
        style_id: &str,
        format: StylesheetFormat,
    ) -> ApiResult<String>;

    /// The explicitly stored default, without fallback.
    fn default_style(&self, base_resource: &str) -> ApiResult<Option<String>>;

    fn update_default_style(&self, base_resource: &str, default: &DefaultStyle) -> ApiResult<()>;
}

pub struct FileStyleStorage {
    options: StyleStorageOptions,
    locks: Arc<StyleLockManager>,
}

impl FileStyleStorage {
    pub fn new(options: StyleStorageOptions, locks: Arc<StyleLockManager>) -> Self {
        Self { options, locks }
    }

    fn formats_in(&self, style_dir: &Path) -> ApiResult<Vec<StylesheetFormat>> {
        let entries = match fs::read_dir(style_dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(ApiError::io(style_dir, err)),
        };
        let mut formats = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|err| ApiError::io(style_dir, err))?;
            if let Some(format) = entry
                .file_name()
                .to_str()
                .and_then(|name| self.options.format_of(name))
            {
                formats.push(format);
            }
        }
        formats.sort();
        formats.dedup();
        Ok(formats)
    }

    fn read_style(
        &self,
        base_resource: &str,
        style_id: &str,
        base_url: &str,
    ) -> ApiResult<OgcStyle> {
        let style_dir = self.options.style_dir(base_resource, style_id)?;
        if !style_dir.is_dir() {
            return Err(ApiError::not_found(format!("style {base_resource}/{style_id}")));
        }
        let formats = self.formats_in(&style_dir)?;
        let metadata_path = self.options.metadata_path(base_resource, style_id)?;
        let title = read_json_if_exists::<StyleMetadata>(&metadata_path)?.and_then(|m| m.title);
        Ok(OgcStyle::new(base_resource, style_id, title, formats, base_url))
    }

    fn read_default(&self, base_resource: &str) -> ApiResult<Option<String>> {
        let path = self.options.default_style_path(base_resource)?;
        Ok(read_json_if_exists::<DefaultStyle>(&path)?.and_then(|record| record.default))
    }
}

impl StyleStorage for FileStyleStorage {
    fn style_exists(&self, base_resource: &str, style_id: &str) -> ApiResult<bool> {
        Ok(self.options.style_dir(base_resource, style_id)?.is_dir())
    }

    fn stylesheet_exists(
        &self,
        base_resource: &str,
        style_id: &str,
        format: StylesheetFormat,
    ) -> ApiResult<bool> {
        Ok(self
            .options
            .stylesheet_path(base_resource, style_id, format)?
            .is_file())
    }

    fn available_formats(
        &self,
        base_resource: &str,
        style_id: &str,
    ) -> ApiResult<Vec<StylesheetFormat>> {
        let style_dir = self.options.style_dir(base_resource, style_id)?;
        self.locks
            .run_exclusive(LockKey::style(base_resource, style_id), || {
                self.formats_in(&style_dir)
            })
    }

    fn add_stylesheet(
        &self,
        base_resource: &str,
        parameters: &StylesheetAddParameters,
    ) -> ApiResult<()> {
        let format = StylesheetFormat::parse(&parameters.format)?;
        let style_id = parameters.style_id.as_str();
        let path = self.options.stylesheet_path(base_resource, style_id, format)?;

        self.locks
            .run_exclusive(LockKey::style(base_resource, style_id), || {
                if path.exists() {
                    return Err(ApiError::Conflict(format!(
                        "stylesheet {base_resource}/{style_id} ({format}) already exists"
                    )));
                }
                write_atomic(&path, parameters.content.as_bytes())
            })?;
        tracing::debug!(base_resource, style_id, %format, "stylesheet added");
        Ok(())
    }

    fn replace_stylesheet(
        &self,
        base_resource: &str,
        style_id: &str,
        parameters: &StylesheetAddParameters,
    ) -> ApiResult<()> {
        let format = StylesheetFormat::parse(&parameters.format)?;
        let path = self.options.stylesheet_path(base_resource, style_id, format)?;

        self.locks
            .run_exclusive(LockKey::style(base_resource, style_id), || {
                if !path.is_file() {
                    return Err(ApiError::not_found(format!(
                        "stylesheet {base_resource}/{style_id} ({format})"
                    )));
                }
                write_atomic(&path, parameters.content.as_bytes())
            })?;
        tracing::debug!(base_resource, style_id, %format, "stylesheet replaced");
        Ok(())
    }

    fn delete_style(&self, base_resource: &str, style_id: &str) -> ApiResult<()> {
        let style_dir = self.options.style_dir(base_resource, style_id)?;
        self.locks
            .run_exclusive(LockKey::style(base_resource, style_id), || {
                match fs::remove_dir_all(&style_dir) {
                    Ok(()) => Ok(()),
                    Err(err) if err.kind() == io::ErrorKind::NotFound => Err(ApiError::not_found(
                        format!("style {base_resource}/{style_id}"),
                    )),
                    Err(err) => Err(ApiError::io(&style_dir, err)),
                }
            })?;
        tracing::debug!(base_resource, style_id, "style deleted");

        let default_path = self.options.default_style_path(base_resource)?;
        self.locks
            .run_exclusive(LockKey::default_style(base_resource), || {
                match self.read_default(base_resource)? {
                    Some(current) if current == style_id => {
                        tracing::debug!(base_resource, style_id, "default style cleared");
                        write_json(&default_path, &DefaultStyle::default())
                    }
                    _ => Ok(()),
                }
            })
    }

    fn get_style(
        &self,
        base_resource: &str,
        style_id: &str,
        base_url: &str,
    ) -> ApiResult<OgcStyle> {
        self.locks
            .run_exclusive(LockKey::style(base_resource, style_id), || {
                self.read_style(base_resource, style_id, base_url)
            })
    }

    fn get_styles(&self, base_resource: &str, base_url: &str) -> ApiResult<OgcStyles> {
        let resource_dir = self.options.resource_dir(base_resource)?;
        let entries = match fs::read_dir(&resource_dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(ApiError::not_found(format!("styles of {base_resource}")));
            }
            Err(err) => return Err(ApiError::io(&resource_dir, err)),
        };

        let mut style_ids = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|err| ApiError::io(&resource_dir, err))?;
            let is_dir = entry
                .file_type()
                .map_err(|err| ApiError::io(&entry.path(), err))?
                .is_dir();
            if let (true, Some(name)) = (is_dir, entry.file_name().to_str()) {
                style_ids.push(name.to_string());
            }
        }
        style_ids.sort();

        let mut styles = Vec::with_capacity(style_ids.len());
        for style_id in &style_ids {
            match self.get_style(base_resource, style_id, base_url) {
                Ok(style) => styles.push(style),
                // Deleted between listing and reading.
                Err(err) if err.is_not_found() => continue,
                Err(err) => return Err(err),
            }
        }

        let explicit = self
            .locks
            .run_exclusive(LockKey::default_style(base_resource), || {
                self.read_default(base_resource)
            })?;
        // A record naming a style that is gone (deleted after the record was
        // checked) falls back like a missing record.
        let default = match explicit {
            Some(explicit) if styles.iter().any(|style| style.id == explicit) => Some(explicit),
            stale => {
                let fallback = styles.first().map(|style| style.id.clone());
                tracing::debug!(
                    base_resource,
                    stale = ?stale,
                    fallback = ?fallback,
                    "no usable default-style record, using first style"
                );
                fallback
            }
        };

        Ok(OgcStyles { default, styles })
    }

    fn get_stylesheet(
        &self,
        base_resource: &str,
        style_id: &str,
        format: StylesheetFormat,
    ) -> ApiResult<String> {
        let path = self.options.stylesheet_path(base_resource, style_id, format)?;
        self.locks
            .run_exclusive(LockKey::style(base_resource, style_id), || {
                match fs::read_to_string(&path) {
                    Ok(content) => Ok(content),
                    Err(err) if err.kind() == io::ErrorKind::NotFound => Err(ApiError::not_found(
                        format!("stylesheet {base_resource}/{style_id} ({format})"),
                    )),
                    Err(err) => Err(ApiError::io(&path, err)),
                }
            })
    }

    fn default_style(&self, base_resource: &str) -> ApiResult<Option<String>> {
        self.locks
            .run_exclusive(LockKey::default_style(base_resource), || {
                self.read_default(base_resource)
            })
    }

    fn update_default_style(&self, base_resource: &str, default: &DefaultStyle) -> ApiResult<()> {
        let path = self.options.default_style_path(base_resource)?;
        self.locks
            .run_exclusive(LockKey::default_style(base_resource), || {
                write_json(&path, default)
            })?;
        tracing::debug!(base_resource, default = ?default.default, "default style updated");
        Ok(())
    }
}

/// Write `bytes` to `path` through a sibling temp file so readers never see
/// a partial file. Missing parent directories are created.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> ApiResult<()> {
    let dir = path
        .parent()
        .ok_or_else(|| ApiError::not_found(format!("parent of {}", path.display())))?;
    fs::create_dir_all(dir).map_err(|err| ApiError::io(dir, err))?;

    let mut temp = NamedTempFile::new_in(dir).map_err(|err| ApiError::io(dir, err))?;
    temp.write_all(bytes)
        .and_then(|()| temp.as_file().sync_all())
        .map_err(|err| ApiError::io(temp.path(), err))?;
    temp.persist(path)
        .map_err(|err| ApiError::io(path, err.error))?;
    Ok(())
}

/// Pretty-printed JSON, so equal values always produce equal bytes.
pub(crate) fn write_json<T: Serialize>(path: &Path, value: &T) -> ApiResult<()> {
    let mut bytes = serde_json::to_vec_pretty(value).map_err(|err| ApiError::format(path, err))?;
    bytes.push(b'\n');
    write_atomic(path, &bytes)
}

pub(crate) fn read_json_if_exists<T: DeserializeOwned>(path: &Path) -> ApiResult<Option<T>> {
    let data = match fs::read(path) {
        Ok(data) => data,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(ApiError::io(path, err)),
    };
    serde_json::from_slice(&data)
        .map(Some)
        .map_err(|err| ApiError::format(path, err))
}
