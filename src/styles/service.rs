//! Style operations as exposed to API callers.
//!
//! Each call authorizes first, then goes to storage. Storage misses surface
//! as `ApiError::NotFound` except for listing, where an unknown base resource
//! simply has no styles.

use crate::error::{ApiError, ApiResult};
use crate::styles::format::StylesheetFormat;
use crate::styles::lock::StyleLockManager;
use crate::styles::metadata::{FileMetadataStorage, MetadataStorage};
use crate::styles::model::{
    DefaultStyle, OgcStyle, OgcStyles, StyleMetadata, StylesheetAddParameters,
};
use crate::styles::options::StyleStorageOptions;
use crate::styles::storage::{FileStyleStorage, StyleStorage};
use chrono::Utc;
use std::sync::Arc;

/// Access check run before every style operation.
pub trait StylesAuthorizer: Send + Sync {
    /// `Ok(())` to proceed, `ApiError::Unauthorized` to refuse.
    fn authorize(
        &self,
        api_key: Option<&str>,
        base_resource: &str,
        style_id: Option<&str>,
    ) -> ApiResult<()>;
}

/// Accepts exactly one configured key for every resource.
#[derive(Clone, Debug)]
pub struct StaticApiKeyAuthorizer {
    key: String,
}

impl StaticApiKeyAuthorizer {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

impl StylesAuthorizer for StaticApiKeyAuthorizer {
    fn authorize(
        &self,
        api_key: Option<&str>,
        base_resource: &str,
        _: Option<&str>,
    ) -> ApiResult<()> {
        if api_key == Some(self.key.as_str()) {
            Ok(())
        } else {
            tracing::warn!(base_resource, "style request rejected: bad or missing API key");
            Err(ApiError::Unauthorized)
        }
    }
}

/// Result of fetching a style: its descriptor, or one stylesheet when a
/// format was requested.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StyleResponse {
    Style(OgcStyle),
    Stylesheet {
        format: StylesheetFormat,
        content: String,
    },
}

#[derive(Clone)]
pub struct StylesService {
    styles: Arc<dyn StyleStorage>,
    metadata: Arc<dyn MetadataStorage>,
    authorizer: Option<Arc<dyn StylesAuthorizer>>,
}

impl StylesService {
    pub fn new(styles: Arc<dyn StyleStorage>, metadata: Arc<dyn MetadataStorage>) -> Self {
        Self {
            styles,
            metadata,
            authorizer: None,
        }
    }

    /// File-backed stores over one directory tree, sharing one lock table.
    pub fn file_backed(options: StyleStorageOptions) -> Self {
        let locks = Arc::new(StyleLockManager::new());
        Self::new(
            Arc::new(FileStyleStorage::new(options.clone(), Arc::clone(&locks))),
            Arc::new(FileMetadataStorage::new(options, locks)),
        )
    }

    pub fn with_authorizer(mut self, authorizer: Arc<dyn StylesAuthorizer>) -> Self {
        self.authorizer = Some(authorizer);
        self
    }

    fn authorize(
        &self,
        api_key: Option<&str>,
        base_resource: &str,
        style_id: Option<&str>,
    ) -> ApiResult<()> {
        match &self.authorizer {
            Some(authorizer) => authorizer.authorize(api_key, base_resource, style_id),
            None => Ok(()),
        }
    }

    pub fn list_styles(
        &self,
        base_resource: &str,
        base_url: &str,
        api_key: Option<&str>,
    ) -> ApiResult<OgcStyles> {
        self.authorize(api_key, base_resource, None)?;
        match self.styles.get_styles(base_resource, base_url) {
            Err(err) if err.is_not_found() => Ok(OgcStyles::default()),
            other => other,
        }
    }

    /// The style descriptor, or the stylesheet in `format` when one is given.
    pub fn get_style(
        &self,
        base_resource: &str,
        style_id: &str,
        format: Option<&str>,
        base_url: &str,
        api_key: Option<&str>,
    ) -> ApiResult<StyleResponse> {
        self.authorize(api_key, base_resource, Some(style_id))?;
        match format.filter(|f| !f.is_empty()) {
            None => self
                .styles
                .get_style(base_resource, style_id, base_url)
                .map(StyleResponse::Style),
            Some(raw) => {
                let format = StylesheetFormat::parse(raw)?;
                let content = self.styles.get_stylesheet(base_resource, style_id, format)?;
                Ok(StyleResponse::Stylesheet { format, content })
            }
        }
    }

    /// Add a stylesheet. The first stylesheet of a style also creates its
    /// metadata record, with both timestamps set to now.
    pub fn add_style(
        &self,
        base_resource: &str,
        parameters: &StylesheetAddParameters,
        api_key: Option<&str>,
    ) -> ApiResult<()> {
        let style_id = parameters.style_id.as_str();
        self.authorize(api_key, base_resource, Some(style_id))?;

        let format = StylesheetFormat::parse(&parameters.format)?;
        if self.styles.stylesheet_exists(base_resource, style_id, format)? {
            return Err(ApiError::Conflict(format!(
                "stylesheet {base_resource}/{style_id} ({format}) already exists"
            )));
        }
        self.styles.add_stylesheet(base_resource, parameters)?;

        self.metadata.add_if_missing(
            base_resource,
            style_id,
            &StyleMetadata::created_at(style_id, Utc::now()),
        )?;
        tracing::info!(base_resource, style_id, %format, "style added");
        Ok(())
    }

    pub fn replace_stylesheet(
        &self,
        base_resource: &str,
        style_id: &str,
        parameters: &StylesheetAddParameters,
        api_key: Option<&str>,
    ) -> ApiResult<()> {
        self.authorize(api_key, base_resource, Some(style_id))?;
        self.styles
            .replace_stylesheet(base_resource, style_id, parameters)
    }

    pub fn delete_style(
        &self,
        base_resource: &str,
        style_id: &str,
        api_key: Option<&str>,
    ) -> ApiResult<()> {
        self.authorize(api_key, base_resource, Some(style_id))?;
        self.styles.delete_style(base_resource, style_id)?;
        tracing::info!(base_resource, style_id, "style deleted");
        Ok(())
    }

    /// Set the default style. The referenced style must exist; a record with
    /// no id clears the explicit default.
    pub fn update_default_style(
        &self,
        base_resource: &str,
        default: &DefaultStyle,
        api_key: Option<&str>,
    ) -> ApiResult<()> {
        self.authorize(api_key, base_resource, None)?;
        // Not atomic with the write: a style deleted in between leaves a stale
        // record, which listing ignores.
        if let Some(style_id) = default.default.as_deref() {
            if !self.styles.style_exists(base_resource, style_id)? {
                return Err(ApiError::not_found(format!(
                    "style {base_resource}/{style_id}"
                )));
            }
        }
        self.styles.update_default_style(base_resource, default)
    }

    pub fn get_metadata(
        &self,
        base_resource: &str,
        style_id: &str,
        api_key: Option<&str>,
    ) -> ApiResult<StyleMetadata> {
        self.authorize(api_key, base_resource, Some(style_id))?;
        self.metadata.get(base_resource, style_id)
    }

    pub fn replace_metadata(
        &self,
        base_resource: &str,
        style_id: &str,
        metadata: &StyleMetadata,
        api_key: Option<&str>,
    ) -> ApiResult<()> {
        self.authorize(api_key, base_resource, Some(style_id))?;
        self.metadata.replace(base_resource, style_id, metadata)
    }

    /// Overwrites the stored record; `NotFound` if there is none yet.
    pub fn update_metadata(
        &self,
        base_resource: &str,
        style_id: &str,
        metadata: &StyleMetadata,
        api_key: Option<&str>,
    ) -> ApiResult<()> {
        self.authorize(api_key, base_resource, Some(style_id))?;
        self.metadata.update(base_resource, style_id, metadata)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn service(dir: &TempDir) -> StylesService {
        StylesService::file_backed(StyleStorageOptions::new(dir.path()))
    }

    fn params(style_id: &str, format: &str) -> StylesheetAddParameters {
        StylesheetAddParameters {
            style_id: style_id.to_string(),
            format: format.to_string(),
            content: format!("<{style_id}/>"),
        }
    }

    #[test]
    fn unknown_collection_lists_no_styles() {
        let dir = TempDir::new().unwrap();
        let styles = service(&dir).list_styles("roads", "/", None).unwrap();
        assert_eq!(styles, OgcStyles::default());
    }

    #[test]
    fn first_add_creates_metadata_later_adds_keep_it() {
        let dir = TempDir::new().unwrap();
        let service = service(&dir);
        service.add_style("roads", &params("night", "sld10"), None).unwrap();
        let created = service.get_metadata("roads", "night", None).unwrap();
        assert_eq!(created.id, "night");
        assert!(created.created.is_some());
        assert_eq!(created.created, created.updated);

        let titled = StyleMetadata {
            title: Some("Night".to_string()),
            ..created.clone()
        };
        service.replace_metadata("roads", "night", &titled, None).unwrap();
        service.add_style("roads", &params("night", "sld11"), None).unwrap();
        assert_eq!(service.get_metadata("roads", "night", None).unwrap(), titled);
    }

    #[test]
    fn duplicate_add_conflicts() {
        let dir = TempDir::new().unwrap();
        let service = service(&dir);
        service.add_style("roads", &params("night", "mapbox"), None).unwrap();
        let err = service
            .add_style("roads", &params("night", "mapbox"), None)
            .unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)));
    }

    #[test]
    fn get_style_switches_on_format() {
        let dir = TempDir::new().unwrap();
        let service = service(&dir);
        service.add_style("roads", &params("night", "mapbox"), None).unwrap();

        match service.get_style("roads", "night", None, "/", None).unwrap() {
            StyleResponse::Style(style) => {
                assert_eq!(style.formats, vec![StylesheetFormat::Mapbox]);
            }
            other => panic!("expected descriptor, got {other:?}"),
        }
        assert_eq!(
            service
                .get_style("roads", "night", Some("mapbox"), "/", None)
                .unwrap(),
            StyleResponse::Stylesheet {
                format: StylesheetFormat::Mapbox,
                content: "<night/>".to_string()
            }
        );
        assert!(service
            .get_style("roads", "night", Some("sld10"), "/", None)
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn default_must_reference_existing_style() {
        let dir = TempDir::new().unwrap();
        let service = service(&dir);
        service.add_style("roads", &params("day", "mapbox"), None).unwrap();
        let err = service
            .update_default_style("roads", &DefaultStyle::new("night"), None)
            .unwrap_err();
        assert!(err.is_not_found());

        service
            .update_default_style("roads", &DefaultStyle::new("day"), None)
            .unwrap();
        let styles = service.list_styles("roads", "/", None).unwrap();
        assert_eq!(styles.default.as_deref(), Some("day"));
    }

    #[test]
    fn deleting_the_default_style_falls_back() {
        let dir = TempDir::new().unwrap();
        let service = service(&dir);
        service.add_style("roads", &params("a", "mapbox"), None).unwrap();
        service.add_style("roads", &params("b", "mapbox"), None).unwrap();
        service
            .update_default_style("roads", &DefaultStyle::new("a"), None)
            .unwrap();

        service.delete_style("roads", "a", None).unwrap();
        let styles = service.list_styles("roads", "/", None).unwrap();
        let ids: Vec<&str> = styles.styles.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["b"]);
        assert_eq!(styles.default.as_deref(), Some("b"));
    }

    #[test]
    fn record_file_name_is_not_a_style_id() {
        let dir = TempDir::new().unwrap();
        let service = service(&dir);
        service.add_style("roads", &params("day", "mapbox"), None).unwrap();

        let err = service
            .add_style("roads", &params("default-style.json", "mapbox"), None)
            .unwrap_err();
        assert!(err.is_not_found());
        assert!(!dir.path().join("roads/default-style.json").exists());

        service
            .update_default_style("roads", &DefaultStyle::new("day"), None)
            .unwrap();
        let styles = service.list_styles("roads", "/", None).unwrap();
        assert_eq!(styles.default.as_deref(), Some("day"));
    }

    #[test]
    fn authorizer_guards_every_operation() {
        let dir = TempDir::new().unwrap();
        let service =
            service(&dir).with_authorizer(Arc::new(StaticApiKeyAuthorizer::new("admin")));

        let err = service
            .add_style("roads", &params("night", "mapbox"), Some("guest"))
            .unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized));
        assert!(!dir.path().join("roads").exists());

        service
            .add_style("roads", &params("night", "mapbox"), Some("admin"))
            .unwrap();
        assert!(matches!(
            service.list_styles("roads", "/", None).unwrap_err(),
            ApiError::Unauthorized
        ));
        assert!(matches!(
            service.delete_style("roads", "night", Some("nope")).unwrap_err(),
            ApiError::Unauthorized
        ));
        service.delete_style("roads", "night", Some("admin")).unwrap();
    }

    #[test]
    fn update_metadata_needs_existing_record() {
        let dir = TempDir::new().unwrap();
        let service = service(&dir);
        let record = StyleMetadata {
            id: "night".to_string(),
            ..StyleMetadata::default()
        };
        assert!(service
            .update_metadata("roads", "night", &record, None)
            .unwrap_err()
            .is_not_found());
    }
}
