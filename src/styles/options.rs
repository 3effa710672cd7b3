//! On-disk layout of the style tree.
//!
//! ```text
//! {baseDirectory}/{baseResource}/{defaultStyleFilename}
//! {baseDirectory}/{baseResource}/{styleId}/{stylesheetFilename}.{format}.{ext}
//! {baseDirectory}/{baseResource}/{styleId}/{metadataFilename}
//! ```

use crate::error::{ApiError, ApiResult};
use crate::styles::format::StylesheetFormat;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_STYLE_FILENAME: &str = "default-style.json";
pub const STYLESHEET_FILENAME: &str = "style";
pub const METADATA_FILENAME: &str = "metadata.json";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleStorageOptions {
    pub base_directory: PathBuf,
    #[serde(default = "default_style_filename")]
    pub default_style_filename: String,
    /// Stem of every stylesheet file name.
    #[serde(default = "stylesheet_filename")]
    pub stylesheet_filename: String,
    #[serde(default = "metadata_filename")]
    pub metadata_filename: String,
}

fn default_style_filename() -> String {
    DEFAULT_STYLE_FILENAME.to_string()
}

fn stylesheet_filename() -> String {
    STYLESHEET_FILENAME.to_string()
}

fn metadata_filename() -> String {
    METADATA_FILENAME.to_string()
}

impl StyleStorageOptions {
    /// Default file names under `base_directory`.
    pub fn new(base_directory: impl Into<PathBuf>) -> Self {
        Self {
            base_directory: base_directory.into(),
            default_style_filename: default_style_filename(),
            stylesheet_filename: stylesheet_filename(),
            metadata_filename: metadata_filename(),
        }
    }

    pub fn resource_dir(&self, base_resource: &str) -> ApiResult<PathBuf> {
        Ok(self.base_directory.join(segment(base_resource)?))
    }

    /// Style ids share the resource directory with the default-style record,
    /// so the record's file name (and the metadata name) are not valid ids.
    pub fn style_dir(&self, base_resource: &str, style_id: &str) -> ApiResult<PathBuf> {
        if style_id == self.default_style_filename || style_id == self.metadata_filename {
            return Err(ApiError::not_found(format!("style '{style_id}'")));
        }
        Ok(self.resource_dir(base_resource)?.join(segment(style_id)?))
    }

    pub fn stylesheet_name(&self, format: StylesheetFormat) -> String {
        format!(
            "{}.{}.{}",
            self.stylesheet_filename,
            format.as_str(),
            format.extension()
        )
    }

    pub fn stylesheet_path(
        &self,
        base_resource: &str,
        style_id: &str,
        format: StylesheetFormat,
    ) -> ApiResult<PathBuf> {
        Ok(self
            .style_dir(base_resource, style_id)?
            .join(self.stylesheet_name(format)))
    }

    pub fn metadata_path(&self, base_resource: &str, style_id: &str) -> ApiResult<PathBuf> {
        Ok(self
            .style_dir(base_resource, style_id)?
            .join(&self.metadata_filename))
    }

    pub fn default_style_path(&self, base_resource: &str) -> ApiResult<PathBuf> {
        Ok(self
            .resource_dir(base_resource)?
            .join(&self.default_style_filename))
    }

    /// Recover the format from a stylesheet file name. Metadata, the default
    /// style record and anything not shaped `{stem}.{format}.{ext}` yield
    /// `None`.
    pub fn format_of(&self, file_name: &str) -> Option<StylesheetFormat> {
        if file_name == self.metadata_filename || file_name == self.default_style_filename {
            return None;
        }
        let rest = file_name.strip_prefix(&self.stylesheet_filename)?.strip_prefix('.')?;
        let (format, extension) = rest.split_once('.')?;
        let format = StylesheetFormat::parse(format).ok()?;
        (format.extension() == extension).then_some(format)
    }
}

/// Identifiers become single path components; reject anything that would
/// escape or alias the style tree.
fn segment(raw: &str) -> ApiResult<&Path> {
    let well_formed = !raw.is_empty()
        && raw != "."
        && raw != ".."
        && !raw.contains(['/', '\\', '\0']);
    if well_formed {
        Ok(Path::new(raw))
    } else {
        Err(ApiError::not_found(format!("style resource '{raw}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_follows_configured_names() {
        let options = StyleStorageOptions::new("/srv/styles");
        assert_eq!(
            options
                .stylesheet_path("roads", "night", StylesheetFormat::Sld11)
                .unwrap(),
            PathBuf::from("/srv/styles/roads/night/style.sld11.xml")
        );
        assert_eq!(
            options.metadata_path("roads", "night").unwrap(),
            PathBuf::from("/srv/styles/roads/night/metadata.json")
        );
        assert_eq!(
            options.default_style_path("roads").unwrap(),
            PathBuf::from("/srv/styles/roads/default-style.json")
        );
    }

    #[test]
    fn format_of_only_accepts_stylesheet_names() {
        let options = StyleStorageOptions::new("/srv/styles");
        assert_eq!(options.format_of("style.mapbox.json"), Some(StylesheetFormat::Mapbox));
        assert_eq!(options.format_of("style.sld10.xml"), Some(StylesheetFormat::Sld10));
        assert_eq!(options.format_of("metadata.json"), None);
        assert_eq!(options.format_of("default-style.json"), None);
        assert_eq!(options.format_of("style.mapbox.xml"), None);
        assert_eq!(options.format_of("other.mapbox.json"), None);
        assert_eq!(options.format_of("style.mapbox.json.tmp"), None);
    }

    #[test]
    fn rejects_identifiers_that_leave_the_tree() {
        let options = StyleStorageOptions::new("/srv/styles");
        for bad in ["", ".", "..", "a/b", "a\\b"] {
            assert!(options.style_dir("roads", bad).unwrap_err().is_not_found(), "{bad:?}");
            assert!(options.resource_dir(bad).is_err(), "{bad:?}");
        }
    }

    #[test]
    fn reserved_file_names_are_not_style_ids() {
        let options = StyleStorageOptions::new("/srv/styles");
        for reserved in ["default-style.json", "metadata.json"] {
            assert!(options.style_dir("roads", reserved).unwrap_err().is_not_found());
            assert!(options.metadata_path("roads", reserved).is_err());
        }

        let mut renamed = StyleStorageOptions::new("/srv/styles");
        renamed.default_style_filename = "default.json".to_string();
        assert!(renamed.style_dir("roads", "default.json").is_err());
        assert!(renamed.style_dir("roads", "default-style.json").is_ok());
    }

    #[test]
    fn deserializes_with_default_file_names() {
        let raw = r#"{"baseDirectory": "/data/styles", "stylesheetFilename": "sheet"}"#;
        let options: StyleStorageOptions = serde_json::from_str(raw).unwrap();
        assert_eq!(options.default_style_filename, DEFAULT_STYLE_FILENAME);
        assert_eq!(options.metadata_filename, METADATA_FILENAME);
        assert_eq!(options.stylesheet_name(StylesheetFormat::Mapbox), "sheet.mapbox.json");
    }
}
