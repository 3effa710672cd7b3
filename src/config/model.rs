//! Deserializable configuration snapshot.
//!
//! The structs mirror `schema/ogcapi_options.schema.json` (camelCase keys).
//! A loaded [`ApiOptions`] is treated as immutable for the lifetime of the
//! process: the document generator and the style service only ever borrow it.

use crate::config::identity::{CollectionId, DEFAULT_OPENAPI_VERSION};
use crate::styles::StyleStorageOptions;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiOptions {
    #[serde(default = "default_openapi_version")]
    pub open_api_version: String,
    /// Adds the document-level API-key requirement. Advisory only: there is
    /// no per-operation exemption.
    #[serde(default)]
    pub use_api_key_authorization: bool,
    #[serde(default)]
    pub landing_page: LandingPage,
    #[serde(default)]
    pub collections: Vec<CollectionDescriptor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style_storage: Option<StyleStorageOptions>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LandingPage {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub contact_name: Option<String>,
    #[serde(default)]
    pub contact_url: Option<String>,
    #[serde(default)]
    pub license_name: Option<String>,
    #[serde(default)]
    pub license_url: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionDescriptor {
    pub id: CollectionId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub features: Option<FeaturesCapability>,
    #[serde(default)]
    pub tiles: Option<TilesCapability>,
    /// Exposes the styles surface for this collection.
    #[serde(default)]
    pub styles: bool,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeaturesCapability {
    /// Name of the registered features provider serving this collection.
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub storage: StorageCapability,
}

/// Write permissions and shape of a feature collection.
///
/// The exposed feature operations are a pure function of these flags.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageCapability {
    #[serde(default)]
    pub allow_create: bool,
    #[serde(default)]
    pub allow_replace: bool,
    #[serde(default)]
    pub allow_update: bool,
    #[serde(default)]
    pub allow_delete: bool,
    #[serde(default)]
    pub geometry_geo_json_type: Option<String>,
    #[serde(default)]
    pub properties: BTreeSet<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TilesCapability {
    /// Name of the registered tiles provider serving this collection.
    #[serde(default)]
    pub provider: Option<String>,
}

fn default_openapi_version() -> String {
    DEFAULT_OPENAPI_VERSION.to_string()
}

impl Default for ApiOptions {
    fn default() -> Self {
        Self {
            open_api_version: default_openapi_version(),
            use_api_key_authorization: false,
            landing_page: LandingPage::default(),
            collections: Vec::new(),
            style_storage: None,
        }
    }
}

impl ApiOptions {
    /// Look up a configured collection.
    pub fn collection(&self, id: &str) -> Option<&CollectionDescriptor> {
        self.collections.iter().find(|c| c.id.as_str() == id)
    }
}
