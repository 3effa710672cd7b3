//! OGC API document composition and style storage.
//!
//! The crate builds the OpenAPI description of an OGC API service from a
//! collection configuration ([`config`], [`openapi`], [`extensions`]) and
//! manages the mutable style resources of those collections on disk
//! ([`styles`]). Data providers are looked up by name through
//! [`providers::ProviderRegistry`]; their data access is out of scope here.
//!
//! The binaries `ogcapi-openapi` and `ogcapi-styles` are thin wrappers over the
//! functions re-exported below.

use anyhow::{Result, bail};
use std::env;
use std::path::PathBuf;
use std::sync::Arc;

pub mod config;
pub mod error;
pub mod extensions;
pub mod logging;
pub mod openapi;
pub mod providers;
pub mod styles;

pub use config::{
    ApiOptions, CONFIG_ENV, CollectionDescriptor, CollectionId, FeaturesCapability, LandingPage,
    OpenApiVersion, StorageCapability, TilesCapability,
};
pub use error::{ApiError, ApiResult};
pub use extensions::{SchemasOpenApiExtension, StylesOpenApiExtension, standard_pipeline};
pub use logging::init_logging;
pub use openapi::{
    ExtensionPipeline, Method, OpenApiDocument, OpenApiExtension, OpenApiGenerator, PathItem,
    geometry_schema,
};
pub use providers::{FeaturesProvider, ProviderRegistry, TilesProvider};
pub use styles::{
    DefaultStyle, OgcStyle, OgcStyles, StaticApiKeyAuthorizer, StyleLockManager, StyleMetadata,
    StyleResponse, StyleStorageOptions, StylesAuthorizer, StylesService, StylesheetAddParameters,
    StylesheetFormat,
};

/// Pick the options file: an explicit path wins, then `OGCAPI_CONFIG`.
pub fn resolve_config_path(explicit: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path);
    }
    match env::var(CONFIG_ENV) {
        Ok(hint) if !hint.trim().is_empty() => Ok(PathBuf::from(hint)),
        _ => bail!("no options file given; pass --config PATH or set {CONFIG_ENV}"),
    }
}

/// Generator with the standard extensions over `options`.
pub fn standard_generator(options: Arc<ApiOptions>) -> OpenApiGenerator {
    OpenApiGenerator::new(options, standard_pipeline())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_config_path_wins() {
        let path = resolve_config_path(Some(PathBuf::from("/etc/ogcapi.json"))).unwrap();
        assert_eq!(path, PathBuf::from("/etc/ogcapi.json"));
    }
}
