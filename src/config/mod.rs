//! Service configuration.
//!
//! The options file (`schema/ogcapi_options.schema.json`) lists the exposed
//! collections and their capabilities. Callers load it once with
//! [`ApiOptions::load`] and share the snapshot read-only.

pub mod identity;
pub mod loader;
pub mod model;

pub use identity::{CollectionId, DEFAULT_OPENAPI_VERSION, OpenApiVersion};
pub use loader::CONFIG_ENV;
pub use model::{
    ApiOptions, CollectionDescriptor, FeaturesCapability, LandingPage, StorageCapability,
    TilesCapability,
};
