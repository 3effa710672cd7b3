//! Capability modules that contribute to the API description.

pub mod schemas;
pub mod styles;

pub use schemas::SchemasOpenApiExtension;
pub use styles::StylesOpenApiExtension;

use crate::openapi::ExtensionPipeline;

/// The pipeline the binaries use: styles first, then schemas.
pub fn standard_pipeline() -> ExtensionPipeline {
    ExtensionPipeline::new()
        .with(StylesOpenApiExtension)
        .with(SchemasOpenApiExtension)
}
