//! API description assembly.
//!
//! [`OpenApiGenerator`] turns an [`ApiOptions`](crate::config::ApiOptions)
//! snapshot into an [`OpenApiDocument`]: core schemas from [`catalog`],
//! collection paths from [`operations`], the optional API-key requirement
//! from [`security`], and finally whatever the registered
//! [`OpenApiExtension`]s contribute.

pub mod catalog;
pub mod document;
pub mod extension;
pub mod generator;
pub mod geometry;
pub mod operations;
pub mod security;

pub use catalog::SchemaCatalog;
pub use document::{
    Method, OpenApiDocument, Operation, Parameter, ParameterLocation, PathItem, schema_ref,
};
pub use extension::{ExtensionPipeline, OpenApiExtension};
pub use generator::OpenApiGenerator;
pub use geometry::{GeometryKind, geometry_schema};
pub use security::{API_KEY_PARAMETER, API_KEY_SCHEME};
