use crate::error::{ApiError, ApiResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier of a collection, used verbatim in path templates
/// (`/collections/{id}`) and as the base resource for style storage.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CollectionId(pub String);

impl CollectionId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Collection ids end up in URLs and directory names; keep them to a
    /// conservative character set.
    pub fn is_well_formed(&self) -> bool {
        !self.0.is_empty()
            && self
                .0
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
    }
}

impl fmt::Display for CollectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CollectionId {
    fn from(value: &str) -> Self {
        CollectionId(value.to_string())
    }
}

/// API description versions the document builder can emit.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum OpenApiVersion {
    V3_0,
    V3_1,
    V3_2,
}

pub const DEFAULT_OPENAPI_VERSION: &str = "3.1";

impl OpenApiVersion {
    /// Parse the configured `major.minor` string.
    ///
    /// `2.0` is rejected: the builder only produces 3.x documents.
    pub fn parse(raw: &str) -> ApiResult<Self> {
        match raw {
            "3.0" => Ok(OpenApiVersion::V3_0),
            "3.1" => Ok(OpenApiVersion::V3_1),
            "3.2" => Ok(OpenApiVersion::V3_2),
            other => Err(ApiError::configuration(format!(
                "OpenAPI version '{other}' is not valid. Valid version values are: 3.0, 3.1, 3.2"
            ))),
        }
    }

    /// Value written to the document's `openapi` field.
    pub fn document_version(self) -> &'static str {
        match self {
            OpenApiVersion::V3_0 => "3.0.4",
            OpenApiVersion::V3_1 => "3.1.1",
            OpenApiVersion::V3_2 => "3.2.0",
        }
    }
}
