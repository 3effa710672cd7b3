//! The in-memory API description.
//!
//! Only the parts of the OpenAPI object model the builder emits are typed;
//! schema bodies stay as `serde_json::Value` fragments. Maps are `BTreeMap`s
//! so serialization order is stable across runs.

use crate::config::OpenApiVersion;
use crate::error::{ApiError, ApiResult};
use serde::Serialize;
use serde_json::{Value, json};
use std::collections::BTreeMap;

/// Prefix used by every reference into the shared schema registry.
pub const SCHEMA_REF_PREFIX: &str = "#/components/schemas/";

/// Reference to a registered schema by name.
pub fn schema_ref(name: &str) -> Value {
    json!({ "$ref": format!("{SCHEMA_REF_PREFIX}{name}") })
}

#[derive(Clone, Debug, Serialize)]
pub struct OpenApiDocument {
    pub openapi: String,
    pub info: Info,
    pub servers: Vec<Server>,
    pub paths: BTreeMap<String, PathItem>,
    pub components: Components,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub security: Vec<SecurityRequirement>,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct Info {
    pub title: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<Contact>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<License>,
}

#[derive(Clone, Debug, Serialize)]
pub struct Contact {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct License {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct Server {
    pub url: String,
}

/// A security requirement object: scheme name to required scopes.
pub type SecurityRequirement = BTreeMap<String, Vec<String>>;

#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Components {
    pub schemas: BTreeMap<String, Value>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub security_schemes: BTreeMap<String, SecurityScheme>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SecurityScheme {
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    #[serde(rename = "in")]
    pub location: ParameterLocation,
    pub description: String,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    Get,
    Put,
    Post,
    Delete,
    Patch,
}

/// Operations available on one path template.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PathItem {
    pub operations: BTreeMap<Method, Operation>,
}

impl PathItem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, method: Method, operation: Operation) -> Self {
        self.operations.insert(method, operation);
        self
    }

    pub fn get(&self, method: Method) -> Option<&Operation> {
        self.operations.get(&method)
    }

    pub fn has(&self, method: Method) -> bool {
        self.operations.contains_key(&method)
    }

    pub fn methods(&self) -> impl Iterator<Item = Method> + '_ {
        self.operations.keys().copied()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBody>,
    pub responses: BTreeMap<String, Response>,
}

impl Operation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn parameter(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn request_body(mut self, media_type: &str, schema: Value) -> Self {
        self.request_body = Some(RequestBody {
            required: true,
            content: BTreeMap::from([(media_type.to_string(), MediaType { schema })]),
        });
        self
    }

    /// Declare a response without a body.
    pub fn respond(mut self, status: &str, description: &str) -> Self {
        self.responses.insert(
            status.to_string(),
            Response {
                description: description.to_string(),
                content: BTreeMap::new(),
            },
        );
        self
    }

    /// Declare a response carrying `schema` as `media_type`.
    pub fn respond_with(
        mut self,
        status: &str,
        description: &str,
        media_type: &str,
        schema: Value,
    ) -> Self {
        self.responses.insert(
            status.to_string(),
            Response {
                description: description.to_string(),
                content: BTreeMap::from([(media_type.to_string(), MediaType { schema })]),
            },
        );
        self
    }

    pub fn has_response(&self, status: &str) -> bool {
        self.responses.contains_key(status)
    }

    pub fn parameter_named(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.name == name)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    Path,
    Query,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "in")]
    pub location: ParameterLocation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub required: bool,
    pub schema: Value,
}

impl Parameter {
    /// Path parameters are always required.
    pub fn path(name: &str, schema: Value) -> Self {
        Self {
            name: name.to_string(),
            location: ParameterLocation::Path,
            description: None,
            required: true,
            schema,
        }
    }

    pub fn query(name: &str, schema: Value) -> Self {
        Self {
            name: name.to_string(),
            location: ParameterLocation::Query,
            description: None,
            required: false,
            schema,
        }
    }

    pub fn described(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RequestBody {
    pub required: bool,
    pub content: BTreeMap<String, MediaType>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Response {
    pub description: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub content: BTreeMap<String, MediaType>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MediaType {
    pub schema: Value,
}

impl OpenApiDocument {
    /// Start an empty document whose only server is `base_url`.
    pub fn new(version: OpenApiVersion, info: Info, base_url: &str) -> Self {
        Self {
            openapi: version.document_version().to_string(),
            info,
            servers: vec![Server {
                url: base_url.to_string(),
            }],
            paths: BTreeMap::new(),
            components: Components::default(),
            security: Vec::new(),
        }
    }

    /// Register a named schema. Names are unique within a document; a second
    /// registration under the same name is rejected instead of replacing the
    /// first.
    pub fn add_schema(&mut self, name: &str, schema: Value) -> ApiResult<()> {
        if self.components.schemas.contains_key(name) {
            return Err(ApiError::configuration(format!(
                "schema '{name}' is already registered"
            )));
        }
        self.components.schemas.insert(name.to_string(), schema);
        Ok(())
    }

    pub fn schema(&self, name: &str) -> Option<&Value> {
        self.components.schemas.get(name)
    }

    /// Insert a path item. An existing item under the same template is
    /// replaced wholesale and returned.
    pub fn insert_path(&mut self, template: impl Into<String>, item: PathItem) -> Option<PathItem> {
        let template = template.into();
        let previous = self.paths.insert(template.clone(), item);
        if previous.is_some() {
            tracing::debug!(path = %template, "path item overwritten");
        }
        previous
    }

    pub fn path(&self, template: &str) -> Option<&PathItem> {
        self.paths.get(template)
    }

    /// Number of operations across all paths.
    pub fn operation_count(&self) -> usize {
        self.paths.values().map(|item| item.operations.len()).sum()
    }

    pub fn to_json(&self) -> ApiResult<Value> {
        serde_json::to_value(self)
            .map_err(|err| ApiError::configuration(format!("serializing document: {err}")))
    }
}
