//! Styles endpoints for collections that enable them.

use crate::config::ApiOptions;
use crate::error::ApiResult;
use crate::openapi::catalog::LINK_SCHEMA;
use crate::openapi::operations::{JSON, collection_path, problem};
use crate::openapi::{
    Method, OpenApiDocument, OpenApiExtension, Operation, Parameter, PathItem, schema_ref,
};
use serde_json::{Value, json};

pub const STYLE_SCHEMA: &str = "OgcStyleSchema";
pub const STYLES_SCHEMA: &str = "OgcStylesSchema";
pub const STYLE_METADATA_SCHEMA: &str = "OgcStyleMetadataSchema";
pub const STYLESHEET_ADD_SCHEMA: &str = "StylesheetAddParametersSchema";
pub const DEFAULT_STYLE_SCHEMA: &str = "DefaultStyleSchema";

const MERGE_PATCH: &str = "application/merge-patch+json";

#[derive(Clone, Copy, Debug, Default)]
pub struct StylesOpenApiExtension;

impl OpenApiExtension for StylesOpenApiExtension {
    fn name(&self) -> &str {
        "styles"
    }

    fn apply(&self, doc: &mut OpenApiDocument, options: &ApiOptions) -> ApiResult<()> {
        let collections: Vec<_> = options.collections.iter().filter(|c| c.styles).collect();
        if collections.is_empty() {
            return Ok(());
        }

        doc.add_schema(STYLE_SCHEMA, style_schema())?;
        doc.add_schema(STYLES_SCHEMA, styles_schema())?;
        doc.add_schema(STYLE_METADATA_SCHEMA, metadata_schema())?;
        doc.add_schema(STYLESHEET_ADD_SCHEMA, add_parameters_schema())?;
        doc.add_schema(DEFAULT_STYLE_SCHEMA, default_style_schema())?;

        for collection in collections {
            let id = collection.id.as_str();
            let tag = collection.title.as_str();
            doc.insert_path(collection_path(id, "/styles"), styles_item(tag));
            doc.insert_path(collection_path(id, "/styles/{styleId}"), style_item(tag));
            doc.insert_path(
                collection_path(id, "/styles/{styleId}/metadata"),
                metadata_item(tag),
            );
        }
        Ok(())
    }
}

fn style_id() -> Parameter {
    Parameter::path("styleId", json!({"type": "string"})).described("Style identifier")
}

fn write_failures(op: Operation) -> Operation {
    op.respond_with("401", "Unauthorized", JSON, problem())
        .respond("500", "Internal server error")
}

fn styles_item(tag: &str) -> PathItem {
    let list = Operation::new()
        .tag(tag)
        .summary("Gets a list of available styles for the collection")
        .description("Returns styles for the collection")
        .respond_with("200", "Success", JSON, schema_ref(STYLES_SCHEMA))
        .respond("500", "Internal server error");

    let add = Operation::new()
        .tag(tag)
        .summary("Adds new stylesheet for the collection")
        .description("Adds a new style to the styles storage if style does not exist.")
        .request_body(JSON, schema_ref(STYLESHEET_ADD_SCHEMA))
        .respond("201", "Created")
        .respond("409", "Stylesheet already exists");

    let set_default = Operation::new()
        .tag(tag)
        .summary("Updates default style of the collection")
        .request_body(MERGE_PATCH, schema_ref(DEFAULT_STYLE_SCHEMA))
        .respond("200", "Success")
        .respond("404", "Style not found");

    PathItem::new()
        .with(Method::Get, list)
        .with(Method::Post, write_failures(add))
        .with(Method::Patch, write_failures(set_default))
}

fn style_item(tag: &str) -> PathItem {
    let get = Operation::new()
        .tag(tag)
        .summary("Gets a style by its identifier")
        .description("Returns style info or a stylesheet if format provided")
        .parameter(style_id())
        .parameter(
            Parameter::query("f", json!({"type": "string", "enum": ["mapbox", "sld10", "sld11"]}))
                .described("Stylesheet format (e.g. mapbox, sld10, sld11)"),
        )
        .respond_with("200", "Success", JSON, schema_ref(STYLE_SCHEMA))
        .respond("404", "Not found")
        .respond("500", "Internal server error");

    let replace = Operation::new()
        .tag(tag)
        .summary("Replaces existing stylesheet")
        .parameter(style_id())
        .request_body(JSON, schema_ref(STYLESHEET_ADD_SCHEMA))
        .respond("200", "Success")
        .respond("404", "Style not found");

    let delete = Operation::new()
        .tag(tag)
        .summary("Deletes existing style")
        .parameter(style_id())
        .respond("200", "Success")
        .respond("404", "Style not found");

    PathItem::new()
        .with(Method::Get, get)
        .with(Method::Put, write_failures(replace))
        .with(Method::Delete, write_failures(delete))
}

fn metadata_item(tag: &str) -> PathItem {
    let get = Operation::new()
        .tag(tag)
        .summary("Gets a metadata of the style")
        .parameter(style_id())
        .respond_with("200", "Success", JSON, schema_ref(STYLE_METADATA_SCHEMA))
        .respond("404", "Style not found");

    let replace = Operation::new()
        .tag(tag)
        .summary("Replaces existing metadata of the style with new metadata instance")
        .parameter(style_id())
        .request_body(JSON, schema_ref(STYLE_METADATA_SCHEMA))
        .respond("200", "Success");

    let update = Operation::new()
        .tag(tag)
        .summary("Updates existing metadata")
        .description("The stored record is replaced by the submitted one")
        .parameter(style_id())
        .request_body(MERGE_PATCH, schema_ref(STYLE_METADATA_SCHEMA))
        .respond("200", "Success")
        .respond("404", "Style not found");

    PathItem::new()
        .with(Method::Get, get)
        .with(Method::Put, write_failures(replace))
        .with(Method::Patch, write_failures(update))
}

fn described(kind: &str, description: &str) -> Value {
    json!({"type": kind, "description": description})
}

fn style_schema() -> Value {
    json!({
        "type": "object",
        "required": ["id"],
        "properties": {
            "id": described("string", "Style identifier"),
            "title": described("string", "Style title"),
            "links": {"type": "array", "items": schema_ref(LINK_SCHEMA)}
        }
    })
}

fn styles_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "default": described("string", "Default style identifier"),
            "styles": {
                "type": "array",
                "description": "Styles list",
                "items": schema_ref(STYLE_SCHEMA)
            }
        }
    })
}

fn metadata_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "id": described("string", "Style identifier"),
            "title": described("string", "Title"),
            "description": described("string", "Description"),
            "keywords": {
                "type": "array",
                "description": "Keywords",
                "items": {"type": "string"}
            },
            "pointOfContact": described("string", "Point of Contact"),
            "license": described("string", "License"),
            "created": {"type": "string", "format": "date-time", "description": "Created"},
            "updated": {"type": "string", "format": "date-time", "description": "Updated"},
            "scope": described("string", "Scope"),
            "version": described("string", "Version")
        }
    })
}

fn add_parameters_schema() -> Value {
    json!({
        "type": "object",
        "description": "Parameters used to add new style for the collection",
        "required": ["styleId", "format", "content"],
        "properties": {
            "styleId": described("string", "Style identifier"),
            "format": described("string", "Stylesheet format"),
            "content": described("string", "Stylesheet content")
        }
    })
}

fn default_style_schema() -> Value {
    json!({
        "type": "object",
        "description": "Parameter used to update or retrieve default style for the collection",
        "properties": {
            "default": described("string", "Default style identifier")
        }
    })
}
