//! Schema, queryables and sortables endpoints for feature collections.

use crate::config::ApiOptions;
use crate::error::ApiResult;
use crate::openapi::operations::{JSON, collection_path, problem};
use crate::openapi::{Method, OpenApiDocument, OpenApiExtension, Operation, PathItem, schema_ref};
use serde_json::{Value, json};

pub const JSON_SCHEMA_SCHEMA: &str = "OgcJsonSchema";

const ENDPOINTS: [(&str, &str); 3] = [
    ("/schema", "Returns the schema of the features in the collection"),
    ("/queryables", "Returns the properties that can be used in filter expressions"),
    ("/sortables", "Returns the properties that can be used to sort the items"),
];

#[derive(Clone, Copy, Debug, Default)]
pub struct SchemasOpenApiExtension;

impl OpenApiExtension for SchemasOpenApiExtension {
    fn name(&self) -> &str {
        "schemas"
    }

    fn apply(&self, doc: &mut OpenApiDocument, options: &ApiOptions) -> ApiResult<()> {
        let collections: Vec<_> = options
            .collections
            .iter()
            .filter(|c| c.features.is_some())
            .collect();
        if collections.is_empty() {
            return Ok(());
        }

        doc.add_schema(JSON_SCHEMA_SCHEMA, json_schema())?;
        for collection in collections {
            for (suffix, summary) in ENDPOINTS {
                let get = Operation::new()
                    .tag(collection.title.clone())
                    .summary(summary)
                    .respond_with("200", "Success", JSON, schema_ref(JSON_SCHEMA_SCHEMA))
                    .respond_with("404", "Not Found", JSON, problem());
                doc.insert_path(
                    collection_path(collection.id.as_str(), suffix),
                    PathItem::new().with(Method::Get, get),
                );
            }
        }
        Ok(())
    }
}

fn json_schema() -> Value {
    json!({
        "type": "object",
        "required": ["$schema", "$id", "type"],
        "properties": {
            "$schema": {"type": "string", "format": "uri"},
            "$id": {"type": "string", "format": "uri"},
            "type": {"type": "string", "enum": ["object"]},
            "title": {"type": "string"},
            "description": {"type": "string"},
            "additionalProperties": {"type": "boolean"},
            "properties": {
                "type": "object",
                "additionalProperties": {"type": "object"}
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CollectionDescriptor, CollectionId, FeaturesCapability, OpenApiVersion};
    use crate::openapi::document::Info;

    #[test]
    fn feature_collections_get_three_read_only_paths() {
        let options = ApiOptions {
            collections: vec![
                CollectionDescriptor {
                    id: CollectionId::from("roads"),
                    title: "Roads".to_string(),
                    description: None,
                    features: Some(FeaturesCapability::default()),
                    tiles: None,
                    styles: false,
                },
                CollectionDescriptor {
                    id: CollectionId::from("basemap"),
                    title: "Basemap".to_string(),
                    description: None,
                    features: None,
                    tiles: None,
                    styles: true,
                },
            ],
            ..ApiOptions::default()
        };
        let mut doc = OpenApiDocument::new(OpenApiVersion::V3_1, Info::default(), "/");
        SchemasOpenApiExtension.apply(&mut doc, &options).unwrap();

        for suffix in ["/schema", "/queryables", "/sortables"] {
            let item = doc.path(&format!("/collections/roads{suffix}")).unwrap();
            assert_eq!(item.methods().collect::<Vec<_>>(), vec![Method::Get]);
            assert!(doc.path(&format!("/collections/basemap{suffix}")).is_none());
        }
        assert_eq!(doc.paths.len(), 3);
        assert!(doc.schema(JSON_SCHEMA_SCHEMA).is_some());
    }
}
