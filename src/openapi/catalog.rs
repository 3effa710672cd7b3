//! Fixed named schemas shared by every document, plus the per-collection
//! feature payload schemas built on top of them.

use crate::config::{OpenApiVersion, StorageCapability};
use crate::error::ApiResult;
use crate::openapi::document::{OpenApiDocument, schema_ref};
use crate::openapi::geometry::geometry_schema;
use serde_json::{Map, Value, json};

pub const LINK_SCHEMA: &str = "Link";
pub const COLLECTION_SCHEMA: &str = "Collection";
pub const FEATURE_SCHEMA: &str = "Feature";
pub const PROBLEM_DETAILS_SCHEMA: &str = "ProblemDetails";
pub const TILESET_SCHEMA: &str = "Tileset";

/// Names registered by [`SchemaCatalog::register`], in registration order.
pub const CORE_SCHEMAS: [&str; 5] = [
    LINK_SCHEMA,
    COLLECTION_SCHEMA,
    FEATURE_SCHEMA,
    PROBLEM_DETAILS_SCHEMA,
    TILESET_SCHEMA,
];

const CRS84: &str = "http://www.opengis.net/def/crs/OGC/1.3/CRS84";

/// Builds schema fragments for one document version.
#[derive(Clone, Copy, Debug)]
pub struct SchemaCatalog {
    version: OpenApiVersion,
}

impl SchemaCatalog {
    pub fn new(version: OpenApiVersion) -> Self {
        Self { version }
    }

    /// Add the core schemas to `doc`.
    pub fn register(&self, doc: &mut OpenApiDocument) -> ApiResult<()> {
        doc.add_schema(LINK_SCHEMA, link())?;
        doc.add_schema(COLLECTION_SCHEMA, collection())?;
        doc.add_schema(FEATURE_SCHEMA, self.feature(None))?;
        doc.add_schema(PROBLEM_DETAILS_SCHEMA, self.problem_details())?;
        doc.add_schema(TILESET_SCHEMA, tileset())?;
        Ok(())
    }

    /// A scalar type that also admits `null`, spelled the way the target
    /// version expects.
    pub fn nullable(&self, kind: &str) -> Value {
        match self.version {
            OpenApiVersion::V3_0 => json!({"type": kind, "nullable": true}),
            OpenApiVersion::V3_1 | OpenApiVersion::V3_2 => json!({"type": [kind, "null"]}),
        }
    }

    /// GeoJSON feature schema for a collection. Declared property names are
    /// listed but left untyped.
    pub fn feature(&self, storage: Option<&StorageCapability>) -> Value {
        let geometry = geometry_schema(storage.and_then(|s| s.geometry_geo_json_type.as_deref()))
            .unwrap_or_else(|| json!({}));

        let mut properties = self.nullable("object");
        if let Some(storage) = storage.filter(|s| !s.properties.is_empty()) {
            let declared: Map<String, Value> = storage
                .properties
                .iter()
                .map(|name| (name.clone(), json!({})))
                .collect();
            properties["properties"] = Value::Object(declared);
        }

        json!({
            "type": "object",
            "required": ["type", "geometry", "properties"],
            "properties": {
                "type": {"type": "string", "enum": ["Feature"]},
                "geometry": geometry,
                "properties": properties,
                "id": {"oneOf": [{"type": "string"}, {"type": "integer"}]},
                "links": {"type": "array", "items": schema_ref(LINK_SCHEMA)}
            }
        })
    }

    /// Items response wrapping `feature`.
    pub fn feature_collection(&self, feature: Value) -> Value {
        json!({
            "type": "object",
            "required": ["type", "features"],
            "properties": {
                "type": {"type": "string", "enum": ["FeatureCollection"]},
                "features": {"type": "array", "items": feature},
                "links": {"type": "array", "items": schema_ref(LINK_SCHEMA)},
                "timeStamp": {"type": "string", "format": "date-time"},
                "numberMatched": {"type": "integer", "minimum": 0},
                "numberReturned": {"type": "integer", "minimum": 0}
            }
        })
    }

    fn problem_details(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "type": self.nullable("string"),
                "title": self.nullable("string"),
                "status": self.nullable("integer"),
                "detail": self.nullable("string"),
                "instance": self.nullable("string")
            }
        })
    }
}

fn link() -> Value {
    json!({
        "type": "object",
        "required": ["href", "rel"],
        "properties": {
            "href": {"type": "string"},
            "rel": {"type": "string"},
            "type": {"type": "string"},
            "hreflang": {"type": "string"},
            "title": {"type": "string"},
            "length": {"type": "integer"}
        }
    })
}

fn collection() -> Value {
    json!({
        "type": "object",
        "required": ["id", "links"],
        "properties": {
            "id": {
                "type": "string",
                "description": "An identifier of the collection used, for example, in URIs"
            },
            "title": {
                "type": "string",
                "description": "A human-readable title of the collection"
            },
            "description": {
                "type": "string",
                "description": "A description of the features in the collection"
            },
            "links": {"type": "array", "items": schema_ref(LINK_SCHEMA)},
            "extent": {
                "type": "object",
                "description": "The extent of the features in the collection",
                "properties": {
                    "spatial": {
                        "type": "object",
                        "properties": {
                            "bbox": {
                                "type": "array",
                                "minItems": 1,
                                "items": {
                                    "type": "array",
                                    "minItems": 4,
                                    "maxItems": 6,
                                    "items": {"type": "number"}
                                }
                            },
                            "crs": {"type": "string", "default": CRS84}
                        }
                    },
                    "temporal": {
                        "type": "object",
                        "properties": {
                            "interval": {
                                "type": "array",
                                "minItems": 1,
                                "items": {
                                    "type": "array",
                                    "minItems": 2,
                                    "maxItems": 2,
                                    "items": {"type": "string", "format": "date-time"}
                                }
                            },
                            "trs": {
                                "type": "string",
                                "default": "http://www.opengis.net/def/uom/ISO-8601/0/Gregorian"
                            }
                        }
                    }
                }
            },
            "itemType": {"type": "string", "default": "feature"},
            "crs": {
                "type": "array",
                "items": {"type": "string"},
                "default": [CRS84]
            }
        }
    })
}

fn tileset() -> Value {
    let bound = json!({"type": "integer", "format": "int32"});
    json!({
        "type": "object",
        "required": ["tileMatrixSetURI", "crs", "dataType", "links", "tileMatrixSetLimits"],
        "properties": {
            "title": {"type": "string"},
            "tileMatrixSetURI": {"type": "string", "format": "uri"},
            "crs": {"type": "string", "format": "uri"},
            "dataType": {"type": "string", "enum": ["vector"]},
            "links": {"type": "array", "items": schema_ref(LINK_SCHEMA)},
            "tileMatrixSetLimits": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "tileMatrix": {"type": "string"},
                        "minTileRow": bound,
                        "maxTileRow": bound,
                        "minTileCol": bound,
                        "maxTileCol": bound
                    }
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::openapi::document::Info;
    use std::collections::BTreeSet;

    fn storage(geometry: Option<&str>, properties: &[&str]) -> StorageCapability {
        StorageCapability {
            geometry_geo_json_type: geometry.map(str::to_string),
            properties: properties.iter().map(|p| p.to_string()).collect::<BTreeSet<_>>(),
            ..StorageCapability::default()
        }
    }

    #[test]
    fn registers_each_core_schema_once() {
        let mut doc = OpenApiDocument::new(OpenApiVersion::V3_1, Info::default(), "/");
        let catalog = SchemaCatalog::new(OpenApiVersion::V3_1);
        catalog.register(&mut doc).unwrap();
        for name in CORE_SCHEMAS {
            assert!(doc.schema(name).is_some(), "{name} missing");
        }
        assert_eq!(doc.components.schemas.len(), CORE_SCHEMAS.len());
        assert!(catalog.register(&mut doc).is_err());
    }

    #[test]
    fn feature_schema_lists_declared_properties() {
        let catalog = SchemaCatalog::new(OpenApiVersion::V3_1);
        let schema = catalog.feature(Some(&storage(Some("Point"), &["name", "lanes"])));
        let props = &schema["properties"]["properties"];
        assert_eq!(props["type"], json!(["object", "null"]));
        assert_eq!(props["properties"], json!({"lanes": {}, "name": {}}));
        assert_eq!(
            schema["properties"]["geometry"]["properties"]["type"]["enum"],
            json!(["Point"])
        );
    }

    #[test]
    fn feature_schema_without_geometry_type_is_free_form() {
        let catalog = SchemaCatalog::new(OpenApiVersion::V3_0);
        let schema = catalog.feature(Some(&storage(None, &[])));
        assert_eq!(schema["properties"]["geometry"], json!({}));
        assert_eq!(
            schema["properties"]["properties"],
            json!({"type": "object", "nullable": true})
        );
    }

    #[test]
    fn feature_collection_wraps_feature() {
        let catalog = SchemaCatalog::new(OpenApiVersion::V3_1);
        let feature = catalog.feature(None);
        let collection = catalog.feature_collection(feature.clone());
        assert_eq!(collection["properties"]["features"]["items"], feature);
        assert_eq!(collection["required"], json!(["type", "features"]));
    }
}
