//! Path items for the static endpoints and for each configured collection.
//!
//! Which feature operations appear is decided only by the collection's
//! storage flags; tiles are always read-only.

use crate::config::{CollectionDescriptor, FeaturesCapability};
use crate::openapi::catalog::{
    COLLECTION_SCHEMA, LINK_SCHEMA, PROBLEM_DETAILS_SCHEMA, SchemaCatalog, TILESET_SCHEMA,
};
use crate::openapi::document::{Method, OpenApiDocument, Operation, Parameter, PathItem, schema_ref};
use serde_json::{Value, json};

pub const JSON: &str = "application/json";
pub const GEO_JSON: &str = "application/geo+json";
pub const MVT: &str = "application/vnd.mapbox-vector-tile";

const CAPABILITIES_TAG: &str = "Capabilities";

/// Template for a collection-scoped path, e.g. `collection_path("roads", "/items")`.
pub fn collection_path(id: &str, suffix: &str) -> String {
    format!("/collections/{id}{suffix}")
}

/// Add the landing page, conformance and collection list paths.
pub fn compose_static_paths(doc: &mut OpenApiDocument) {
    let links = json!({"type": "array", "items": schema_ref(LINK_SCHEMA)});

    doc.insert_path(
        "/",
        PathItem::new().with(
            Method::Get,
            Operation::new()
                .tag(CAPABILITIES_TAG)
                .description(
                    "The landing page provides links to the API definition, the conformance \
                     statements and to the feature collections in this dataset.",
                )
                .respond_with(
                    "200",
                    "Success",
                    JSON,
                    json!({
                        "type": "object",
                        "required": ["links"],
                        "properties": {
                            "title": {"type": "string"},
                            "description": {"type": "string"},
                            "links": links
                        }
                    }),
                ),
        ),
    );

    doc.insert_path(
        "/conformance",
        PathItem::new().with(
            Method::Get,
            Operation::new()
                .tag(CAPABILITIES_TAG)
                .description("Information about specifications that this API conforms to")
                .respond_with(
                    "200",
                    "Success",
                    JSON,
                    json!({
                        "type": "object",
                        "required": ["conformsTo"],
                        "properties": {
                            "conformsTo": {"type": "array", "items": {"type": "string"}}
                        }
                    }),
                ),
        ),
    );

    doc.insert_path(
        "/collections",
        PathItem::new().with(
            Method::Get,
            Operation::new()
                .tag(CAPABILITIES_TAG)
                .description("The feature collections in the dataset")
                .respond_with(
                    "200",
                    "Success",
                    JSON,
                    json!({
                        "type": "object",
                        "required": ["links", "collections"],
                        "properties": {
                            "links": links,
                            "collections": {"type": "array", "items": schema_ref(COLLECTION_SCHEMA)}
                        }
                    }),
                ),
        ),
    );
}

/// Per-collection path builder.
pub struct OperationComposer<'a> {
    catalog: SchemaCatalog,
    collection: &'a CollectionDescriptor,
}

impl<'a> OperationComposer<'a> {
    pub fn new(catalog: SchemaCatalog, collection: &'a CollectionDescriptor) -> Self {
        Self {
            catalog,
            collection,
        }
    }

    /// Add every path this collection exposes.
    pub fn compose(&self, doc: &mut OpenApiDocument) {
        let id = self.collection.id.as_str();
        doc.insert_path(collection_path(id, ""), self.metadata_item());

        if let Some(features) = &self.collection.features {
            doc.insert_path(collection_path(id, "/items"), self.items_item(features));
            doc.insert_path(
                collection_path(id, "/items/{featureId}"),
                self.feature_item(features),
            );
        }

        if self.collection.tiles.is_some() {
            doc.insert_path(collection_path(id, "/tiles"), self.tilesets_item());
            doc.insert_path(
                collection_path(id, "/tiles/{tileMatrix}/{tileRow}/{tileCol}"),
                self.tile_item(),
            );
        }
    }

    fn operation(&self) -> Operation {
        Operation::new().tag(self.collection.title.clone())
    }

    fn metadata_item(&self) -> PathItem {
        let mut op = self.operation().summary("Feature collection metadata");
        if let Some(description) = &self.collection.description {
            op = op.description(description.clone());
        }
        PathItem::new().with(
            Method::Get,
            op.respond_with("200", "Success", JSON, schema_ref(COLLECTION_SCHEMA))
                .respond_with("404", "Not Found", JSON, problem()),
        )
    }

    fn items_item(&self, features: &FeaturesCapability) -> PathItem {
        let storage = &features.storage;
        let feature = self.catalog.feature(Some(storage));

        let fetch = items_query_parameters()
            .into_iter()
            .fold(
                self.operation()
                    .summary("Fetch features")
                    .description("Fetch features of the feature collection"),
                Operation::parameter,
            )
            .respond_with(
                "200",
                "Success",
                GEO_JSON,
                self.catalog.feature_collection(feature.clone()),
            )
            .respond_with("400", "Bad Request", JSON, problem())
            .respond_with("404", "Not Found", JSON, problem());

        let mut item = PathItem::new().with(Method::Get, fetch);
        if storage.allow_create {
            let create = self
                .operation()
                .summary("Create feature")
                .description("Add a new feature to the collection")
                .parameter(crs_parameter(
                    "The coordinates of all geometry-valued properties in the request document \
                     will be converted from the requested CRS",
                ))
                .request_body(GEO_JSON, feature);
            item = item.with(Method::Post, write_responses(create, "201", "Created"));
        }
        item
    }

    fn feature_item(&self, features: &FeaturesCapability) -> PathItem {
        let storage = &features.storage;
        let feature = self.catalog.feature(Some(storage));
        let request_crs = || {
            crs_parameter(
                "The coordinates of all geometry-valued properties in the request document \
                 will be converted from the requested CRS",
            )
        };

        let fetch = self
            .operation()
            .summary("Fetch feature")
            .description("Fetch the feature with id featureId in the feature collection")
            .parameter(feature_id("Identifier of a feature"))
            .parameter(crs_parameter(
                "The coordinates of all geometry-valued properties in the response document \
                 will be presented in the requested CRS",
            ))
            .respond_with("200", "Success", GEO_JSON, feature.clone())
            .respond_with("400", "Bad Request", JSON, problem())
            .respond_with("404", "Not Found", JSON, problem());

        let mut item = PathItem::new().with(Method::Get, fetch);

        if storage.allow_replace {
            let replace = self
                .operation()
                .summary("Replace feature")
                .description("Replace an existing resource")
                .parameter(feature_id("Identifier of a feature to replace"))
                .parameter(request_crs())
                .request_body(GEO_JSON, feature.clone());
            item = item.with(Method::Put, write_responses(replace, "200", "Success"));
        }

        if storage.allow_delete {
            let delete = self
                .operation()
                .summary("Delete feature")
                .description("Remove a resource from a collection")
                .parameter(feature_id("Identifier of a feature to delete"));
            item = item.with(Method::Delete, write_responses(delete, "200", "Success"));
        }

        if storage.allow_update {
            let update = self
                .operation()
                .summary("Update feature")
                .description("Modify an existing resource")
                .parameter(feature_id("Identifier of a feature to update"))
                .parameter(request_crs())
                .request_body(GEO_JSON, feature);
            item = item.with(Method::Patch, write_responses(update, "200", "Success"));
        }

        item
    }

    fn tilesets_item(&self) -> PathItem {
        PathItem::new().with(
            Method::Get,
            self.operation()
                .summary("Provides a list of available tilesets for a resource")
                .respond_with(
                    "200",
                    "Success",
                    JSON,
                    json!({"type": "array", "items": schema_ref(TILESET_SCHEMA)}),
                )
                .respond_with("404", "Not Found", JSON, problem()),
        )
    }

    fn tile_item(&self) -> PathItem {
        PathItem::new().with(
            Method::Get,
            self.operation()
                .summary("Retrieve the vector tile for the specified tile matrix, row, and column")
                .parameter(
                    Parameter::path("tileMatrix", int32()).described(
                        "Identifier of the tile matrix (representing a zoom level, a.k.a. a \
                         scale) listed in the TileMatrixSet definition",
                    ),
                )
                .parameter(Parameter::path("tileRow", int32()).described(
                    "A non-negative integer between 0 and the MatrixHeight - 1. If there is a \
                     TileMatrixSetLimits the value is limited between MinTileRow and MaxTileRow",
                ))
                .parameter(Parameter::path("tileCol", int32()).described(
                    "A non-negative integer between 0 and the MatrixWidth - 1. If there is a \
                     TileMatrixSetLimits the value is limited between MinTileCol and MaxTileCol",
                ))
                .respond_with(
                    "200",
                    "Success",
                    MVT,
                    json!({"type": "string", "format": "binary"}),
                )
                .respond_with("404", "Not Found", JSON, problem()),
        )
    }
}

/// Schema of every failure body.
pub fn problem() -> Value {
    schema_ref(PROBLEM_DETAILS_SCHEMA)
}

/// Failure responses shared by every write operation.
pub fn write_responses(op: Operation, success: &str, description: &str) -> Operation {
    op.respond(success, description)
        .respond_with("400", "Bad Request", JSON, problem())
        .respond_with("401", "Unauthorized", JSON, problem())
        .respond_with("404", "Not Found", JSON, problem())
}

fn int32() -> Value {
    json!({"type": "integer", "format": "int32"})
}

fn feature_id(description: &str) -> Parameter {
    Parameter::path("featureId", json!({"type": "string"})).described(description)
}

fn crs_parameter(description: &str) -> Parameter {
    Parameter::query("crs", json!({"type": "string", "format": "uri"})).described(description)
}

fn items_query_parameters() -> Vec<Parameter> {
    vec![
        Parameter::query(
            "limit",
            json!({
                "type": "integer",
                "format": "int32",
                "minimum": 1,
                "maximum": 10000,
                "default": 10
            }),
        )
        .described(
            "The optional limit parameter limits the number of items that are presented in \
             the response document",
        ),
        Parameter::query(
            "offset",
            json!({"type": "integer", "format": "int32", "minimum": 0, "default": 0}),
        )
        .described(
            "The optional offset parameter indicates the index within the result set from \
             which the server shall begin presenting results in the response document",
        ),
        Parameter::query(
            "bbox",
            json!({
                "type": "array",
                "minItems": 4,
                "maxItems": 6,
                "items": {"type": "number"}
            }),
        )
        .described(
            "Only features that have a geometry that intersects the bounding box are selected",
        ),
        Parameter::query("bbox-crs", json!({"type": "string", "format": "uri"}))
            .described("The coordinate reference system of the bbox parameter"),
        Parameter::query("datetime", json!({"type": "string"})).described(
            "Either a date-time or an interval. Only features that have a temporal property \
             that intersects the value of datetime are selected",
        ),
        Parameter::query("crs", json!({"type": "string", "format": "uri"})).described(
            "The coordinates of all geometry-valued properties in the response document \
             will be presented in the requested CRS",
        ),
    ]
}
