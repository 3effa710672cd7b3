//! GeoJSON geometry schema fragments.
//!
//! Maps a declared geometry type name to the schema its features must match.
//! Unknown or absent names yield no constraint at all.

use serde_json::{Value, json};

/// Geometry type names with a dedicated schema.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum GeometryKind {
    Point,
    LineString,
    Polygon,
    MultiPoint,
    MultiLineString,
    MultiPolygon,
}

impl GeometryKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Point" => Some(GeometryKind::Point),
            "LineString" => Some(GeometryKind::LineString),
            "Polygon" => Some(GeometryKind::Polygon),
            "MultiPoint" => Some(GeometryKind::MultiPoint),
            "MultiLineString" => Some(GeometryKind::MultiLineString),
            "MultiPolygon" => Some(GeometryKind::MultiPolygon),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            GeometryKind::Point => "Point",
            GeometryKind::LineString => "LineString",
            GeometryKind::Polygon => "Polygon",
            GeometryKind::MultiPoint => "MultiPoint",
            GeometryKind::MultiLineString => "MultiLineString",
            GeometryKind::MultiPolygon => "MultiPolygon",
        }
    }

    /// The singular kind a multi kind aggregates.
    pub fn singular(self) -> Self {
        match self {
            GeometryKind::MultiPoint => GeometryKind::Point,
            GeometryKind::MultiLineString => GeometryKind::LineString,
            GeometryKind::MultiPolygon => GeometryKind::Polygon,
            other => other,
        }
    }

    pub fn is_multi(self) -> bool {
        self.singular() != self
    }

    /// Schema for the `coordinates` member.
    fn coordinates(self) -> Value {
        match self {
            GeometryKind::Point => position(),
            GeometryKind::LineString => line_coordinates(),
            GeometryKind::Polygon => polygon_coordinates(),
            GeometryKind::MultiPoint => array_of(position()),
            GeometryKind::MultiLineString => array_of(line_coordinates()),
            GeometryKind::MultiPolygon => array_of(polygon_coordinates()),
        }
    }

    fn object_schema(self) -> Value {
        json!({
            "type": "object",
            "required": ["type", "coordinates"],
            "properties": {
                "type": {"type": "string", "enum": [self.name()]},
                "coordinates": self.coordinates()
            }
        })
    }

    /// Full geometry schema. Multi kinds accept either the singular geometry
    /// or the multi geometry.
    pub fn schema(self) -> Value {
        if self.is_multi() {
            json!({ "anyOf": [self.singular().object_schema(), self.object_schema()] })
        } else {
            self.object_schema()
        }
    }
}

/// Resolve the geometry schema for a declared type name.
///
/// `None` means the geometry is unconstrained.
pub fn geometry_schema(type_name: Option<&str>) -> Option<Value> {
    let kind = type_name.and_then(GeometryKind::from_name);
    if let (None, Some(name)) = (kind, type_name) {
        tracing::debug!(
            geometry_type = name,
            "unrecognised geometry type, geometry left free-form"
        );
    }
    kind.map(GeometryKind::schema)
}

fn position() -> Value {
    json!({"type": "array", "minItems": 2, "items": {"type": "number"}})
}

fn line_coordinates() -> Value {
    json!({"type": "array", "minItems": 2, "items": position()})
}

fn polygon_coordinates() -> Value {
    // Rings are closed, so the first position repeats as the fourth or later.
    json!({
        "type": "array",
        "items": {"type": "array", "minItems": 4, "items": position()}
    })
}

fn array_of(items: Value) -> Value {
    json!({"type": "array", "items": items})
}
