use crate::error::{ApiError, ApiResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stylesheet encodings the storage knows how to name and serve.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StylesheetFormat {
    Mapbox,
    Sld10,
    Sld11,
}

impl StylesheetFormat {
    pub const ALL: [StylesheetFormat; 3] = [
        StylesheetFormat::Mapbox,
        StylesheetFormat::Sld10,
        StylesheetFormat::Sld11,
    ];

    /// Parse the `f` value used in requests and file names.
    pub fn parse(raw: &str) -> ApiResult<Self> {
        Self::ALL
            .into_iter()
            .find(|format| format.as_str() == raw)
            .ok_or_else(|| ApiError::not_found(format!("stylesheet format '{raw}'")))
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StylesheetFormat::Mapbox => "mapbox",
            StylesheetFormat::Sld10 => "sld10",
            StylesheetFormat::Sld11 => "sld11",
        }
    }

    /// File extension, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            StylesheetFormat::Mapbox => "json",
            StylesheetFormat::Sld10 | StylesheetFormat::Sld11 => "xml",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            StylesheetFormat::Mapbox => "application/vnd.mapbox.style+json",
            StylesheetFormat::Sld10 | StylesheetFormat::Sld11 => "application/vnd.ogc.sld+xml",
        }
    }
}

impl fmt::Display for StylesheetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
