use crate::styles::format::StylesheetFormat;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub href: String,
    pub rel: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// One style of a base resource with a link per stored stylesheet.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OgcStyle {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub links: Vec<Link>,
    /// Derived from the files present; never stored.
    #[serde(skip)]
    pub formats: Vec<StylesheetFormat>,
}

impl OgcStyle {
    /// Build the descriptor with one `stylesheet` link per format, relative to
    /// `base_url`.
    pub fn new(
        base_resource: &str,
        id: &str,
        title: Option<String>,
        formats: Vec<StylesheetFormat>,
        base_url: &str,
    ) -> Self {
        let links = formats
            .iter()
            .map(|format| Link {
                href: stylesheet_href(base_url, base_resource, id, *format),
                rel: "stylesheet".to_string(),
                media_type: Some(format.content_type().to_string()),
                title: None,
            })
            .collect();
        Self {
            id: id.to_string(),
            title,
            links,
            formats,
        }
    }
}

/// `{base}collections/{r}/styles/{id}?f={format}`; a missing trailing slash on
/// `base_url` is supplied.
pub fn stylesheet_href(
    base_url: &str,
    base_resource: &str,
    style_id: &str,
    format: StylesheetFormat,
) -> String {
    let separator = if base_url.is_empty() || base_url.ends_with('/') {
        ""
    } else {
        "/"
    };
    format!("{base_url}{separator}collections/{base_resource}/styles/{style_id}?f={format}")
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OgcStyles {
    pub default: Option<String>,
    #[serde(default)]
    pub styles: Vec<OgcStyle>,
}

/// Stored default-style record of a base resource.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

impl DefaultStyle {
    pub fn new(style_id: impl Into<String>) -> Self {
        Self {
            default: Some(style_id.into()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StylesheetAddParameters {
    pub style_id: String,
    pub format: String,
    pub content: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleMetadata {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub point_of_contact: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl StyleMetadata {
    /// Record for a freshly added style: both timestamps set to `now`.
    pub fn created_at(style_id: &str, now: DateTime<Utc>) -> Self {
        Self {
            id: style_id.to_string(),
            created: Some(now),
            updated: Some(now),
            ..Self::default()
        }
    }
}
