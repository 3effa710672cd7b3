//! Document-level API-key requirement.

use crate::openapi::document::{OpenApiDocument, ParameterLocation, SecurityScheme};
use std::collections::BTreeMap;

/// Name of the security scheme component.
pub const API_KEY_SCHEME: &str = "ApiKey";
/// Query parameter carrying the key.
pub const API_KEY_PARAMETER: &str = "apiKey";

/// Register the `ApiKey` scheme and require it for the whole document.
///
/// Applies to every operation alike; there is no per-operation opt-out.
pub fn apply_api_key(doc: &mut OpenApiDocument) {
    doc.components.security_schemes.insert(
        API_KEY_SCHEME.to_string(),
        SecurityScheme {
            kind: "apiKey".to_string(),
            name: API_KEY_PARAMETER.to_string(),
            location: ParameterLocation::Query,
            description: "API key".to_string(),
        },
    );
    let requirement = BTreeMap::from([(API_KEY_SCHEME.to_string(), Vec::new())]);
    if !doc.security.contains(&requirement) {
        doc.security.push(requirement);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OpenApiVersion;
    use crate::openapi::document::Info;
    use serde_json::json;

    #[test]
    fn adds_one_requirement_even_when_applied_twice() {
        let mut doc = OpenApiDocument::new(OpenApiVersion::V3_1, Info::default(), "/");
        apply_api_key(&mut doc);
        apply_api_key(&mut doc);
        let value = doc.to_json().unwrap();
        assert_eq!(value["security"], json!([{"ApiKey": []}]));
        assert_eq!(
            value["components"]["securitySchemes"]["ApiKey"],
            json!({"type": "apiKey", "name": "apiKey", "in": "query", "description": "API key"})
        );
    }
}
