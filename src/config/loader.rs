//! Loading and validating the options file.
//!
//! Validation happens in two passes: the raw JSON is checked against the
//! embedded options schema, then the deserialized snapshot is checked for
//! invariants the schema cannot express (unique ids, a supported version).

use crate::config::identity::OpenApiVersion;
use crate::config::model::ApiOptions;
use anyhow::{Context, Result, anyhow, bail};
use jsonschema::JSONSchema;
use serde_json::Value;
use std::collections::BTreeSet;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Environment variable naming the default options file for the binaries.
pub const CONFIG_ENV: &str = "OGCAPI_CONFIG";

const OPTIONS_SCHEMA: &str = include_str!("../../schema/ogcapi_options.schema.json");

impl ApiOptions {
    /// Read, schema-check and validate an options file.
    pub fn load(path: &Path) -> Result<Self> {
        let file =
            File::open(path).with_context(|| format!("opening options {}", path.display()))?;
        let value: Value = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("parsing options {}", path.display()))?;
        let options = Self::from_value(value)
            .with_context(|| format!("loading options {}", path.display()))?;
        tracing::debug!(
            path = %path.display(),
            collections = options.collections.len(),
            "options loaded"
        );
        Ok(options)
    }

    /// Build a snapshot from an in-memory JSON document.
    pub fn from_value(value: Value) -> Result<Self> {
        validate_against_schema(&value)?;
        let options: ApiOptions =
            serde_json::from_value(value).context("deserializing options")?;
        options.validate()?;
        Ok(options)
    }

    /// Check the invariants the options schema cannot express.
    pub fn validate(&self) -> Result<()> {
        OpenApiVersion::parse(&self.open_api_version)?;

        let mut seen = BTreeSet::new();
        for collection in &self.collections {
            if !collection.id.is_well_formed() {
                bail!(
                    "collection id '{}' must match ^[A-Za-z0-9_.-]+$",
                    collection.id
                );
            }
            if !seen.insert(collection.id.as_str()) {
                bail!("duplicate collection id '{}'", collection.id);
            }
        }
        Ok(())
    }

    /// The parsed document version. `validate` has already accepted it for
    /// loaded snapshots; hand-built ones are checked here.
    pub fn openapi_version(&self) -> crate::ApiResult<OpenApiVersion> {
        OpenApiVersion::parse(&self.open_api_version)
    }
}

fn validate_against_schema(value: &Value) -> Result<()> {
    let schema: Value =
        serde_json::from_str(OPTIONS_SCHEMA).context("parsing embedded options schema")?;
    let compiled = JSONSchema::compile(&schema)
        .map_err(|err| anyhow!("compiling embedded options schema: {err}"))?;

    if let Err(errors) = compiled.validate(value) {
        let details = errors
            .map(|err| err.to_string())
            .collect::<Vec<_>>()
            .join("\n");
        bail!("options failed schema validation:\n{details}");
    }
    Ok(())
}
