//! Pluggable contributors to the API description.
//!
//! Extensions run after the core paths and schemas are in place, in the order
//! they were registered. Path keys are not arbitrated: an extension that
//! writes an existing path replaces it.

use crate::config::ApiOptions;
use crate::error::ApiResult;
use crate::openapi::document::OpenApiDocument;

pub trait OpenApiExtension: Send + Sync {
    /// Short name used in log events.
    fn name(&self) -> &str;

    /// Append paths or schemas to `doc`. An error aborts document generation.
    fn apply(&self, doc: &mut OpenApiDocument, options: &ApiOptions) -> ApiResult<()>;
}

/// Extensions in registration order.
#[derive(Default)]
pub struct ExtensionPipeline {
    extensions: Vec<Box<dyn OpenApiExtension>>,
}

impl ExtensionPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, extension: impl OpenApiExtension + 'static) -> &mut Self {
        self.extensions.push(Box::new(extension));
        self
    }

    pub fn with(mut self, extension: impl OpenApiExtension + 'static) -> Self {
        self.register(extension);
        self
    }

    pub fn names(&self) -> Vec<&str> {
        self.extensions.iter().map(|ext| ext.name()).collect()
    }

    /// Run every extension against `doc`, stopping at the first failure.
    pub fn apply(&self, doc: &mut OpenApiDocument, options: &ApiOptions) -> ApiResult<()> {
        for extension in &self.extensions {
            let paths_before = doc.paths.len();
            extension.apply(doc, options).inspect_err(|err| {
                tracing::error!(extension = extension.name(), error = %err, "extension failed");
            })?;
            tracing::debug!(
                extension = extension.name(),
                added_paths = doc.paths.len().saturating_sub(paths_before),
                "extension applied"
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OpenApiVersion;
    use crate::error::ApiError;
    use crate::openapi::document::{Info, Method, Operation, PathItem};

    struct Writes(&'static str, &'static str);

    impl OpenApiExtension for Writes {
        fn name(&self) -> &str {
            self.0
        }

        fn apply(&self, doc: &mut OpenApiDocument, _: &ApiOptions) -> ApiResult<()> {
            doc.insert_path(
                self.1,
                PathItem::new().with(Method::Get, Operation::new().summary(self.0)),
            );
            Ok(())
        }
    }

    struct Fails;

    impl OpenApiExtension for Fails {
        fn name(&self) -> &str {
            "fails"
        }

        fn apply(&self, _: &mut OpenApiDocument, _: &ApiOptions) -> ApiResult<()> {
            Err(ApiError::configuration("broken extension"))
        }
    }

    fn doc() -> OpenApiDocument {
        OpenApiDocument::new(OpenApiVersion::V3_1, Info::default(), "/")
    }

    #[test]
    fn last_registered_writer_wins() {
        let pipeline = ExtensionPipeline::new()
            .with(Writes("first", "/shared"))
            .with(Writes("second", "/shared"));
        let mut doc = doc();
        pipeline.apply(&mut doc, &ApiOptions::default()).unwrap();
        assert_eq!(doc.paths.len(), 1);
        let op = doc.path("/shared").unwrap().get(Method::Get).unwrap();
        assert_eq!(op.summary.as_deref(), Some("second"));
        assert_eq!(pipeline.names(), vec!["first", "second"]);
    }

    #[test]
    fn failure_stops_later_extensions() {
        let pipeline = ExtensionPipeline::new()
            .with(Fails)
            .with(Writes("after", "/after"));
        let mut doc = doc();
        assert!(pipeline.apply(&mut doc, &ApiOptions::default()).is_err());
        assert!(doc.path("/after").is_none());
    }
}
