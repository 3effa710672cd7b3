use crate::config::ApiOptions;
use crate::error::ApiResult;
use crate::openapi::catalog::SchemaCatalog;
use crate::openapi::document::{Contact, Info, License, OpenApiDocument};
use crate::openapi::extension::ExtensionPipeline;
use crate::openapi::operations::{OperationComposer, compose_static_paths};
use crate::openapi::security::apply_api_key;
use crate::providers::ProviderRegistry;
use std::sync::Arc;

/// Builds a fresh document per call from a shared options snapshot.
///
/// Holds no per-call state, so one generator can serve concurrent callers.
#[derive(Clone)]
pub struct OpenApiGenerator {
    options: Arc<ApiOptions>,
    extensions: Arc<ExtensionPipeline>,
    providers: Option<Arc<ProviderRegistry>>,
}

impl OpenApiGenerator {
    pub fn new(options: Arc<ApiOptions>, extensions: ExtensionPipeline) -> Self {
        Self {
            options,
            extensions: Arc::new(extensions),
            providers: None,
        }
    }

    /// Refuse to generate while a collection names a provider that is not in
    /// `providers`.
    pub fn with_providers(mut self, providers: Arc<ProviderRegistry>) -> Self {
        self.providers = Some(providers);
        self
    }

    /// Assemble the document served at `base_url`.
    ///
    /// Order: static content and core schemas, collection paths, security,
    /// then extensions.
    pub fn document(&self, base_url: &str) -> ApiResult<OpenApiDocument> {
        let options = self.options.as_ref();
        let version = options.openapi_version()?;
        if let Some(providers) = &self.providers {
            providers.check(options)?;
        }
        tracing::debug!(
            base_url,
            version = version.document_version(),
            collections = options.collections.len(),
            extensions = ?self.extensions.names(),
            "assembling API description"
        );

        let mut doc = OpenApiDocument::new(version, info(options), base_url);
        let catalog = SchemaCatalog::new(version);
        catalog.register(&mut doc)?;
        compose_static_paths(&mut doc);

        for collection in &options.collections {
            OperationComposer::new(catalog, collection).compose(&mut doc);
        }

        if options.use_api_key_authorization {
            apply_api_key(&mut doc);
        }

        self.extensions.apply(&mut doc, options)?;

        tracing::info!(
            paths = doc.paths.len(),
            operations = doc.operation_count(),
            schemas = doc.components.schemas.len(),
            "API description assembled"
        );
        Ok(doc)
    }
}

fn info(options: &ApiOptions) -> Info {
    let landing = &options.landing_page;
    let contact = (landing.contact_name.is_some() || landing.contact_url.is_some()).then(|| {
        Contact {
            name: landing.contact_name.clone(),
            url: landing.contact_url.clone(),
        }
    });
    let license = landing.license_name.clone().map(|name| License {
        name,
        url: landing.license_url.clone(),
    });
    Info {
        title: landing.title.clone(),
        description: landing.description.clone(),
        version: landing.version.clone(),
        contact,
        license,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CollectionId, CollectionDescriptor, LandingPage};
    use crate::error::ApiError;

    fn options(version: &str) -> ApiOptions {
        ApiOptions {
            open_api_version: version.to_string(),
            landing_page: LandingPage {
                title: "Demo".to_string(),
                version: "2.1".to_string(),
                license_name: Some("MIT".to_string()),
                ..LandingPage::default()
            },
            collections: vec![CollectionDescriptor {
                id: CollectionId::from("roads"),
                title: "Roads".to_string(),
                description: None,
                features: None,
                tiles: None,
                styles: false,
            }],
            ..ApiOptions::default()
        }
    }

    #[test]
    fn info_comes_from_landing_page() {
        let generator = OpenApiGenerator::new(Arc::new(options("3.0")), ExtensionPipeline::new());
        let doc = generator.document("https://maps.example/").unwrap();
        assert_eq!(doc.openapi, "3.0.4");
        assert_eq!(doc.info.title, "Demo");
        assert_eq!(doc.info.version, "2.1");
        assert!(doc.info.contact.is_none());
        assert_eq!(doc.info.license.as_ref().map(|l| l.name.as_str()), Some("MIT"));
        assert_eq!(doc.servers.len(), 1);
        assert_eq!(doc.servers[0].url, "https://maps.example/");
        assert!(doc.security.is_empty());
    }

    #[test]
    fn unsupported_version_fails_generation() {
        let generator = OpenApiGenerator::new(Arc::new(options("2.0")), ExtensionPipeline::new());
        let err = generator.document("/").unwrap_err();
        assert!(matches!(err, ApiError::Configuration(_)));
    }

    struct Named(&'static str);

    impl crate::providers::FeaturesProvider for Named {
        fn name(&self) -> &str {
            self.0
        }
    }

    #[test]
    fn unregistered_provider_fails_generation() {
        let mut with_provider = options("3.1");
        with_provider.collections[0].features = Some(crate::config::FeaturesCapability {
            provider: Some("PostGis".to_string()),
            ..Default::default()
        });
        let with_provider = Arc::new(with_provider);

        let empty = Arc::new(ProviderRegistry::new());
        let err = OpenApiGenerator::new(with_provider.clone(), ExtensionPipeline::new())
            .with_providers(empty)
            .document("/")
            .unwrap_err();
        assert!(matches!(err, ApiError::Configuration(_)), "{err}");

        let mut registry = ProviderRegistry::new();
        registry.register_features(Arc::new(Named("PostGis")));
        OpenApiGenerator::new(with_provider, ExtensionPipeline::new())
            .with_providers(Arc::new(registry))
            .document("/")
            .unwrap();
    }

    #[test]
    fn repeated_calls_produce_equal_documents() {
        let generator = OpenApiGenerator::new(Arc::new(options("3.1")), ExtensionPipeline::new());
        let first = generator.document("/").unwrap().to_json().unwrap();
        let second = generator.document("/").unwrap().to_json().unwrap();
        assert_eq!(first, second);
    }
}
