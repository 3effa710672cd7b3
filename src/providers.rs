//! Name-to-provider registries for the data backends.
//!
//! Collections name their provider in configuration; the registry is filled
//! once at startup and checked against the options before serving. Data
//! access itself happens behind these traits and is not implemented here.

use crate::config::ApiOptions;
use crate::error::{ApiError, ApiResult};
use std::collections::BTreeMap;
use std::sync::Arc;

pub trait FeaturesProvider: Send + Sync {
    fn name(&self) -> &str;
}

pub trait TilesProvider: Send + Sync {
    fn name(&self) -> &str;
}

#[derive(Default, Clone)]
pub struct ProviderRegistry {
    features: BTreeMap<String, Arc<dyn FeaturesProvider>>,
    tiles: BTreeMap<String, Arc<dyn TilesProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_features(&mut self, provider: Arc<dyn FeaturesProvider>) -> &mut Self {
        self.features.insert(provider.name().to_string(), provider);
        self
    }

    pub fn register_tiles(&mut self, provider: Arc<dyn TilesProvider>) -> &mut Self {
        self.tiles.insert(provider.name().to_string(), provider);
        self
    }

    pub fn features(&self, name: &str) -> Option<&Arc<dyn FeaturesProvider>> {
        self.features.get(name)
    }

    pub fn tiles(&self, name: &str) -> Option<&Arc<dyn TilesProvider>> {
        self.tiles.get(name)
    }

    /// Every provider named by a collection must be registered. Collections
    /// that leave the provider unset are not checked.
    pub fn check(&self, options: &ApiOptions) -> ApiResult<()> {
        let mut missing = Vec::new();
        for collection in &options.collections {
            let features = collection.features.as_ref().and_then(|f| f.provider.as_deref());
            if let Some(name) = features.filter(|name| !self.features.contains_key(*name)) {
                missing.push(format!("{}: features provider '{name}'", collection.id));
            }
            let tiles = collection.tiles.as_ref().and_then(|t| t.provider.as_deref());
            if let Some(name) = tiles.filter(|name| !self.tiles.contains_key(*name)) {
                missing.push(format!("{}: tiles provider '{name}'", collection.id));
            }
        }
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ApiError::configuration(format!(
                "unregistered providers:\n{}",
                missing.join("\n")
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CollectionDescriptor, CollectionId, FeaturesCapability, TilesCapability};

    struct Named(&'static str);

    impl FeaturesProvider for Named {
        fn name(&self) -> &str {
            self.0
        }
    }

    impl TilesProvider for Named {
        fn name(&self) -> &str {
            self.0
        }
    }

    fn options(features: Option<&str>, tiles: Option<&str>) -> ApiOptions {
        ApiOptions {
            collections: vec![CollectionDescriptor {
                id: CollectionId::from("roads"),
                title: "Roads".to_string(),
                description: None,
                features: Some(FeaturesCapability {
                    provider: features.map(str::to_string),
                    ..FeaturesCapability::default()
                }),
                tiles: Some(TilesCapability {
                    provider: tiles.map(str::to_string),
                }),
                styles: false,
            }],
            ..ApiOptions::default()
        }
    }

    #[test]
    fn registered_names_pass() {
        let mut registry = ProviderRegistry::new();
        registry
            .register_features(Arc::new(Named("PostGis")))
            .register_tiles(Arc::new(Named("MbTiles")));
        registry.check(&options(Some("PostGis"), Some("MbTiles"))).unwrap();
        registry.check(&options(None, None)).unwrap();
        assert_eq!(registry.features("PostGis").unwrap().name(), "PostGis");
    }

    #[test]
    fn unknown_names_are_reported_together() {
        let registry = ProviderRegistry::new();
        let err = registry
            .check(&options(Some("SqlServer"), Some("MbTiles")))
            .unwrap_err();
        let text = err.to_string();
        assert!(text.contains("features provider 'SqlServer'"), "{text}");
        assert!(text.contains("tiles provider 'MbTiles'"), "{text}");
    }
}
