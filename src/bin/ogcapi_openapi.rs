//! Prints the OpenAPI description generated for an options file.
//!
//! The document is assembled exactly as a running service would assemble it
//! for the given base URL, with the standard extensions registered.

use anyhow::{Context, Result, bail};
use ogcapi::{
    ApiOptions, FeaturesProvider, ProviderRegistry, TilesProvider, init_logging,
    resolve_config_path, standard_generator,
};
use std::env;
use std::path::PathBuf;
use std::sync::Arc;

const DEFAULT_BASE_URL: &str = "http://localhost:5000/api/ogc/";

fn main() {
    init_logging();
    if let Err(err) = run() {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = CliArgs::parse()?;
    let config = resolve_config_path(args.config)?;
    let options = ApiOptions::load(&config)?;

    let mut generator = standard_generator(Arc::new(options));
    if let Some(names) = &args.providers {
        generator = generator.with_providers(Arc::new(declared_registry(names)));
    }
    let document = generator
        .document(&args.base_url)
        .with_context(|| format!("generating document from {}", config.display()))?;

    let rendered = if args.compact {
        serde_json::to_string(&document)?
    } else {
        serde_json::to_string_pretty(&document)?
    };
    println!("{rendered}");
    Ok(())
}

/// A provider known only by name: the deployment's actual backends live in
/// the serving process.
struct DeclaredProvider(String);

impl FeaturesProvider for DeclaredProvider {
    fn name(&self) -> &str {
        &self.0
    }
}

impl TilesProvider for DeclaredProvider {
    fn name(&self) -> &str {
        &self.0
    }
}

fn declared_registry(names: &[String]) -> ProviderRegistry {
    let mut registry = ProviderRegistry::new();
    for name in names {
        registry
            .register_features(Arc::new(DeclaredProvider(name.clone())))
            .register_tiles(Arc::new(DeclaredProvider(name.clone())));
    }
    registry
}

struct CliArgs {
    config: Option<PathBuf>,
    base_url: String,
    compact: bool,
    providers: Option<Vec<String>>,
}

impl CliArgs {
    fn parse() -> Result<Self> {
        let mut args = env::args().skip(1);
        let mut config = None;
        let mut base_url = None;
        let mut compact = false;
        let mut providers = None;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" => config = Some(PathBuf::from(next_value(&mut args, "--config")?)),
                "--base-url" => base_url = Some(next_value(&mut args, "--base-url")?),
                "--compact" => compact = true,
                "--providers" => {
                    let list = next_value(&mut args, "--providers")?;
                    providers = Some(
                        list.split(',')
                            .map(str::trim)
                            .filter(|name| !name.is_empty())
                            .map(str::to_string)
                            .collect(),
                    );
                }
                "-h" | "--help" => usage(0),
                other => bail!("unknown argument: {other}\n{}", usage_text()),
            }
        }

        Ok(Self {
            config,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            compact,
            providers,
        })
    }
}

fn next_value(args: &mut impl Iterator<Item = String>, flag: &str) -> Result<String> {
    args.next()
        .ok_or_else(|| anyhow::anyhow!("missing value for {flag}"))
}

fn usage_text() -> &'static str {
    "Usage: ogcapi-openapi [--config PATH] [--base-url URL] [--compact] [--providers A,B]\n\
Prints the OpenAPI document for the options file (default: $OGCAPI_CONFIG).\n\
With --providers, fails if a collection names a provider not in the list.\n"
}

fn usage(code: i32) -> ! {
    print!("{}", usage_text());
    std::process::exit(code);
}
