//! Command-line access to a style directory tree.
//!
//! Uses the same storage and locking as the service, so it can be pointed at
//! a live tree. Results are printed as JSON; stylesheet content is printed
//! verbatim.

use anyhow::{Context, Result, bail};
use ogcapi::styles::StyleStorageOptions;
use ogcapi::{
    ApiOptions, DefaultStyle, StaticApiKeyAuthorizer, StyleResponse, StylesService,
    StylesheetAddParameters, init_logging, resolve_config_path,
};
use serde::Serialize;
use std::env;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::sync::Arc;

/// When set, every command must present this key with `--api-key`.
const REQUIRED_KEY_ENV: &str = "OGCAPI_STYLES_API_KEY";

fn main() {
    init_logging();
    if let Err(err) = run() {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = CliArgs::parse()?;
    let storage = args.storage_options()?;
    let mut service = StylesService::file_backed(storage);
    if let Some(required) = env::var(REQUIRED_KEY_ENV).ok().filter(|v| !v.is_empty()) {
        service = service.with_authorizer(Arc::new(StaticApiKeyAuthorizer::new(required)));
    }
    let key = args.api_key.as_deref();
    let base_url = args.base_url.as_str();

    match args.command {
        Command::List { collection } => {
            print_json(&service.list_styles(&collection, base_url, key)?)?;
        }
        Command::Get {
            collection,
            style,
            format,
        } => match service.get_style(&collection, &style, format.as_deref(), base_url, key)? {
            StyleResponse::Style(style) => print_json(&style)?,
            StyleResponse::Stylesheet { content, .. } => print!("{content}"),
        },
        Command::Add {
            collection,
            style,
            format,
            source,
        } => {
            let parameters = StylesheetAddParameters {
                style_id: style,
                format,
                content: read_source(&source)?,
            };
            service.add_style(&collection, &parameters, key)?;
        }
        Command::Replace {
            collection,
            style,
            format,
            source,
        } => {
            let parameters = StylesheetAddParameters {
                style_id: style.clone(),
                format,
                content: read_source(&source)?,
            };
            service.replace_stylesheet(&collection, &style, &parameters, key)?;
        }
        Command::Delete { collection, style } => {
            service.delete_style(&collection, &style, key)?;
        }
        Command::SetDefault { collection, style } => {
            service.update_default_style(&collection, &DefaultStyle::new(style), key)?;
        }
        Command::Metadata { collection, style } => {
            print_json(&service.get_metadata(&collection, &style, key)?)?;
        }
    }
    Ok(())
}

enum Command {
    List {
        collection: String,
    },
    Get {
        collection: String,
        style: String,
        format: Option<String>,
    },
    Add {
        collection: String,
        style: String,
        format: String,
        source: String,
    },
    Replace {
        collection: String,
        style: String,
        format: String,
        source: String,
    },
    Delete {
        collection: String,
        style: String,
    },
    SetDefault {
        collection: String,
        style: String,
    },
    Metadata {
        collection: String,
        style: String,
    },
}

struct CliArgs {
    config: Option<PathBuf>,
    dir: Option<PathBuf>,
    base_url: String,
    api_key: Option<String>,
    command: Command,
}

impl CliArgs {
    fn parse() -> Result<Self> {
        let mut args = env::args().skip(1);
        let mut config = None;
        let mut dir = None;
        let mut base_url = String::from("/");
        let mut api_key = None;
        let mut format = None;
        let mut positional = Vec::new();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" => config = Some(PathBuf::from(next_value(&mut args, "--config")?)),
                "--dir" => dir = Some(PathBuf::from(next_value(&mut args, "--dir")?)),
                "--base-url" => base_url = next_value(&mut args, "--base-url")?,
                "--api-key" => api_key = Some(next_value(&mut args, "--api-key")?),
                "--format" | "-f" => format = Some(next_value(&mut args, "--format")?),
                "-h" | "--help" => usage(0),
                flag if flag.starts_with("--") => bail!("unknown flag: {flag}\n{}", usage_text()),
                _ => positional.push(arg),
            }
        }

        let command = parse_command(positional, format)?;
        Ok(Self {
            config,
            dir,
            base_url,
            api_key,
            command,
        })
    }

    /// `--dir` wins over the options file's `styleStorage`.
    fn storage_options(&self) -> Result<StyleStorageOptions> {
        if let Some(dir) = &self.dir {
            return Ok(StyleStorageOptions::new(dir.clone()));
        }
        let config = resolve_config_path(self.config.clone())?;
        let options = ApiOptions::load(&config)?;
        options
            .style_storage
            .with_context(|| format!("{} has no styleStorage section", config.display()))
    }
}

fn parse_command(positional: Vec<String>, format: Option<String>) -> Result<Command> {
    let mut words = positional.into_iter();
    let Some(verb) = words.next() else {
        usage(2);
    };
    let rest: Vec<String> = words.collect();
    let arity = |n: usize| -> Result<()> {
        if rest.len() != n {
            bail!("'{verb}' expects {n} argument(s), got {}\n{}", rest.len(), usage_text());
        }
        Ok(())
    };

    let command = match verb.as_str() {
        "list" => {
            arity(1)?;
            Command::List {
                collection: rest[0].clone(),
            }
        }
        "get" => {
            arity(2)?;
            Command::Get {
                collection: rest[0].clone(),
                style: rest[1].clone(),
                format,
            }
        }
        "add" | "replace" => {
            arity(3)?;
            let format = format.context("--format is required")?;
            let (collection, style, source) = (rest[0].clone(), rest[1].clone(), rest[2].clone());
            if verb == "add" {
                Command::Add {
                    collection,
                    style,
                    format,
                    source,
                }
            } else {
                Command::Replace {
                    collection,
                    style,
                    format,
                    source,
                }
            }
        }
        "delete" => {
            arity(2)?;
            Command::Delete {
                collection: rest[0].clone(),
                style: rest[1].clone(),
            }
        }
        "set-default" => {
            arity(2)?;
            Command::SetDefault {
                collection: rest[0].clone(),
                style: rest[1].clone(),
            }
        }
        "metadata" => {
            arity(2)?;
            Command::Metadata {
                collection: rest[0].clone(),
                style: rest[1].clone(),
            }
        }
        other => bail!("unknown command: {other}\n{}", usage_text()),
    };
    Ok(command)
}

/// `-` reads stdin.
fn read_source(source: &str) -> Result<String> {
    if source == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("reading stylesheet from stdin")?;
        return Ok(buf);
    }
    fs::read_to_string(source).with_context(|| format!("reading stylesheet {source}"))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn next_value(args: &mut impl Iterator<Item = String>, flag: &str) -> Result<String> {
    args.next()
        .ok_or_else(|| anyhow::anyhow!("missing value for {flag}"))
}

fn usage_text() -> &'static str {
    "Usage: ogcapi-styles [--config PATH | --dir DIR] [--base-url URL] [--api-key KEY] COMMAND\n\
Commands:\n\
  list COLLECTION\n\
  get COLLECTION STYLE [--format F]\n\
  add COLLECTION STYLE FILE|- --format F\n\
  replace COLLECTION STYLE FILE|- --format F\n\
  delete COLLECTION STYLE\n\
  set-default COLLECTION STYLE\n\
  metadata COLLECTION STYLE\n\
Formats: mapbox, sld10, sld11. Set OGCAPI_STYLES_API_KEY to require --api-key.\n"
}

fn usage(code: i32) -> ! {
    print!("{}", usage_text());
    std::process::exit(code);
}
