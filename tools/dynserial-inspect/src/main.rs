// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! dynserial-inspect - look inside dynserial catalogs and messages
//!
//! ```text
//! dynserial-inspect types --catalog survey.yaml --builtin
//! dynserial-inspect decode --builtin --hex message.hex
//! dynserial-inspect encode --catalog survey.yaml --type Survey survey.json -o survey.bin
//! ```

mod json;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use dynserial::{localization, Catalog, Codec, CodecConfig, TypeRegistry};
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "dynserial-inspect")]
#[command(about = "List registered types, decode messages to JSON, encode JSON to messages")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Where the type registry comes from.
#[derive(Args, Debug, Clone)]
struct RegistrySource {
    /// YAML type catalog (its `limits` section sets the codec limits)
    #[arg(short, long, value_name = "FILE")]
    catalog: Option<PathBuf>,

    /// Include the built-in localization message family (implied without --catalog)
    #[arg(long)]
    builtin: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered types with their fields in wire order
    Types {
        #[command(flatten)]
        source: RegistrySource,
    },

    /// Decode one message and print it as JSON
    Decode {
        #[command(flatten)]
        source: RegistrySource,

        /// Input is hex text instead of raw bytes
        #[arg(long)]
        hex: bool,

        /// Encoded message file
        #[arg(value_name = "INPUT")]
        input: PathBuf,
    },

    /// Build an instance from JSON and encode it
    Encode {
        #[command(flatten)]
        source: RegistrySource,

        /// Tag of the instance (a `$type` key in the JSON may name a subtype)
        #[arg(short = 't', long = "type", value_name = "TAG")]
        tag: String,

        /// JSON input file
        #[arg(value_name = "INPUT.json")]
        input: PathBuf,

        /// Output file (stdout if omitted)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Write hex text instead of raw bytes
        #[arg(long)]
        hex: bool,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Types { source } => cmd_types(&source),
        Commands::Decode { source, hex, input } => cmd_decode(&source, hex, &input),
        Commands::Encode {
            source,
            tag,
            input,
            output,
            hex,
        } => cmd_encode(&source, &tag, &input, output.as_deref(), hex),
    }
}

/// Registry and codec limits for a command.
fn load(source: &RegistrySource) -> Result<(TypeRegistry, CodecConfig)> {
    let mut registry = TypeRegistry::new();
    if source.builtin || source.catalog.is_none() {
        localization::register(&mut registry)?;
    }

    let config = match &source.catalog {
        Some(path) => {
            let catalog = Catalog::load_from_file(path)?;
            catalog
                .register_into(&mut registry)
                .with_context(|| format!("registering {}", path.display()))?;
            catalog.codec_config()
        }
        None => CodecConfig::from_env(),
    };
    registry.validate()?;
    log::debug!(
        "[inspect] {} types, max_depth={}, max_length={}",
        registry.len(),
        config.max_depth,
        config.max_length
    );
    Ok((registry, config))
}

fn cmd_types(source: &RegistrySource) -> Result<()> {
    let (registry, _) = load(source)?;
    print!("{}", describe_types(&registry));
    Ok(())
}

fn describe_types(registry: &TypeRegistry) -> String {
    let mut out = String::new();
    for descriptor in registry.descriptors() {
        match descriptor.parent() {
            Some(parent) => out.push_str(&format!("{} extends {}\n", descriptor.tag(), parent)),
            None => out.push_str(&format!("{}\n", descriptor.tag())),
        }
        for (index, field) in descriptor.fields().iter().enumerate() {
            out.push_str(&format!("  {:>2}. {}: {}\n", index, field.name, field.describe()));
        }
    }
    out
}

fn cmd_decode(source: &RegistrySource, hex: bool, input: &Path) -> Result<()> {
    let (registry, config) = load(source)?;
    let bytes = read_input(input, hex)?;
    let codec = Codec::with_config(&registry, config);

    let instance = codec
        .decode(&bytes)
        .with_context(|| format!("decoding {} ({} bytes)", input.display(), bytes.len()))?;
    let json = json::instance_to_json(&registry, instance.as_ref())?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}

fn cmd_encode(
    source: &RegistrySource,
    tag: &str,
    input: &Path,
    output: Option<&Path>,
    hex: bool,
) -> Result<()> {
    let (registry, config) = load(source)?;
    let text = std::fs::read_to_string(input)
        .with_context(|| format!("reading {}", input.display()))?;
    let value: serde_json::Value = serde_json::from_str(&text)
        .with_context(|| format!("parsing {}", input.display()))?;

    let instance = json::instance_from_json(&registry, tag, &value)?;
    let bytes = Codec::with_config(&registry, config).encode(instance.as_ref())?;
    let payload = if hex {
        let mut text = json::to_hex(&bytes);
        text.push('\n');
        text.into_bytes()
    } else {
        bytes
    };

    match output {
        Some(path) => {
            std::fs::write(path, &payload)
                .with_context(|| format!("writing {}", path.display()))?;
            eprintln!("[OK] {} -> {} ({} bytes)", tag, path.display(), payload.len());
        }
        None => std::io::stdout().lock().write_all(&payload)?,
    }
    Ok(())
}

fn read_input(path: &Path, hex: bool) -> Result<Vec<u8>> {
    if hex {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        json::from_hex(&text).with_context(|| format!("parsing hex in {}", path.display()))
    } else {
        std::fs::read(path).with_context(|| format!("reading {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_is_default_source() {
        let source = RegistrySource {
            catalog: None,
            builtin: false,
        };
        let (registry, config) = load(&source).expect("load");
        assert!(registry.contains("LocalizationStreamPutRequest"));
        assert_eq!(config, CodecConfig::from_env());
    }

    #[test]
    fn test_types_listing() {
        let (registry, _) = load(&RegistrySource {
            catalog: None,
            builtin: true,
        })
        .expect("load");
        let listing = describe_types(&registry);
        assert!(listing.starts_with("User\n   0. userId: string?\n"));
        assert!(listing.contains("LocalizationStreamGetRequest extends LocalizationStreamRequest\n"));
        assert!(listing.contains("   3. user: nested<User>\n"));
    }

    #[test]
    fn test_encode_then_decode_through_files() {
        let dir = tempfile::tempdir().expect("temp dir");
        let catalog = dir.path().join("catalog.yaml");
        std::fs::write(
            &catalog,
            "types:\n  - tag: Probe\n    fields:\n      - { name: seq, type: u32 }\n      - { name: owner, type: User }\n",
        )
        .expect("catalog");
        let input = dir.path().join("probe.json");
        std::fs::write(&input, r#"{ "seq": 9, "owner": { "userId": "x" } }"#).expect("json");
        let output = dir.path().join("probe.hex");

        let source = RegistrySource {
            catalog: Some(catalog),
            builtin: true,
        };
        cmd_encode(&source, "Probe", &input, Some(&output), true).expect("encode");

        let (registry, config) = load(&source).expect("load");
        let bytes = read_input(&output, true).expect("hex");
        let decoded = Codec::with_config(&registry, config).decode(&bytes).expect("decode");
        let json = json::instance_to_json(&registry, decoded.as_ref()).expect("json");
        assert_eq!(json["seq"], 9);
        assert_eq!(json["owner"]["userId"], "x");
    }
}
