// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! ddl-inspect - DDL description inspector
//!
//! ```bash
//! ddl-inspect validate vehicle.description
//! ddl-inspect layout vehicle.description tVehicle --repr both
//! ddl-inspect decode vehicle.description tVehicle --hex 40420f0000000000 --transcode
//! ```

mod config;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use config::InspectConfig;
use ddl::codec::transcode_to_vec;
use ddl::layout::{ElementKind, StructLayout};
use ddl::{DataDefinition, Representation};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "ddl-inspect")]
#[command(about = "Validate DDL descriptions, print struct layouts and decode samples")]
#[command(version)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a description and list every problem
    Validate {
        /// DDL XML description
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Print offsets, sizes and padding of a struct
    Layout {
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Struct name
        #[arg(value_name = "STRUCT")]
        name: String,

        #[arg(long, value_enum, default_value = "both")]
        repr: ReprArg,
    },

    /// Decode a hex sample of a struct
    Decode {
        #[arg(value_name = "FILE")]
        input: PathBuf,

        #[arg(value_name = "STRUCT")]
        name: String,

        /// Sample bytes as hex (whitespace allowed)
        #[arg(long, value_name = "HEX")]
        hex: String,

        /// Representation of the sample
        #[arg(long, value_enum, default_value = "serialized")]
        repr: ReprArg,

        /// Also print the sample converted to the other representation
        #[arg(long)]
        transcode: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ReprArg {
    Serialized,
    Deserialized,
    Both,
}

impl ReprArg {
    fn representations(self) -> &'static [Representation] {
        match self {
            Self::Serialized => &[Representation::Serialized],
            Self::Deserialized => &[Representation::Deserialized],
            Self::Both => &[Representation::Serialized, Representation::Deserialized],
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => InspectConfig::from_file(path)?,
        None => InspectConfig::default(),
    };
    let env = env_logger::Env::default().default_filter_or(config.log_level.as_str());
    env_logger::Builder::from_env(env).init();
    log::debug!("[ddl-inspect] config: {:?}", config);

    match cli.command {
        Commands::Validate { input } => cmd_validate(&input, &config),
        Commands::Layout { input, name, repr } => cmd_layout(&input, &name, repr, &config),
        Commands::Decode {
            input,
            name,
            hex,
            repr,
            transcode,
        } => cmd_decode(&input, &name, &hex, repr, transcode, &config),
    }
}

fn load(input: &Path, config: &InspectConfig) -> anyhow::Result<DataDefinition> {
    let xml = std::fs::read_to_string(input)
        .with_context(|| format!("cannot read '{}'", input.display()))?;
    ddl::description::parse_str_with_config(&xml, config.definition.clone())
        .with_context(|| format!("cannot load '{}'", input.display()))
}

fn cmd_validate(input: &Path, config: &InspectConfig) -> anyhow::Result<()> {
    let dd = load(input, config)?;
    let problems = dd.validate();
    let structs = dd.structs().count();
    let enums = dd.enums().count();

    if problems.is_empty() {
        println!(
            "[OK] {}: {} struct(s), {} enum(s)",
            input.display(),
            structs,
            enums
        );
        return Ok(());
    }

    println!("[FAIL] {}: {} problem(s)", input.display(), problems.len());
    for (idx, problem) in problems.iter().enumerate() {
        println!("  {}. [{:?}] {}", idx + 1, problem.kind, problem);
    }
    bail!("validation failed")
}

fn cmd_layout(
    input: &Path,
    name: &str,
    repr: ReprArg,
    config: &InspectConfig,
) -> anyhow::Result<()> {
    let dd = load(input, config)?;
    for &representation in repr.representations() {
        let layout = dd.layout(name, representation)?;
        print_layout(&layout);
        println!();
    }
    Ok(())
}

fn print_layout(layout: &StructLayout) {
    println!(
        "{} v{} ({}): size {}, alignment {}",
        layout.name(),
        layout.version(),
        layout.representation(),
        layout.size(),
        layout.alignment()
    );
    println!(
        "  {:<24} {:<12} {:>6} {:>6} {:>6}  {}",
        "element", "type", "offset", "size", "count", "bits"
    );
    for element in layout.elements() {
        let bits = element
            .bits
            .map(|b| format!("{}..{}", b.pos, b.pos + b.width))
            .unwrap_or_default();
        let type_name = match &element.kind {
            ElementKind::Struct(nested) => format!("struct {}", nested.name()),
            other => other.type_name().to_string(),
        };
        println!(
            "  {:<24} {:<12} {:>6} {:>6} {:>6}  {}",
            element.name,
            type_name,
            element.offset,
            element.size(),
            element.array_size,
            bits
        );
    }
    for padding in layout.padding() {
        println!("  padding at {} ({} byte(s))", padding.offset, padding.len);
    }
}

fn cmd_decode(
    input: &Path,
    name: &str,
    hex_text: &str,
    repr: ReprArg,
    transcode: bool,
    config: &InspectConfig,
) -> anyhow::Result<()> {
    let representation = match repr {
        ReprArg::Serialized => Representation::Serialized,
        ReprArg::Deserialized => Representation::Deserialized,
        ReprArg::Both => bail!("--repr both is not valid for decode"),
    };
    let compact: String = hex_text.split_whitespace().collect();
    let bytes = hex::decode(&compact).context("invalid hex sample")?;

    let dd = load(input, config)?;
    let layout = dd.layout(name, representation)?;
    let decoder = layout
        .decoder(&bytes)
        .with_context(|| format!("sample does not fit {} ({})", name, representation))?;

    println!("{} ({}), {} byte(s)", name, representation, bytes.len());
    for (index, leaf) in layout.leaves().iter().enumerate() {
        let value = decoder.get_leaf_value(index)?;
        let symbol = leaf
            .enum_type
            .as_ref()
            .and_then(|_| decoder.resolve_enum_name(leaf.path.as_str()).ok());
        match symbol {
            Some(symbol) => println!("  {:<28} = {} ({})", leaf.path, symbol, value),
            None => println!("  {:<28} = {}", leaf.path, value),
        }
    }

    if transcode {
        let other = match representation {
            Representation::Serialized => Representation::Deserialized,
            Representation::Deserialized => Representation::Serialized,
        };
        let target = dd.layout(name, other)?;
        let converted = transcode_to_vec(&decoder, &target)?;
        println!("{}: {}", other, hex::encode(converted));
    }
    Ok(())
}
