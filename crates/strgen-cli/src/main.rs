//! strgen CLI
//!
//! Command-line interface for generating value-to-string helpers.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use strgen_codegen::{generate_to, locate_root, Destination};
use strgen_core::{GeneratorConfig, Item};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "strgen")]
#[command(author, version, about = "Value-to-string helper generator for C headers", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Options locating and configuring the scanned header
#[derive(Args)]
struct SourceArgs {
    /// Root directory of the source tree (default: search upwards from cwd)
    #[arg(long, value_name = "DIR")]
    root: Option<PathBuf>,

    /// Header to scan, overriding root and configured header path
    #[arg(long, value_name = "FILE")]
    header: Option<PathBuf>,

    /// Configuration file (YAML or JSON)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Do not wrap scopes of outermost blocks (e.g. the include guard)
    #[arg(long)]
    unguarded_outermost: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the helper source file
    Generate {
        #[command(flatten)]
        source: SourceArgs,

        /// Output directory, or `-` for stdout
        #[arg(value_name = "OUTPUT_DIR", default_value = "library")]
        output_dir: String,
    },

    /// List guards and entities found in the header
    List {
        #[command(flatten)]
        source: SourceArgs,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },
}

fn main() -> Result<()> {
    // Logs go to stderr; stdout may carry generated code
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate { source, output_dir } => {
            cmd_generate(&source, &output_dir)?;
        }
        Commands::List { source, format } => {
            cmd_list(&source, &format)?;
        }
    }

    Ok(())
}

fn load_config(args: &SourceArgs) -> Result<GeneratorConfig> {
    let mut config = match &args.config {
        Some(path) => GeneratorConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => GeneratorConfig::default(),
    };
    if args.unguarded_outermost {
        config.unguarded_outermost = true;
    }
    Ok(config)
}

fn resolve_header(args: &SourceArgs, config: &GeneratorConfig) -> Result<PathBuf> {
    if let Some(header) = &args.header {
        return Ok(header.clone());
    }

    let root = match &args.root {
        Some(root) => root.clone(),
        None => {
            let cwd = std::env::current_dir()?;
            locate_root(&cwd, &config.source_header)?
        }
    };
    Ok(root.join(&config.source_header))
}

fn cmd_generate(args: &SourceArgs, output_dir: &str) -> Result<()> {
    let config = load_config(args)?;
    let header = resolve_header(args, &config)?;

    let destination = if output_dir == "-" {
        Destination::Stdout
    } else {
        Destination::File(Path::new(output_dir).join(&config.output_file))
    };

    let summary = generate_to(&header, &destination, &config)
        .with_context(|| format!("failed to generate helpers from {}", header.display()))?;

    if let Destination::File(path) = &destination {
        println!(
            "Generated {} helper functions from {} into {}",
            summary.entities,
            summary.header.display(),
            path.display()
        );
    }

    Ok(())
}

fn cmd_list(args: &SourceArgs, format: &str) -> Result<()> {
    let config = load_config(args)?;
    let header = resolve_header(args, &config)?;

    let scan = strgen_parser::scan_file(&header, &config)
        .with_context(|| format!("failed to scan {}", header.display()))?;

    match format {
        "json" => {
            let items: Vec<_> = scan
                .items
                .iter()
                .map(|(offset, item)| {
                    serde_json::json!({
                        "offset": offset,
                        "line": strgen_core::span::line_of(&scan.source, *offset),
                        "item": item,
                    })
                })
                .collect();
            let result = serde_json::json!({
                "header": header.to_string_lossy(),
                "entities": scan.entity_count(),
                "items": items,
            });
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        "text" => {
            println!("{}: {} entities", header.display(), scan.entity_count());
            let mut depth = 0usize;
            for (offset, item) in &scan.items {
                let line = strgen_core::span::line_of(&scan.source, *offset);
                match item {
                    Item::Guard(guard) => {
                        if guard.closing {
                            depth = depth.saturating_sub(1);
                        }
                        println!("  L{:<5} {}{}", line, "  ".repeat(depth), first_line(&guard.text));
                        if !guard.closing {
                            depth += 1;
                        }
                    }
                    Item::Entity(entity) => {
                        println!("  L{:<5} {}{}", line, "  ".repeat(depth), entity.describe());
                    }
                }
            }
        }
        other => anyhow::bail!("unknown format: {}", other),
    }

    Ok(())
}

/// First line of a possibly `\`-continued directive
fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or(text)
}
