//! Resolve a proxy-group template against a subscription

use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};
use subtpl_core::{ConfigLoader, Inventory, ProviderMap, TemplateProcessor};
use tracing_subscriber::filter::{EnvFilter, LevelFilter};

#[derive(Parser, Debug)]
#[command(
    name = "subtpl",
    about = "Expand a proxy-group template into concrete Clash groups",
    version
)]
struct Args {
    /// Template file (YAML)
    #[arg(long, short = 't', value_name = "PATH")]
    template: PathBuf,

    /// Subscription file with a `proxies` list
    #[arg(long, short = 's', value_name = "PATH")]
    subscription: PathBuf,

    /// Named proxy provider file (can be used multiple times)
    #[arg(long = "provider", value_name = "NAME=PATH", value_parser = parse_provider)]
    providers: Vec<(String, PathBuf)>,

    /// Config file path
    #[arg(long, short = 'c', env = "SUBTPL_CONFIG")]
    config: Option<PathBuf>,

    /// Write the result here instead of stdout
    #[arg(long, short = 'o', value_name = "PATH")]
    output: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, short = 'v')]
    verbose: bool,
}

fn parse_provider(value: &str) -> std::result::Result<(String, PathBuf), String> {
    match value.split_once('=') {
        Some((name, path)) if !name.is_empty() && !path.is_empty() => {
            Ok((name.to_string(), PathBuf::from(path)))
        }
        _ => Err(format!("expected NAME=PATH, got '{}'", value)),
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = ConfigLoader::load_or_builtin(args.config.clone())
        .context("Failed to load configuration")?;

    // Initialize logging
    let level = if args.verbose || config.common.verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .init();

    let template = read_file(&args.template, "template")?;
    let mut inventory = Inventory::from_clash_yaml(&read_file(&args.subscription, "subscription")?)
        .with_context(|| format!("Invalid subscription {:?}", args.subscription))?;
    tracing::info!("Loaded {} nodes from {:?}", inventory.len(), args.subscription);

    let mut providers = ProviderMap::new();
    for (name, path) in &args.providers {
        let nodes = Inventory::from_clash_yaml(&read_file(path, "provider")?)
            .with_context(|| format!("Invalid provider {} at {:?}", name, path))?;
        tracing::info!("Provider {}: {} nodes", name, nodes.len());
        providers.entry(name.clone()).or_default().extend(nodes.names());
        inventory.extend(nodes);
    }
    for record in inventory.records() {
        tracing::debug!("Node {} ({})", record.name(), record.kind());
    }

    let (output, report) = TemplateProcessor::new(&config)
        .process_with_report(&template, inventory.records_mut(), &providers)
        .with_context(|| format!("Failed to process template {:?}", args.template))?;

    tracing::info!(
        "Resolved {} groups, pruned {}, emitted {} nodes",
        report.groups,
        report.pruned_groups.len(),
        report.emitted_proxies
    );
    if !report.region_groups.is_empty() {
        tracing::debug!("Region groups: {}", report.region_groups.join(", "));
    }
    for (group, entry) in &report.dangling_refs {
        tracing::info!("Dropped unknown reference {} from {}", entry, group);
    }
    if !report.landing_nodes.is_empty() {
        tracing::info!("Tagged {} landing nodes", report.landing_nodes.len());
    }

    match &args.output {
        Some(path) => {
            fs::write(path, output).with_context(|| format!("Failed to write {:?}", path))?
        }
        None => print!("{}", output),
    }

    Ok(())
}

fn read_file(path: &Path, what: &str) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read {} {:?}", what, path))
}
