use std::fs;

use anyhow::{bail, Context};
use arbor_model::record_from_str;
use arbor_store::{render_tree, FileNodeStore, NodeStore};
use arbor_sync::{SyncConfig, SyncReport, Synchronizer};
use arbor_types::NodePath;
use colored::Colorize;
use serde_json::json;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Sync(args) => cmd_sync(args, &cli.format),
        Command::Dump(args) => cmd_dump(args, &cli.format),
    }
}

fn cmd_sync(args: SyncArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let report = sync_document(&args)?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => {
            println!("{} Synchronized {}", "✓".green().bold(), args.input.display().to_string().bold());
            println!("  Created: {}", report.nodes_created.to_string().cyan());
            println!("  Re-typed: {}", report.nodes_retyped.to_string().cyan());
            println!("  Properties written: {}", report.properties_written.to_string().cyan());
            println!("  Properties removed: {}", report.properties_removed.to_string().cyan());
            println!("  Deleted: {}", report.nodes_deleted.to_string().cyan());
            if report.failed_deletions > 0 {
                println!("  {} {}", "Failed deletions:".yellow(), report.failed_deletions);
            }
        }
    }
    Ok(())
}

fn cmd_dump(args: DumpArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let store = FileNodeStore::open_read_only(&args.store)
        .with_context(|| format!("opening {}", args.store.display()))?;
    let path = NodePath::parse(&args.path)?;
    if !store.exists(&path)? {
        bail!("no node at {path}");
    }

    match format {
        OutputFormat::Text => print!("{}", render_tree(&store, &path)?),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&subtree_json(&store, &path)?)?),
    }
    Ok(())
}

/// Load the configuration and document, then persist into the store.
///
/// A failed synchronization discards the staged changes so the snapshot on
/// disk stays as it was.
pub fn sync_document(args: &SyncArgs) -> anyhow::Result<SyncReport> {
    let config = match &args.config {
        Some(path) => SyncConfig::load(path)
            .with_context(|| format!("loading configuration {}", path.display()))?,
        None => SyncConfig::default(),
    };
    let text = fs::read_to_string(&args.input)
        .with_context(|| format!("reading {}", args.input.display()))?;
    let record = record_from_str(&text)
        .with_context(|| format!("parsing {}", args.input.display()))?;
    let store = FileNodeStore::open(&args.store)
        .with_context(|| format!("opening {}", args.store.display()))?;

    let sync = Synchronizer::new(config);
    let deep = !args.shallow;
    let result = match &args.path {
        Some(path) => sync.persist_at_with_depth(path, &record, &store, deep),
        None => sync.persist_with_depth(&record, &store, deep),
    };
    match result {
        Ok(report) => Ok(report),
        Err(e) => {
            if let Err(discard) = store.discard() {
                tracing::warn!(error = %discard, "discarding staged changes failed");
            }
            Err(e).context("synchronization failed")
        }
    }
}

fn subtree_json(store: &dyn NodeStore, path: &NodePath) -> anyhow::Result<serde_json::Value> {
    let node = store
        .node(path)?
        .with_context(|| format!("no node at {path}"))?;
    let children = store
        .children(path)?
        .iter()
        .map(|child| subtree_json(store, &child.path))
        .collect::<anyhow::Result<Vec<_>>>()?;
    Ok(json!({
        "path": node.path,
        "type": node.node_type,
        "properties": store.properties(path)?,
        "children": children,
    }))
}
