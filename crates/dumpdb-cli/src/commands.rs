//! Command handlers

use crate::output::{create_table, format_size, render_table, table_to_json};
use crate::{Commands, Context, OutputFormat};
use anyhow::{Context as _, Result};
use comfy_table::Cell;
use dumpdb_store::{
    CatalogEntry, DumpStore, LoadOptions, ScanOutcome, StoreCatalog, StoreConfig, VersionKey,
};
use std::path::Path;
use tracing::debug;

/// Run one command, writing its result to stdout
pub fn handle(cmd: Commands, ctx: &Context) -> Result<()> {
    match cmd {
        Commands::List { dir, skipped } => {
            let dir = dir.unwrap_or_else(|| ctx.work_dir.clone());
            handle_list(ctx, &dir, skipped)
        }
        Commands::Versions { name } => handle_versions(ctx, &name),
        Commands::Show {
            name,
            all,
            timestamp,
            version,
            limit,
        } => handle_show(ctx, &name, all, timestamp, version.as_deref(), limit),
    }
}

fn open_store(ctx: &Context) -> Result<DumpStore> {
    let config = StoreConfig::new(&ctx.work_dir).with_extension(&ctx.extension);
    DumpStore::new(config).context("invalid store configuration")
}

fn handle_list(ctx: &Context, dir: &Path, show_skipped: bool) -> Result<()> {
    debug!("Scanning {}", dir.display());
    let outcomes = StoreCatalog::new(&ctx.extension)
        .scan_detailed(dir)
        .with_context(|| format!("failed to scan {}", dir.display()))?;

    let (entries, skipped): (Vec<_>, Vec<_>) = outcomes
        .into_iter()
        .partition(|o| matches!(o, ScanOutcome::Entry(_)));
    let entries: Vec<CatalogEntry> = entries
        .into_iter()
        .filter_map(|o| match o {
            ScanOutcome::Entry(entry) => Some(entry),
            ScanOutcome::Skipped { .. } => None,
        })
        .collect();

    match ctx.format {
        OutputFormat::Json => {
            let mut json = serde_json::json!({ "stores": entries });
            if show_skipped {
                json["skipped"] = serde_json::to_value(&skipped)?;
            }
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Text => {
            if entries.is_empty() {
                println!("No stores found in {}", dir.display());
            } else {
                let mut table = create_table();
                table.set_header(vec!["Name", "Latest", "Versions", "Size"]);
                for entry in &entries {
                    table.add_row(vec![
                        Cell::new(&entry.name),
                        Cell::new(entry.latest.format("%Y-%m-%d %H:%M:%S%.6f")),
                        Cell::new(entry.versions),
                        Cell::new(format_size(entry.size)),
                    ]);
                }
                println!("{table}");
            }

            if show_skipped {
                for outcome in &skipped {
                    if let ScanOutcome::Skipped { path, reason } = outcome {
                        println!("skipped {}: {reason:?}", path.display());
                    }
                }
            }
        }
    }
    Ok(())
}

fn handle_versions(ctx: &Context, name: &str) -> Result<()> {
    let store = open_store(ctx)?;
    let versions = store
        .versions(name)
        .with_context(|| format!("failed to list versions of '{name}'"))?;

    match ctx.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&versions)?),
        OutputFormat::Text => {
            for key in &versions {
                println!("{key}  {}", key.timestamp().format("%Y-%m-%d %H:%M:%S%.6f"));
            }
        }
    }
    Ok(())
}

fn handle_show(
    ctx: &Context,
    name: &str,
    all: bool,
    timestamp: bool,
    version: Option<&str>,
    limit: Option<usize>,
) -> Result<()> {
    let store = open_store(ctx)?;
    let table = match version {
        Some(key) => {
            let key = VersionKey::parse(key)?;
            store.load_version(name, &key, timestamp)
        }
        None => {
            let options = LoadOptions {
                merge_all: all,
                include_timestamp: timestamp,
            };
            store.load(name, options)
        }
    }
    .with_context(|| format!("failed to load '{name}'"))?;

    match ctx.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&table_to_json(&table, limit))?
            );
        }
        OutputFormat::Text => {
            println!("{}", render_table(&table, limit));
            let shown = limit.unwrap_or(usize::MAX).min(table.row_count());
            println!("{shown} of {} rows", table.row_count());
        }
    }
    Ok(())
}
