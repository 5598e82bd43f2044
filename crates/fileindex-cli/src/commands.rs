//! CLI command implementations.

use colored::Colorize;
use fileindex_core::PatternSet;
use fileindex_index::IndexStore;
use fileindex_watcher::{ChangeWatcher, IndexService, WatchConfig};
use std::fs;

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Create an empty ignore file.
pub fn init(config: &WatchConfig) -> Result<()> {
    let ignore_path = config.ignore_path();

    if ignore_path.exists() {
        println!(
            "{} Already initialized: {}",
            "✓".green(),
            ignore_path.display()
        );
        return Ok(());
    }

    if let Some(parent) = ignore_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&ignore_path, "[]")?;

    println!("{} Created {}", "✓".green(), ignore_path.display());
    println!(
        "  Add regular expressions to it, e.g. {}",
        r#"["\\.tmp$", "^archive/"]"#.cyan()
    );
    println!("  Run {} to build the index", "fileindex index".cyan());

    Ok(())
}

/// Recreate the index once.
pub fn index(config: WatchConfig) -> Result<()> {
    let mut service = IndexService::new(config)?;

    if let Err(e) = service.reload_patterns() {
        eprintln!("{} {}", "⚠ Warning:".yellow(), e);
        eprintln!("  Indexing without ignore patterns");
    }

    let report = service.rebuild()?;

    println!(
        "{} Indexed {} files ({} ignored) in {}ms",
        "✓".green(),
        report.paths.to_string().cyan(),
        report.ignored.to_string().dimmed(),
        report.duration_ms
    );
    println!(
        "  {} {} ({:?})",
        "Index:".dimmed(),
        service.store().target().display(),
        report.outcome
    );

    if !report.collisions.is_empty() {
        println!(
            "\n{} {} basenames are shared by more than one file:",
            "⚠".yellow(),
            report.collisions.len()
        );
        for collision in report.collisions.iter().take(5) {
            println!(
                "  {} {} (replaced {})",
                collision.key.yellow(),
                collision.current,
                collision.previous.dimmed()
            );
        }
        if report.collisions.len() > 5 {
            println!("  ... and {} more", report.collisions.len() - 5);
        }
    }

    Ok(())
}

/// Watch the directory and keep the index current.
pub async fn watch(config: WatchConfig) -> Result<()> {
    let root = config.root.clone();
    let watcher = ChangeWatcher::start(config)?;

    println!("{} Watching {}", "✓".green(), root.display());
    println!("  Press {} to stop", "Ctrl+C".cyan());

    tokio::signal::ctrl_c().await?;

    watcher.shutdown().await;
    println!("{} Stopped", "✓".green());

    Ok(())
}

/// Look up a file by basename.
pub fn lookup(name: &str, config: &WatchConfig) -> Result<()> {
    let store = IndexStore::new(config.index_path());
    let index = store.load()?.ok_or_else(|| {
        format!(
            "no index at {}, run `fileindex index` first",
            store.target().display()
        )
    })?;

    match index.lookup(name) {
        Some(path) => {
            println!("{}", path);
            Ok(())
        }
        None => Err(format!("no file named \"{}\" in the index", name).into()),
    }
}

/// Show index status.
pub fn status(config: &WatchConfig, json: bool) -> Result<()> {
    let store = IndexStore::new(config.index_path());
    let index = store.load()?;
    let patterns = PatternSet::load(&config.ignore_path());

    if json {
        let summary = serde_json::json!({
            "config": config,
            "indexed": index.is_some(),
            "paths": index.as_ref().map(|i| i.paths.len()),
            "basenames": index.as_ref().map(|i| i.basenames.len()),
            "ignorePatterns": patterns.as_ref().ok().map(|p| p.patterns()),
            "ignoreError": patterns.as_ref().err().map(|e| e.to_string()),
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("{}", "fileindex status".cyan().bold());
    println!();
    println!("  {} {}", "Index file:".dimmed(), store.target().display());

    match &index {
        Some(index) => {
            println!("  {} {}", "Paths:".dimmed(), index.paths.len());
            println!("  {} {}", "Basenames:".dimmed(), index.basenames.len());
        }
        None => {
            println!("  {} {}", "Paths:".dimmed(), "(not indexed yet)".yellow());
            println!("  Run {} to build it", "fileindex index".cyan());
        }
    }

    println!("  {} {}", "Ignore file:".dimmed(), config.ignore_path().display());
    match &patterns {
        Ok(patterns) if patterns.is_empty() => {
            println!("  {} (none)", "Ignore patterns:".dimmed());
        }
        Ok(patterns) => {
            println!("  {} {}", "Ignore patterns:".dimmed(), patterns.len());
            for pattern in patterns.patterns() {
                println!("    {}", pattern.dimmed());
            }
        }
        Err(e) => println!("  {} {}", "Ignore patterns:".dimmed(), e.to_string().red()),
    }

    Ok(())
}
