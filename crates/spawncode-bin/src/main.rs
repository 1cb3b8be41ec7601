mod cli;
mod diff;
mod prompt;

use anyhow::Result;
use cli::Cli;
use spawncode_core::{AutoApprove, ChangeReviewer, Manifest, ProjectLayout, RunOptions, RunReport};
use std::process;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() -> Result<()> {
    let cli = Cli::parse_args();

    setup_logging(&cli)?;

    info!("Starting spawncode");

    let root = match &cli.target {
        Some(target) => target.clone(),
        None => std::env::current_dir()?,
    };
    if !root.is_dir() {
        anyhow::bail!("Target must be a directory: {:?}", root);
    }

    let layout = ProjectLayout::rooted_at(&root);
    info!("Target directory: {:?}", root);

    let manifest = match Manifest::load(&layout.manifest) {
        Ok(manifest) => manifest,
        Err(err) => {
            error!("Failed to load manifest: {}", err);
            process::exit(1);
        }
    };

    let options = resolve_options(&cli)?;
    info!("Interactive mode: {}", cli.interactive);

    let reviewer: &dyn ChangeReviewer = if cli.interactive {
        &diff::DiffReviewer
    } else {
        &AutoApprove
    };

    let report = spawncode_core::run(&layout, &manifest, &options, reviewer)?;
    print_summary(&report);

    info!("Spawncode completed successfully");
    Ok(())
}

/// Fills in whatever the command line left out through the menus.
fn resolve_options(cli: &Cli) -> Result<RunOptions> {
    let mode = match cli.mode {
        Some(mode) => mode,
        None => prompt::select_mode()?,
    };

    let mut options = RunOptions::new(mode).with_dry_run(cli.dry_run);
    if mode.prefixes_mod_kits() {
        let prefix = match cli.kit_prefix {
            Some(prefix) => prefix,
            None => prompt::select_kit_prefix()?,
        };
        options = options.with_kit_prefix(prefix);
    }

    Ok(options)
}

fn print_summary(report: &RunReport) {
    println!("Spawn codes updated!");
    println!("  Assets renamed: {}", report.assets_renamed);
    println!("  Assets skipped: {}", report.assets_skipped);
    println!("  Documents rewritten: {}", report.documents_rewritten);
    println!("  Metadata records updated: {}", report.records_updated);
    println!("  Script replacements: {}", report.script_replacements);
    println!("  Mod kits prefixed: {}", report.kits_prefixed);
    if !report.warnings.is_empty() {
        println!("  Warnings: {}", report.warnings.len());
    }
}

fn setup_logging(cli: &Cli) -> Result<()> {
    let filter = if cli.quiet {
        EnvFilter::new("error")
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_thread_names(false)
                .compact()
        )
        .with(filter)
        .init();

    Ok(())
}
