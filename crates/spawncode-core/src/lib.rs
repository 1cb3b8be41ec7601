use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub mod assets;
pub mod codes;
pub mod manifest;
pub mod meta;
pub mod options;
pub mod script;
pub mod xml;

pub use codes::{GroupCounters, SpawnCodeMapping};
pub use manifest::{DataTemplate, Manifest, VehicleEntry};
pub use meta::{InitDataList, MetaDocument, MetaKind, ModKitList, VariationList};
pub use options::{KitPrefix, ProjectLayout, RunMode, RunOptions};
pub use script::ScriptRewriter;

#[derive(thiserror::Error, Debug)]
pub enum SpawnError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Unable to read manifest {path:?}: {source}")]
    ManifestRead {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid manifest: {0}")]
    ManifestParse(#[from] serde_yaml::Error),
    #[error("Vehicle '{vehicle}' references unknown data template '{template}'")]
    UnknownTemplate { vehicle: String, template: String },
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("Malformed XML: {message}")]
    Malformed { message: String },
    #[error("Unexpected {kind} structure: {message}")]
    Structure { kind: MetaKind, message: String },
}

/// Counts and warnings collected over one run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub assets_renamed: usize,
    pub assets_skipped: usize,
    pub documents_rewritten: usize,
    pub records_updated: usize,
    pub script_replacements: usize,
    pub kits_prefixed: usize,
    pub warnings: Vec<String>,
}

impl RunReport {
    pub(crate) fn warn(&mut self, message: String) {
        warn!("{}", message);
        self.warnings.push(message);
    }
}

/// Gate consulted before each file is rewritten or renamed.
pub trait ChangeReviewer {
    fn review_content(&self, path: &Path, old_content: &str, new_content: &str, description: &str) -> Result<bool>;

    fn review_rename(&self, old_path: &Path, new_path: &Path, change_type: &str) -> Result<bool>;
}

/// Accepts every change.
pub struct AutoApprove;

impl ChangeReviewer for AutoApprove {
    fn review_content(&self, _path: &Path, _old: &str, _new: &str, _description: &str) -> Result<bool> {
        Ok(true)
    }

    fn review_rename(&self, _old_path: &Path, _new_path: &Path, _change_type: &str) -> Result<bool> {
        Ok(true)
    }
}

pub(crate) fn apply_content_change(
    path: &Path,
    old_content: &str,
    new_content: &str,
    description: &str,
    reviewer: &dyn ChangeReviewer,
    dry_run: bool,
) -> Result<bool> {
    if !reviewer.review_content(path, old_content, new_content, description)? {
        info!("Change declined: {:?}", path);
        return Ok(false);
    }

    if dry_run {
        info!("Would update contents of: {:?}", path);
    } else {
        info!("Updating contents of: {:?}", path);
        fs::write(path, new_content)?;
    }
    Ok(true)
}

/// Generates the spawn codes once and runs the steps selected by the mode in
/// order: assets, metadata, script, mod kits. Skips inside a step never stop the
/// following steps.
pub fn run(
    layout: &ProjectLayout,
    manifest: &Manifest,
    options: &RunOptions,
    reviewer: &dyn ChangeReviewer,
) -> Result<RunReport> {
    let kit_prefix = if options.mode.prefixes_mod_kits() {
        match options.kit_prefix {
            Some(prefix) => Some(prefix),
            None => anyhow::bail!("Mode '{}' requires a mod kit prefix", options.mode.name()),
        }
    } else {
        None
    };

    info!("Running mode: {}", options.mode.name());
    if options.dry_run {
        warn!("Dry run mode - no changes will be made");
    }

    let mapping = SpawnCodeMapping::generate(&manifest.vehicles);
    info!("Generated {} spawn codes", mapping.len());

    let mut report = RunReport::default();

    if options.mode.renames_assets() {
        assets::rename_assets(&layout.assets_dir, &mapping, reviewer, options.dry_run, &mut report)?;
    }

    if options.mode.rewrites_metadata() {
        meta::rewrite_metadata(&layout.meta_dir, manifest, &mapping, reviewer, options.dry_run, &mut report)?;
    }

    if options.mode.rewrites_script() {
        script::rewrite_script(&layout.script, &mapping, reviewer, options.dry_run, &mut report)?;
    }

    if let Some(prefix) = kit_prefix {
        meta::prefix_mod_kits(&layout.meta_dir, prefix, reviewer, options.dry_run, &mut report)?;
    }

    info!(
        "Run complete: {} assets renamed, {} documents rewritten, {} script replacements, {} warnings",
        report.assets_renamed,
        report.documents_rewritten,
        report.script_replacements,
        report.warnings.len()
    );

    Ok(report)
}
