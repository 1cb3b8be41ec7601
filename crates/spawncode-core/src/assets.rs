use anyhow::Result;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::codes::SpawnCodeMapping;
use crate::{ChangeReviewer, RunReport};

/// Model file suffixes renamed along with the identifier: geometry, texture
/// dictionary, and their high-detail counterparts.
pub const ASSET_SUFFIXES: [&str; 4] = [".yft", ".ytd", "_hi.yft", "+hi.ytd"];

/// Renames `<original><suffix>` to `<code><suffix>` for every mapping entry and
/// suffix. Missing sources and occupied destinations are skipped with a warning.
pub fn rename_assets(
    assets_dir: &Path,
    mapping: &SpawnCodeMapping,
    reviewer: &dyn ChangeReviewer,
    dry_run: bool,
    report: &mut RunReport,
) -> Result<()> {
    info!("Renaming assets in: {:?}", assets_dir);

    if !assets_dir.is_dir() {
        report.warn(format!("Asset directory not found: {:?}", assets_dir));
        return Ok(());
    }

    for (original, code) in mapping.iter() {
        for suffix in ASSET_SUFFIXES {
            let old_path = assets_dir.join(format!("{}{}", original, suffix));
            let new_path = assets_dir.join(format!("{}{}", code, suffix));

            if !old_path.is_file() {
                report.assets_skipped += 1;
                report.warn(format!("Missing asset: {:?}", old_path));
                continue;
            }

            if new_path.exists() {
                report.assets_skipped += 1;
                report.warn(format!(
                    "Not renaming {:?}: {:?} already exists",
                    old_path, new_path
                ));
                continue;
            }

            if !reviewer.review_rename(&old_path, &new_path, "File")? {
                debug!("Rename declined: {:?}", old_path);
                continue;
            }

            if dry_run {
                info!("Would rename file: {:?} -> {:?}", old_path, new_path);
            } else {
                info!("Renaming file: {:?} -> {:?}", old_path, new_path);
                fs::rename(&old_path, &new_path)?;
            }
            report.assets_renamed += 1;
        }
    }

    Ok(())
}
