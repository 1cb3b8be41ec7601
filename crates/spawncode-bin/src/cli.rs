use clap::Parser;
use spawncode_core::{KitPrefix, RunMode};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "spawncode")]
#[command(version)]
#[command(about = "Renumber vehicle spawn codes across a resource")]
#[command(long_about = "Generates spawn codes from vehicles.yml and propagates them to model files, vehicles.meta, carvariations.meta, carcols.meta and the client script. Without --mode an interactive menu is shown.")]
pub struct Cli {
    #[arg(help = "Resource directory (defaults to current directory)")]
    pub target: Option<PathBuf>,

    #[arg(short, long, help = "Operation: full, spawn-codes, metadata, script or mod-kits")]
    pub mode: Option<RunMode>,

    #[arg(short, long, help = "Digit (1-9) prepended to mod kit ids")]
    pub kit_prefix: Option<KitPrefix>,

    #[arg(long, help = "Perform a dry run without making changes")]
    pub dry_run: bool,

    #[arg(short, long, help = "Interactive mode - prompt for each change")]
    pub interactive: bool,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(short, long, global = true)]
    pub quiet: bool,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
