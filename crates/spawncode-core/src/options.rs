use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const MANIFEST_FILE: &str = "vehicles.yml";
pub const ASSETS_DIR: &str = "stream";
pub const META_DIR: &str = "data";
pub const SCRIPT_FILE: &str = "client/vehicle_names.lua";

/// Where a resource keeps the files a run touches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    pub manifest: PathBuf,
    pub assets_dir: PathBuf,
    pub meta_dir: PathBuf,
    pub script: PathBuf,
}

impl ProjectLayout {
    pub fn rooted_at(root: &Path) -> Self {
        Self {
            manifest: root.join(MANIFEST_FILE),
            assets_dir: root.join(ASSETS_DIR),
            meta_dir: root.join(META_DIR),
            script: root.join(SCRIPT_FILE),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Full,
    SpawnCodes,
    Metadata,
    Script,
    ModKits,
}

impl RunMode {
    pub const ALL: [RunMode; 5] = [
        RunMode::Full,
        RunMode::SpawnCodes,
        RunMode::Metadata,
        RunMode::Script,
        RunMode::ModKits,
    ];

    pub fn renames_assets(self) -> bool {
        matches!(self, RunMode::Full | RunMode::SpawnCodes)
    }

    pub fn rewrites_metadata(self) -> bool {
        matches!(self, RunMode::Full | RunMode::Metadata)
    }

    pub fn rewrites_script(self) -> bool {
        matches!(self, RunMode::Full | RunMode::Script)
    }

    pub fn prefixes_mod_kits(self) -> bool {
        matches!(self, RunMode::Full | RunMode::ModKits)
    }

    pub fn name(self) -> &'static str {
        match self {
            RunMode::Full => "full",
            RunMode::SpawnCodes => "spawn-codes",
            RunMode::Metadata => "metadata",
            RunMode::Script => "script",
            RunMode::ModKits => "mod-kits",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            RunMode::Full => "Full run (assets, metadata, script, mod kits)",
            RunMode::SpawnCodes => "Spawn codes only (rename asset files)",
            RunMode::Metadata => "Metadata only (vehicles.meta, carvariations.meta)",
            RunMode::Script => "Script only",
            RunMode::ModKits => "Mod kits only (carcols.meta)",
        }
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

impl FromStr for RunMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RunMode::ALL
            .into_iter()
            .find(|mode| mode.name() == s)
            .ok_or_else(|| {
                let names: Vec<&str> = RunMode::ALL.iter().map(|mode| mode.name()).collect();
                format!("unknown mode '{}', expected one of: {}", s, names.join(", "))
            })
    }
}

/// Single digit 1-9 prepended to mod kit ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KitPrefix(u8);

impl KitPrefix {
    pub fn new(digit: u8) -> Option<Self> {
        (1..=9).contains(&digit).then_some(Self(digit))
    }

    pub fn all() -> Vec<KitPrefix> {
        (1..=9).map(KitPrefix).collect()
    }
}

impl fmt::Display for KitPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for KitPrefix {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u8>()
            .ok()
            .and_then(KitPrefix::new)
            .ok_or_else(|| format!("kit prefix must be a digit from 1 to 9, got '{}'", s))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    pub mode: RunMode,
    pub kit_prefix: Option<KitPrefix>,
    pub dry_run: bool,
}

impl RunOptions {
    pub fn new(mode: RunMode) -> Self {
        Self {
            mode,
            kit_prefix: None,
            dry_run: false,
        }
    }

    pub fn with_kit_prefix(mut self, prefix: KitPrefix) -> Self {
        self.kit_prefix = Some(prefix);
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}
