use anyhow::Result;
use inquire::Select;
use spawncode_core::{KitPrefix, RunMode};

pub fn select_mode() -> Result<RunMode> {
    let mode = Select::new("Which operation should run?", RunMode::ALL.to_vec())
        .with_starting_cursor(0)
        .prompt()?;
    Ok(mode)
}

pub fn select_kit_prefix() -> Result<KitPrefix> {
    let prefix = Select::new("Mod kit id prefix:", KitPrefix::all())
        .with_help_message("Prepended to every kit id in carcols.meta")
        .prompt()?;
    Ok(prefix)
}
