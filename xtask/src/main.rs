use std::process;

use anyhow::Result;
use clap::{ArgMatches, Command};

const BINARY_NAME: &str = "spawncode";

fn main() -> Result<()> {
    let args = clap::command!()
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(Command::new("install").about("Install spawncode binary locally"))
        .subcommand(
            Command::new("run")
                .about("Build and run spawncode with arguments")
                .trailing_var_arg(true)
                .allow_hyphen_values(true)
                .arg(clap::Arg::new("args")
                    .help("Arguments to pass to spawncode")
                    .action(clap::ArgAction::Append)
                    .num_args(0..))
        )
        .subcommand(
            Command::new("test")
                .about("Test Operations")
                .subcommand(Command::new("all").about("Run all tests for the entire project"))
                .subcommand(Command::new("core").about("Run tests for spawncode-core"))
                .subcommand(Command::new("bin").about("Run tests for spawncode-bin"))
                .subcommand(Command::new("integration").about("Run the pipeline tests and CLI smoke checks"))
        )
        .get_matches();

    match args.subcommand() {
        Some(("install", _args)) => install(),
        Some(("run", args)) => handle_run_command(args),
        Some(("test", args)) => handle_test_commands(args),
        Some((command, _)) => anyhow::bail!("Unexpected command: {command}"),
        None => anyhow::bail!("Expected subcommand"),
    }
}

fn cargo(args: &[&str], failure: &str) -> Result<()> {
    let status = process::Command::new("cargo").args(args).status()?;
    if !status.success() {
        anyhow::bail!("{}", failure);
    }
    Ok(())
}

fn install() -> Result<()> {
    println!("Installing {BINARY_NAME}...");
    cargo(&["install", "--path", "crates/spawncode-bin"], "Failed to install spawncode")?;
    println!("✓ {BINARY_NAME} installed successfully");
    Ok(())
}

fn handle_run_command(args: &ArgMatches) -> Result<()> {
    let run_args: Vec<String> = args.get_many::<String>("args")
        .map_or(Vec::new(), |vals| vals.cloned().collect());

    let mut command_args = vec!["run", "--bin", BINARY_NAME, "--"];
    command_args.extend(run_args.iter().map(String::as_str));

    cargo(&command_args, "Failed to run spawncode")
}

fn handle_test_commands(args: &ArgMatches) -> Result<()> {
    match args.subcommand() {
        Some(("all", _args)) => test_all(),
        Some(("core", _args)) => cargo(&["test", "--package", "spawncode-core"], "Core tests failed"),
        Some(("bin", _args)) => cargo(&["test", "--package", "spawncode-bin"], "Binary tests failed"),
        Some(("integration", _args)) => test_integration(),
        _ => {
            println!("Available test commands:");
            println!("  all          - Run all tests for the entire project");
            println!("  core         - Run tests for spawncode-core");
            println!("  bin          - Run tests for spawncode-bin");
            println!("  integration  - Run the pipeline tests and CLI smoke checks");
            Ok(())
        }
    }
}

fn test_all() -> Result<()> {
    println!("🧪 Running all tests for the spawncode project...\n");

    let suites: [(&str, fn() -> Result<()>); 3] = [
        ("workspace", test_workspace),
        ("documentation", test_docs),
        ("integration", test_integration),
    ];

    let mut all_passed = true;
    for (name, suite) in suites {
        println!("Running {} tests...", name);
        match suite() {
            Ok(()) => println!("✅ {} tests passed\n", name),
            Err(err) => {
                all_passed = false;
                println!("❌ {} tests failed: {:?}\n", name, err);
            }
        }
    }

    if !all_passed {
        anyhow::bail!("Test suite failed");
    }
    println!("🎉 All tests passed successfully!");
    Ok(())
}

fn test_workspace() -> Result<()> {
    cargo(&["test", "--workspace"], "Workspace tests failed")
}

fn test_docs() -> Result<()> {
    cargo(&["test", "--doc", "--package", "spawncode-core"], "Documentation tests failed")
}

fn test_integration() -> Result<()> {
    cargo(&["test", "--package", "spawncode-core", "--test", "pipeline"], "Pipeline tests failed")?;
    cargo(&["run", "--bin", BINARY_NAME, "--", "--help"], "CLI help command failed")?;
    cargo(&["run", "--bin", BINARY_NAME, "--", "--version"], "CLI version command failed")
}
