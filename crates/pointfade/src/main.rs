mod cli;
mod paths;
mod run;

use anyhow::{Context, Result};
use cli::{Command, ConfigAction, RunArgs};
use paths::{ConfigLocation, ENV_CONFIG_DIR};

fn main() -> Result<()> {
    let cli = cli::parse();
    run::initialise_tracing();

    let location = ConfigLocation::discover(cli.config.as_deref())?;
    match cli.command {
        Some(Command::Config(config_cmd)) => match config_cmd.action {
            ConfigAction::Show { json } => run_config_show(&location, &cli.run, json),
            ConfigAction::Where => run_config_where(&location),
        },
        None => run::run(&location, &cli.run),
    }
}

fn run_config_show(location: &ConfigLocation, args: &RunArgs, json: bool) -> Result<()> {
    let config = run::resolve_config(location, args)?;
    if json {
        let rendered =
            serde_json::to_string_pretty(&config).context("failed to render configuration")?;
        println!("{rendered}");
    } else {
        print!("{}", config.to_toml_string()?);
    }
    Ok(())
}

fn run_config_where(location: &ConfigLocation) -> Result<()> {
    let status = if location.path().is_file() {
        "present"
    } else if location.is_required() {
        "missing"
    } else {
        "missing (built-in defaults in use)"
    };
    println!("Configuration file:");
    println!("  path:    {}", location.path().display());
    println!("  source:  {}", location.origin());
    println!("  status:  {status}");
    println!("Search order:");
    println!("  1. --config FILE");
    println!("  2. ${ENV_CONFIG_DIR}/pointfade.toml");
    println!("  3. platform config directory");
    Ok(())
}
