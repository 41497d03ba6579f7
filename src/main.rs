//! Command-line front end for inspecting YAML configuration files.
//!
//! Entry point and error handling boundary. Uses `anyhow` for
//! ergonomic error propagation and user-facing messages.

mod cli;

use std::process;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::args::{Cli, Command, DumpArgs, GetArgs, ValueKind};
use yamlconf::constants;
use yamlconf::env::Env;
use yamlconf::node::{json, yaml};
use yamlconf::resolve::PathResolver;
use yamlconf::section::coerce;
use yamlconf::store::YamlStore;
use yamlconf::YamlConfig;

fn main() {
    init_tracing();

    if let Err(err) = run() {
        eprintln!("Error: {err:#}");
        process::exit(1);
    }
}

/// Log to stderr, filtered by `YAMLCONF_LOG` (default: warnings and errors).
fn init_tracing() {
    let filter = EnvFilter::try_from_env(constants::ENV_LOG)
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Path => run_path(&cli.config),
        Command::Get(args) => run_get(&cli.config, args),
        Command::Dump(args) => run_dump(&cli.config, args),
        Command::Version => run_version(),
    }
}

fn run_version() -> Result<()> {
    use colored::Colorize;

    println!(
        "{} {}",
        constants::APP_NAME.bold(),
        constants::VERSION.green().bold()
    );
    Ok(())
}

/// Load the referenced file without watching it.
fn load(reference: &str) -> Result<YamlConfig> {
    let mut config = YamlConfig::new(reference);
    config
        .load(|_| {}, false)
        .with_context(|| format!("failed to load config {reference:?}"))?;
    Ok(config)
}

/// Print the resolved config path, creating the default file if needed.
fn run_path(reference: &str) -> Result<()> {
    let path = PathResolver::new(Env::real())
        .resolve(reference, &YamlStore::new())
        .with_context(|| format!("failed to resolve config {reference:?}"))?;
    println!("{}", path.display());
    Ok(())
}

/// Print one value through the getter matching `--as`.
fn run_get(reference: &str, args: GetArgs) -> Result<()> {
    let config = load(reference)?;
    let root = config.root();
    let key = args.key.as_str();

    match args.kind {
        ValueKind::String => println!("{}", root.try_get_string(key)?),
        ValueKind::Int => println!("{}", root.try_get_int(key)?),
        ValueKind::Float => println!("{}", root.try_get_float64(key)?),
        ValueKind::Bool => println!("{}", root.try_get_bool(key)?),
        ValueKind::List => {
            let node = root.try_get_object(key)?;
            for item in coerce::string_list(&node) {
                println!("{item}");
            }
        }
        ValueKind::Duration => {
            let duration = root
                .get_duration(key)
                .ok_or_else(|| anyhow!("key {key:?} does not hold a duration"))?;
            println!("{duration:?}");
        }
        ValueKind::Raw => {
            let node = root.try_get_object(key)?;
            print!("{}", yaml::render(&node).context("failed to render value")?);
        }
    }

    Ok(())
}

/// Print the document, or one section of it, as YAML or JSON.
fn run_dump(reference: &str, args: DumpArgs) -> Result<()> {
    let config = load(reference)?;
    let section = match args.section.as_deref() {
        Some(key) => config.config_section(key)?,
        None => config.root(),
    };
    let node = section.get_raw();

    if args.json {
        let value = json::to_json(&node).context("document has no JSON form")?;
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        print!("{}", yaml::render(&node).context("failed to render document")?);
    }

    Ok(())
}
