//! Clap argument types.

use clap::{Parser, ValueEnum};

use yamlconf::constants::{ENV_CONFIG, VERSION};

/// Inspect YAML configuration files through typed, colon-delimited key paths.
#[derive(Parser, Debug)]
#[command(name = "yamlconf", version = VERSION)]
pub struct Cli {
    /// Config file reference: absolute, relative to the working directory,
    /// or relative to the home directory (created there when missing).
    #[arg(long, short = 'c', global = true, env = ENV_CONFIG, default_value = "config.yaml")]
    pub config: String,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(clap::Subcommand, Debug)]
pub enum Command {
    /// Print the absolute path the config reference resolves to.
    Path,

    /// Print one value.
    Get(GetArgs),

    /// Print the whole document or one section of it.
    Dump(DumpArgs),

    /// Print version information.
    Version,
}

/// Arguments for the `get` subcommand.
#[derive(Parser, Debug)]
pub struct GetArgs {
    /// Colon-delimited key path, e.g. `server:http:port`.
    pub key: String,

    /// How to read the value.
    #[arg(long = "as", default_value = "string")]
    pub kind: ValueKind,
}

/// Arguments for the `dump` subcommand.
#[derive(Parser, Debug)]
pub struct DumpArgs {
    /// Only dump the section at this key path.
    #[arg(long)]
    pub section: Option<String>,

    /// Emit JSON instead of YAML.
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

/// Getter used by `get`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ValueKind {
    String,
    Int,
    Float,
    Bool,
    /// Sequence elements, one per line.
    List,
    Duration,
    /// The node as YAML.
    Raw,
}
