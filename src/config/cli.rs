//! Command-line argument definitions for dockenv.

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};

/// Command-line interface for dockenv.
#[derive(Debug, Parser)]
#[command(name = "dockenv")]
#[command(
    author,
    version,
    about = "Resolve container engine connection settings and translate container declarations"
)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file.
    #[arg(long, global = true)]
    pub config: Option<Utf8PathBuf>,

    /// Engine API version as `major.minor`.
    #[arg(long, global = true)]
    pub api_version: Option<String>,

    /// Log level for diagnostics written to stderr.
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print the resolved environment as `KEY=VALUE` lines.
    Env,

    /// Print the binds a container needs to reach the engine.
    Binds,

    /// Translate exposed ports and port mappings.
    Ports(PortsArgs),

    /// Translate volumes and volumes-from sources.
    Volumes(VolumesArgs),

    /// Verify TLS material and construct an engine client.
    Check,
}

/// Arguments for the `ports` subcommand.
#[derive(Debug, Parser)]
pub struct PortsArgs {
    /// Container port to expose without a host binding.
    #[arg(long = "expose")]
    pub expose: Vec<u16>,

    /// Port mapping in `hostPort:containerPort` or `containerPort` form.
    #[arg(long = "publish", short = 'p')]
    pub publish: Vec<String>,
}

/// Arguments for the `volumes` subcommand.
#[derive(Debug, Parser)]
pub struct VolumesArgs {
    /// Container path to declare as a volume.
    #[arg(long = "volume", short = 'v')]
    pub volumes: Vec<String>,

    /// Container to share volumes from.
    #[arg(long = "volumes-from")]
    pub volumes_from: Vec<String>,
}
