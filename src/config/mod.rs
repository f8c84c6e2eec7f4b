//! Configuration system for dockenv.
//!
//! This module provides the configuration structures and CLI definitions for
//! dockenv. Loading and precedence merging is handled by the `ortho_config`
//! crate: CLI flags override environment variables, which override
//! configuration files, which override defaults.
//!
//! The configuration file is expected at `~/.config/dockenv/config.toml` by
//! default.
//!
//! # Example Configuration
//!
//! ```toml
//! host_policy = "require"
//! scheme_rewrite = "force_tcp"
//! api_version = "1.41"
//! connect_timeout_secs = 30
//! ```

mod cli;
mod loader;
mod types;

#[cfg(test)]
mod tests;

pub use cli::{Cli, Commands, PortsArgs, VolumesArgs};
pub use loader::{env_var_names, load_config};
pub use types::DockenvConfig;
