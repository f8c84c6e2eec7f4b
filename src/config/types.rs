//! Configuration data types for dockenv.

use ortho_config::{OrthoConfig, OrthoResult, PostMergeContext, PostMergeHook};
use serde::{Deserialize, Serialize};

use crate::engine::{
    ApiVersion, ClientBuilder, DEFAULT_TIMEOUT_SECS, EnvironmentResolver, HostPolicy,
    SchemeRewrite,
};
use crate::error::Result;

const fn default_connect_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

/// Root application configuration.
///
/// Loaded from configuration files, environment variables and command-line
/// arguments with layered precedence (lowest to highest): defaults,
/// configuration file, environment variables, command-line arguments.
///
/// Configuration files are discovered in this order:
/// 1. Path specified via `DOCKENV_CONFIG_PATH` environment variable
/// 2. `.dockenv.toml` in the current working directory
/// 3. `.dockenv.toml` in the home directory
/// 4. `~/.config/dockenv/config.toml` (XDG default)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(
    prefix = "DOCKENV",
    post_merge_hook,
    discovery(
        app_name = "dockenv",
        env_var = "DOCKENV_CONFIG_PATH",
        config_file_name = "config.toml",
        dotfile_name = ".dockenv.toml",
        config_cli_long = "config",
        config_cli_visible = true,
    )
)]
pub struct DockenvConfig {
    /// What to do when `DOCKER_HOST` is not set.
    #[serde(default)]
    #[ortho_config(skip_cli)]
    pub host_policy: HostPolicy,

    /// How TLS host schemes are rewritten before connecting.
    #[serde(default)]
    #[ortho_config(skip_cli)]
    pub scheme_rewrite: SchemeRewrite,

    /// Engine API version as `major.minor`; `Bollard`'s default when unset.
    pub api_version: Option<String>,

    /// Request timeout passed to the engine client.
    #[serde(default = "default_connect_timeout_secs")]
    #[ortho_config(skip_cli)]
    pub connect_timeout_secs: u64,
}

impl Default for DockenvConfig {
    fn default() -> Self {
        Self {
            host_policy: HostPolicy::default(),
            scheme_rewrite: SchemeRewrite::default(),
            api_version: None,
            connect_timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl DockenvConfig {
    /// The configured API version, or `Bollard`'s default.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::InvalidApiVersion` if the configured value is not
    /// of the form `major.minor`.
    pub fn api_version(&self) -> Result<ApiVersion> {
        match self.api_version.as_deref().map(str::trim) {
            Some(version) if !version.is_empty() => ApiVersion::parse(version),
            _ => Ok(ApiVersion::default()),
        }
    }

    /// An environment resolver honouring the configured host policy.
    #[must_use]
    pub const fn resolver(&self) -> EnvironmentResolver {
        EnvironmentResolver::new(self.host_policy)
    }

    /// A client builder honouring the configured scheme rewrite and timeout.
    #[must_use]
    pub const fn client_builder(&self) -> ClientBuilder {
        ClientBuilder::new()
            .scheme_rewrite(self.scheme_rewrite)
            .timeout_secs(self.connect_timeout_secs)
    }
}

impl PostMergeHook for DockenvConfig {
    fn post_merge(&mut self, _ctx: &PostMergeContext) -> OrthoResult<()> {
        // Blank versions come from empty environment variables; treat them as unset.
        self.api_version = self
            .api_version
            .take()
            .map(|version| version.trim().to_owned())
            .filter(|version| !version.is_empty());
        Ok(())
    }
}
