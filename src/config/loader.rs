//! Configuration loading with layered precedence.
//!
//! Layers, lowest to highest: application defaults, configuration file,
//! `DOCKENV_*` environment variables, command-line arguments. The layers are
//! composed by hand with `MergeComposer` because the `Cli` struct owns
//! subcommand dispatch, and because typed environment values must fail fast
//! instead of being silently ignored.
//!
//! # Environment Variable Handling
//!
//! String fields (`DOCKENV_API_VERSION`) are always accepted. Typed fields
//! (`DOCKENV_CONNECT_TIMEOUT_SECS`) and enumerations (`DOCKENV_HOST_POLICY`,
//! `DOCKENV_SCHEME_REWRITE`) must hold a valid value or loading fails with a
//! clear error.

use camino::Utf8PathBuf;
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use ortho_config::discovery::ConfigDiscovery;
use ortho_config::serde_json::{self, Map, Value};
use ortho_config::{MergeComposer, toml};
use tracing::debug;

use crate::config::{Cli, DockenvConfig};
use crate::error::{ConfigError, Result};

/// The type of value expected from an environment variable.
#[derive(Clone, Copy)]
enum EnvVarType {
    /// String value (always accepted).
    String,
    /// Unsigned 64-bit integer. Invalid values return an error.
    U64,
    /// One of a fixed set of names. Invalid values return an error.
    Choice(&'static [&'static str]),
}

/// Specification for a single environment variable mapping.
struct EnvVarSpec {
    /// The environment variable name (e.g., `DOCKENV_HOST_POLICY`).
    env_var: &'static str,
    /// The configuration field the value is stored in.
    field: &'static str,
    /// The expected value type.
    var_type: EnvVarType,
}

/// Table of all environment variables and their configuration fields.
const ENV_VAR_SPECS: &[EnvVarSpec] = &[
    EnvVarSpec {
        env_var: "DOCKENV_HOST_POLICY",
        field: "host_policy",
        var_type: EnvVarType::Choice(&["default_socket", "require"]),
    },
    EnvVarSpec {
        env_var: "DOCKENV_SCHEME_REWRITE",
        field: "scheme_rewrite",
        var_type: EnvVarType::Choice(&["normalise_http", "force_tcp"]),
    },
    EnvVarSpec {
        env_var: "DOCKENV_API_VERSION",
        field: "api_version",
        var_type: EnvVarType::String,
    },
    EnvVarSpec {
        env_var: "DOCKENV_CONNECT_TIMEOUT_SECS",
        field: "connect_timeout_secs",
        var_type: EnvVarType::U64,
    },
];

/// Returns the list of environment variable names recognised by the loader.
///
/// Tests use this to clear every `DOCKENV_*` variable without keeping a
/// second list in sync.
#[must_use]
pub fn env_var_names() -> Vec<&'static str> {
    ENV_VAR_SPECS.iter().map(|spec| spec.env_var).collect()
}

/// Load a configuration file and push it to the composer.
///
/// Uses `cap_std::fs_utf8`: the parent directory is opened with ambient
/// authority and the file read relative to it.
fn load_config_file(path: &Utf8PathBuf, composer: &mut MergeComposer) -> Result<()> {
    let current_dir = Utf8PathBuf::from(".");
    let parent = path
        .parent()
        .filter(|parent| !parent.as_str().is_empty())
        .unwrap_or_else(|| current_dir.as_ref());
    let file_name = path.file_name().unwrap_or(path.as_str());

    let dir = Dir::open_ambient_dir(parent, ambient_authority()).map_err(|e| {
        ConfigError::ParseError {
            message: format!("failed to open directory {parent}: {e}"),
        }
    })?;

    let content = dir
        .read_to_string(file_name)
        .map_err(|e| ConfigError::ParseError {
            message: format!("failed to read {path}: {e}"),
        })?;

    let value =
        toml::from_str::<serde_json::Value>(&content).map_err(|e| ConfigError::ParseError {
            message: format!("failed to parse {path}: {e}"),
        })?;

    debug!(%path, "loaded configuration file");
    composer.push_file(value, Some(path.clone()));
    Ok(())
}

/// Load configuration with full layer precedence.
///
/// 1. Application defaults
/// 2. Configuration file (`--config`, or discovered via `DOCKENV_CONFIG_PATH`
///    and XDG paths)
/// 3. `DOCKENV_*` environment variables read from `env`
/// 4. Command-line arguments
///
/// # Errors
///
/// Returns `ConfigError` if a configuration file is malformed, a typed
/// environment variable has an invalid value, or the merged layers fail to
/// deserialise.
pub fn load_config<E: mockable::Env>(cli: &Cli, env: &E) -> Result<DockenvConfig> {
    let mut composer = MergeComposer::new();

    let defaults =
        serde_json::to_value(DockenvConfig::default()).map_err(|e| ConfigError::ParseError {
            message: format!("failed to serialise defaults: {e}"),
        })?;
    composer.push_defaults(defaults);

    let config_path: Option<Utf8PathBuf> =
        cli.config.clone().filter(|p| p.exists()).or_else(|| {
            let discovery = ConfigDiscovery::builder("dockenv")
                .env_var("DOCKENV_CONFIG_PATH")
                .config_file_name("config.toml")
                .dotfile_name(".dockenv.toml")
                .build();
            discovery
                .candidates()
                .into_iter()
                .filter(|p| p.exists())
                .find_map(|p| Utf8PathBuf::try_from(p).ok())
        });

    if let Some(ref path) = config_path {
        load_config_file(path, &mut composer)?;
    }

    let env_values = collect_env_vars(env)?;
    if !env_values.is_null() {
        composer.push_environment(env_values);
    }

    let cli_overrides = build_cli_overrides(cli);
    if !cli_overrides.is_null() {
        composer.push_cli(cli_overrides);
    }

    let config =
        DockenvConfig::merge_from_layers(composer.layers()).map_err(ConfigError::OrthoConfig)?;

    Ok(config)
}

/// Collect `DOCKENV_*` environment variables into a JSON value.
///
/// # Errors
///
/// Returns `ConfigError::InvalidValue` if a typed variable has an
/// unparseable value.
fn collect_env_vars<E: mockable::Env>(env: &E) -> Result<Value> {
    let mut root = Map::new();

    for spec in ENV_VAR_SPECS {
        let Some(raw_value) = env.string(spec.env_var) else {
            continue;
        };

        let json_value = match spec.var_type {
            EnvVarType::String => Value::String(raw_value),
            EnvVarType::U64 => match raw_value.parse::<u64>() {
                Ok(n) => Value::Number(n.into()),
                Err(_) => {
                    return Err(ConfigError::InvalidValue {
                        field: spec.env_var.to_owned(),
                        reason: format!("expected unsigned integer, got '{raw_value}'"),
                    }
                    .into());
                }
            },
            EnvVarType::Choice(choices) => {
                if !choices.contains(&raw_value.as_str()) {
                    return Err(ConfigError::InvalidValue {
                        field: spec.env_var.to_owned(),
                        reason: format!(
                            "expected one of {}, got '{raw_value}'",
                            choices.join(", ")
                        ),
                    }
                    .into());
                }
                Value::String(raw_value)
            }
        };

        root.insert(spec.field.to_owned(), json_value);
    }

    if root.is_empty() {
        Ok(Value::Null)
    } else {
        Ok(Value::Object(root))
    }
}

/// Build a JSON value containing CLI overrides.
fn build_cli_overrides(cli: &Cli) -> Value {
    let mut overrides = Map::new();

    if let Some(ref api_version) = cli.api_version {
        overrides.insert(
            "api_version".to_owned(),
            Value::String(api_version.clone()),
        );
    }

    if overrides.is_empty() {
        Value::Null
    } else {
        Value::Object(overrides)
    }
}
