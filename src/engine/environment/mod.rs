//! Connection environment resolution.
//!
//! The container engine location and its TLS material are described by a
//! handful of environment variables. This module captures them into an
//! [`EnvironmentSnapshot`], resolves the snapshot into a validated
//! [`ConnectionEnvironment`], and serialises the result back into
//! `KEY=VALUE` pairs or host volume bindings for a child container.

use std::collections::{BTreeMap, HashMap};

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{ConfigError, FilesystemError, Result};

/// Environment variable naming the engine host address.
pub const DOCKER_HOST: &str = "DOCKER_HOST";

/// Environment variable enabling TLS verification.
pub const DOCKER_TLS_VERIFY: &str = "DOCKER_TLS_VERIFY";

/// Environment variable naming the TLS certificate directory.
pub const DOCKER_CERT_PATH: &str = "DOCKER_CERT_PATH";

/// Environment variable naming the user's home directory.
pub const HOME: &str = "HOME";

/// Every variable read during resolution, in capture order.
const RESOLUTION_ENV_VARS: &[&str] = &[DOCKER_HOST, DOCKER_TLS_VERIFY, DOCKER_CERT_PATH, HOME];

/// Host address used when `DOCKER_HOST` is unset and the policy allows a default.
pub const DEFAULT_HOST: &str = "unix:///var/run/docker.sock";

/// Directory below `HOME` holding the default TLS material.
const DEFAULT_CERT_DIR_NAME: &str = ".docker";

const UNIX_SCHEME_PREFIX: &str = "unix://";

/// A point-in-time copy of the environment variables used for resolution.
///
/// Empty values are treated exactly like unset variables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvironmentSnapshot {
    vars: BTreeMap<String, String>,
}

impl EnvironmentSnapshot {
    /// Capture the resolution variables from an environment provider.
    ///
    /// # Example
    ///
    /// ```ignore
    /// use mockable::DefaultEnv;
    /// use dockenv::engine::EnvironmentSnapshot;
    ///
    /// let snapshot = EnvironmentSnapshot::capture(&DefaultEnv::new());
    /// ```
    #[must_use]
    pub fn capture<E: mockable::Env>(env: &E) -> Self {
        Self::from_pairs(
            RESOLUTION_ENV_VARS
                .iter()
                .filter_map(|name| env.string(name).map(|value| (*name, value))),
        )
    }

    /// Build a snapshot from explicit name/value pairs.
    #[must_use]
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        }
    }

    /// Build a snapshot from `KEY=VALUE` assignments.
    ///
    /// Assignments without `=` are ignored. Later assignments override
    /// earlier ones, as they would in a process environment.
    #[must_use]
    pub fn from_assignments<I, S>(assignments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::from_pairs(assignments.into_iter().filter_map(|assignment| {
            assignment
                .as_ref()
                .split_once('=')
                .map(|(name, value)| (name.to_owned(), value.to_owned()))
        }))
    }

    /// Returns the value of `name` if it is set to a non-empty string.
    #[must_use]
    pub fn value(&self, name: &str) -> Option<&str> {
        self.vars
            .get(name)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }
}

/// What to do when `DOCKER_HOST` is absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostPolicy {
    /// Fall back to [`DEFAULT_HOST`].
    #[default]
    DefaultSocket,

    /// Fail with a missing-configuration error.
    Require,
}

/// Classify a `DOCKER_TLS_VERIFY` value.
///
/// Any non-empty value enables TLS, including `0` and `false`.
#[must_use]
pub const fn tls_verify_enabled(value: Option<&str>) -> bool {
    match value {
        Some(flag) => !flag.is_empty(),
        None => false,
    }
}

/// The resolved location and trust material of a container engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionEnvironment {
    host: String,
    cert_path: Option<Utf8PathBuf>,
}

impl ConnectionEnvironment {
    /// An environment without TLS.
    #[must_use]
    pub fn plain(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            cert_path: None,
        }
    }

    /// An environment with TLS verification using certificates in `cert_path`.
    #[must_use]
    pub fn tls(host: impl Into<String>, cert_path: impl Into<Utf8PathBuf>) -> Self {
        Self {
            host: host.into(),
            cert_path: Some(cert_path.into()),
        }
    }

    /// The engine host address.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Whether TLS verification is enabled.
    #[must_use]
    pub const fn tls_verify(&self) -> bool {
        self.cert_path.is_some()
    }

    /// The TLS certificate directory, present only when TLS is enabled.
    #[must_use]
    pub fn cert_path(&self) -> Option<&Utf8Path> {
        self.cert_path.as_deref()
    }

    /// The filesystem path of a `unix://` host, if any.
    #[must_use]
    pub fn unix_socket_path(&self) -> Option<&str> {
        self.host
            .strip_prefix(UNIX_SCHEME_PREFIX)
            .filter(|path| !path.is_empty())
    }

    /// Serialise the environment as `KEY=VALUE` pairs for a child process.
    ///
    /// The host always comes first. TLS variables follow only when TLS is
    /// enabled, verify flag before certificate path.
    #[must_use]
    pub fn environment_variables(&self) -> Vec<String> {
        let mut vars = vec![format!("{DOCKER_HOST}={}", self.host)];
        if let Some(cert_path) = &self.cert_path {
            vars.push(format!("{DOCKER_TLS_VERIFY}=1"));
            vars.push(format!("{DOCKER_CERT_PATH}={cert_path}"));
        }
        vars
    }

    /// Host paths a container needs mounted to reach this engine.
    ///
    /// Maps the certificate directory and the unix socket path, when present,
    /// to themselves. Returns `None` rather than an empty mapping when neither
    /// applies.
    #[must_use]
    pub fn host_volume_bindings(&self) -> Option<HostVolumeMapping> {
        let mut mapping = HostVolumeMapping::default();
        if let Some(cert_path) = &self.cert_path {
            mapping.insert(cert_path.as_str(), cert_path.as_str());
        }
        if let Some(socket_path) = self.unix_socket_path() {
            mapping.insert(socket_path, socket_path);
        }
        (!mapping.is_empty()).then_some(mapping)
    }
}

/// Host filesystem paths mapped to the paths they appear at inside a container.
///
/// Iteration order is unspecified.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostVolumeMapping {
    entries: HashMap<String, String>,
}

impl HostVolumeMapping {
    /// Map `host_path` to `container_path`, replacing any earlier mapping.
    pub fn insert(&mut self, host_path: impl Into<String>, container_path: impl Into<String>) {
        self.entries.insert(host_path.into(), container_path.into());
    }

    /// The container path mapped from `host_path`.
    #[must_use]
    pub fn get(&self, host_path: &str) -> Option<&str> {
        self.entries.get(host_path).map(String::as_str)
    }

    /// Iterate over `(host_path, container_path)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(host, container)| (host.as_str(), container.as_str()))
    }

    /// Number of mapped paths.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no paths are mapped.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for HostVolumeMapping {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(host, container)| (host.into(), container.into()))
                .collect(),
        }
    }
}

/// Resolves an [`EnvironmentSnapshot`] into a [`ConnectionEnvironment`].
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvironmentResolver {
    host_policy: HostPolicy,
}

impl EnvironmentResolver {
    /// Creates a resolver applying `host_policy` when `DOCKER_HOST` is absent.
    #[must_use]
    pub const fn new(host_policy: HostPolicy) -> Self {
        Self { host_policy }
    }

    /// Resolve the connection environment.
    ///
    /// No certificate files are checked here; that happens when a client is
    /// built, so resolution can succeed for a directory that is later found
    /// to be incomplete.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingRequired` when `DOCKER_HOST` is absent
    /// under [`HostPolicy::Require`], or when TLS is enabled and neither
    /// `DOCKER_CERT_PATH` nor `HOME` is set.
    ///
    /// Returns `FilesystemError::IoError` when the default certificate
    /// directory cannot be made absolute.
    pub fn resolve(&self, snapshot: &EnvironmentSnapshot) -> Result<ConnectionEnvironment> {
        let host = self.resolve_host(snapshot)?;

        if !tls_verify_enabled(snapshot.value(DOCKER_TLS_VERIFY)) {
            debug!(%host, "resolved engine environment without TLS");
            return Ok(ConnectionEnvironment::plain(host));
        }

        let cert_path = match snapshot.value(DOCKER_CERT_PATH) {
            Some(path) => Utf8PathBuf::from(path),
            None => default_cert_path(snapshot)?,
        };
        debug!(%host, %cert_path, "resolved engine environment with TLS");
        Ok(ConnectionEnvironment::tls(host, cert_path))
    }

    fn resolve_host(&self, snapshot: &EnvironmentSnapshot) -> Result<String> {
        if let Some(host) = snapshot.value(DOCKER_HOST) {
            return Ok(host.to_owned());
        }
        match self.host_policy {
            HostPolicy::DefaultSocket => {
                debug!(host = DEFAULT_HOST, "{DOCKER_HOST} not set, using default");
                Ok(String::from(DEFAULT_HOST))
            }
            HostPolicy::Require => Err(ConfigError::MissingRequired {
                field: String::from(DOCKER_HOST),
            }
            .into()),
        }
    }
}

/// `<HOME>/.docker`, made absolute against the working directory.
fn default_cert_path(snapshot: &EnvironmentSnapshot) -> Result<Utf8PathBuf> {
    let Some(home) = snapshot.value(HOME) else {
        warn!("{DOCKER_TLS_VERIFY} is set but neither {DOCKER_CERT_PATH} nor {HOME} is");
        return Err(ConfigError::MissingRequired {
            field: String::from(HOME),
        }
        .into());
    };

    let relative = Utf8Path::new(home).join(DEFAULT_CERT_DIR_NAME);
    let absolute =
        std::path::absolute(relative.as_std_path()).map_err(|e| FilesystemError::IoError {
            path: relative.clone(),
            message: e.to_string(),
        })?;
    Utf8PathBuf::from_path_buf(absolute).map_err(|path| {
        FilesystemError::IoError {
            path: relative,
            message: format!("absolute path is not valid UTF-8: {}", path.display()),
        }
        .into()
    })
}
