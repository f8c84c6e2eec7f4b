//! Container engine client construction.
//!
//! This module turns a resolved [`ConnectionEnvironment`] into a `Bollard`
//! client handle. Without TLS the host address is classified by scheme and
//! connected over a socket or plain HTTP. With TLS the certificate directory
//! and its three PEM files are checked eagerly, in a fixed order, before the
//! client is constructed, so a misconfigured machine reports the exact file
//! that is missing.
//!
//! No network I/O happens here; connection failures surface when the handle
//! is first used.

mod probe;

use std::fmt;

use bollard::{ClientVersion, Docker};
use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

pub use probe::{AmbientProbe, PathProbe};

use super::environment::ConnectionEnvironment;
use crate::error::{ClientError, DockenvError, FilesystemError, Result};

/// Connection timeout in seconds for engine API requests.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Client certificate file name inside the certificate directory.
pub const CERT_FILE: &str = "cert.pem";

/// Client key file name inside the certificate directory.
pub const KEY_FILE: &str = "key.pem";

/// Certificate authority file name inside the certificate directory.
pub const CA_FILE: &str = "ca.pem";

const SCHEME_SEPARATOR: &str = "://";
const TLS_SCHEME: &str = "tcp";

/// How the host scheme is rewritten before a TLS client is constructed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemeRewrite {
    /// Rewrite HTTP-like schemes (`http`, `https`) to `tcp`; keep any other
    /// scheme as given.
    #[default]
    NormaliseHttp,

    /// Rewrite every scheme to `tcp`.
    ForceTcp,
}

impl SchemeRewrite {
    /// Apply the rewrite to a `scheme://rest` host address.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::InvalidHostFormat` unless splitting `host` on
    /// `://` yields exactly two parts.
    pub fn apply(self, host: &str) -> Result<String> {
        let mut parts = host.split(SCHEME_SEPARATOR);
        let (Some(scheme), Some(rest), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(ClientError::InvalidHostFormat {
                host: host.to_owned(),
            }
            .into());
        };

        let rewritten_scheme = match self {
            Self::NormaliseHttp if !scheme.starts_with("http") => scheme,
            Self::NormaliseHttp | Self::ForceTcp => TLS_SCHEME,
        };
        Ok(format!("{rewritten_scheme}{SCHEME_SEPARATOR}{rest}"))
    }
}

/// An engine API version of the form `major.minor`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiVersion {
    major: usize,
    minor: usize,
}

impl ApiVersion {
    /// Creates a version from its components.
    #[must_use]
    pub const fn new(major: usize, minor: usize) -> Self {
        Self { major, minor }
    }

    /// Parse a `major.minor` string such as `1.41`.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::InvalidApiVersion` when the string is not two
    /// dot-separated unsigned integers.
    pub fn parse(version: &str) -> Result<Self> {
        let invalid = || ClientError::InvalidApiVersion {
            version: version.to_owned(),
        };
        let (major, minor) = version.trim().split_once('.').ok_or_else(invalid)?;
        Ok(Self {
            major: major.parse().map_err(|_| invalid())?,
            minor: minor.parse().map_err(|_| invalid())?,
        })
    }

    /// The equivalent `Bollard` client version.
    #[must_use]
    pub const fn client_version(self) -> ClientVersion {
        ClientVersion {
            major_version: self.major,
            minor_version: self.minor,
        }
    }
}

impl Default for ApiVersion {
    fn default() -> Self {
        Self::new(
            bollard::API_DEFAULT_VERSION.major_version,
            bollard::API_DEFAULT_VERSION.minor_version,
        )
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// The three PEM files of a verified certificate directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsMaterial {
    /// Client certificate.
    pub cert: Utf8PathBuf,
    /// Client private key.
    pub key: Utf8PathBuf,
    /// Certificate authority.
    pub ca: Utf8PathBuf,
}

/// Classifies socket endpoint types for connection handling.
enum SocketType {
    /// Unix socket or Windows named pipe with explicit scheme.
    Socket,
    /// HTTP, HTTPS, or TCP endpoint (TCP is rewritten to HTTP).
    Http,
    /// Bare path without scheme prefix.
    BarePath,
}

impl SocketType {
    fn is_socket_scheme(socket: &str) -> bool {
        socket.starts_with("unix://") || socket.starts_with("npipe://")
    }

    fn is_http_scheme(socket: &str) -> bool {
        socket.starts_with("tcp://")
            || socket.starts_with("http://")
            || socket.starts_with("https://")
    }

    fn classify(socket: &str) -> Self {
        match (Self::is_socket_scheme(socket), Self::is_http_scheme(socket)) {
            (true, _) => Self::Socket,
            (_, true) => Self::Http,
            _ => Self::BarePath,
        }
    }
}

/// Builds `Bollard` clients from a [`ConnectionEnvironment`].
///
/// # Example
///
/// ```ignore
/// use dockenv::engine::{ApiVersion, ClientBuilder, EnvironmentResolver, EnvironmentSnapshot};
/// use mockable::DefaultEnv;
///
/// let snapshot = EnvironmentSnapshot::capture(&DefaultEnv::new());
/// let environment = EnvironmentResolver::default().resolve(&snapshot)?;
/// let docker = ClientBuilder::new().build(&environment, ApiVersion::default())?;
/// ```
#[derive(Debug, Clone)]
pub struct ClientBuilder<P: PathProbe = AmbientProbe> {
    probe: P,
    scheme_rewrite: SchemeRewrite,
    timeout_secs: u64,
}

impl ClientBuilder<AmbientProbe> {
    /// Creates a builder that checks the real filesystem.
    #[must_use]
    pub const fn new() -> Self {
        Self::with_probe(AmbientProbe)
    }
}

impl Default for ClientBuilder<AmbientProbe> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: PathProbe> ClientBuilder<P> {
    /// Creates a builder using `probe` for certificate existence checks.
    #[must_use]
    pub const fn with_probe(probe: P) -> Self {
        Self {
            probe,
            scheme_rewrite: SchemeRewrite::NormaliseHttp,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Sets the scheme rewrite applied to TLS hosts.
    #[must_use]
    pub const fn scheme_rewrite(mut self, scheme_rewrite: SchemeRewrite) -> Self {
        self.scheme_rewrite = scheme_rewrite;
        self
    }

    /// Sets the request timeout passed to the client.
    #[must_use]
    pub const fn timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Construct a client for `environment` speaking `api_version`.
    ///
    /// Without TLS no filesystem checks are made. With TLS the host scheme is
    /// rewritten and the certificate material verified before construction.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::InvalidHostFormat` if a TLS host lacks a scheme.
    ///
    /// Returns `ClientError::CertificateMissing` naming the first missing
    /// certificate path.
    ///
    /// Returns `FilesystemError::IoError` if an existence check fails for a
    /// reason other than not-found.
    ///
    /// Returns `ClientError::ConnectionFailed` if `Bollard` rejects the
    /// configuration.
    pub fn build(
        &self,
        environment: &ConnectionEnvironment,
        api_version: ApiVersion,
    ) -> Result<Docker> {
        let client_version = api_version.client_version();
        let Some(cert_path) = environment.cert_path() else {
            info!(host = environment.host(), %api_version, "constructing engine client");
            return self.connect_plain(environment.host(), &client_version);
        };

        let host = self.tls_host(environment.host())?;
        let material = self.verify_tls_material(cert_path)?;
        info!(%host, %cert_path, %api_version, "constructing TLS engine client");
        Docker::connect_with_ssl(
            &host,
            material.key.as_std_path(),
            material.cert.as_std_path(),
            material.ca.as_std_path(),
            self.timeout_secs,
            &client_version,
        )
        .map_err(|e| connection_failed(&e))
    }

    /// The host address a TLS client is bound to after scheme rewriting.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::InvalidHostFormat` if `host` lacks a scheme.
    pub fn tls_host(&self, host: &str) -> Result<String> {
        self.scheme_rewrite.apply(host)
    }

    /// Check the certificate directory, then `cert.pem`, `key.pem` and
    /// `ca.pem`, stopping at the first missing path.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::CertificateMissing` for the first missing path,
    /// or `FilesystemError::IoError` if a check fails for another reason.
    pub fn verify_tls_material(&self, cert_path: &Utf8Path) -> Result<TlsMaterial> {
        let material = TlsMaterial {
            cert: cert_path.join(CERT_FILE),
            key: cert_path.join(KEY_FILE),
            ca: cert_path.join(CA_FILE),
        };
        for path in [
            cert_path,
            material.cert.as_path(),
            material.key.as_path(),
            material.ca.as_path(),
        ] {
            self.require_exists(path)?;
        }
        Ok(material)
    }

    fn require_exists(&self, path: &Utf8Path) -> Result<()> {
        let exists = self
            .probe
            .exists(path)
            .map_err(|e| FilesystemError::IoError {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        if exists {
            Ok(())
        } else {
            debug!(%path, "certificate path missing");
            Err(ClientError::CertificateMissing {
                path: path.to_path_buf(),
            }
            .into())
        }
    }

    fn connect_plain(&self, host: &str, client_version: &ClientVersion) -> Result<Docker> {
        match SocketType::classify(host) {
            SocketType::Socket => {
                Docker::connect_with_socket(host, self.timeout_secs, client_version)
            }
            SocketType::Http => {
                // Rewrite tcp:// to http:// for Bollard compatibility
                let http_host = if host.starts_with("tcp://") {
                    host.replacen("tcp://", "http://", 1)
                } else {
                    host.to_owned()
                };
                Docker::connect_with_http(&http_host, self.timeout_secs, client_version)
            }
            SocketType::BarePath => Docker::connect_with_socket(
                &normalize_bare_path(host),
                self.timeout_secs,
                client_version,
            ),
        }
        .map_err(|e| connection_failed(&e))
    }
}

/// Prefix a bare socket path with the scheme its syntax implies.
///
/// Paths starting with `\\` or `//` are Windows named pipes; everything else
/// is a Unix socket.
fn normalize_bare_path(path: &str) -> String {
    if path.starts_with("\\\\") || path.starts_with("//") {
        format!("npipe://{path}")
    } else {
        format!("unix://{path}")
    }
}

fn connection_failed(error: &bollard::errors::Error) -> DockenvError {
    ClientError::ConnectionFailed {
        message: error.to_string(),
    }
    .into()
}
