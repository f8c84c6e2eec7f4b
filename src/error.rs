//! Semantic error types for the dockenv library.
//!
//! Conditions a caller might inspect (a missing certificate, a malformed port
//! specification) are modelled as `thiserror` enums grouped by concern. Opaque
//! `eyre::Report` values are reserved for the binary boundary.

use std::sync::Arc;

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors that can occur while loading configuration or resolving the
/// connection environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A configuration file could not be read or parsed.
    #[error("failed to parse configuration file: {message}")]
    ParseError {
        /// A description of the parse error.
        message: String,
    },

    /// A required configuration value is missing and no default applies.
    #[error("missing required configuration: {field}")]
    MissingRequired {
        /// The name of the missing field or environment variable.
        field: String,
    },

    /// A configuration value failed validation.
    #[error("invalid configuration value for '{field}': {reason}")]
    InvalidValue {
        /// The name of the invalid field.
        field: String,
        /// The reason the value is invalid.
        reason: String,
    },

    /// The `OrthoConfig` library returned an error while merging layers.
    #[error("configuration loading failed: {0}")]
    OrthoConfig(Arc<ortho_config::OrthoError>),
}

/// Errors that can occur while constructing a container engine client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The host address does not split into a scheme and a remainder.
    #[error("could not split host '{host}' into two parts by '://'")]
    InvalidHostFormat {
        /// The offending host address.
        host: String,
    },

    /// A certificate directory or file required for TLS does not exist.
    #[error("certificate path does not exist: {path}")]
    CertificateMissing {
        /// The first missing path, in check order.
        path: Utf8PathBuf,
    },

    /// The requested engine API version is not of the form `major.minor`.
    #[error("invalid engine API version '{version}'")]
    InvalidApiVersion {
        /// The version string as supplied.
        version: String,
    },

    /// The engine client library refused to construct a client handle.
    #[error("failed to construct container engine client: {message}")]
    ConnectionFailed {
        /// A description of the construction failure.
        message: String,
    },
}

/// Errors that can occur while translating container declarations.
#[derive(Debug, Error)]
pub enum DeclarationError {
    /// A port specification is not numeric or has the wrong shape.
    #[error("invalid port specification '{spec}'")]
    InvalidPortSpec {
        /// The raw specification as supplied.
        spec: String,
    },
}

/// Errors that can occur during filesystem operations.
#[derive(Debug, Error)]
pub enum FilesystemError {
    /// An I/O error other than "not found" occurred.
    #[error("I/O error at '{path}': {message}")]
    IoError {
        /// The path where the error occurred.
        path: Utf8PathBuf,
        /// A description of the I/O error.
        message: String,
    },
}

/// Top-level error type for dockenv.
///
/// Aggregates the domain-specific errors so library functions can share a
/// single `Result` alias. At the binary boundary these are converted to
/// `eyre::Report`.
#[derive(Debug, Error)]
pub enum DockenvError {
    /// An error occurred during configuration or environment resolution.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// An error occurred while constructing an engine client.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// An error occurred while translating declarations.
    #[error(transparent)]
    Declaration(#[from] DeclarationError),

    /// An error occurred during filesystem operations.
    #[error(transparent)]
    Filesystem(#[from] FilesystemError),
}

/// A specialised `Result` type for dockenv operations.
pub type Result<T> = std::result::Result<T, DockenvError>;
