//! Container engine connection settings and request parameters.
//!
//! Three steps, none of which share mutable state:
//!
//! 1. [`EnvironmentResolver`] turns an [`EnvironmentSnapshot`] of
//!    `DOCKER_HOST`, `DOCKER_TLS_VERIFY`, `DOCKER_CERT_PATH` and `HOME` into
//!    a [`ConnectionEnvironment`].
//! 2. [`ClientBuilder`] verifies the TLS material that environment implies
//!    and constructs a `Bollard` client.
//! 3. The `translate_*` functions convert port, volume and bind declarations
//!    into engine request parameters.

mod client;
mod declarations;
mod environment;

pub use client::{
    AmbientProbe, ApiVersion, CA_FILE, CERT_FILE, ClientBuilder, DEFAULT_TIMEOUT_SECS, KEY_FILE,
    PathProbe, SchemeRewrite, TlsMaterial,
};
pub use declarations::{
    ExposedPort, PortDeclarations, translate_binds, translate_ports, translate_volumes,
    translate_volumes_from,
};
pub use environment::{
    ConnectionEnvironment, DEFAULT_HOST, DOCKER_CERT_PATH, DOCKER_HOST, DOCKER_TLS_VERIFY,
    EnvironmentResolver, EnvironmentSnapshot, HOME, HostPolicy, HostVolumeMapping,
    tls_verify_enabled,
};
