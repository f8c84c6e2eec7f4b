//! Translation of container declarations into engine request parameters.
//!
//! Users describe a container with a few loose declarations: ports to
//! expose, `host:container` port mappings, volume paths, containers to share
//! volumes from, and host paths to bind. The functions here convert those
//! into the shapes `Bollard` expects in `ContainerCreateBody` and
//! `HostConfig`. They are pure and keep "nothing declared" (`None`) distinct
//! from an empty but present value, because the engine treats the two
//! differently.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

use bollard::models::PortBinding;
use tracing::debug;

use super::environment::HostVolumeMapping;
use crate::error::{DeclarationError, Result};

/// Access mode suffix appended to every bind.
const BIND_MODE: &str = "rw";

/// A container-side port, always recorded as TCP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ExposedPort(u16);

impl ExposedPort {
    /// A TCP port.
    #[must_use]
    pub const fn tcp(port: u16) -> Self {
        Self(port)
    }

    /// The port number.
    #[must_use]
    pub const fn port(self) -> u16 {
        self.0
    }
}

impl fmt::Display for ExposedPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/tcp", self.0)
    }
}

/// Declared ports and their host bindings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PortDeclarations {
    /// Every port the container declares, deduplicated.
    pub exposed: BTreeSet<ExposedPort>,

    /// Host bindings for ports declared through `host:container` specs.
    ///
    /// A binding with no host port asks the engine to auto-assign one.
    pub bindings: BTreeMap<ExposedPort, Vec<PortBinding>>,
}

impl PortDeclarations {
    /// Port keys in the engine's `<port>/<protocol>` form.
    #[must_use]
    pub fn exposed_port_keys(&self) -> Vec<String> {
        self.exposed.iter().map(ToString::to_string).collect()
    }

    /// Bindings in the shape of `HostConfig.port_bindings`.
    #[must_use]
    pub fn host_port_bindings(&self) -> HashMap<String, Option<Vec<PortBinding>>> {
        self.bindings
            .iter()
            .map(|(port, bindings)| (port.to_string(), Some(bindings.clone())))
            .collect()
    }
}

/// Translate exposed ports and port specifications.
///
/// Each spec is split on `:`. The last segment is the container port; in a
/// two-part spec a non-empty first segment is the host port. Specs such as
/// `80` or `:80` produce a binding with no host port, which the engine
/// auto-assigns. Ports named in both inputs are recorded once, with the
/// binding from `specs`.
///
/// Returns `Ok(None)` when both inputs are empty.
///
/// # Errors
///
/// Returns `DeclarationError::InvalidPortSpec` when a port segment is not a
/// number in the TCP port range.
pub fn translate_ports<S: AsRef<str>>(
    expose: &[u16],
    specs: &[S],
) -> Result<Option<PortDeclarations>> {
    if expose.is_empty() && specs.is_empty() {
        return Ok(None);
    }

    let mut declarations = PortDeclarations::default();
    declarations
        .exposed
        .extend(expose.iter().copied().map(ExposedPort::tcp));

    for spec in specs {
        let (port, binding) = parse_port_spec(spec.as_ref())?;
        declarations.exposed.insert(port);
        declarations.bindings.insert(port, vec![binding]);
    }

    debug!(
        exposed = declarations.exposed.len(),
        bound = declarations.bindings.len(),
        "translated port declarations"
    );
    Ok(Some(declarations))
}

fn parse_port_spec(spec: &str) -> Result<(ExposedPort, PortBinding)> {
    let segments: Vec<&str> = spec.split(':').collect();
    let invalid = || DeclarationError::InvalidPortSpec {
        spec: spec.to_owned(),
    };

    let container_port = segments.last().copied().unwrap_or_default();
    let host_port = match segments.as_slice() {
        [host, _] if !host.is_empty() => {
            Some(host.parse::<u16>().map_err(|_| invalid())?.to_string())
        }
        _ => None,
    };
    let port = container_port.parse::<u16>().map_err(|_| invalid())?;

    Ok((
        ExposedPort::tcp(port),
        PortBinding {
            host_ip: None,
            host_port,
        },
    ))
}

/// Deduplicate volume paths.
///
/// Returns `None` for an empty input rather than an empty set.
#[must_use]
pub fn translate_volumes<S: AsRef<str>>(paths: &[S]) -> Option<BTreeSet<String>> {
    if paths.is_empty() {
        return None;
    }
    Some(paths.iter().map(|path| path.as_ref().to_owned()).collect())
}

/// Join volumes-from sources with `,`.
///
/// Always returns a value; an empty input yields an empty string.
#[must_use]
pub fn translate_volumes_from<S: AsRef<str>>(sources: &[S]) -> String {
    sources
        .iter()
        .map(|source| source.as_ref())
        .collect::<Vec<&str>>()
        .join(",")
}

/// Render host-to-container mappings as `host:container:rw` binds.
///
/// Returns `None` for an absent or empty mapping. Order follows the
/// mapping's iteration order, which is unspecified.
#[must_use]
pub fn translate_binds(mapping: Option<&HostVolumeMapping>) -> Option<Vec<String>> {
    let entries = mapping.filter(|entries| !entries.is_empty())?;
    Some(
        entries
            .iter()
            .map(|(host, container)| format!("{host}:{container}:{BIND_MODE}"))
            .collect(),
    )
}
