//! Container engine connection settings resolved from the environment.
//!
//! `dockenv` reads the conventional `DOCKER_*` environment variables, decides
//! where the container engine lives and whether TLS is required, checks that
//! the TLS material is actually on disk, and constructs a `Bollard` client.
//! Alongside that it translates the loose declarations users write for a
//! container (exposed ports, `host:container` port mappings, volumes,
//! volumes-from sources, host binds) into the structured parameters the
//! engine API expects.
//!
//! # Modules
//!
//! - [`config`]: Layered configuration (CLI > env > file > defaults)
//! - [`engine`]: Environment resolution, client construction, declaration translation
//! - [`error`]: Semantic error types for the library

pub mod config;
pub mod engine;
pub mod error;
