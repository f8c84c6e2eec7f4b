//! Shared fixtures and helper functions for config tests.

use std::sync::Arc;

use ortho_config::MergeComposer;
use rstest::fixture;

use crate::config::DockenvConfig;
use crate::engine::{DEFAULT_TIMEOUT_SECS, HostPolicy, SchemeRewrite};

/// Fixture providing a `DockenvConfig` parsed from a full TOML example.
#[fixture]
pub fn config_from_full_toml() -> DockenvConfig {
    let toml = r#"
        host_policy = "require"
        scheme_rewrite = "force_tcp"
        api_version = "1.41"
        connect_timeout_secs = 30
    "#;

    toml::from_str(toml).expect("TOML parsing should succeed")
}

/// Fixture providing a `DockenvConfig` parsed from a minimal TOML example.
#[fixture]
pub fn config_from_partial_toml() -> DockenvConfig {
    let toml = r#"
        api_version = "1.24"
    "#;

    toml::from_str(toml).expect("TOML parsing should succeed")
}

/// Helper: Creates a `MergeComposer` with defaults layer already pushed.
pub fn create_composer_with_defaults() -> Result<MergeComposer, serde_json::Error> {
    let mut composer = MergeComposer::new();
    let defaults = ortho_config::serde_json::to_value(DockenvConfig::default())?;
    composer.push_defaults(defaults);
    Ok(composer)
}

/// Helper: Merges layers from a composer into `DockenvConfig`.
pub fn merge_config(
    composer: MergeComposer,
) -> Result<DockenvConfig, Arc<ortho_config::OrthoError>> {
    DockenvConfig::merge_from_layers(composer.layers())
}

/// Helper: Asserts that a config has all default values.
pub fn assert_config_has_defaults(config: &DockenvConfig) {
    assert_eq!(
        config.host_policy,
        HostPolicy::DefaultSocket,
        "host_policy should be DefaultSocket"
    );
    assert_eq!(
        config.scheme_rewrite,
        SchemeRewrite::NormaliseHttp,
        "scheme_rewrite should be NormaliseHttp"
    );
    assert!(config.api_version.is_none(), "api_version should be None");
    assert_eq!(
        config.connect_timeout_secs, DEFAULT_TIMEOUT_SECS,
        "connect_timeout_secs should be the default"
    );
}
