//! Given and When step definitions for environment resolution BDD tests.

use std::sync::Arc;

use camino::Utf8Path;
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use dockenv::engine::{
    ApiVersion, ClientBuilder, EnvironmentResolver, EnvironmentSnapshot, HostPolicy,
};
use rstest_bdd_macros::{given, when};

use super::state::{BuildOutcome, EnvironmentResolutionState, ResolutionOutcome, StepResult};

fn set_var(state: &EnvironmentResolutionState, name: &str, value: &str) {
    let mut vars = state.env_vars.get().unwrap_or_default();
    vars.retain(|(existing, _)| existing != name);
    vars.push((String::from(name), String::from(value)));
    state.env_vars.set(vars);
}

fn snapshot(state: &EnvironmentResolutionState) -> EnvironmentSnapshot {
    EnvironmentSnapshot::from_pairs(state.env_vars.get().unwrap_or_default())
}

fn resolver(state: &EnvironmentResolutionState) -> EnvironmentResolver {
    EnvironmentResolver::new(state.host_policy.get().unwrap_or_default())
}

#[given("DOCKER_HOST is set to {value}")]
fn docker_host_is_set_to(environment_resolution_state: &EnvironmentResolutionState, value: String) {
    set_var(environment_resolution_state, "DOCKER_HOST", &value);
}

#[given("DOCKER_HOST is empty")]
fn docker_host_is_empty(environment_resolution_state: &EnvironmentResolutionState) {
    set_var(environment_resolution_state, "DOCKER_HOST", "");
}

#[given("DOCKER_HOST is not set")]
#[expect(
    unused_variables,
    reason = "rstest-bdd requires parameter to match fixture name"
)]
fn docker_host_is_not_set(environment_resolution_state: &EnvironmentResolutionState) {
    // Variables absent from the state are unset.
}

#[given("DOCKER_TLS_VERIFY is set to {value}")]
fn tls_verify_is_set_to(environment_resolution_state: &EnvironmentResolutionState, value: String) {
    set_var(environment_resolution_state, "DOCKER_TLS_VERIFY", &value);
}

#[given("DOCKER_CERT_PATH is set to {value}")]
fn cert_path_is_set_to(environment_resolution_state: &EnvironmentResolutionState, value: String) {
    set_var(environment_resolution_state, "DOCKER_CERT_PATH", &value);
}

#[given("HOME is set to {value}")]
fn home_is_set_to(environment_resolution_state: &EnvironmentResolutionState, value: String) {
    set_var(environment_resolution_state, "HOME", &value);
}

#[given("the host policy requires DOCKER_HOST")]
fn host_policy_requires_host(environment_resolution_state: &EnvironmentResolutionState) {
    environment_resolution_state
        .host_policy
        .set(HostPolicy::Require);
}

#[given("a certificate directory containing only cert.pem")]
fn certificate_directory_with_cert_only(
    environment_resolution_state: &EnvironmentResolutionState,
) -> StepResult<()> {
    let tmp = tempfile::tempdir().map_err(|e| format!("should create temp dir: {e}"))?;
    let tmp_path = Utf8Path::from_path(tmp.path())
        .ok_or_else(|| String::from("temp dir path should be UTF-8"))?
        .to_owned();
    let dir = Dir::open_ambient_dir(&tmp_path, ambient_authority())
        .map_err(|e| format!("should open temp dir: {e}"))?;
    dir.write("cert.pem", "certificate")
        .map_err(|e| format!("should write cert.pem: {e}"))?;

    set_var(
        environment_resolution_state,
        "DOCKER_CERT_PATH",
        tmp_path.as_str(),
    );
    environment_resolution_state.cert_dir.set(Arc::new(tmp));
    Ok(())
}

#[when("the environment is resolved")]
fn environment_is_resolved(environment_resolution_state: &EnvironmentResolutionState) {
    let outcome = match resolver(environment_resolution_state)
        .resolve(&snapshot(environment_resolution_state))
    {
        Ok(environment) => ResolutionOutcome::Resolved(environment),
        Err(error) => ResolutionOutcome::Failed {
            message: error.to_string(),
        },
    };
    environment_resolution_state.resolution.set(outcome);
}

#[when("the engine client is built")]
fn engine_client_is_built(
    environment_resolution_state: &EnvironmentResolutionState,
) -> StepResult<()> {
    let environment = resolver(environment_resolution_state)
        .resolve(&snapshot(environment_resolution_state))
        .map_err(|e| format!("resolution should succeed: {e}"))?;
    let outcome = match ClientBuilder::new().build(&environment, ApiVersion::default()) {
        Ok(_) => BuildOutcome::Built,
        Err(error) => BuildOutcome::Failed {
            message: error.to_string(),
        },
    };
    environment_resolution_state.build.set(outcome);
    Ok(())
}
