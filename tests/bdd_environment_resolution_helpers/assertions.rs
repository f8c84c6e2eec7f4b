//! Then step definitions for environment resolution BDD tests.

use dockenv::engine::{ConnectionEnvironment, translate_binds};
use rstest_bdd_macros::then;

use super::state::{BuildOutcome, EnvironmentResolutionState, ResolutionOutcome, StepResult};

fn resolved(state: &EnvironmentResolutionState) -> StepResult<ConnectionEnvironment> {
    match state.resolution.get() {
        Some(ResolutionOutcome::Resolved(environment)) => Ok(environment),
        Some(ResolutionOutcome::Failed { message }) => {
            Err(format!("expected resolution to succeed, got: {message}"))
        }
        None => Err(String::from("resolution outcome should be set")),
    }
}

#[then("the resolved host is {expected}")]
fn resolved_host_is(
    environment_resolution_state: &EnvironmentResolutionState,
    expected: String,
) -> StepResult<()> {
    let environment = resolved(environment_resolution_state)?;
    assert_eq!(environment.host(), expected);
    Ok(())
}

#[then("TLS verification is disabled")]
fn tls_is_disabled(environment_resolution_state: &EnvironmentResolutionState) -> StepResult<()> {
    let environment = resolved(environment_resolution_state)?;
    assert!(!environment.tls_verify(), "TLS should be disabled");
    assert!(environment.cert_path().is_none());
    Ok(())
}

#[then("TLS verification is enabled")]
fn tls_is_enabled(environment_resolution_state: &EnvironmentResolutionState) -> StepResult<()> {
    let environment = resolved(environment_resolution_state)?;
    assert!(environment.tls_verify(), "TLS should be enabled");
    Ok(())
}

#[then("the certificate path is {expected}")]
fn certificate_path_is(
    environment_resolution_state: &EnvironmentResolutionState,
    expected: String,
) -> StepResult<()> {
    let environment = resolved(environment_resolution_state)?;
    assert_eq!(
        environment.cert_path().map(camino::Utf8Path::as_str),
        Some(expected.as_str())
    );
    Ok(())
}

#[then("the container environment is {expected}")]
fn container_environment_is(
    environment_resolution_state: &EnvironmentResolutionState,
    expected: String,
) -> StepResult<()> {
    let environment = resolved(environment_resolution_state)?;
    let expected: Vec<&str> = expected.split(',').collect();
    assert_eq!(environment.environment_variables(), expected);
    Ok(())
}

#[then("the container binds include {bind}")]
fn container_binds_include(
    environment_resolution_state: &EnvironmentResolutionState,
    bind: String,
) -> StepResult<()> {
    let environment = resolved(environment_resolution_state)?;
    let binds = translate_binds(environment.host_volume_bindings().as_ref())
        .ok_or_else(|| String::from("binds should be present"))?;
    assert!(binds.contains(&bind), "{bind} missing from {binds:?}");
    Ok(())
}

#[then("resolution fails with {expected}")]
fn resolution_fails_with(
    environment_resolution_state: &EnvironmentResolutionState,
    expected: String,
) -> StepResult<()> {
    match environment_resolution_state.resolution.get() {
        Some(ResolutionOutcome::Failed { message }) => {
            assert_eq!(message, expected);
            Ok(())
        }
        Some(ResolutionOutcome::Resolved(environment)) => {
            Err(format!("expected resolution to fail, got {environment:?}"))
        }
        None => Err(String::from("resolution outcome should be set")),
    }
}

#[then("the build fails naming {file}")]
fn build_fails_naming(
    environment_resolution_state: &EnvironmentResolutionState,
    file: String,
) -> StepResult<()> {
    match environment_resolution_state.build.get() {
        Some(BuildOutcome::Failed { message }) => {
            assert!(
                message.starts_with("certificate path does not exist")
                    && message.ends_with(&file),
                "unexpected message: {message}"
            );
            Ok(())
        }
        Some(BuildOutcome::Built) => Err(String::from("expected the build to fail")),
        None => Err(String::from("build outcome should be set")),
    }
}
