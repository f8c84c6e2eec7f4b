//! Scenario state for environment resolution BDD tests.

use std::sync::Arc;

use dockenv::engine::{ConnectionEnvironment, HostPolicy};
use rstest_bdd::Slot;
use rstest_bdd_macros::ScenarioState;
use tempfile::TempDir;

/// Convenience alias for step outcomes.
pub type StepResult<T> = Result<T, String>;

/// Outcome of resolving the scenario environment.
#[derive(Clone, Debug)]
pub enum ResolutionOutcome {
    /// Resolution produced a connection environment.
    Resolved(ConnectionEnvironment),
    /// Resolution failed with the given error message.
    Failed {
        /// The `Display` representation of the error.
        message: String,
    },
}

/// Outcome of building an engine client.
#[derive(Clone, Debug)]
pub enum BuildOutcome {
    /// A client was constructed.
    Built,
    /// Construction failed with the given error message.
    Failed {
        /// The `Display` representation of the error.
        message: String,
    },
}

/// State shared across environment resolution scenarios.
#[derive(ScenarioState)]
pub struct EnvironmentResolutionState {
    /// Variables visible to the resolver, in insertion order.
    pub(crate) env_vars: Slot<Vec<(String, String)>>,
    /// Host policy applied when `DOCKER_HOST` is absent.
    pub(crate) host_policy: Slot<HostPolicy>,
    /// Temporary certificate directory, kept alive for the scenario.
    pub(crate) cert_dir: Slot<Arc<TempDir>>,
    /// Result of the most recent resolution.
    pub(crate) resolution: Slot<ResolutionOutcome>,
    /// Result of the most recent client build.
    pub(crate) build: Slot<BuildOutcome>,
}

#[expect(
    clippy::derivable_impls,
    reason = "ScenarioState guidance discourages deriving Default in this module"
)]
impl Default for EnvironmentResolutionState {
    fn default() -> Self {
        Self {
            env_vars: Slot::default(),
            host_policy: Slot::default(),
            cert_dir: Slot::default(),
            resolution: Slot::default(),
            build: Slot::default(),
        }
    }
}

/// Fixture providing fresh state for each resolution scenario.
#[rstest::fixture]
pub fn environment_resolution_state() -> EnvironmentResolutionState {
    let state = EnvironmentResolutionState::default();
    state.env_vars.set(Vec::new());
    state.host_policy.set(HostPolicy::DefaultSocket);
    state
}
