//! Behavioural step helpers for engine environment resolution scenarios.

mod assertions;
mod state;
mod steps;

pub use state::{EnvironmentResolutionState, environment_resolution_state};
