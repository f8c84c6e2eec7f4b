//! Unit tests for dockenv configuration types.
//!
//! - [`helpers`] - Shared fixtures and helper functions
//! - [`types_tests`] - Defaults, serialisation, and derived settings
//! - [`layer_precedence_tests`] - `MergeComposer` layer precedence tests

mod helpers;
