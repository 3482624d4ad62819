//! Unit tests for openclaw-setup configuration.
//!
//! This module contains tests organised into:
//! - [`helpers`] - Shared fixtures and helper functions
//! - [`types_tests`] - Engine parsing and serialisation tests
//! - [`loader_tests`] - Environment variable mapping tests
//! - [`layer_precedence_tests`] - `MergeComposer` layer precedence tests

mod helpers;
