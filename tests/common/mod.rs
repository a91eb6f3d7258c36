//! Common test utilities for Stevedore integration tests.
//!
//! This module provides:
//! - `TestEnv`: Isolated test environment with temp directories
//! - Fixtures: Reusable config and artifact constants

pub mod env;
pub mod fixtures;

pub use env::*;
pub use fixtures::*;
