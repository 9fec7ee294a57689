//! Test Module
//!
//! Cross-module test suite for the chatline core.
//!
//! ## Test Categories
//! - `brain_tests`: normalization, sentiment and knowledge matching together
//! - `session_tests`: interaction loop transcripts and analytics failure isolation
//! - `analytics_tests`: HTTP analytics sink against a mock server
//! - `population_tests`: dataset fetch through chart export against a mock server
//! - `config_tests`: environment-driven settings

pub mod population_tests;
pub mod session_tests;
