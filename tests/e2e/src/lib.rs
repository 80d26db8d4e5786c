//! End-to-end test support for namematch
//!
//! Shared fixtures for the scenario, property and two-stage test targets.

pub mod mocks;
