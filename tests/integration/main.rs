//! Integration tests for the tree walker and orchestrator
//!
//! These tests use wiremock to serve listing and file pages shaped like the
//! hosting service's markup and exercise full walks end-to-end.

mod fixtures;
mod orchestrator_tests;
mod walk_tests;
