//! Shared test helpers for `contact-importer-core` integration tests.
//!
//! These helpers provide lightweight mocks so the flow controller tests can
//! focus on behaviour instead of boilerplate.

pub mod provider;
pub mod session;
