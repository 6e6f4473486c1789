//! Use-case layer for the scanflow workflow coordinator.
//!
//! Wires the pure session state machine from `scanflow-core` to its async
//! collaborators: entity resolution over fetched candidate lists, the
//! one-shot action executor, and the coordinator that sequences a live
//! session.

pub mod coordinator;
pub mod executor;
pub mod resolver;

#[cfg(test)]
mod coordinator_test;

pub use coordinator::ScanCoordinator;
pub use executor::{ActionExecutor, Outcome};
pub use resolver::{Candidate, EntityResolver};
