//! Core domain layer for the scanflow workflow coordinator.
//!
//! This crate is pure: it holds the data model, the `ScanSession` state
//! machine and the trait seams (`CaptureAdapter`, `Gateway`, `RoleStore`)
//! that the application layer wires to real collaborators. No I/O happens
//! here.

pub mod actor;
pub mod capture;
pub mod error;
pub mod gateway;
pub mod kit;
pub mod patient;
pub mod session;

// Re-export common error type
pub use error::{Result, ScanError};
