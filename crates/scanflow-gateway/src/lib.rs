//! REST client layer for the scanflow workflow coordinator.
//!
//! Implements the core `Gateway` trait against the primary API and the
//! separate analysis host. Bearer tokens come from a [`TokenProvider`];
//! refresh and persistence of tokens are outside this crate.

pub mod dto;
pub mod rest;
pub mod token;

pub use rest::RestGateway;
pub use token::{StaticTokenProvider, TokenProvider};
