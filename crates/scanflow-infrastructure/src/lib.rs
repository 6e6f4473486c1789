//! Device-storage layer for the scanflow workflow coordinator.

pub mod role_store;

pub use role_store::TomlRoleStore;
