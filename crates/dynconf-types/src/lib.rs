//! Shared types, adapter traits, and error types for dynconf.
//!
//! This crate contains the foundational types that are shared between the
//! settings registry and all adapter implementations. Keeping them in a
//! separate crate lets adapter crates build without the registry.

pub mod cache_adapter;
pub mod entity_set;
pub mod error;
pub mod prelude;
pub mod store_adapter;
pub mod types;

// vim: ts=4
