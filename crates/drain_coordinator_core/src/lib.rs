//! Shared drain coordination domain primitives.
//!
//! This crate owns the lifecycle notification contracts, the container
//! instance model, and the drain action vocabulary. It intentionally
//! excludes AWS SDK and Lambda runtime concerns.

pub mod action;
pub mod contract;
pub mod instance;
