//! AWS-oriented adapters and handlers for lifecycle drain coordination.
//!
//! This crate owns runtime integration details (the Lambda handler and
//! the adapter seams for EC2 tags, ECS cluster state, Auto Scaling
//! lifecycle actions, and SNS re-publication) on top of the contracts
//! in `drain_coordinator_core`.

pub mod adapters;
pub mod handlers;
