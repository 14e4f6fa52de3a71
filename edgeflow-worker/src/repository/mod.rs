//! Repository layer
//!
//! Repositories are thin adapters over the scheduler HTTP API. They carry
//! no business logic and are trait-based so the run loop can be tested
//! against a scripted scheduler.

mod jobs;

pub use jobs::{HttpJobRepository, JobRepository};
