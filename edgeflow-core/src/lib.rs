//! Edgeflow Core
//!
//! Domain types shared between the scheduler client and the worker.
//!
//! This crate contains:
//! - Domain types: the job record handed out by the scheduler

pub mod domain;
