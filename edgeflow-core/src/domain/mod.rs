//! Domain types
//!
//! Core business entities as they appear on the wire between the
//! scheduler and its workers.

pub mod job;
