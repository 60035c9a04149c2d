//! Serve and tools command implementations.

pub mod serve;
pub mod tools;
