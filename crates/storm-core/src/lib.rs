//! storm-core: configuration and assembly of the Storm tool set.

pub mod config;
mod error;
pub mod runtime;

pub use config::{Config, ConfigStore};
pub use error::{ConfigError, StormError};
pub use runtime::{build_dispatcher, ToolSet};
