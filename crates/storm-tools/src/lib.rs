//! storm-tools: tool registry, argument validation and the built-in Storm tools.

pub mod builtin;
pub mod credentials;
mod dispatcher;
mod error;
pub mod registry;
pub mod schema;
pub mod traits;

pub use builtin::{register_file_tools, register_platform_tools, PlatformContext};
pub use credentials::{CredentialSource, Credentials};
pub use dispatcher::ToolDispatcher;
pub use error::{RegistryError, ToolCallError, ToolError, ToolErrorKind};
pub use registry::ToolRegistry;
pub use schema::ToolDescriptor;
pub use traits::{Tool, ToolOutput};
