//! storm-sandbox: Root-confined file access for the file tools.
//!
//! Every path handed to [`FileManager`] is resolved by [`path_guard::resolve`]
//! and rejected unless it lands at or beneath the sandbox root.

mod error;
mod files;
pub mod mime;
pub mod path_guard;

pub use error::SandboxError;
pub use files::{decode_base64, EntryKind, FileEntry, FileManager};
