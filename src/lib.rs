//! Protobuf descriptors to draft-04 JSON Schema.
//!
//! The crate runs as a `protoc` plugin (see [`plugin`]) or over binary
//! `FileDescriptorSet` files from the command line (see [`cli`]). Both paths
//! end in [`session::generate`], which turns the requested files of a
//! descriptor forest into one [`Document`] per top-level message, or per
//! top-level enum for files that declare no messages.
pub mod cli;
pub mod config;
pub mod convert;
pub mod error;
pub mod file;
pub mod plugin;
pub mod registry;
pub mod schema;
pub mod session;

#[cfg(test)]
mod fixtures;

pub use config::{Config, Options};
pub use error::{ConfigError, ConvertError, LookupError, SessionError};
pub use file::Document;
pub use session::{Session, generate};
