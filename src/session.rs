//! One translation session over a full descriptor forest.
//!
//! Every file of the forest is registered (so imports resolve) and every
//! top-level enum is gathered into one flat list. That list takes the place of
//! each requested file's own enums: messages match enum names against it, and
//! a file without messages emits a document for each of its entries. Only the requested files are
//! converted, in the order they were requested. The first failure aborts the
//! session; no partial document list is ever returned.

use indexmap::IndexMap;
use prost_types::{EnumDescriptorProto, FileDescriptorProto};
use tracing::debug;

use crate::config::Config;
use crate::convert::TypeConverter;
use crate::error::SessionError;
use crate::file::{Document, convert_file};
use crate::registry::PackageRegistry;

pub struct Session<'a> {
    registry: PackageRegistry<'a>,
    enums: Vec<&'a EnumDescriptorProto>,
    files: IndexMap<&'a str, &'a FileDescriptorProto>,
    config: Config,
}

impl<'a> Session<'a> {
    pub fn new(forest: &'a [FileDescriptorProto], config: Config) -> Self {
        let mut registry = PackageRegistry::new();
        let mut enums = Vec::new();
        let mut files = IndexMap::new();
        for file in forest {
            for message in &file.message_type {
                debug!(message_name = message.name(), package = file.package(), "registering message type");
                registry.register(file.package(), message);
            }
            enums.extend(file.enum_type.iter());
            files.insert(file.name(), file);
        }
        Self { registry, enums, files, config }
    }

    pub fn registry(&self) -> &PackageRegistry<'a> {
        &self.registry
    }

    /// Every top-level enum of the forest, in file order.
    pub fn enums(&self) -> &[&'a EnumDescriptorProto] {
        &self.enums
    }

    pub fn generate<S: AsRef<str>>(&self, targets: &[S]) -> Result<Vec<Document>, SessionError> {
        let converter = TypeConverter::new(&self.registry, &self.config);
        let mut out = Vec::new();
        for target in targets {
            let target = target.as_ref();
            let file = self
                .files
                .get(target)
                .copied()
                .ok_or_else(|| SessionError::UnknownFile(target.to_string()))?;
            debug!(file = target, "converting file");
            let documents = convert_file(&converter, file, &self.enums)
                .map_err(|source| SessionError::File { file: target.to_string(), source })?;
            out.extend(documents);
        }
        Ok(out)
    }
}

/// Build a session over `forest` and generate `targets` in one go.
pub fn generate<S: AsRef<str>>(
    forest: &[FileDescriptorProto],
    targets: &[S],
    config: Config,
) -> Result<Vec<Document>, SessionError> {
    Session::new(forest, config).generate(targets)
}
