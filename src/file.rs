//! Per-file orchestration: which types of a file become documents.

use std::path::Path;

use prost_types::{EnumDescriptorProto, FileDescriptorProto};
use tracing::{error, info};

use crate::convert::TypeConverter;
use crate::error::ConvertError;

pub const SCHEMA_EXTENSION: &str = "jsonschema";

/// One generated JSON Schema file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub name: String,
    pub content: String,
}

impl Document {
    pub fn file_name(type_name: &str) -> String {
        format!("{type_name}.{SCHEMA_EXTENSION}")
    }
}

/// Convert one file.
///
/// `visible` stands in for the file's top-level enums: a session passes every
/// enum of the forest. A file with top-level messages yields one document per
/// message, each seeing `visible` after its own nested enums. A file without
/// messages yields one document per enum in `visible`.
pub fn convert_file<'a>(
    converter: &TypeConverter<'a>,
    file: &'a FileDescriptorProto,
    visible: &[&'a EnumDescriptorProto],
) -> Result<Vec<Document>, ConvertError> {
    let file_name = Path::new(file.name())
        .file_name()
        .map(|x| x.to_string_lossy().into_owned())
        .unwrap_or_default();

    if file.message_type.len() > 1 {
        info!(count = file.message_type.len(), file = %file_name, "file declares several messages, each gets its own schema");
    }
    if visible.len() > 1 {
        info!(count = visible.len(), file = %file_name, "file sees several enums, each gets its own schema");
    }

    convert_types(converter, file, visible).inspect_err(|e| error!(file = %file_name, error = %e, "failed to convert"))
}

fn convert_types<'a>(
    converter: &TypeConverter<'a>,
    file: &'a FileDescriptorProto,
    visible: &[&'a EnumDescriptorProto],
) -> Result<Vec<Document>, ConvertError> {
    let mut out = Vec::new();

    if file.message_type.is_empty() {
        for descriptor in visible.iter().copied() {
            let name = Document::file_name(descriptor.name());
            info!(enum_name = descriptor.name(), file = file.name(), document = %name, "generating schema for stand-alone enum");
            let schema = converter.convert_enum_type(descriptor).into_document();
            out.push(Document { name, content: schema.to_json_string()? });
        }
        return Ok(out);
    }

    let package = converter
        .registry()
        .lookup_package(file.package())
        .map_err(|source| ConvertError::UnknownPackage { name: file.package().to_string(), source })?;

    for message in &file.message_type {
        let name = Document::file_name(message.name());
        info!(message_name = message.name(), file = file.name(), document = %name, "generating schema for message");
        let schema = converter.convert_message_type(package, message, visible)?.into_document();
        out.push(Document { name, content: schema.to_json_string()? });
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::fixtures::{enumeration, field, file, fizz_buzz, message, typed};
    use crate::registry::PackageRegistry;
    use prost_types::field_descriptor_proto::{Label, Type};
    use serde_json::{Value, json};

    fn parse(document: &Document) -> Value {
        serde_json::from_str(&document.content).unwrap()
    }

    #[test]
    fn enum_only_file_yields_one_document_per_enum() {
        let source = file(
            "SeveralEnums.proto",
            "samples",
            vec![],
            vec![fizz_buzz(), enumeration("Second", &[("ONE", 1)])],
        );
        let registry = PackageRegistry::new();
        let config = Config::default();
        let converter = TypeConverter::new(&registry, &config);

        let visible: Vec<_> = source.enum_type.iter().collect();
        let docs = convert_file(&converter, &source, &visible).unwrap();
        let names: Vec<_> = docs.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, ["FooBarBaz.jsonschema", "Second.jsonschema"]);
        assert_eq!(
            parse(&docs[1]),
            json!({
                "$schema": "http://json-schema.org/draft-04/schema#",
                "enum": ["ONE", 1],
                "oneOf": [{ "type": "string" }, { "type": "integer" }]
            })
        );
    }

    #[test]
    fn message_file_yields_one_document_per_message_only() {
        let source = file(
            "dir/SeveralMessages.proto",
            "samples",
            vec![
                message("FirstMessage", vec![field("name", Type::String, Label::Optional)]),
                message("SecondMessage", vec![field("flag", Type::Bool, Label::Optional)]),
            ],
            vec![fizz_buzz()],
        );
        let mut registry = PackageRegistry::new();
        for m in &source.message_type {
            registry.register(source.package(), m);
        }
        let config = Config::default();
        let converter = TypeConverter::new(&registry, &config);

        let docs = convert_file(&converter, &source, &[]).unwrap();
        let names: Vec<_> = docs.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, ["FirstMessage.jsonschema", "SecondMessage.jsonschema"]);
        assert_eq!(parse(&docs[0])["$schema"], json!(crate::schema::DRAFT_04));
        assert_eq!(parse(&docs[1])["properties"]["flag"], json!({ "type": "boolean" }));
    }

    #[test]
    fn visible_enums_reach_top_level_messages() {
        let color = enumeration("Color", &[("RED", 0), ("GREEN", 1)]);
        let source = file(
            "Paint.proto",
            "",
            vec![message("Paint", vec![typed("color", Type::Enum, Label::Optional, ".Color")])],
            vec![],
        );
        let mut registry = PackageRegistry::new();
        registry.register(source.package(), &source.message_type[0]);
        let config = Config::default();
        let converter = TypeConverter::new(&registry, &config);

        let docs = convert_file(&converter, &source, &[&color]).unwrap();
        assert_eq!(parse(&docs[0])["properties"]["color"]["enum"], json!(["RED", 0, "GREEN", 1]));
    }

    #[test]
    fn unregistered_package_is_an_error() {
        let source = file("Lost.proto", "nowhere", vec![message("Lost", vec![])], vec![]);
        let registry = PackageRegistry::new();
        let config = Config::default();
        let converter = TypeConverter::new(&registry, &config);
        assert!(matches!(
            convert_file(&converter, &source, &[]),
            Err(ConvertError::UnknownPackage { name, .. }) if name == "nowhere"
        ));
    }

    #[test]
    fn documents_are_indented_with_four_spaces() {
        let source = file("Tiny.proto", "", vec![], vec![enumeration("Tiny", &[("A", 0)])]);
        let registry = PackageRegistry::new();
        let config = Config::default();
        let converter = TypeConverter::new(&registry, &config);
        let docs = convert_file(&converter, &source, &[&source.enum_type[0]]).unwrap();
        assert!(docs[0].content.starts_with("{\n    \"$schema\""));
    }

    #[test]
    fn enum_only_file_emits_every_visible_enum() {
        let other = enumeration("Unrelated", &[("Y", 0)]);
        let source = file("Enums.proto", "samples", vec![], vec![fizz_buzz()]);
        let registry = PackageRegistry::new();
        let config = Config::default();
        let converter = TypeConverter::new(&registry, &config);

        let docs = convert_file(&converter, &source, &[&source.enum_type[0], &other]).unwrap();
        let names: Vec<_> = docs.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, ["FooBarBaz.jsonschema", "Unrelated.jsonschema"]);
    }
}
