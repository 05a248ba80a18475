use prost_types::FieldDescriptorProto;
use prost_types::field_descriptor_proto::Type;

use crate::error::ConvertError;

/// The declared kind of a field, folded into the families that share a
/// JSON Schema mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Float,
    Int32,
    Int64,
    String,
    Bool,
    Enum,
    Message,
}

impl FieldKind {
    pub fn of(field: &FieldDescriptorProto) -> Result<Self, ConvertError> {
        let raw = field.r#type.unwrap_or_default();
        let ty = Type::try_from(raw).map_err(|_| ConvertError::UnrecognizedFieldType {
            field: field.name().to_string(),
            kind: raw,
        })?;
        Ok(Self::from(ty))
    }
}

impl From<Type> for FieldKind {
    fn from(ty: Type) -> Self {
        match ty {
            Type::Double | Type::Float => Self::Float,
            Type::Int32 | Type::Uint32 | Type::Fixed32 | Type::Sfixed32 | Type::Sint32 => Self::Int32,
            Type::Int64 | Type::Uint64 | Type::Fixed64 | Type::Sfixed64 | Type::Sint64 => Self::Int64,
            Type::String | Type::Bytes => Self::String,
            Type::Bool => Self::Bool,
            Type::Enum => Self::Enum,
            Type::Group | Type::Message => Self::Message,
        }
    }
}
