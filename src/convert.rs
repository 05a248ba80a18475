//! Descriptor → JSON Schema type conversion.
//!
//! One recursive walk over a message's fields. Each field is first mapped by
//! its declared kind (see [`FieldKind`]) under the active [`Config`], then
//! post-processed: repeated scalars and enums become arrays, message fields
//! are resolved through the [`PackageRegistry`] and embedded.
//!
//! Enum references are resolved by name against the enums *visible* from the
//! enclosing message. That list is an explicit, immutable argument:
//! - a top-level message sees its own enums, then whatever the caller passes
//!   (the session passes every enum of the request);
//! - a message reached through a field inherits the enclosing list if it
//!   declares no enums of its own, otherwise it sees only its own.
//!
//! Descriptors are never mutated, so the same message converts identically no
//! matter which path reached it first.
pub mod enums;
pub mod kind;

use std::collections::BTreeMap;
use std::mem;

use prost_types::field_descriptor_proto::Label;
use prost_types::{DescriptorProto, EnumDescriptorProto, FieldDescriptorProto};
use tracing::{debug, error, warn};

use crate::config::Config;
use crate::error::ConvertError;
use crate::registry::{PackageId, PackageRegistry};
use crate::schema::{JsonType, Schema};

pub use kind::FieldKind;

pub const TIMESTAMP: &str = ".google.protobuf.Timestamp";

/// Enums visible from one message, in match priority order.
pub type EnumScope<'a> = Vec<&'a EnumDescriptorProto>;

pub struct TypeConverter<'a> {
    registry: &'a PackageRegistry<'a>,
    config: &'a Config,
}

impl<'a> TypeConverter<'a> {
    pub fn new(registry: &'a PackageRegistry<'a>, config: &'a Config) -> Self {
        Self { registry, config }
    }

    pub fn config(&self) -> &Config {
        self.config
    }

    pub fn registry(&self) -> &'a PackageRegistry<'a> {
        self.registry
    }

    /// Convert a whole message into an object schema. `visible` is appended
    /// after the message's own enums.
    pub fn convert_message_type(
        &self,
        package: PackageId,
        message: &'a DescriptorProto,
        visible: &[&'a EnumDescriptorProto],
    ) -> Result<Schema, ConvertError> {
        let scope = top_level_scope(message, visible);
        self.message_schema(package, message, &scope, &mut Vec::new())
    }

    /// Convert one field of `enclosing`, seeing the same enums
    /// [`Self::convert_message_type`] would give it.
    pub fn convert_field(
        &self,
        package: PackageId,
        field: &FieldDescriptorProto,
        enclosing: &'a DescriptorProto,
        visible: &[&'a EnumDescriptorProto],
    ) -> Result<Schema, ConvertError> {
        let scope = top_level_scope(enclosing, visible);
        self.field_schema(package, field, &scope, &mut vec![enclosing])
    }

    /// Standalone enum document body.
    pub fn convert_enum_type(&self, descriptor: &EnumDescriptorProto) -> Schema {
        let mut schema = enums::enum_base(self.config, false);
        schema.enum_values = enums::enum_literals(descriptor, self.config.enum_one_of());
        schema
    }

    fn message_schema(
        &self,
        package: PackageId,
        message: &'a DescriptorProto,
        scope: &[&'a EnumDescriptorProto],
        path: &mut Vec<&'a DescriptorProto>,
    ) -> Result<Schema, ConvertError> {
        debug!(message_name = message.name(), fields = message.field.len(), "converting message");
        let mut schema = Schema::scalar(JsonType::Object, self.config);
        schema.additional_properties = Some(self.config.additional_properties());

        path.push(message);
        let properties = self.message_properties(package, message, scope, path);
        path.pop();

        schema.properties = properties?;
        Ok(schema)
    }

    fn message_properties(
        &self,
        package: PackageId,
        message: &'a DescriptorProto,
        scope: &[&'a EnumDescriptorProto],
        path: &mut Vec<&'a DescriptorProto>,
    ) -> Result<BTreeMap<String, Schema>, ConvertError> {
        let mut properties = BTreeMap::new();
        for field in &message.field {
            let converted = self.field_schema(package, field, scope, path).inspect_err(|error| {
                error!(field = field.name(), message_name = message.name(), %error, "failed to convert field")
            })?;
            properties.insert(json_name(field), converted);
        }
        Ok(properties)
    }

    fn field_schema(
        &self,
        package: PackageId,
        field: &FieldDescriptorProto,
        scope: &[&'a EnumDescriptorProto],
        path: &mut Vec<&'a DescriptorProto>,
    ) -> Result<Schema, ConvertError> {
        let config = self.config;
        let mut schema = match FieldKind::of(field)? {
            FieldKind::Float => Schema::scalar(JsonType::Number, config),
            FieldKind::Int32 => Schema::scalar(JsonType::Integer, config),
            FieldKind::Int64 => self.big_integer(),
            FieldKind::String => Schema::scalar(JsonType::String, config),
            FieldKind::Bool => Schema::scalar(JsonType::Boolean, config),
            FieldKind::Enum => self.enum_field(field, scope),
            FieldKind::Message => match well_known(field.type_name()) {
                Some(schema) => schema,
                None => self.object_field(field.label()),
            },
        };

        if !schema.is_type(JsonType::Object) {
            if field.label() == Label::Repeated {
                schema = self.into_array(schema);
            }
            return Ok(schema);
        }

        self.embed_message(package, field, scope, path, &mut schema)?;
        Ok(schema)
    }

    // int64 and friends exceed what JSON numbers carry exactly, so they may
    // also arrive as strings.
    fn big_integer(&self) -> Schema {
        if !self.config.one_of() {
            return Schema::of_type(JsonType::Integer);
        }
        let mut one_of = vec![Schema::of_type(JsonType::Integer)];
        if self.config.bigints_as_strings() {
            one_of.push(Schema::of_type(JsonType::String));
        }
        if self.config.nullable() {
            one_of.push(Schema::of_type(JsonType::Null));
        }
        Schema { one_of, ..Schema::default() }
    }

    fn enum_field(&self, field: &FieldDescriptorProto, scope: &[&'a EnumDescriptorProto]) -> Schema {
        let mut schema = enums::enum_base(self.config, self.config.nullable());
        match enums::match_enum(scope, field.type_name()) {
            Some(found) => schema.enum_values = enums::enum_literals(found, self.config.enum_numbers()),
            None => warn!(
                field = field.name(),
                type_name = field.type_name(),
                "could not find matching enum"
            ),
        }
        schema
    }

    fn object_field(&self, label: Label) -> Schema {
        let mut schema = Schema::of_type(JsonType::Object);
        schema.additional_properties = if !self.config.additional_properties() {
            Some(false)
        } else {
            match label {
                Label::Optional => Some(true),
                Label::Required => Some(false),
                Label::Repeated => None,
            }
        };
        schema
    }

    /// Wrap a scalar or enum element as an array. The enum list moves onto
    /// `items`; a null member of the element union does not, since repeated
    /// elements are never null. A `format` hint stays on the array.
    fn into_array(&self, mut element: Schema) -> Schema {
        let mut items = Schema {
            ty: element.ty,
            one_of: mem::take(&mut element.one_of),
            enum_values: mem::take(&mut element.enum_values),
            ..Schema::default()
        };
        drop_null_member(&mut items);

        let mut array = Schema::scalar(JsonType::Array, self.config);
        array.items = Some(Box::new(items));
        array.format = element.format.take();
        array
    }

    fn embed_message(
        &self,
        package: PackageId,
        field: &FieldDescriptorProto,
        scope: &[&'a EnumDescriptorProto],
        path: &mut Vec<&'a DescriptorProto>,
        schema: &mut Schema,
    ) -> Result<(), ConvertError> {
        let type_name = field.type_name();
        let target = self
            .registry
            .lookup_type(package, type_name)
            .map_err(|source| ConvertError::UnresolvedType { name: type_name.to_string(), source })?;
        if path.iter().any(|seen| std::ptr::eq(*seen, target)) {
            return Err(ConvertError::RecursiveMessage(type_name.to_string()));
        }

        let target_scope: EnumScope<'a> = if target.enum_type.is_empty() {
            scope.to_vec()
        } else {
            target.enum_type.iter().collect()
        };
        let mut embedded = self.message_schema(package, target, &target_scope, path)?;

        if field.label() == Label::Repeated {
            schema.items = Some(Box::new(embedded));
            schema.ty = Some(JsonType::Array);
        } else {
            schema.properties = mem::take(&mut embedded.properties);
        }

        if self.config.nullable() {
            let ty = schema.ty.take();
            schema.one_of = vec![Schema::of_type(JsonType::Null), Schema { ty, ..Schema::default() }];
        }
        Ok(())
    }
}

/// Well-known message types with a fixed JSON mapping.
pub fn well_known(type_name: &str) -> Option<Schema> {
    match type_name {
        TIMESTAMP => Some(Schema {
            ty: Some(JsonType::String),
            format: Some("date-time".to_string()),
            ..Schema::default()
        }),
        _ => None,
    }
}

/// Property name for a field: its `json_name`, or protoc's projection of the
/// field name when the producer left `json_name` empty.
pub fn json_name(field: &FieldDescriptorProto) -> String {
    match field.json_name() {
        "" => lower_camel_case(field.name()),
        name => name.to_string(),
    }
}

/// `foo_bar_baz` → `fooBarBaz` (protoc's `ToJsonName`).
pub fn lower_camel_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper_next = false;
    for c in name.chars() {
        if c == '_' {
            upper_next = true;
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

fn top_level_scope<'a>(message: &'a DescriptorProto, visible: &[&'a EnumDescriptorProto]) -> EnumScope<'a> {
    message.enum_type.iter().chain(visible.iter().copied()).collect()
}

fn drop_null_member(schema: &mut Schema) {
    if !schema.admits_null() {
        return;
    }
    schema.one_of.retain(|member| !member.is_type(JsonType::Null));
    if schema.one_of.len() == 1 {
        if let Some(only) = schema.one_of.pop() {
            schema.ty = only.ty;
        }
    }
}
