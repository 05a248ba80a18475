use prost_types::EnumDescriptorProto;
use serde_json::Value;

use crate::config::Config;
use crate::schema::{JsonType, Schema};

/// `oneOf: [string, integer(, null)]` when enums may be numbers, otherwise a
/// plain string.
pub fn enum_base(config: &Config, with_null: bool) -> Schema {
    if !config.enum_one_of() {
        return Schema::of_type(JsonType::String);
    }
    let mut one_of = vec![Schema::of_type(JsonType::String), Schema::of_type(JsonType::Integer)];
    if with_null {
        one_of.push(Schema::of_type(JsonType::Null));
    }
    Schema { one_of, ..Schema::default() }
}

/// Allowed values in declaration order: each name, followed by its number
/// when `with_numbers` is set.
pub fn enum_literals(descriptor: &EnumDescriptorProto, with_numbers: bool) -> Vec<Value> {
    let mut out = Vec::new();
    for value in &descriptor.value {
        out.push(Value::from(value.name()));
        if with_numbers {
            out.push(Value::from(value.number()));
        }
    }
    out
}

/// First visible enum whose name is a suffix of `type_name`.
///
/// This is a name heuristic, not scoping: `.pkg.OtherColor` also matches an
/// enum named `Color` if that one is seen first.
pub fn match_enum<'a>(scope: &[&'a EnumDescriptorProto], type_name: &str) -> Option<&'a EnumDescriptorProto> {
    scope.iter().copied().find(|candidate| type_name.ends_with(candidate.name()))
}
