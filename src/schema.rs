//! Draft-04 JSON Schema node. Field order is the emitted keyword order.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::config::Config;

pub const DRAFT_04: &str = "http://json-schema.org/draft-04/schema#";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JsonType {
    Null,
    Boolean,
    Integer,
    Number,
    String,
    Array,
    Object,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Schema {
    #[serde(rename = "$schema", skip_serializing_if = "Option::is_none")]
    pub version: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, Schema>,
    #[serde(rename = "additionalProperties", skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<bool>,
    #[serde(rename = "enum", skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<Value>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub ty: Option<JsonType>,
    #[serde(rename = "oneOf", skip_serializing_if = "Vec::is_empty")]
    pub one_of: Vec<Schema>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl Schema {
    pub fn of_type(ty: JsonType) -> Self {
        Self { ty: Some(ty), ..Self::default() }
    }

    /// `oneOf: [null, ty]`
    pub fn nullable(ty: JsonType) -> Self {
        Self { one_of: vec![Self::of_type(JsonType::Null), Self::of_type(ty)], ..Self::default() }
    }

    /// `ty`, or `oneOf: [null, ty]` when the config asks for nullable values.
    pub fn scalar(ty: JsonType, config: &Config) -> Self {
        if config.nullable() { Self::nullable(ty) } else { Self::of_type(ty) }
    }

    pub fn is_type(&self, ty: JsonType) -> bool {
        self.ty == Some(ty)
    }

    /// Only `oneOf: [null, ..]` counts; a bare `type: null` does not.
    pub fn admits_null(&self) -> bool {
        self.one_of.iter().any(|x| x.is_type(JsonType::Null))
    }

    /// Mark this node as a document root.
    pub fn into_document(mut self) -> Self {
        self.version = Some(DRAFT_04);
        self
    }

    /// Pretty-print with a 4-space indent.
    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        let mut out = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut out, formatter);
        self.serialize(&mut ser)?;
        // serde_json only ever writes valid UTF-8
        Ok(String::from_utf8_lossy(&out).into_owned())
    }
}
