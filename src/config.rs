//! Output-shape policies.
//!
//! [`Options`] is the mutable, flag-by-flag view filled from CLI flags and the
//! plugin parameter string. [`Config`] is what the converters read: resolved
//! once, immutable, and only constructible through [`Options::resolve`] (or
//! [`Config::default`], which has every flag off).

use tracing::warn;

use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Options {
    /// wrap non-null types in a nullable `oneOf`
    pub allow_null_values: bool,
    /// enums are strings only, never integers
    pub disallow_enum_one_of: bool,
    /// never emit `oneOf`
    pub disallow_one_of: bool,
    /// objects reject unknown properties
    pub disallow_additional_properties: bool,
    /// 64-bit integers may not be given as strings
    pub disallow_bigints_as_strings: bool,
    /// log debug messages
    pub debug: bool,
}

impl Options {
    /// Apply a comma-separated plugin parameter such as
    /// `allow_null_values,disallow_bigints_as_strings`.
    pub fn apply_parameter(&mut self, parameter: &str) {
        for name in parameter.split(',').map(str::trim).filter(|x| !x.is_empty()) {
            match name {
                "allow_null_values" => self.allow_null_values = true,
                "disallow_enum_one_of" => self.disallow_enum_one_of = true,
                "disallow_one_of" => self.disallow_one_of = true,
                "disallow_additional_properties" => self.disallow_additional_properties = true,
                "disallow_bigints_as_strings" => self.disallow_bigints_as_strings = true,
                "debug" => self.debug = true,
                other => warn!(parameter = other, "ignoring unknown plugin parameter"),
            }
        }
    }

    pub fn resolve(self) -> Result<Config, ConfigError> {
        if self.allow_null_values && self.disallow_one_of {
            return Err(ConfigError::NullWithoutOneOf);
        }
        Ok(Config {
            allow_null_values: self.allow_null_values,
            disallow_enum_one_of: self.disallow_enum_one_of,
            disallow_one_of: self.disallow_one_of,
            disallow_additional_properties: self.disallow_additional_properties,
            disallow_bigints_as_strings: self.disallow_bigints_as_strings,
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Config {
    allow_null_values: bool,
    disallow_enum_one_of: bool,
    disallow_one_of: bool,
    disallow_additional_properties: bool,
    disallow_bigints_as_strings: bool,
}

impl Config {
    pub fn one_of(&self) -> bool {
        !self.disallow_one_of
    }

    /// Scalars, objects and arrays become `oneOf: [null, T]`.
    pub fn nullable(&self) -> bool {
        self.allow_null_values && self.one_of()
    }

    /// Enum fields list each value's number after its name.
    pub fn enum_numbers(&self) -> bool {
        !self.disallow_enum_one_of
    }

    /// Enums are a `oneOf` of string and integer, and standalone enum
    /// documents list numbers too.
    pub fn enum_one_of(&self) -> bool {
        self.enum_numbers() && self.one_of()
    }

    pub fn bigints_as_strings(&self) -> bool {
        !self.disallow_bigints_as_strings
    }

    pub fn additional_properties(&self) -> bool {
        !self.disallow_additional_properties
    }
}
