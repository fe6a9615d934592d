//! The polymorphic `Type` and the field-level building blocks

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::collection::{EnumId, StructId};
use crate::decimal::DecimalType;
use crate::error::{Result, SchemaError};
use crate::scalar::ScalarKind;

/// A type in the model. Named types are handles into a `TypeCollection`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Scalar(ScalarKind),
    Decimal(DecimalType),
    Enum(EnumId),
    Struct(StructId),
    /// Content kept as-is, not parsed into structure
    Unparsed(Box<Type>),
}

impl Type {
    pub fn unparsed(inner: Type) -> Self {
        Type::Unparsed(Box::new(inner))
    }

    /// Whether this type carries a name (struct or enum)
    pub fn is_named(&self) -> bool {
        matches!(self, Type::Enum(_) | Type::Struct(_))
    }
}

impl From<ScalarKind> for Type {
    fn from(kind: ScalarKind) -> Self {
        Type::Scalar(kind)
    }
}

impl From<DecimalType> for Type {
    fn from(decimal: DecimalType) -> Self {
        Type::Decimal(decimal)
    }
}

impl From<StructId> for Type {
    fn from(id: StructId) -> Self {
        Type::Struct(id)
    }
}

impl From<EnumId> for Type {
    fn from(id: EnumId) -> Self {
        Type::Enum(id)
    }
}

/// How many values a field holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cardinality {
    Required,
    Optional,
    Repeated,
}

impl Cardinality {
    /// Suffix used when rendering field names
    pub fn suffix(&self) -> &'static str {
        match self {
            Cardinality::Required => "",
            Cardinality::Optional => "?",
            Cardinality::Repeated => "[]",
        }
    }
}

/// Field default: none, an explicit null, or a literal
#[derive(Debug, Clone, PartialEq, Default)]
pub enum DefaultValue {
    #[default]
    NoDefault,
    /// Optional field whose default is null
    ExplicitNull,
    Literal(serde_json::Value),
}

impl DefaultValue {
    pub fn literal(value: impl Into<serde_json::Value>) -> Self {
        DefaultValue::Literal(value.into())
    }

    /// Empty list, the canonical default of repeated fields
    pub fn empty_list() -> Self {
        DefaultValue::Literal(serde_json::Value::Array(Vec::new()))
    }

    pub fn is_present(&self) -> bool {
        !matches!(self, DefaultValue::NoDefault)
    }
}

impl fmt::Display for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefaultValue::NoDefault => Ok(()),
            DefaultValue::ExplicitNull => f.write_str("null"),
            DefaultValue::Literal(serde_json::Value::String(text)) => f.write_str(text),
            DefaultValue::Literal(value) => write!(f, "{}", value),
        }
    }
}

/// A live name plus the former/alternate names it is also known by.
/// The alias set never contains the live name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Names {
    pub name: String,
    pub aliases: BTreeSet<String>,
}

impl Names {
    pub fn new<I, S>(name: impl Into<String>, aliases: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let name = name.into();
        let aliases: BTreeSet<String> = aliases.into_iter().map(Into::into).collect();
        if aliases.contains(&name) {
            return Err(SchemaError::InvalidConstruction(format!(
                "'{}' is used both as name and as alias",
                name
            )));
        }
        Ok(Self { name, aliases })
    }

    /// The name followed by all aliases
    pub fn all(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.aliases.iter().map(String::as_str))
    }

    /// Make `new_name` the live name, keeping the old one as alias.
    ///
    /// `taken_elsewhere` reports whether a name belongs to another entity in
    /// the same scope. Renaming to one of our own aliases swaps the two.
    /// Returns whether anything changed.
    pub fn rename(
        &mut self,
        new_name: &str,
        scope: &str,
        taken_elsewhere: impl Fn(&str) -> bool,
    ) -> Result<bool> {
        if self.name == new_name {
            return Ok(false);
        }
        if !self.aliases.contains(new_name) && taken_elsewhere(new_name) {
            return Err(SchemaError::conflict(new_name, scope));
        }
        self.aliases.remove(new_name);
        let old_name = std::mem::replace(&mut self.name, new_name.to_string());
        self.aliases.insert(old_name);
        Ok(true)
    }
}
