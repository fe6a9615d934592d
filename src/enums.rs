//! Enum types: named, closed sets of symbols

use std::collections::{BTreeSet, HashSet};

use crate::error::{Result, SchemaError};
use crate::types::Names;
use crate::value::Value;

/// A named, documented set of symbols with an optional fallback symbol
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumType {
    pub(crate) names: Names,
    documentation: Option<String>,
    symbols: Vec<String>,
    default_symbol: Option<String>,
}

impl EnumType {
    /// Create an enum type.
    ///
    /// Symbols must be non-empty and unique; the default symbol, if any, must
    /// be one of them.
    pub fn new<I, S>(
        name: impl Into<String>,
        aliases: I,
        documentation: Option<String>,
        symbols: Vec<String>,
        default_symbol: Option<String>,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names = Names::new(name, aliases)?;
        if symbols.is_empty() {
            return Err(SchemaError::InvalidConstruction(format!(
                "enum {} has no symbols",
                names.name
            )));
        }
        let mut seen = HashSet::new();
        if let Some(duplicate) = symbols.iter().find(|s| !seen.insert(s.as_str())) {
            return Err(SchemaError::InvalidConstruction(format!(
                "enum {} repeats symbol '{}'",
                names.name, duplicate
            )));
        }
        if let Some(default) = &default_symbol {
            if !symbols.contains(default) {
                return Err(SchemaError::InvalidConstruction(format!(
                    "default symbol '{}' is not a symbol of enum {}",
                    default, names.name
                )));
            }
        }
        Ok(Self {
            names,
            documentation,
            symbols,
            default_symbol,
        })
    }

    pub fn name(&self) -> &str {
        &self.names.name
    }

    pub fn aliases(&self) -> &BTreeSet<String> {
        &self.names.aliases
    }

    pub fn documentation(&self) -> Option<&str> {
        self.documentation.as_deref()
    }

    pub fn set_documentation(&mut self, documentation: Option<String>) {
        self.documentation = documentation;
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn default_symbol(&self) -> Option<&str> {
        self.default_symbol.as_deref()
    }

    /// Parse a symbol. Unknown symbols fall back to the default symbol, if there is one.
    pub fn parse(&self, input: Option<&str>) -> Result<Option<Value>> {
        let Some(symbol) = input else {
            return Ok(None);
        };
        if self.symbols.iter().any(|s| s == symbol) {
            return Ok(Some(Value::Symbol(symbol.to_string())));
        }
        match &self.default_symbol {
            Some(default) => Ok(Some(Value::Symbol(default.clone()))),
            None => Err(SchemaError::syntax(
                format!("enum {}", self.names.name),
                symbol,
                "unknown symbol",
            )),
        }
    }

    /// One-line rendering: `enum(name, alias: one, two; default)`
    pub fn debug_string(&self) -> String {
        let mut out = format!("enum({}", self.names.name);
        for alias in &self.names.aliases {
            out.push_str(", ");
            out.push_str(alias);
        }
        out.push_str(": ");
        out.push_str(&self.symbols.join(", "));
        if let Some(default) = &self.default_symbol {
            out.push_str("; ");
            out.push_str(default);
        }
        out.push(')');
        out
    }
}
