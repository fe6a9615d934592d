//! Path-based editing of a type graph
//!
//! A `FieldPath` addresses a field by walking struct fields from a root
//! struct. The editor renames and documents fields and the named types they
//! hold, leaving the rest of the graph as it was.

use std::fmt;
use std::str::FromStr;

use crate::collection::{NamedRef, StructId, TypeCollection};
use crate::error::{Result, SchemaError};
use crate::types::Type;

/// Dotted path of field names or aliases, e.g. `nested.status`.
/// The empty path denotes the root struct.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct FieldPath(Vec<String>);

impl FieldPath {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    pub fn root() -> Self {
        Self::default()
    }

    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        if text.is_empty() {
            return Self::root();
        }
        Self::new(text.split('.').map(str::trim))
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromStr for FieldPath {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("."))
    }
}

/// Edits the types reachable from one root struct
pub struct SchemaEditor<'a> {
    types: &'a mut TypeCollection,
    root: StructId,
}

impl<'a> SchemaEditor<'a> {
    pub fn new(types: &'a mut TypeCollection, root: StructId) -> Self {
        Self { types, root }
    }

    /// Rename the field at `path`; the old name becomes an alias
    pub fn rename_field(&mut self, path: &FieldPath, new_name: &str) -> Result<()> {
        let (owner, field) = self.locate_field(path)?;
        self.types.rename_field(owner, &field, new_name)
    }

    /// Rename the struct or enum held by the field at `path`, or the root
    /// struct for the empty path
    pub fn rename_type(&mut self, path: &FieldPath, new_name: &str) -> Result<()> {
        let named = self.named_type(path)?;
        self.types.rename_type(named, new_name)
    }

    pub fn document_field(&mut self, path: &FieldPath, documentation: impl Into<String>) -> Result<()> {
        let (owner, field) = self.locate_field(path)?;
        self.types
            .set_field_documentation(owner, &field, Some(documentation.into()))
    }

    pub fn document_type(&mut self, path: &FieldPath, documentation: impl Into<String>) -> Result<()> {
        let named = self.named_type(path)?;
        self.types.set_type_documentation(named, Some(documentation.into()));
        Ok(())
    }

    /// The type at `path`
    pub fn resolve(&self, path: &FieldPath) -> Result<Type> {
        if path.is_root() {
            return Ok(Type::Struct(self.root));
        }
        let (owner, field) = self.locate_field(path)?;
        Ok(self.types.struct_type(owner).get_field(&field)?.field_type().clone())
    }

    fn named_type(&self, path: &FieldPath) -> Result<NamedRef> {
        match self.resolve(path)? {
            Type::Struct(id) => Ok(NamedRef::Struct(id)),
            Type::Enum(id) => Ok(NamedRef::Enum(id)),
            other => Err(SchemaError::UnnamedType(format!(
                "{} at '{}'",
                self.types.display(other),
                path
            ))),
        }
    }

    /// The struct holding the addressed field, and the field's current name
    fn locate_field(&self, path: &FieldPath) -> Result<(StructId, String)> {
        let Some((last, parents)) = path.segments().split_last() else {
            return Err(SchemaError::StructuralState(
                "the empty path addresses the root struct, not a field".to_string(),
            ));
        };
        let mut current = self.root;
        for segment in parents {
            let field = self.types.struct_type(current).get_field(segment)?;
            current = match field.field_type() {
                Type::Struct(id) => *id,
                _ => {
                    return Err(SchemaError::StructuralState(format!(
                        "field '{}' in path '{}' is not a struct",
                        segment, path
                    )))
                }
            };
        }
        let field = self.types.struct_type(current).get_field(last)?;
        Ok((current, field.name().to_string()))
    }
}
