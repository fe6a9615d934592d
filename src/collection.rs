//! Type Collection
//!
//! Arena owning every named type (structs and enums) of one type graph.
//! Types reference each other through `StructId`/`EnumId` handles, which is
//! how shared and recursive structures are modeled. The collection keeps an
//! index of every name and alias, and guarantees they are unique across all
//! registered types.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::debug;

use crate::enums::EnumType;
use crate::error::{Result, SchemaError};
use crate::structs::{Field, Owner, StructType};
use crate::types::{Names, Type};
use crate::value::Value;

static NEXT_TOKEN: AtomicU64 = AtomicU64::new(1);

/// Handle to a struct type in a `TypeCollection`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StructId(pub(crate) usize);

/// Handle to an enum type in a `TypeCollection`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EnumId(pub(crate) usize);

/// Handle to any named type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamedRef {
    Struct(StructId),
    Enum(EnumId),
}

impl From<NamedRef> for Type {
    fn from(named: NamedRef) -> Self {
        match named {
            NamedRef::Struct(id) => Type::Struct(id),
            NamedRef::Enum(id) => Type::Enum(id),
        }
    }
}

/// Registry of named types with globally unique names and aliases
#[derive(Debug, Clone)]
pub struct TypeCollection {
    token: u64,
    structs: Vec<StructType>,
    enums: Vec<EnumType>,
    /// Every name and alias -> the type carrying it
    by_name: HashMap<String, NamedRef>,
}

/// Number of registered types at some point, to roll back to
#[derive(Debug, Clone, Copy)]
pub(crate) struct Checkpoint {
    structs: usize,
    enums: usize,
}

impl Default for TypeCollection {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeCollection {
    pub fn new() -> Self {
        Self {
            token: NEXT_TOKEN.fetch_add(1, Ordering::Relaxed),
            structs: Vec::new(),
            enums: Vec::new(),
            by_name: HashMap::new(),
        }
    }

    /// Number of registered types
    pub fn len(&self) -> usize {
        self.structs.len() + self.enums.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Register a struct type; its name and aliases must be unused
    pub fn register_struct(&mut self, struct_type: StructType) -> Result<StructId> {
        self.check_unused(&struct_type.names)?;
        let id = StructId(self.structs.len());
        self.index(&struct_type.names, NamedRef::Struct(id));
        debug!(name = %struct_type.name(), "registered struct type");
        self.structs.push(struct_type);
        Ok(id)
    }

    /// Register an enum type; its name and aliases must be unused
    pub fn register_enum(&mut self, enum_type: EnumType) -> Result<EnumId> {
        self.check_unused(&enum_type.names)?;
        let id = EnumId(self.enums.len());
        self.index(&enum_type.names, NamedRef::Enum(id));
        debug!(name = %enum_type.name(), "registered enum type");
        self.enums.push(enum_type);
        Ok(id)
    }

    fn check_unused(&self, names: &Names) -> Result<()> {
        match names.all().find(|name| self.by_name.contains_key(*name)) {
            Some(name) => Err(SchemaError::conflict(name, "the type collection")),
            None => Ok(()),
        }
    }

    fn index(&mut self, names: &Names, named: NamedRef) {
        for name in names.all() {
            self.by_name.insert(name.to_string(), named);
        }
    }

    pub(crate) fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            structs: self.structs.len(),
            enums: self.enums.len(),
        }
    }

    /// Drop every type registered after `checkpoint`, with its names
    pub(crate) fn rollback(&mut self, checkpoint: Checkpoint) {
        self.structs.truncate(checkpoint.structs);
        self.enums.truncate(checkpoint.enums);
        self.by_name.retain(|_, named| match named {
            NamedRef::Struct(id) => id.0 < checkpoint.structs,
            NamedRef::Enum(id) => id.0 < checkpoint.enums,
        });
    }

    /// Look up a type by name or alias
    pub fn get_type(&self, name: &str) -> Result<NamedRef> {
        self.by_name.get(name).copied().ok_or_else(|| SchemaError::NotFound {
            kind: "Type",
            name: name.to_string(),
        })
    }

    pub fn struct_type(&self, id: StructId) -> &StructType {
        &self.structs[id.0]
    }

    pub fn enum_type(&self, id: EnumId) -> &EnumType {
        &self.enums[id.0]
    }

    pub fn structs(&self) -> impl Iterator<Item = (StructId, &StructType)> {
        self.structs.iter().enumerate().map(|(i, s)| (StructId(i), s))
    }

    pub fn enums(&self) -> impl Iterator<Item = (EnumId, &EnumType)> {
        self.enums.iter().enumerate().map(|(i, e)| (EnumId(i), e))
    }

    /// Current name of a named type
    pub fn name_of(&self, named: NamedRef) -> &str {
        match named {
            NamedRef::Struct(id) => self.struct_type(id).name(),
            NamedRef::Enum(id) => self.enum_type(id).name(),
        }
    }

    /// Assign the fields of a struct, exactly once
    pub fn set_fields(&mut self, id: StructId, fields: Vec<Field>) -> Result<()> {
        let owner = Owner {
            collection: self.token,
            index: id.0,
        };
        self.structs[id.0].adopt_fields(owner, fields)
    }

    /// Rename a struct or enum. The old name becomes an alias; renaming to an
    /// own alias swaps the two.
    pub fn rename_type(&mut self, named: NamedRef, new_name: &str) -> Result<()> {
        let by_name = &self.by_name;
        let taken = |name: &str| by_name.get(name).is_some_and(|other| *other != named);
        let names = match named {
            NamedRef::Struct(id) => &mut self.structs[id.0].names,
            NamedRef::Enum(id) => &mut self.enums[id.0].names,
        };
        let old_name = names.name.clone();
        if names.rename(new_name, "the type collection", taken)? {
            debug!(from = %old_name, to = %new_name, "renamed type");
            self.by_name.insert(new_name.to_string(), named);
        }
        Ok(())
    }

    pub fn set_type_documentation(&mut self, named: NamedRef, documentation: Option<String>) {
        match named {
            NamedRef::Struct(id) => self.structs[id.0].set_documentation(documentation),
            NamedRef::Enum(id) => self.enums[id.0].set_documentation(documentation),
        }
    }

    /// Rename a field of a struct; the new name may not be used by a sibling
    pub fn rename_field(&mut self, id: StructId, field: &str, new_name: &str) -> Result<()> {
        self.structs[id.0].rename_field(field, new_name)?;
        debug!(record = %self.structs[id.0].name(), from = %field, to = %new_name, "renamed field");
        Ok(())
    }

    pub fn set_field_documentation(
        &mut self,
        id: StructId,
        field: &str,
        documentation: Option<String>,
    ) -> Result<()> {
        self.structs[id.0].set_field_documentation(field, documentation)
    }

    /// Parse a textual value of a leaf type. Absent input yields no value.
    pub fn parse_value(&self, value_type: &Type, input: Option<&str>) -> Result<Option<Value>> {
        match value_type {
            Type::Scalar(kind) => kind.parse(input),
            Type::Decimal(decimal) => decimal.parse(input),
            Type::Enum(id) => self.enum_type(*id).parse(input),
            Type::Unparsed(inner) => self.parse_value(inner, input),
            Type::Struct(id) => Err(SchemaError::StructuralState(format!(
                "struct {} has fields, not a textual value",
                self.struct_type(*id).name()
            ))),
        }
    }

    /// Structural equality of two types, each interpreted in its own
    /// collection. Handles recursive structs.
    pub fn types_equal(&self, left: &Type, other: &TypeCollection, right: &Type) -> bool {
        self.types_equal_inner(left, other, right, &mut HashSet::new())
    }

    /// Structural equality of two structs, each in its own collection
    pub fn structs_equal(&self, left: StructId, other: &TypeCollection, right: StructId) -> bool {
        self.structs_equal_inner(left, other, right, &mut HashSet::new())
    }

    /// Structural equality of two fields, each in its own collection
    pub fn fields_equal(&self, left: &Field, other: &TypeCollection, right: &Field) -> bool {
        self.fields_equal_inner(left, other, right, &mut HashSet::new())
    }

    fn types_equal_inner(
        &self,
        left: &Type,
        other: &TypeCollection,
        right: &Type,
        visited: &mut HashSet<(StructId, StructId)>,
    ) -> bool {
        match (left, right) {
            (Type::Scalar(a), Type::Scalar(b)) => a == b,
            (Type::Decimal(a), Type::Decimal(b)) => a == b,
            (Type::Enum(a), Type::Enum(b)) => self.enum_type(*a) == other.enum_type(*b),
            (Type::Struct(a), Type::Struct(b)) => self.structs_equal_inner(*a, other, *b, visited),
            (Type::Unparsed(a), Type::Unparsed(b)) => self.types_equal_inner(a, other, b, visited),
            _ => false,
        }
    }

    fn structs_equal_inner(
        &self,
        left: StructId,
        other: &TypeCollection,
        right: StructId,
        visited: &mut HashSet<(StructId, StructId)>,
    ) -> bool {
        // A pair under comparison is assumed equal; mismatches show up elsewhere
        if !visited.insert((left, right)) {
            return true;
        }
        let (a, b) = (self.struct_type(left), other.struct_type(right));
        if a.names != b.names || a.documentation() != b.documentation() {
            return false;
        }
        match (a.fields(), b.fields()) {
            (None, None) => true,
            (Some(fa), Some(fb)) => {
                fa.len() == fb.len()
                    && fa.iter().zip(fb).all(|(x, y)| self.fields_equal_inner(x, other, y, visited))
            }
            _ => false,
        }
    }

    fn fields_equal_inner(
        &self,
        left: &Field,
        other: &TypeCollection,
        right: &Field,
        visited: &mut HashSet<(StructId, StructId)>,
    ) -> bool {
        left.names == right.names
            && left.documentation() == right.documentation()
            && left.cardinality() == right.cardinality()
            && left.default_value() == right.default_value()
            && self.types_equal_inner(left.field_type(), other, right.field_type(), visited)
    }
}
