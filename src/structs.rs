//! Struct types and their fields

use std::collections::{BTreeSet, HashMap};

use crate::error::{Result, SchemaError};
use crate::types::{Cardinality, DefaultValue, Names, Type};

/// Identifies the struct that adopted a field: collection token + struct index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Owner {
    pub collection: u64,
    pub index: usize,
}

/// A field of a struct type
#[derive(Debug, Clone)]
pub struct Field {
    pub(crate) names: Names,
    documentation: Option<String>,
    cardinality: Cardinality,
    field_type: Type,
    default: DefaultValue,
    owner: Option<Owner>,
}

impl Field {
    pub fn new(name: impl Into<String>, cardinality: Cardinality, field_type: impl Into<Type>) -> Self {
        Self {
            names: Names {
                name: name.into(),
                aliases: BTreeSet::new(),
            },
            documentation: None,
            cardinality,
            field_type: field_type.into(),
            default: DefaultValue::NoDefault,
            owner: None,
        }
    }

    pub fn required(name: impl Into<String>, field_type: impl Into<Type>) -> Self {
        Self::new(name, Cardinality::Required, field_type)
    }

    pub fn optional(name: impl Into<String>, field_type: impl Into<Type>) -> Self {
        Self::new(name, Cardinality::Optional, field_type)
    }

    pub fn repeated(name: impl Into<String>, field_type: impl Into<Type>) -> Self {
        Self::new(name, Cardinality::Repeated, field_type)
    }

    /// Replace the aliases; none may equal the field name
    pub fn with_aliases<I, S>(mut self, aliases: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.names = Names::new(self.names.name, aliases)?;
        Ok(self)
    }

    pub fn with_documentation(mut self, documentation: impl Into<String>) -> Self {
        self.documentation = Some(documentation.into());
        self
    }

    /// Set the default value.
    ///
    /// Only optional fields can default to null (a literal JSON null is read as
    /// `ExplicitNull`), and repeated fields need a list literal.
    pub fn with_default(mut self, default: DefaultValue) -> Result<Self> {
        let default = match default {
            DefaultValue::Literal(serde_json::Value::Null) => DefaultValue::ExplicitNull,
            other => other,
        };
        match (&default, self.cardinality) {
            (DefaultValue::ExplicitNull, Cardinality::Required | Cardinality::Repeated) => {
                return Err(SchemaError::InvalidConstruction(format!(
                    "field {} is not optional and cannot default to null",
                    self.names.name
                )));
            }
            (DefaultValue::Literal(value), Cardinality::Repeated) if !value.is_array() => {
                return Err(SchemaError::InvalidConstruction(format!(
                    "repeated field {} needs a list as default, not {}",
                    self.names.name, value
                )));
            }
            _ => {}
        }
        self.default = default;
        Ok(self)
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

    pub fn cardinality(&self) -> Cardinality {
        self.cardinality
    }

    pub fn field_type(&self) -> &Type {
        &self.field_type
    }

    pub fn default_value(&self) -> &DefaultValue {
        &self.default
    }

    /// Rename a field that is not part of a struct yet. Fields of a struct are
    /// renamed through their struct, which checks the sibling fields.
    pub fn rename(&mut self, new_name: &str) -> Result<()> {
        self.names.rename(new_name, "its own names", |_| false)?;
        Ok(())
    }
}

/// Field list of a struct: assigned at most once
#[derive(Debug, Clone, Default)]
enum FieldList {
    #[default]
    Unset,
    Set {
        fields: Vec<Field>,
        /// Every field name and alias -> position
        index: HashMap<String, usize>,
    },
}

/// A named, documented record type
#[derive(Debug, Clone)]
pub struct StructType {
    pub(crate) names: Names,
    documentation: Option<String>,
    fields: FieldList,
}

impl StructType {
    /// Create a struct type without fields. Register it in a `TypeCollection`
    /// to reference it, then assign its fields.
    pub fn new<I, S>(name: impl Into<String>, aliases: I, documentation: Option<String>) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Ok(Self {
            names: Names::new(name, aliases)?,
            documentation,
            fields: FieldList::Unset,
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

    /// The fields, or `None` if they have not been assigned yet
    pub fn fields(&self) -> Option<&[Field]> {
        match &self.fields {
            FieldList::Unset => None,
            FieldList::Set { fields, .. } => Some(fields),
        }
    }

    pub fn has_fields(&self) -> bool {
        matches!(self.fields, FieldList::Set { .. })
    }

    /// Look up a field by name or alias
    pub fn get_field(&self, name: &str) -> Result<&Field> {
        let position = self.position(name)?;
        self.fields()
            .and_then(|fields| fields.get(position))
            .ok_or_else(|| self.missing_field(name))
    }

    fn position(&self, name: &str) -> Result<usize> {
        match &self.fields {
            FieldList::Set { index, .. } => {
                index.get(name).copied().ok_or_else(|| self.missing_field(name))
            }
            FieldList::Unset => Err(SchemaError::StructuralState(format!(
                "struct {} has no fields yet",
                self.names.name
            ))),
        }
    }

    fn missing_field(&self, name: &str) -> SchemaError {
        SchemaError::NotFound {
            kind: "Field",
            name: format!("{}.{}", self.names.name, name),
        }
    }

    /// Adopt a field list. Fails, leaving the struct untouched, if fields were
    /// assigned before, a field belongs to another struct, or names collide.
    pub(crate) fn adopt_fields(&mut self, owner: Owner, mut fields: Vec<Field>) -> Result<()> {
        if self.has_fields() {
            return Err(SchemaError::StructuralState(format!(
                "fields of struct {} can be set only once",
                self.names.name
            )));
        }
        if let Some(field) = fields.iter().find(|f| f.owner.is_some_and(|o| o != owner)) {
            return Err(SchemaError::StructuralState(format!(
                "field {} already belongs to another struct",
                field.names.name
            )));
        }
        let mut index = HashMap::new();
        for (position, field) in fields.iter().enumerate() {
            for name in field.names.all() {
                if index.insert(name.to_string(), position).is_some() {
                    return Err(SchemaError::conflict(
                        name,
                        format!("the fields of struct {}", self.names.name),
                    ));
                }
            }
        }
        for field in &mut fields {
            field.owner = Some(owner);
        }
        self.fields = FieldList::Set { fields, index };
        Ok(())
    }

    /// Rename a field; the new name may not be used by a sibling
    pub(crate) fn rename_field(&mut self, name: &str, new_name: &str) -> Result<()> {
        let position = self.position(name)?;
        let scope = format!("the fields of struct {}", self.names.name);
        if let FieldList::Set { fields, index } = &mut self.fields {
            let field = &mut fields[position];
            let taken = |n: &str| index.get(n).is_some_and(|&p| p != position);
            if field.names.rename(new_name, &scope, taken)? {
                index.insert(new_name.to_string(), position);
            }
        }
        Ok(())
    }

    pub(crate) fn set_field_documentation(&mut self, name: &str, documentation: Option<String>) -> Result<()> {
        let position = self.position(name)?;
        if let FieldList::Set { fields, .. } = &mut self.fields {
            fields[position].set_documentation(documentation);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scalar::ScalarKind;

    const OWNER: Owner = Owner { collection: 1, index: 0 };

    fn string_field(name: &str) -> Field {
        Field::required(name, ScalarKind::String)
    }

    #[test]
    fn test_field_names_may_not_repeat() {
        assert!(string_field("names").with_aliases(["may", "not", "repeat", "names"]).is_err());
    }

    #[test]
    fn test_free_field_rename_round_trip() {
        let mut field = string_field("alias");
        field.rename("field1").unwrap();
        field.rename("alias").unwrap();
        assert_eq!(field.name(), "alias");
        assert_eq!(field.aliases().iter().collect::<Vec<_>>(), vec!["field1"]);
    }

    #[test]
    fn test_default_rules() {
        assert!(string_field("f").with_default(DefaultValue::ExplicitNull).is_err());
        assert!(Field::repeated("f", ScalarKind::String)
            .with_default(DefaultValue::literal("x"))
            .is_err());
        let optional = Field::optional("f", ScalarKind::String)
            .with_default(DefaultValue::Literal(serde_json::Value::Null))
            .unwrap();
        assert_eq!(optional.default_value(), &DefaultValue::ExplicitNull);
    }

    #[test]
    fn test_get_field_by_name_and_alias() {
        let mut record = StructType::new("name", ["alias"], None).unwrap();
        assert!(record.get_field("field1").is_err());

        let field1 = string_field("field1").with_aliases(["alias1", "alias2"]).unwrap();
        record
            .adopt_fields(OWNER, vec![field1.clone(), string_field("field2")])
            .unwrap();

        for name in ["field1", "alias1", "alias2"] {
            let found = record.get_field(name).unwrap();
            assert_eq!(found.name(), "field1");
            assert_eq!(found.aliases(), field1.aliases());
        }
        assert!(matches!(record.get_field("field3"), Err(SchemaError::NotFound { .. })));
    }

    #[test]
    fn test_colliding_fields_leave_struct_unset() {
        let mut record = StructType::new("name", Vec::<String>::new(), None).unwrap();
        let fields = vec![
            string_field("field1"),
            string_field("field2").with_aliases(["alias"]).unwrap(),
            string_field("alias"),
        ];
        assert!(matches!(
            record.adopt_fields(OWNER, fields),
            Err(SchemaError::NamingConflict { .. })
        ));
        assert!(record.fields().is_none());
    }

    #[test]
    fn test_fields_are_write_once_and_owned() {
        let mut record = StructType::new("name", Vec::<String>::new(), None).unwrap();
        record.adopt_fields(OWNER, vec![string_field("field1")]).unwrap();
        let copy = record.fields().unwrap().to_vec();
        assert!(matches!(
            record.adopt_fields(OWNER, copy.clone()),
            Err(SchemaError::StructuralState(_))
        ));

        let mut other = StructType::new("other", Vec::<String>::new(), None).unwrap();
        let other_owner = Owner { collection: 1, index: 1 };
        assert!(matches!(
            other.adopt_fields(other_owner, copy),
            Err(SchemaError::StructuralState(_))
        ));
        assert!(other.fields().is_none());
    }

    #[test]
    fn test_rename_field_checks_siblings() {
        let mut record = StructType::new("name", Vec::<String>::new(), None).unwrap();
        let field1 = string_field("alias").with_aliases(["field1"]).unwrap();
        record
            .adopt_fields(OWNER, vec![field1, string_field("field3")])
            .unwrap();

        assert!(matches!(
            record.rename_field("field3", "alias"),
            Err(SchemaError::NamingConflict { .. })
        ));
        assert!(matches!(
            record.rename_field("field3", "field1"),
            Err(SchemaError::NamingConflict { .. })
        ));

        record.rename_field("field3", "third").unwrap();
        assert_eq!(record.get_field("field3").unwrap().name(), "third");
        assert_eq!(record.get_field("third").unwrap().name(), "third");

        // Swapping with an own alias is allowed
        record.rename_field("alias", "field1").unwrap();
        let field = record.get_field("alias").unwrap();
        assert_eq!(field.name(), "field1");
        assert_eq!(field.aliases().iter().collect::<Vec<_>>(), vec!["alias"]);
    }
}
