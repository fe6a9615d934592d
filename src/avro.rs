//! Avro schema codec
//!
//! Converts Avro schema documents (JSON) into the type model and back.
//!
//! Import maps records to structs, enums to enums, primitives and logical
//! types to scalars and decimals, and unions with `null` to optional fields.
//! A few redundant Avro constructs are normalized on the way in:
//! - a one-branch union is its single branch
//! - an optional array is a repeated field (an absent list is an empty list)
//! - nullable array items are plain items
//! - logical types without a counterpart fall back to their primitive
//!
//! Constructs the model cannot represent (`fixed`, `map`, nested arrays,
//! unions of several non-null types) are rejected.
//!
//! Export always produces the canonical form, so exporting an imported graph
//! and importing it again yields an equal graph.

use serde_json::{json, Map, Value as Json};
use std::collections::HashSet;
use tracing::debug;

use crate::collection::{NamedRef, StructId, TypeCollection};
use crate::decimal::DecimalType;
use crate::enums::EnumType;
use crate::error::{Result, SchemaError};
use crate::scalar::ScalarKind;
use crate::structs::{Field, StructType};
use crate::types::{Cardinality, DefaultValue, Type};

/// Import an Avro schema into a new type collection
pub fn from_schema(schema: &Json) -> Result<(TypeCollection, Type)> {
    let mut types = TypeCollection::new();
    let root = SchemaImporter::new(&mut types).import(schema)?;
    Ok((types, root))
}

/// Parse, validate and import an Avro schema document
pub fn from_schema_str(text: &str) -> Result<(TypeCollection, Type)> {
    let schema: Json = serde_json::from_str(text)?;
    validate(&schema)?;
    from_schema(&schema)
}

/// Export a type as a canonical Avro schema
pub fn to_schema(types: &TypeCollection, root: &Type) -> Result<Json> {
    SchemaExporter::new(types).export(root)
}

/// Export a type and parse the result with apache-avro
pub fn to_avro(types: &TypeCollection, root: &Type) -> Result<apache_avro::Schema> {
    validate(&to_schema(types, root)?)
}

/// Check that a document is a valid Avro schema
pub fn validate(schema: &Json) -> Result<apache_avro::Schema> {
    Ok(apache_avro::Schema::parse(schema)?)
}

fn unsupported(message: impl Into<String>) -> SchemaError {
    SchemaError::UnsupportedShape(message.into())
}

/// Qualify a name with a namespace, unless it is already a full name
fn qualify(name: &str, namespace: Option<&str>) -> String {
    match namespace {
        Some(namespace) if !name.contains('.') => format!("{}.{}", namespace, name),
        _ => name.to_string(),
    }
}

fn is_null(schema: &Json) -> bool {
    match schema {
        Json::String(name) => name == "null",
        Json::Object(object) => object.get("type").and_then(Json::as_str) == Some("null"),
        _ => false,
    }
}

/// Items of an array schema, if this is one
fn array_items(schema: &Json) -> Option<&Json> {
    let object = schema.as_object()?;
    match object.get("type")? {
        Json::String(kind) if kind == "array" => object.get("items"),
        _ => None,
    }
}

/// Split a union into its single non-null branch and whether it included null
fn split_union(branches: &[Json]) -> Result<(&Json, bool)> {
    let nulls = branches.iter().filter(|b| is_null(b)).count();
    let others: Vec<&Json> = branches.iter().filter(|b| !is_null(b)).collect();
    match (others.as_slice(), nulls) {
        ([branch], 0) => Ok((*branch, false)),
        ([branch], 1) => Ok((*branch, true)),
        ([], _) => Err(unsupported("a union needs a non-null branch")),
        (_, 0 | 1) => Err(unsupported(format!(
            "unions of {} non-null branches are not supported",
            others.len()
        ))),
        _ => Err(unsupported("a union can contain null only once")),
    }
}

fn documentation(object: &Map<String, Json>) -> Option<String> {
    object.get("doc").and_then(Json::as_str).map(String::from)
}

fn string_list(object: &Map<String, Json>, key: &str) -> Result<Vec<String>> {
    match object.get(key) {
        None => Ok(Vec::new()),
        Some(Json::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(String::from)
                    .ok_or_else(|| unsupported(format!("'{}' must contain strings, found {}", key, item)))
            })
            .collect(),
        Some(other) => Err(unsupported(format!("'{}' must be a list, found {}", key, other))),
    }
}

fn attribute_u32(object: &Map<String, Json>, key: &str) -> Result<Option<u32>> {
    match object.get(key) {
        None => Ok(None),
        Some(value) => value
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .map(Some)
            .ok_or_else(|| unsupported(format!("'{}' must be a small non-negative integer, found {}", key, value))),
    }
}

/// Imports Avro schemas into a type collection
pub struct SchemaImporter<'a> {
    types: &'a mut TypeCollection,
}

impl<'a> SchemaImporter<'a> {
    pub fn new(types: &'a mut TypeCollection) -> Self {
        Self { types }
    }

    /// Import a schema. Named types are registered in the collection; on
    /// failure the collection is left as it was.
    pub fn import(&mut self, schema: &Json) -> Result<Type> {
        let checkpoint = self.types.checkpoint();
        self.import_type(schema, None).inspect_err(|e| {
            debug!(error = %e, "import failed, dropping partially imported types");
            self.types.rollback(checkpoint);
        })
    }

    fn import_type(&mut self, schema: &Json, namespace: Option<&str>) -> Result<Type> {
        match schema {
            Json::String(name) => self.import_name(name, namespace),
            Json::Object(object) => self.import_object(object, namespace),
            Json::Array(_) => Err(unsupported("unions are only supported as field types")),
            other => Err(unsupported(format!("not a schema: {}", other))),
        }
    }

    /// A primitive type or a reference to a named type
    fn import_name(&mut self, name: &str, namespace: Option<&str>) -> Result<Type> {
        let primitive: Type = match name {
            "boolean" => ScalarKind::Boolean.into(),
            "bytes" => ScalarKind::BinaryHex.into(),
            "double" => ScalarKind::Double.into(),
            "float" => ScalarKind::Float.into(),
            "string" => ScalarKind::String.into(),
            "int" => DecimalType::int().into(),
            "long" => DecimalType::long().into(),
            "null" => return Err(unsupported("null is only supported in unions")),
            _ => {
                let qualified = qualify(name, namespace);
                let named = self
                    .types
                    .get_type(&qualified)
                    .or_else(|_| self.types.get_type(name))?;
                return Ok(named.into());
            }
        };
        Ok(primitive)
    }

    fn import_object(&mut self, object: &Map<String, Json>, namespace: Option<&str>) -> Result<Type> {
        match object.get("type") {
            Some(Json::String(kind)) => match kind.as_str() {
                "record" | "error" => self.import_record(object, namespace),
                "enum" => self.import_enum(object, namespace),
                "fixed" => Err(unsupported("fixed types are not supported")),
                "map" => Err(unsupported("maps are not supported")),
                "array" => Err(unsupported("arrays are only supported as field types")),
                primitive => self.import_logical(primitive, object, namespace),
            },
            Some(nested @ (Json::Object(_) | Json::Array(_))) => self.import_type(nested, namespace),
            _ => Err(unsupported(format!("schema without a type: {}", Json::Object(object.clone())))),
        }
    }

    fn import_logical(
        &mut self,
        primitive: &str,
        object: &Map<String, Json>,
        namespace: Option<&str>,
    ) -> Result<Type> {
        let logical = object.get("logicalType").and_then(Json::as_str);
        let scalar = match (primitive, logical) {
            ("bytes", Some("decimal")) => {
                let precision = attribute_u32(object, "precision")?
                    .ok_or_else(|| unsupported("decimal without a precision"))?;
                let scale = attribute_u32(object, "scale")?.unwrap_or(0);
                return Ok(DecimalType::new(precision, scale)?.into());
            }
            ("int", Some("date")) => ScalarKind::Date,
            ("int", Some("time-millis")) => ScalarKind::Time,
            ("long", Some("time-micros")) => ScalarKind::TimeMicros,
            ("long", Some("timestamp-millis")) => ScalarKind::DateTime,
            ("long", Some("timestamp-micros")) => ScalarKind::DateTimeMicros,
            (_, Some(logical)) => {
                debug!(logical_type = %logical, primitive = %primitive, "dropping unsupported logical type");
                return self.import_name(primitive, namespace);
            }
            (_, None) => return self.import_name(primitive, namespace),
        };
        Ok(scalar.into())
    }

    /// Full name and namespace of a named type
    fn full_name(object: &Map<String, Json>, enclosing: Option<&str>) -> Result<(String, Option<String>)> {
        let name = object
            .get("name")
            .and_then(Json::as_str)
            .ok_or_else(|| unsupported("named type without a name"))?;
        if let Some((namespace, _)) = name.rsplit_once('.') {
            return Ok((name.to_string(), Some(namespace.to_string())));
        }
        let namespace = match object.get("namespace") {
            Some(explicit) => explicit.as_str(),
            None => enclosing,
        }
        .filter(|ns| !ns.is_empty());
        Ok((qualify(name, namespace), namespace.map(String::from)))
    }

    fn import_record(&mut self, object: &Map<String, Json>, enclosing: Option<&str>) -> Result<Type> {
        let (name, namespace) = Self::full_name(object, enclosing)?;
        let aliases: Vec<String> = string_list(object, "aliases")?
            .iter()
            .map(|alias| qualify(alias, namespace.as_deref()))
            .collect();
        let fields = object
            .get("fields")
            .and_then(Json::as_array)
            .ok_or_else(|| unsupported(format!("record {} has no field list", name)))?;

        // Register first, so fields can refer to the record itself
        let struct_type = StructType::new(name.as_str(), aliases, documentation(object))?;
        let id = self.types.register_struct(struct_type)?;
        debug!(name = %name, fields = fields.len(), "importing record");

        let fields = fields
            .iter()
            .map(|field| self.import_field(field, namespace.as_deref()))
            .collect::<Result<Vec<_>>>()?;
        self.types.set_fields(id, fields)?;
        Ok(Type::Struct(id))
    }

    fn import_enum(&mut self, object: &Map<String, Json>, enclosing: Option<&str>) -> Result<Type> {
        let (name, namespace) = Self::full_name(object, enclosing)?;
        let aliases: Vec<String> = string_list(object, "aliases")?
            .iter()
            .map(|alias| qualify(alias, namespace.as_deref()))
            .collect();
        let symbols = string_list(object, "symbols")?;
        let default = object.get("default").and_then(Json::as_str).map(String::from);
        debug!(name = %name, symbols = symbols.len(), "importing enum");
        let enum_type = EnumType::new(name, aliases, documentation(object), symbols, default)?;
        Ok(Type::Enum(self.types.register_enum(enum_type)?))
    }

    fn import_field(&mut self, field: &Json, namespace: Option<&str>) -> Result<Field> {
        let object = field
            .as_object()
            .ok_or_else(|| unsupported(format!("not a record field: {}", field)))?;
        let name = object
            .get("name")
            .and_then(Json::as_str)
            .ok_or_else(|| unsupported("record field without a name"))?;
        let schema = object
            .get("type")
            .ok_or_else(|| unsupported(format!("field {} has no type", name)))?;

        let (cardinality, field_type, default) =
            self.field_shape(name, schema, object.get("default"), namespace)?;
        let mut field = Field::new(name, cardinality, field_type)
            .with_aliases(string_list(object, "aliases")?)?
            .with_default(default)?;
        if let Some(doc) = documentation(object) {
            field = field.with_documentation(doc);
        }
        Ok(field)
    }

    fn field_shape(
        &mut self,
        name: &str,
        schema: &Json,
        default: Option<&Json>,
        namespace: Option<&str>,
    ) -> Result<(Cardinality, Type, DefaultValue)> {
        if let Json::Array(branches) = schema {
            return self.union_shape(name, branches, default, namespace);
        }
        if let Some(items) = array_items(schema) {
            let item_type = self.item_type(name, items, namespace)?;
            let default = match default {
                Some(value) => DefaultValue::Literal(value.clone()),
                None => DefaultValue::empty_list(),
            };
            return Ok((Cardinality::Repeated, item_type, default));
        }
        let field_type = self.import_type(schema, namespace)?;
        let default = default.map_or(DefaultValue::NoDefault, |value| DefaultValue::Literal(value.clone()));
        Ok((Cardinality::Required, field_type, default))
    }

    fn union_shape(
        &mut self,
        name: &str,
        branches: &[Json],
        default: Option<&Json>,
        namespace: Option<&str>,
    ) -> Result<(Cardinality, Type, DefaultValue)> {
        let (branch, nullable) = split_union(branches)?;
        if !nullable {
            debug!(field = %name, "unwrapping single-branch union");
            return self.field_shape(name, branch, default, namespace);
        }
        if let Some(items) = array_items(branch) {
            debug!(field = %name, "importing optional array as repeated field");
            let item_type = self.item_type(name, items, namespace)?;
            let default = match default {
                None | Some(Json::Null) => DefaultValue::empty_list(),
                Some(value) => DefaultValue::Literal(value.clone()),
            };
            return Ok((Cardinality::Repeated, item_type, default));
        }
        let field_type = self.import_type(branch, namespace)?;
        let default = match default {
            None => DefaultValue::NoDefault,
            Some(Json::Null) => DefaultValue::ExplicitNull,
            Some(value) => DefaultValue::Literal(value.clone()),
        };
        Ok((Cardinality::Optional, field_type, default))
    }

    fn item_type(&mut self, name: &str, items: &Json, namespace: Option<&str>) -> Result<Type> {
        let items = match items {
            Json::Array(branches) => {
                let (branch, nullable) = split_union(branches)?;
                if nullable {
                    debug!(field = %name, "dropping nullability of array items");
                }
                branch
            }
            other => other,
        };
        if array_items(items).is_some() {
            return Err(unsupported(format!("field {} is a nested array", name)));
        }
        self.import_type(items, namespace)
    }
}

/// Exports types of a collection as canonical Avro schemas
pub struct SchemaExporter<'a> {
    types: &'a TypeCollection,
    /// Named types already written; later uses refer to them by name
    defined: HashSet<NamedRef>,
    /// Namespace a nested definition would inherit on import
    namespace: Option<String>,
}

impl<'a> SchemaExporter<'a> {
    pub fn new(types: &'a TypeCollection) -> Self {
        Self {
            types,
            defined: HashSet::new(),
            namespace: None,
        }
    }

    pub fn export(&mut self, root: &Type) -> Result<Json> {
        self.defined.clear();
        self.namespace = None;
        self.export_type(root)
    }

    /// Write the name of a named type definition. A name without namespace
    /// nested in a namespaced record needs an explicit empty namespace.
    fn insert_name(&self, object: &mut Map<String, Json>, name: &str) {
        object.insert("name".into(), json!(name));
        if !name.contains('.') && self.namespace.is_some() {
            object.insert("namespace".into(), json!(""));
        }
    }

    fn export_type(&mut self, value_type: &Type) -> Result<Json> {
        let schema = match value_type {
            Type::Scalar(kind) => Self::export_scalar(*kind),
            Type::Decimal(decimal) => Self::export_decimal(decimal),
            Type::Enum(id) => {
                let enum_type = self.types.enum_type(*id);
                if !self.defined.insert(NamedRef::Enum(*id)) {
                    return Ok(json!(enum_type.name()));
                }
                let mut object = Map::new();
                object.insert("type".into(), json!("enum"));
                self.insert_name(&mut object, enum_type.name());
                if !enum_type.aliases().is_empty() {
                    object.insert("aliases".into(), json!(enum_type.aliases()));
                }
                if let Some(doc) = enum_type.documentation() {
                    object.insert("doc".into(), json!(doc));
                }
                object.insert("symbols".into(), json!(enum_type.symbols()));
                if let Some(default) = enum_type.default_symbol() {
                    object.insert("default".into(), json!(default));
                }
                Json::Object(object)
            }
            Type::Struct(id) => self.export_struct(*id)?,
            Type::Unparsed(inner) => self.export_type(inner)?,
        };
        Ok(schema)
    }

    fn export_scalar(kind: ScalarKind) -> Json {
        let logical = |primitive: &str, logical_type: &str| {
            json!({"type": primitive, "logicalType": logical_type})
        };
        match kind {
            ScalarKind::Boolean => json!("boolean"),
            ScalarKind::Float => json!("float"),
            ScalarKind::Double => json!("double"),
            ScalarKind::String => json!("string"),
            ScalarKind::BinaryHex | ScalarKind::BinaryBase64 => json!("bytes"),
            ScalarKind::Date => logical("int", "date"),
            ScalarKind::Time => logical("int", "time-millis"),
            ScalarKind::TimeMicros => logical("long", "time-micros"),
            ScalarKind::DateTime => logical("long", "timestamp-millis"),
            ScalarKind::DateTimeMicros => logical("long", "timestamp-micros"),
        }
    }

    fn export_decimal(decimal: &DecimalType) -> Json {
        if *decimal == DecimalType::int() {
            json!("int")
        } else if *decimal == DecimalType::long() {
            json!("long")
        } else {
            json!({
                "type": "bytes",
                "logicalType": "decimal",
                "precision": decimal.precision(),
                "scale": decimal.scale(),
            })
        }
    }

    fn export_struct(&mut self, id: StructId) -> Result<Json> {
        let struct_type = self.types.struct_type(id);
        if !self.defined.insert(NamedRef::Struct(id)) {
            return Ok(json!(struct_type.name()));
        }
        let fields = struct_type.fields().ok_or_else(|| {
            SchemaError::StructuralState(format!("struct {} has no fields yet", struct_type.name()))
        })?;

        let mut object = Map::new();
        object.insert("type".into(), json!("record"));
        self.insert_name(&mut object, struct_type.name());
        if !struct_type.aliases().is_empty() {
            object.insert("aliases".into(), json!(struct_type.aliases()));
        }
        if let Some(doc) = struct_type.documentation() {
            object.insert("doc".into(), json!(doc));
        }
        let namespace = struct_type.name().rsplit_once('.').map(|(ns, _)| ns.to_string());
        let enclosing = std::mem::replace(&mut self.namespace, namespace);
        let fields = fields
            .iter()
            .map(|field| self.export_field(field))
            .collect::<Result<Vec<_>>>();
        self.namespace = enclosing;
        object.insert("fields".into(), Json::Array(fields?));
        Ok(Json::Object(object))
    }

    fn export_field(&mut self, field: &Field) -> Result<Json> {
        let mut object = Map::new();
        object.insert("name".into(), json!(field.name()));
        if !field.aliases().is_empty() {
            object.insert("aliases".into(), json!(field.aliases()));
        }
        if let Some(doc) = field.documentation() {
            object.insert("doc".into(), json!(doc));
        }

        let inner = self.export_type(field.field_type())?;
        let (schema, default) = match (field.cardinality(), field.default_value()) {
            (Cardinality::Required, DefaultValue::Literal(value)) => (inner, Some(value.clone())),
            (Cardinality::Required, _) => (inner, None),
            (Cardinality::Optional, DefaultValue::NoDefault) => (json!(["null", inner]), None),
            (Cardinality::Optional, DefaultValue::ExplicitNull) => (json!(["null", inner]), Some(Json::Null)),
            // The default of a union must match its first branch
            (Cardinality::Optional, DefaultValue::Literal(value)) => {
                (json!([inner, "null"]), Some(value.clone()))
            }
            (Cardinality::Repeated, DefaultValue::Literal(value)) => {
                (json!({"type": "array", "items": inner}), Some(value.clone()))
            }
            (Cardinality::Repeated, _) => (json!({"type": "array", "items": inner}), Some(json!([]))),
        };
        object.insert("type".into(), schema);
        if let Some(default) = default {
            object.insert("default".into(), default);
        }
        Ok(Json::Object(object))
    }
}
