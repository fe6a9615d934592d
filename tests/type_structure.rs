//! End-to-end tests for the type model
//!
//! Imports Avro schemas, renders and exports them, and walks a schema through
//! a series of renames and documentation updates.

use pretty_assertions::assert_eq;
use serde_json::json;

use familiar_datamodel::{
    from_schema, from_schema_str, to_avro, to_schema, Cardinality, DecimalType, DefaultValue, EnumType,
    Field, FieldPath, Fingerprint, ScalarKind, SchemaEditor, SchemaError, StructId, StructType, Type,
    TypeCollection, Value,
};

const FIELDS: &str = include_str!("fixtures/fields.avsc");
const RECURSIVE: &str = include_str!("fixtures/recursive.avsc");

fn record(types: &mut TypeCollection, name: &str, aliases: &[&str], doc: Option<&str>) -> StructId {
    types
        .register_struct(StructType::new(name, aliases.iter().copied(), doc.map(String::from)).unwrap())
        .unwrap()
}

fn root_struct(root: &Type) -> StructId {
    match root {
        Type::Struct(id) => *id,
        other => panic!("Expected a struct, got {:?}", other),
    }
}

// =============================================================================
// Avro conversions
// =============================================================================

#[test]
fn test_import_renders_structure() {
    let (types, root) = from_schema_str(FIELDS).unwrap();
    assert_eq!(
        types.display(root).to_string(),
        include_str!("fixtures/fields.txt").trim_end()
    );
}

#[test]
fn test_export_is_normalized_schema() {
    let (types, root) = from_schema_str(FIELDS).unwrap();
    let expected: serde_json::Value =
        serde_json::from_str(include_str!("fixtures/fields_canonical.avsc")).unwrap();
    assert_eq!(to_schema(&types, &root).unwrap(), expected);
    assert!(to_avro(&types, &root).is_ok());
}

#[test]
fn test_export_is_fixed_point() {
    let (types, root) = from_schema_str(FIELDS).unwrap();
    let exported = to_schema(&types, &root).unwrap();

    let (reimported, reimported_root) = from_schema(&exported).unwrap();
    assert!(types.types_equal(&root, &reimported, &reimported_root));
    assert_eq!(to_schema(&reimported, &reimported_root).unwrap(), exported);

    let original = Fingerprint::of(&to_avro(&types, &root).unwrap());
    let again = Fingerprint::of(&to_avro(&reimported, &reimported_root).unwrap());
    assert_eq!(original, again);
}

#[test]
fn test_recursive_graph_is_fixed_point() {
    let (types, root) = from_schema_str(RECURSIVE).unwrap();
    assert_eq!(types.len(), 4);
    let node = Type::from(types.get_type("graph.Node").unwrap());
    let tree = types.struct_type(root_struct(&root));
    assert_eq!(tree.get_field("children").unwrap().field_type(), &root);
    assert_eq!(tree.get_field("children").unwrap().cardinality(), Cardinality::Repeated);
    assert_eq!(tree.get_field("last").unwrap().field_type(), &node);
    let node_fields = types.struct_type(root_struct(&node));
    assert_eq!(node_fields.get_field("next").unwrap().field_type(), &node);
    assert_eq!(node_fields.get_field("owner").unwrap().field_type(), &root);
    assert!(types.get_type("meta.Kind").is_ok());

    let exported = to_schema(&types, &root).unwrap();
    assert_eq!(exported["fields"][1]["type"], json!({"type": "array", "items": "graph.Tree"}));
    assert_eq!(exported["fields"][3]["type"], json!(["null", "graph.Node"]));
    assert_eq!(exported["fields"][4]["type"], json!("meta.Info"));

    let (reimported, reimported_root) = from_schema(&exported).unwrap();
    assert_eq!(reimported.len(), 4);
    assert!(types.types_equal(&root, &reimported, &reimported_root));
    assert_eq!(to_schema(&reimported, &reimported_root).unwrap(), exported);
    assert_eq!(
        Fingerprint::of(&to_avro(&types, &root).unwrap()),
        Fingerprint::of(&to_avro(&reimported, &reimported_root).unwrap())
    );
}

#[test]
fn test_shared_struct_is_one_type() {
    let (types, root) = from_schema_str(FIELDS).unwrap();
    let fields = types.struct_type(root_struct(&root));
    let structure = fields.get_field("structure").unwrap().field_type();
    assert_eq!(structure, fields.get_field("structure2").unwrap().field_type());
    assert_eq!(types.len(), 3);
}

#[test]
fn test_default_values_export() {
    let mut types = TypeCollection::new();
    let id = record(&mut types, "defaults", &[], None);
    types
        .set_fields(
            id,
            vec![
                Field::optional("optional1", ScalarKind::String)
                    .with_default(DefaultValue::ExplicitNull)
                    .unwrap(),
                Field::optional("optional2", ScalarKind::String)
                    .with_default(DefaultValue::Literal(serde_json::Value::Null))
                    .unwrap(),
                Field::optional("optional3", ScalarKind::String)
                    .with_default(DefaultValue::literal("text"))
                    .unwrap(),
            ],
        )
        .unwrap();

    let expected = json!({"type": "record", "name": "defaults", "fields": [
        {"name": "optional1", "type": ["null", "string"], "default": null},
        {"name": "optional2", "type": ["null", "string"], "default": null},
        {"name": "optional3", "type": ["string", "null"], "default": "text"}
    ]});
    assert_eq!(to_schema(&types, &Type::Struct(id)).unwrap(), expected);
}

#[test]
fn test_conversion_failures() {
    let cases = [
        r#"{"type": "fixed", "name": "not.supported", "size": 8}"#,
        r#"{"type":"record","name":"record","fields":[{"name":"complexUnion","type":["int","string"]}]}"#,
        r#"{"type":"record","name":"record","fields":[{"name":"complexUnion","type":["null","int","string"]}]}"#,
        r#"{"type":"record","name":"record","fields":[{"name":"uselessUnion","type":["null"]}]}"#,
    ];
    for schema in cases {
        let schema: serde_json::Value = serde_json::from_str(schema).unwrap();
        assert!(
            matches!(from_schema(&schema), Err(SchemaError::UnsupportedShape(_))),
            "{}",
            schema
        );
    }
}

#[test]
fn test_parse_values_of_imported_fields() {
    let (types, root) = from_schema_str(FIELDS).unwrap();
    let fields = types.struct_type(root_struct(&root));
    let parse = |field: &str, input: &str| {
        types.parse_value(fields.get_field(field).unwrap().field_type(), Some(input))
    };

    assert_eq!(parse("i_number", "12").unwrap(), Some(Value::Int(12)));
    assert_eq!(parse("l_number", "12").unwrap(), Some(Value::Long(12)));
    assert_eq!(parse("bin", "DEAD").unwrap(), Some(Value::Bytes(vec![0xde, 0xad])));
    assert_eq!(parse("status", "unknown").unwrap(), Some(Value::Symbol("off".to_string())));
    assert!(parse("s_number", "12.345").unwrap_err().is_precision_error());
    assert!(parse("i_number", "twelve").unwrap_err().is_syntax_error());
    assert!(matches!(parse("structure", "x"), Err(SchemaError::StructuralState(_))));
}

// =============================================================================
// Naming and documentation
// =============================================================================

fn before() -> (TypeCollection, StructId) {
    let mut types = TypeCollection::new();
    let root = record(&mut types, "before", &[], Some("gibberish"));
    let nested = record(&mut types, "nested", &[], None);
    let status = types
        .register_enum(
            EnumType::new("Status", Vec::<String>::new(), Some("switch".into()), vec!["ON".into(), "OFF".into()], None)
                .unwrap(),
        )
        .unwrap();
    types
        .set_fields(
            nested,
            vec![
                Field::optional("field1", DecimalType::int())
                    .with_default(DefaultValue::ExplicitNull)
                    .unwrap(),
                Field::required("field2a", ScalarKind::String)
                    .with_aliases(["field2b"])
                    .unwrap()
                    .with_documentation("Many names"),
                Field::required("status", status),
            ],
        )
        .unwrap();
    types
        .set_fields(
            root,
            vec![
                Field::required("name", ScalarKind::String),
                Field::optional("description", ScalarKind::String),
                Field::required("nested", nested),
            ],
        )
        .unwrap();
    (types, root)
}

fn after() -> (TypeCollection, StructId) {
    let mut types = TypeCollection::new();
    let root = record(&mut types, "after", &["before"], Some("Some sensible comment"));
    let ranked = record(&mut types, "ranked", &["nested"], Some("Now with ranked fields"));
    let switch = types
        .register_enum(
            EnumType::new(
                "Switch",
                ["Status"],
                Some("On/Off switch".into()),
                vec!["ON".into(), "OFF".into()],
                None,
            )
            .unwrap(),
        )
        .unwrap();
    types
        .set_fields(
            ranked,
            vec![
                Field::optional("first", DecimalType::int())
                    .with_aliases(["field1"])
                    .unwrap()
                    .with_documentation("Winner!")
                    .with_default(DefaultValue::ExplicitNull)
                    .unwrap(),
                Field::required("second", ScalarKind::String)
                    .with_aliases(["field2a", "field2b"])
                    .unwrap()
                    .with_documentation("Many names"),
                Field::required("toggle", switch)
                    .with_aliases(["status"])
                    .unwrap()
                    .with_documentation("Flip me!"),
            ],
        )
        .unwrap();
    types
        .set_fields(
            root,
            vec![
                Field::required("title", ScalarKind::String).with_aliases(["name"]).unwrap(),
                Field::optional("notes", ScalarKind::String)
                    .with_aliases(["description"])
                    .unwrap()
                    .with_documentation("Notes are helpful"),
                Field::required("ranking", ranked)
                    .with_aliases(["nested"])
                    .unwrap()
                    .with_documentation("Ranking, but no stars"),
            ],
        )
        .unwrap();
    (types, root)
}

#[test]
fn test_updated_names_and_documentation() {
    let (mut types, root) = before();
    let mut editor = SchemaEditor::new(&mut types, root);
    let path = FieldPath::parse;

    editor.document_field(&path("nested.field1"), "Winner!").unwrap();
    editor.document_type(&path("nested.status"), "On/Off switch").unwrap();
    editor.document_field(&path("nested.status"), "Flip me!").unwrap();
    editor.document_field(&path("description"), "Notes are helpful").unwrap();
    editor.document_field(&path("nested"), "Ranking, but no stars").unwrap();
    editor.document_type(&path("nested"), "Now with ranked fields").unwrap();
    editor.document_type(&path(""), "Some sensible comment").unwrap();

    editor.rename_field(&path("nested.field1"), "first").unwrap();
    editor.rename_field(&path("nested.field2b"), "second").unwrap();
    editor.rename_type(&path("nested.status"), "Switch").unwrap();
    editor.rename_field(&path("nested.status"), "toggle").unwrap();
    editor.rename_type(&path("nested"), "ranked").unwrap();
    editor.rename_field(&path("nested"), "ranking").unwrap();
    editor.rename_field(&path("name"), "title").unwrap();
    editor.rename_field(&path("description"), "notes").unwrap();
    editor.rename_type(&path(""), "after").unwrap();

    let (expected_types, expected_root) = after();
    assert_eq!(
        types.display(root).to_string(),
        expected_types.display(expected_root).to_string()
    );
    assert!(types.structs_equal(root, &expected_types, expected_root));

    // Old names keep resolving after the renames
    assert_eq!(types.get_type("before").unwrap(), types.get_type("after").unwrap());
    let ranking = types.struct_type(root).get_field("nested").unwrap();
    assert_eq!(ranking.name(), "ranking");
    assert_eq!(ranking.cardinality(), Cardinality::Required);
}

#[test]
fn test_renamed_schema_exports_aliases() {
    let (mut types, root) = from_schema_str(FIELDS).unwrap();
    let id = root_struct(&root);
    let mut editor = SchemaEditor::new(&mut types, id);
    editor.rename_field(&FieldPath::parse("structure.remark"), "comment").unwrap();
    editor.rename_type(&FieldPath::parse("status"), "ns.switch").unwrap();

    let exported = to_schema(&types, &root).unwrap();
    let cardinality = &exported["fields"][16]["type"];
    assert_eq!(
        cardinality["fields"][2],
        json!({"name": "comment", "aliases": ["remark"], "type": ["null", "string"], "default": null})
    );
    assert_eq!(exported["fields"][15]["type"]["aliases"], json!(["ns.toggle"]));
    assert!(to_avro(&types, &root).is_ok());
}

#[test]
fn test_names_without_namespace_survive_round_trip() {
    let (mut types, root) = from_schema_str(FIELDS).unwrap();
    let mut editor = SchemaEditor::new(&mut types, root_struct(&root));
    editor.rename_type(&FieldPath::parse("status"), "switch").unwrap();
    editor.rename_type(&FieldPath::parse("structure"), "cardinality").unwrap();

    let exported = to_schema(&types, &root).unwrap();
    let status = &exported["fields"][15]["type"];
    assert_eq!(status["name"], json!("switch"));
    assert_eq!(status["namespace"], json!(""));
    assert_eq!(status["aliases"], json!(["ns.toggle"]));
    assert_eq!(exported["fields"][16]["type"]["namespace"], json!(""));
    assert_eq!(exported["fields"][17]["type"], json!("cardinality"));

    let (reimported, reimported_root) = from_schema(&exported).unwrap();
    assert!(reimported.get_type("switch").is_ok());
    assert!(matches!(reimported.get_type("ns.switch"), Err(SchemaError::NotFound { .. })));
    assert!(types.types_equal(&root, &reimported, &reimported_root));
    assert_eq!(to_schema(&reimported, &reimported_root).unwrap(), exported);
}
