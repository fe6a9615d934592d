//! Familiar Data Model
//!
//! A portable type model for record-shaped data, with a codec for Avro
//! schemas and path-based editing for schema evolution.
//!
//! ## Features
//!
//! - **Typed leaves**: scalars, bounded decimals and enums parse textual
//!   values into typed `Value`s
//! - **Shared and recursive structs**: named types live in a `TypeCollection`
//!   and reference each other by handle
//! - **Avro codec**: import normalizes redundant constructs, export produces
//!   a canonical form that round-trips
//! - **Evolution-safe renames**: renamed types and fields keep their old
//!   names as aliases
//!
//! ## Example
//!
//! ```no_run
//! use familiar_datamodel::{from_schema_str, FieldPath, SchemaEditor, Type};
//!
//! # fn main() -> familiar_datamodel::Result<()> {
//! let (mut types, root) = from_schema_str(
//!     r#"{"type": "record", "name": "person", "fields": [{"name": "name", "type": "string"}]}"#,
//! )?;
//! if let Type::Struct(id) = root {
//!     SchemaEditor::new(&mut types, id).rename_field(&FieldPath::parse("name"), "full_name")?;
//! }
//! println!("{}", types.display(root));
//! # Ok(())
//! # }
//! ```

pub mod avro;
pub mod collection;
pub mod config;
pub mod decimal;
pub mod editor;
pub mod enums;
pub mod error;
pub mod fingerprint;
pub mod render;
pub mod scalar;
pub mod structs;
pub mod types;
pub mod value;

pub use avro::{from_schema, from_schema_str, to_avro, to_schema, SchemaExporter, SchemaImporter};
pub use collection::{EnumId, NamedRef, StructId, TypeCollection};
pub use config::ModelConfig;
pub use decimal::{DecimalType, Representation};
pub use editor::{FieldPath, SchemaEditor};
pub use enums::EnumType;
pub use error::{Result, SchemaError};
pub use fingerprint::Fingerprint;
pub use render::Renderer;
pub use scalar::ScalarKind;
pub use structs::{Field, StructType};
pub use types::{Cardinality, DefaultValue, Type};
pub use value::Value;
