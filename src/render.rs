//! Indented text rendering of type graphs
//!
//! Structs render as a header with their name and aliases, followed by one
//! block per field (sorted by name). A struct that was already rendered shows
//! only its header, which keeps shared and recursive types finite.

use similar::{ChangeTag, TextDiff};
use std::collections::HashSet;
use std::fmt;

use crate::collection::{StructId, TypeCollection};
use crate::types::{DefaultValue, Type};

/// Default number of spaces per nesting level
pub const DEFAULT_INDENT: usize = 2;

/// Renders types of one collection
pub struct Renderer<'a> {
    types: &'a TypeCollection,
    indent: usize,
}

impl<'a> Renderer<'a> {
    pub fn new(types: &'a TypeCollection) -> Self {
        Self {
            types,
            indent: DEFAULT_INDENT,
        }
    }

    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    /// Render a type; every line starts with `prefix`
    pub fn render(&self, value_type: &Type, prefix: &str) -> String {
        let mut out = String::new();
        let mut rendered = HashSet::new();
        self.write_type(&mut out, value_type, prefix, prefix, &mut rendered);
        out
    }

    /// `lead` starts the first line, `prefix` all following lines
    fn write_type(
        &self,
        out: &mut String,
        value_type: &Type,
        lead: &str,
        prefix: &str,
        rendered: &mut HashSet<StructId>,
    ) {
        match value_type {
            Type::Scalar(kind) => {
                out.push_str(lead);
                out.push_str(kind.name());
            }
            Type::Decimal(decimal) => {
                out.push_str(lead);
                out.push_str(&decimal.to_string());
            }
            Type::Enum(id) => {
                out.push_str(lead);
                out.push_str(&self.types.enum_type(*id).debug_string());
            }
            Type::Unparsed(inner) => {
                let lead = format!("{}(unparsed) ", lead);
                self.write_type(out, inner, &lead, prefix, rendered);
            }
            Type::Struct(id) => self.write_struct(out, *id, lead, prefix, rendered),
        }
    }

    fn write_struct(
        &self,
        out: &mut String,
        id: StructId,
        lead: &str,
        prefix: &str,
        rendered: &mut HashSet<StructId>,
    ) {
        let struct_type = self.types.struct_type(id);
        out.push_str(lead);
        out.push_str("StructType(");
        out.push_str(struct_type.name());
        for alias in struct_type.aliases() {
            out.push_str(", ");
            out.push_str(alias);
        }
        out.push(')');
        if !rendered.insert(id) {
            return;
        }
        out.push_str(" {");

        let inner = format!("{}{}", prefix, " ".repeat(self.indent));
        let detail = format!("{}{}", inner, " ".repeat(self.indent));
        if let Some(doc) = struct_type.documentation() {
            line(out, &inner, &format!("Doc: {}", doc));
        }
        match struct_type.fields() {
            None => line(out, &inner, "(no fields yet)"),
            Some(fields) => {
                let mut sorted: Vec<_> = fields.iter().collect();
                sorted.sort_by(|a, b| a.name().cmp(b.name()));
                for field in sorted {
                    let mut header = format!("{}{}", field.name(), field.cardinality().suffix());
                    for alias in field.aliases() {
                        header.push_str(", ");
                        header.push_str(alias);
                    }
                    line(out, &inner, &header);
                    if let Some(doc) = field.documentation() {
                        line(out, &detail, &format!("Doc: {}", doc));
                    }
                    if field.default_value() != &DefaultValue::NoDefault {
                        line(out, &detail, &format!("Default: {}", field.default_value()));
                    }
                    out.push('\n');
                    self.write_type(out, field.field_type(), &detail, &detail, rendered);
                }
            }
        }
        out.push('\n');
        out.push_str(prefix);
        out.push('}');
    }
}

fn line(out: &mut String, prefix: &str, text: &str) {
    out.push('\n');
    out.push_str(prefix);
    out.push_str(text);
}

/// Display adapter for a type of a collection
pub struct TypeDisplay<'a> {
    types: &'a TypeCollection,
    value_type: Type,
}

impl TypeCollection {
    /// Render a type with the default indentation
    pub fn display(&self, value_type: impl Into<Type>) -> TypeDisplay<'_> {
        TypeDisplay {
            types: self,
            value_type: value_type.into(),
        }
    }
}

impl fmt::Display for TypeDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&Renderer::new(self.types).render(&self.value_type, ""))
    }
}

/// Line diff between two renderings, prefixed with `-`, `+` or a space
pub fn diff(before: &str, after: &str) -> String {
    let text_diff = TextDiff::from_lines(before, after);
    let mut out = String::new();
    for change in text_diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => '-',
            ChangeTag::Insert => '+',
            ChangeTag::Equal => ' ',
        };
        out.push(sign);
        out.push_str(change.value());
        if change.missing_newline() {
            out.push('\n');
        }
    }
    out
}
