//! Schema fingerprints for integrity checks
//!
//! A fingerprint is the SHA-256 of a schema's Parsing Canonical Form, so it
//! ignores documentation, formatting and attribute order.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Lowercase hex SHA-256 of an Avro schema's canonical form
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn of(schema: &apache_avro::Schema) -> Self {
        Self::from_canonical_form(&schema.canonical_form())
    }

    pub fn from_canonical_form(canonical_form: &str) -> Self {
        Self(hex::encode(Sha256::digest(canonical_form.as_bytes())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether a schema has this fingerprint
    pub fn verify(&self, schema: &apache_avro::Schema) -> bool {
        *self == Self::of(schema)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Fingerprint {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apache_avro::Schema;

    const RECORD: &str = r#"{"type": "record", "name": "ns.test", "fields": [{"name": "a", "type": "int"}]}"#;

    #[test]
    fn test_fingerprint_ignores_documentation_and_layout() {
        let plain = Schema::parse_str(RECORD).unwrap();
        let documented = Schema::parse_str(
            r#"{
                "name": "test",
                "namespace": "ns",
                "type": "record",
                "doc": "Documented",
                "fields": [{"name": "a", "type": "int", "doc": "a number"}]
            }"#,
        )
        .unwrap();
        assert_eq!(Fingerprint::of(&plain), Fingerprint::of(&documented));
        assert!(Fingerprint::of(&plain).verify(&documented));
    }

    #[test]
    fn test_fingerprint_detects_changes() {
        let before = Schema::parse_str(RECORD).unwrap();
        let after = Schema::parse_str(
            r#"{"type": "record", "name": "ns.test", "fields": [{"name": "a", "type": "long"}]}"#,
        )
        .unwrap();
        assert_ne!(Fingerprint::of(&before), Fingerprint::of(&after));
    }

    #[test]
    fn test_fingerprint_format() {
        let fingerprint = Fingerprint::from_canonical_form("\"int\"");
        assert_eq!(fingerprint.as_str().len(), 64);
        assert!(fingerprint.to_string().chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }
}
