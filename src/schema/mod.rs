// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Logic for parsing Avro schemas into the strongly-typed [`Schema`] graph.
//!
//! Only the subset of the Avro schema language embedded by container files in
//! scope here is supported: the eight primitive types and `record`. Named
//! references, unions, arrays, maps, enums and fixed all fail with a distinct
//! error rather than being silently accepted.

mod parser;

use crate::AvroResult;
use crate::error::Details;
use parser::Parser;
use serde_json::Value;
use strum_macros::{Display, EnumDiscriminants, EnumString};

/// Maximum schema nesting accepted by [`Schema::parse_str`].
///
/// Record fields can nest arbitrarily; bounding the recursion turns stack
/// exhaustion on adversarial input into a reported error.
pub const DEFAULT_MAX_SCHEMA_DEPTH: usize = 64;

/// Documentation carried by a record or field, if any.
pub type Documentation = Option<String>;

/// A strongly-typed Avro schema tree.
///
/// Record nodes exclusively own their fields and each field exclusively owns
/// its nested schema; the graph is a tree with no sharing and no cycles.
#[derive(Clone, Debug, PartialEq, EnumDiscriminants, Display)]
#[strum_discriminants(name(SchemaKind), derive(EnumString, Display, Hash, Ord, PartialOrd))]
#[strum_discriminants(strum(serialize_all = "lowercase", ascii_case_insensitive))]
pub enum Schema {
    /// A `null` Avro schema.
    Null,
    /// A `boolean` Avro schema.
    Boolean,
    /// An `int` Avro schema.
    Int,
    /// A `long` Avro schema.
    Long,
    /// A `float` Avro schema.
    Float,
    /// A `double` Avro schema.
    Double,
    /// A `bytes` Avro schema.
    Bytes,
    /// A `string` Avro schema.
    String,
    /// A `record` Avro schema.
    Record(RecordSchema),
}

/// A description of an Avro `record` schema.
#[derive(Clone, Debug, PartialEq)]
pub struct RecordSchema {
    /// The name of the record, never empty.
    pub name: String,
    /// The optional enclosing namespace.
    pub namespace: Option<String>,
    /// The documentation of the record.
    pub doc: Documentation,
    /// The set of fields of the record, in declaration order, never empty.
    pub fields: Vec<RecordField>,
}

/// Represents a `field` in a `record` Avro schema.
#[derive(Clone, Debug, PartialEq)]
pub struct RecordField {
    /// Name of the field, never empty.
    pub name: String,
    /// Documentation of the field.
    pub doc: Documentation,
    /// Schema of the field.
    pub schema: Schema,
    /// Position of the field in the list of `field` of its parent [`Schema`].
    pub position: usize,
}

impl Schema {
    /// Create a `Schema` from a string representing a JSON Avro schema.
    pub fn parse_str(input: &str) -> AvroResult<Schema> {
        Self::parse_str_with_depth(input, DEFAULT_MAX_SCHEMA_DEPTH)
    }

    /// Create a `Schema` from a string representing a JSON Avro schema,
    /// rejecting schemas nested deeper than `max_depth`.
    pub fn parse_str_with_depth(input: &str, max_depth: usize) -> AvroResult<Schema> {
        if input.trim().is_empty() {
            return Err(Details::EmptySchema.into());
        }
        let value = serde_json::from_str(input).map_err(Details::ParseSchemaJson)?;
        Self::parse_with_depth(&value, max_depth)
    }

    /// Create a `Schema` from a `serde_json::Value` representing a JSON Avro
    /// schema.
    pub fn parse(value: &Value) -> AvroResult<Schema> {
        Self::parse_with_depth(value, DEFAULT_MAX_SCHEMA_DEPTH)
    }

    /// Create a `Schema` from a `serde_json::Value`, rejecting schemas nested
    /// deeper than `max_depth`.
    pub fn parse_with_depth(value: &Value, max_depth: usize) -> AvroResult<Schema> {
        Parser::new(max_depth).parse(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("null", Schema::Null)]
    #[case("boolean", Schema::Boolean)]
    #[case("int", Schema::Int)]
    #[case("long", Schema::Long)]
    #[case("float", Schema::Float)]
    #[case("double", Schema::Double)]
    #[case("bytes", Schema::Bytes)]
    #[case("string", Schema::String)]
    fn test_parse_primitive_names(#[case] name: &str, #[case] expected: Schema) {
        let bare = format!("\"{name}\"");
        assert_eq!(Schema::parse_str(&bare).unwrap(), expected);

        // object-form declarations are accepted identically
        let object_form = format!("{{\"type\": \"{name}\"}}");
        assert_eq!(Schema::parse_str(&object_form).unwrap(), expected);
    }

    #[rstest]
    #[case("\"LONG\"")]
    #[case("\"Long\"")]
    #[case("{\"type\": \"lOnG\"}")]
    fn test_primitive_names_are_case_insensitive(#[case] input: &str) {
        assert_eq!(Schema::parse_str(input).unwrap(), Schema::Long);
    }

    #[rstest]
    #[case("")]
    #[case("   \n\t ")]
    fn test_empty_input(#[case] input: &str) {
        assert!(matches!(
            Schema::parse_str(input).unwrap_err().into_details(),
            Details::EmptySchema
        ));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            Schema::parse_str("{\"type\": ").unwrap_err().into_details(),
            Details::ParseSchemaJson(_)
        ));
    }

    #[test]
    fn test_named_reference_is_unresolved() {
        match Schema::parse_str("\"MyNamedType\"").unwrap_err().into_details() {
            Details::UnresolvedReference(name) => assert_eq!(name, "MyNamedType"),
            other => panic!("expected an unresolved reference error, got: {other:?}"),
        }
    }

    #[rstest]
    #[case("[\"null\", \"long\"]")]
    #[case("42")]
    #[case("true")]
    #[case("null")]
    fn test_invalid_schema_element_kind(#[case] input: &str) {
        assert!(matches!(
            Schema::parse_str(input).unwrap_err().into_details(),
            Details::ParseSchemaFromValidJson
        ));
    }

    #[rstest]
    #[case("{\"type\": \"enum\", \"name\": \"E\", \"symbols\": [\"a\"]}", "enum")]
    #[case("{\"type\": \"array\", \"items\": \"long\"}", "array")]
    #[case("{\"type\": \"map\", \"values\": \"long\"}", "map")]
    #[case("{\"type\": \"fixed\", \"name\": \"F\", \"size\": 16}", "fixed")]
    fn test_unknown_complex_type(#[case] input: &str, #[case] type_name: &str) {
        match Schema::parse_str(input).unwrap_err().into_details() {
            Details::UnknownComplexType(name) => assert_eq!(name, type_name),
            other => panic!("expected an unknown complex type error, got: {other:?}"),
        }
    }

    #[rstest]
    #[case("{\"name\": \"R\"}")]
    #[case("{\"type\": 42}")]
    #[case("{\"type\": [\"long\"]}")]
    fn test_missing_type_property(#[case] input: &str) {
        match Schema::parse_str(input).unwrap_err().into_details() {
            Details::GetTypeField(excerpt) => {
                assert!(excerpt.chars().count() <= 100, "excerpt too long: {excerpt}");
            }
            other => panic!("expected a missing `type` error, got: {other:?}"),
        }
    }

    #[test]
    fn test_type_field_excerpt_is_truncated() {
        let filler = "x".repeat(500);
        let input = format!("{{\"padding\": \"{filler}\"}}");
        match Schema::parse_str(&input).unwrap_err().into_details() {
            Details::GetTypeField(excerpt) => assert_eq!(excerpt.chars().count(), 100),
            other => panic!("expected a missing `type` error, got: {other:?}"),
        }
    }

    #[test]
    fn test_record_requires_name() {
        let input = "{\"type\": \"record\", \"fields\": [{\"name\": \"a\", \"type\": \"int\"}]}";
        assert!(matches!(
            Schema::parse_str(input).unwrap_err().into_details(),
            Details::GetRecordName(None)
        ));

        let blank = "{\"type\": \"record\", \"name\": \"\", \"fields\": []}";
        assert!(matches!(
            Schema::parse_str(blank).unwrap_err().into_details(),
            Details::GetRecordName(Some(_))
        ));
    }

    #[test]
    fn test_record_requires_fields_array() {
        let input = "{\"type\": \"record\", \"name\": \"R\"}";
        match Schema::parse_str(input).unwrap_err().into_details() {
            Details::GetRecordFieldsJson(name) => assert_eq!(name, "R"),
            other => panic!("expected a missing `fields` error, got: {other:?}"),
        }
    }

    #[test]
    fn test_record_with_empty_fields_is_rejected() {
        let input = "{\"type\": \"record\", \"name\": \"R\", \"fields\": []}";
        match Schema::parse_str(input).unwrap_err().into_details() {
            Details::EmptyRecordFields(name) => assert_eq!(name, "R"),
            other => panic!("expected an empty fields error, got: {other:?}"),
        }
    }

    #[test]
    fn test_nested_record() {
        let input = r#"
        {
            "type": "record",
            "name": "R",
            "fields": [
                {"name": "a", "type": "int"},
                {"name": "b", "type": {
                    "type": "record",
                    "name": "Inner",
                    "fields": [{"name": "c", "type": "string"}]
                }}
            ]
        }"#;
        let expected = Schema::Record(RecordSchema {
            name: "R".to_string(),
            namespace: None,
            doc: None,
            fields: vec![
                RecordField {
                    name: "a".to_string(),
                    doc: None,
                    schema: Schema::Int,
                    position: 0,
                },
                RecordField {
                    name: "b".to_string(),
                    doc: None,
                    schema: Schema::Record(RecordSchema {
                        name: "Inner".to_string(),
                        namespace: None,
                        doc: None,
                        fields: vec![RecordField {
                            name: "c".to_string(),
                            doc: None,
                            schema: Schema::String,
                            position: 0,
                        }],
                    }),
                    position: 1,
                },
            ],
        });
        assert_eq!(Schema::parse_str(input).unwrap(), expected);
    }

    #[test]
    fn test_record_namespace_and_doc() {
        let input = r#"
        {
            "type": "RECORD",
            "name": "R",
            "namespace": "org.example",
            "doc": "a documented record",
            "fields": [{"name": "a", "type": "long", "doc": "a documented field"}]
        }"#;
        let Schema::Record(record) = Schema::parse_str(input).unwrap() else {
            panic!("expected a record schema");
        };
        assert_eq!(record.namespace.as_deref(), Some("org.example"));
        assert_eq!(record.doc.as_deref(), Some("a documented record"));
        assert_eq!(record.fields[0].doc.as_deref(), Some("a documented field"));
    }

    #[test]
    fn test_non_string_namespace_and_doc_are_ignored() {
        let input = r#"
        {
            "type": "record",
            "name": "R",
            "namespace": 42,
            "doc": ["not", "a", "string"],
            "fields": [{"name": "a", "type": "long"}]
        }"#;
        let Schema::Record(record) = Schema::parse_str(input).unwrap() else {
            panic!("expected a record schema");
        };
        assert_eq!(record.namespace, None);
        assert_eq!(record.doc, None);
    }

    #[test]
    fn test_field_defaults_are_ignored() {
        let input = r#"
        {
            "type": "record",
            "name": "R",
            "fields": [{"name": "a", "type": "long", "default": 42}]
        }"#;
        let Schema::Record(record) = Schema::parse_str(input).unwrap() else {
            panic!("expected a record schema");
        };
        assert_eq!(record.fields[0].schema, Schema::Long);
    }

    #[test]
    fn test_field_error_carries_enclosing_context() {
        let input = r#"
        {
            "type": "record",
            "name": "Y",
            "fields": [{"name": "x", "type": "NoSuchType"}]
        }"#;
        match Schema::parse_str(input).unwrap_err().into_details() {
            Details::ParseRecordField {
                field,
                position,
                record,
                source,
            } => {
                assert_eq!(field, "x");
                assert_eq!(position, 0);
                assert_eq!(record, "Y");
                assert!(matches!(
                    source.into_details(),
                    Details::UnresolvedReference(_)
                ));
            }
            other => panic!("expected a wrapped field error, got: {other:?}"),
        }
    }

    #[test]
    fn test_field_must_be_an_object() {
        let input = "{\"type\": \"record\", \"name\": \"R\", \"fields\": [\"a\"]}";
        assert!(matches!(
            Schema::parse_str(input).unwrap_err().into_details(),
            Details::GetRecordFieldJson { position: 0, .. }
        ));
    }

    #[test]
    fn test_field_requires_name_and_type() {
        let missing_name = "{\"type\": \"record\", \"name\": \"R\", \"fields\": [{\"type\": \"int\"}]}";
        assert!(matches!(
            Schema::parse_str(missing_name).unwrap_err().into_details(),
            Details::GetNameFieldFromRecord { position: 0, .. }
        ));

        let missing_type = "{\"type\": \"record\", \"name\": \"R\", \"fields\": [{\"name\": \"a\"}]}";
        assert!(matches!(
            Schema::parse_str(missing_type).unwrap_err().into_details(),
            Details::GetFieldTypeField { .. }
        ));
    }

    fn nested_record_json(levels: usize) -> String {
        let mut input = "\"long\"".to_string();
        for level in 0..levels {
            input = format!(
                "{{\"type\": \"record\", \"name\": \"R{level}\", \"fields\": [{{\"name\": \"f\", \"type\": {input}}}]}}"
            );
        }
        input
    }

    #[test]
    fn test_recursion_limit() {
        let input = nested_record_json(DEFAULT_MAX_SCHEMA_DEPTH + 1);
        match Schema::parse_str(&input).unwrap_err().into_details() {
            Details::ParseRecordField { mut source, .. } => {
                // the limit error surfaces at the innermost wrapped field
                loop {
                    match source.into_details() {
                        Details::ParseRecordField { source: inner, .. } => source = inner,
                        Details::RecursionLimit(depth) => {
                            assert_eq!(depth, DEFAULT_MAX_SCHEMA_DEPTH);
                            break;
                        }
                        other => panic!("expected a recursion limit error, got: {other:?}"),
                    }
                }
            }
            other => panic!("expected a wrapped field error, got: {other:?}"),
        }
    }

    #[test]
    fn test_custom_recursion_limit() {
        let shallow = nested_record_json(3);
        assert!(Schema::parse_str_with_depth(&shallow, 16).is_ok());

        let deep = nested_record_json(17);
        assert!(Schema::parse_str_with_depth(&deep, 16).is_err());
    }
}
