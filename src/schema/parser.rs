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

use crate::error::{Details, Error};
use crate::schema::{RecordField, RecordSchema, Schema, SchemaKind};
use crate::util::MapHelper;
use crate::AvroResult;
use log::debug;
use serde_json::{Map, Value};
use std::str::FromStr;

/// Characters of the offending JSON kept in diagnostics.
const EXCERPT_LEN: usize = 100;

pub(crate) struct Parser {
    max_depth: usize,
    depth: usize,
}

impl Parser {
    pub(crate) fn new(max_depth: usize) -> Self {
        Self {
            max_depth,
            depth: 0,
        }
    }

    /// Create a `Schema` from a `serde_json::Value` representing a JSON Avro
    /// schema.
    pub(crate) fn parse(&mut self, value: &Value) -> AvroResult<Schema> {
        if self.depth >= self.max_depth {
            return Err(Details::RecursionLimit(self.max_depth).into());
        }
        self.depth += 1;
        let parsed = match *value {
            Value::String(ref t) => self.parse_known_schema(t.as_str()),
            Value::Object(ref data) => self.parse_complex(data),
            _ => Err(Details::ParseSchemaFromValidJson.into()),
        };
        self.depth -= 1;
        parsed
    }

    /// Parse a string as a primitive type name.
    ///
    /// There is no named-type registry: a bare name that is not a primitive
    /// is unsupported by design and fails fast.
    fn parse_known_schema(&mut self, name: &str) -> AvroResult<Schema> {
        match primitive_schema(name) {
            Some(primitive) => Ok(primitive),
            None => Err(Details::UnresolvedReference(name.to_string()).into()),
        }
    }

    /// Parse a `serde_json::Value` representing a complex Avro type into a
    /// `Schema`.
    ///
    /// Object-form primitive declarations, e.g. `{"type": "long"}`, are
    /// accepted identically to bare-string primitives.
    fn parse_complex(&mut self, complex: &Map<String, Value>) -> AvroResult<Schema> {
        match complex.get("type") {
            Some(Value::String(t)) => {
                if let Some(primitive) = primitive_schema(t) {
                    Ok(primitive)
                } else if t.eq_ignore_ascii_case("record") {
                    self.parse_record(complex)
                } else {
                    Err(Details::UnknownComplexType(t.clone()).into())
                }
            }
            _ => Err(Details::GetTypeField(json_excerpt(complex)).into()),
        }
    }

    /// Parse a `serde_json::Value` representing an Avro record type into a
    /// `Schema`.
    fn parse_record(&mut self, complex: &Map<String, Value>) -> AvroResult<Schema> {
        let name = complex
            .name()
            .filter(|name| !name.is_empty())
            .ok_or_else(|| Error::from(Details::GetRecordName(complex.name())))?;

        debug!("Going to parse record schema: {name:?}");

        let fields_json = complex
            .get("fields")
            .and_then(|fields| fields.as_array())
            .ok_or_else(|| Error::from(Details::GetRecordFieldsJson(name.clone())))?;
        if fields_json.is_empty() {
            return Err(Details::EmptyRecordFields(name).into());
        }

        let mut fields = Vec::with_capacity(fields_json.len());
        for (position, field) in fields_json.iter().enumerate() {
            fields.push(RecordField::parse(field, position, self, &name)?);
        }

        Ok(Schema::Record(RecordSchema {
            namespace: complex.string("namespace"),
            doc: complex.doc(),
            name,
            fields,
        }))
    }
}

impl RecordField {
    /// Parse a `serde_json::Value` into a `RecordField`.
    pub(crate) fn parse(
        field: &Value,
        position: usize,
        parser: &mut Parser,
        enclosing_record: &str,
    ) -> AvroResult<Self> {
        let field = field.as_object().ok_or_else(|| {
            Error::from(Details::GetRecordFieldJson {
                record: enclosing_record.to_string(),
                position,
            })
        })?;

        let name = field
            .name()
            .filter(|name| !name.is_empty())
            .ok_or_else(|| {
                Error::from(Details::GetNameFieldFromRecord {
                    record: enclosing_record.to_string(),
                    position,
                })
            })?;

        let type_json = field.get("type").ok_or_else(|| {
            Error::from(Details::GetFieldTypeField {
                field: name.clone(),
                record: enclosing_record.to_string(),
            })
        })?;

        let schema = parser.parse(type_json).map_err(|source| {
            Error::from(Details::ParseRecordField {
                field: name.clone(),
                position,
                record: enclosing_record.to_string(),
                source: Box::new(source),
            })
        })?;

        // A `default` property is recognized as ignorable: it is neither
        // extracted nor validated.
        Ok(RecordField {
            name,
            doc: field.doc(),
            schema,
            position,
        })
    }
}

/// Case-insensitively match one of the eight primitive type names.
fn primitive_schema(name: &str) -> Option<Schema> {
    match SchemaKind::from_str(name).ok()? {
        SchemaKind::Null => Some(Schema::Null),
        SchemaKind::Boolean => Some(Schema::Boolean),
        SchemaKind::Int => Some(Schema::Int),
        SchemaKind::Long => Some(Schema::Long),
        SchemaKind::Float => Some(Schema::Float),
        SchemaKind::Double => Some(Schema::Double),
        SchemaKind::Bytes => Some(Schema::Bytes),
        SchemaKind::String => Some(Schema::String),
        SchemaKind::Record => None,
    }
}

/// A bounded excerpt of the offending JSON for diagnostics.
fn json_excerpt(complex: &Map<String, Value>) -> String {
    let text = Value::Object(complex.clone()).to_string();
    text.chars().take(EXCERPT_LEN).collect()
}
