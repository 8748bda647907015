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

use std::{error::Error as _, fmt};

/// Errors encountered while reading a container file or parsing a schema.
///
/// To inspect the details of the error use [`details`](Self::details) or
/// [`into_details`](Self::into_details) to get a [`Details`] which contains
/// more precise error information.
#[derive(thiserror::Error, Debug)]
#[repr(transparent)]
#[error(transparent)]
pub struct Error {
    details: Box<Details>,
}

impl Error {
    pub fn new(details: Details) -> Self {
        Self {
            details: Box::new(details),
        }
    }

    pub fn details(&self) -> &Details {
        &self.details
    }

    pub fn into_details(self) -> Details {
        *self.details
    }
}

impl From<Details> for Error {
    fn from(details: Details) -> Self {
        Self::new(details)
    }
}

/// The concrete failure kinds.
///
/// Callers can distinguish "not this format" ([`Details::HeaderMagic`]) from
/// "this format but corrupted" (the framing variants) from "valid framing but
/// unsupported schema" (the schema variants).
#[derive(thiserror::Error)]
pub enum Details {
    #[error("Failed to read header: {0}")]
    ReadHeader(#[source] std::io::Error),

    #[error("Wrong header magic")]
    HeaderMagic,

    #[error("Overflow when decoding integer value")]
    IntegerOverflow,

    #[error("Failed to read bytes of a variable-length integer: {0}")]
    ReadVariableIntegerBytes(#[source] std::io::Error),

    #[error("Cannot convert length {1} to usize: {0}")]
    ConvertI64ToUsize(#[source] std::num::TryFromIntError, i64),

    #[error("Cannot convert count {1} to usize: {0}")]
    ConvertU64ToUsize(#[source] std::num::TryFromIntError, u64),

    #[error("Unable to allocate {desired} bytes (maximum allowed: {maximum})")]
    MemoryAllocation { desired: usize, maximum: usize },

    #[error("Invalid utf-8 string")]
    ConvertToUtf8(#[source] std::string::FromUtf8Error),

    #[error("Invalid utf-8 string")]
    ConvertToUtf8Error(#[source] std::str::Utf8Error),

    #[error("Failed to read metadata bytes: {0}")]
    ReadBytes(#[source] std::io::Error),

    #[error("Failed to write bytes: {0}")]
    WriteBytes(#[source] std::io::Error),

    #[error("Failed to read the header sync marker: {0}")]
    ReadMarker(#[source] std::io::Error),

    #[error("Failed to read a block payload: {0}")]
    ReadBlockPayload(#[source] std::io::Error),

    #[error("Failed to read a block sync marker: {0}")]
    ReadBlockMarker(#[source] std::io::Error),

    #[error("The block sync marker does not match the header sync marker")]
    BlockMarkerMismatch,

    #[error("Cannot parse schema from an empty input")]
    EmptySchema,

    #[error("Failed to parse schema from JSON: {0}")]
    ParseSchemaJson(#[source] serde_json::Error),

    #[error("Must be a JSON string or object")]
    ParseSchemaFromValidJson,

    #[error("Unresolved schema reference: {0}")]
    UnresolvedReference(String),

    #[error("Unknown complex type: {0}")]
    UnknownComplexType(String),

    #[error("No string `type` property in the schema object: {0}")]
    GetTypeField(String),

    #[error("Record schema without a valid `name` property (got {0:?})")]
    GetRecordName(Option<String>),

    #[error("No `fields` array in the record schema '{0}'")]
    GetRecordFieldsJson(String),

    #[error("Record '{0}' must declare at least one field")]
    EmptyRecordFields(String),

    #[error("Field {position} of record '{record}' must be a JSON object")]
    GetRecordFieldJson { record: String, position: usize },

    #[error("No valid `name` property in field {position} of record '{record}'")]
    GetNameFieldFromRecord { record: String, position: usize },

    #[error("No `type` property in field '{field}' of record '{record}'")]
    GetFieldTypeField { field: String, record: String },

    #[error("While parsing field '{field}' (position {position}) of record '{record}'")]
    ParseRecordField {
        field: String,
        position: usize,
        record: String,
        #[source]
        source: Box<Error>,
    },

    #[error("Schema nesting exceeds the maximum depth of {0}")]
    RecursionLimit(usize),
}

impl fmt::Debug for Details {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut msg = self.to_string();
        if let Some(e) = self.source() {
            msg.extend([": ", &e.to_string()]);
        }
        write!(f, "{msg}")
    }
}
