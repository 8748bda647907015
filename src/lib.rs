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

//! A minimal, read-only decoder for the **Avro object container file**
//! format: a binary container embedding a self-describing JSON schema and a
//! sequence of data blocks delimited by a per-file random sync marker.
//!
//! [`Reader`] validates the magic header, decodes the counted metadata map,
//! parses the writer schema found under the `avro.schema` metadata key into a
//! strongly-typed [`Schema`] graph and verifies the sync-marker framing of
//! every data block. Block payloads are kept as opaque bytes: decoding them
//! into typed records, codec handling and named-type resolution are outside
//! the scope of this crate.
//!
//! ```no_run
//! use avro_container::Reader;
//! use std::fs::File;
//!
//! # fn main() -> anyhow::Result<()> {
//! let file = File::open("data.avro")?;
//! let container = Reader::new(file).read()?;
//! println!(
//!     "{} objects in {} blocks",
//!     container.object_count(),
//!     container.blocks.len()
//! );
//! # Ok(())
//! # }
//! ```
//!
//! Every failure surfaces as a distinct [`error::Details`] kind, so callers
//! can tell "not this format" from "this format but corrupted" from "valid
//! framing but unsupported schema". The crate never logs user-visible output;
//! diagnostics go through the [`log`] facade.

mod reader;

pub mod error;
pub mod schema;
pub mod util;

pub use error::Error;
pub use reader::{Container, DataBlock, Reader, SCHEMA_METADATA_KEY, SYNC_MARKER_SIZE};
pub use schema::Schema;

/// A convenience type alias for `Result`s with `Error`s.
pub type AvroResult<T> = Result<T, Error>;
