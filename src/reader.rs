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

//! Logic handling reading the object container file framing.

use crate::error::Details;
use crate::schema::{DEFAULT_MAX_SCHEMA_DEPTH, Schema};
use crate::{AvroResult, util};
use bon::bon;
use log::warn;
use std::collections::HashMap;
use std::io::{ErrorKind, Read};

/// The metadata key holding the writer schema JSON.
pub const SCHEMA_METADATA_KEY: &str = "avro.schema";

/// The size in bytes of the per-file sync marker.
pub const SYNC_MARKER_SIZE: usize = 16;

const MAGIC: [u8; 4] = [b'O', b'b', b'j', 1u8];

/// A fully read object container file.
#[derive(Clone, Debug, PartialEq)]
pub struct Container {
    /// The metadata map of the header. Keys are unique, last write wins when
    /// the file repeats a key.
    pub metadata: HashMap<String, Vec<u8>>,
    /// The per-file random sync marker, used only for framing verification.
    pub sync_marker: [u8; SYNC_MARKER_SIZE],
    /// The writer schema decoded from the `avro.schema` metadata entry, if
    /// that entry is present.
    pub schema: Option<Schema>,
    /// The data blocks, in file order.
    pub blocks: Vec<DataBlock>,
}

impl Container {
    /// Total number of objects across all blocks.
    pub fn object_count(&self) -> u64 {
        self.blocks.iter().map(|block| block.object_count as u64).sum()
    }
}

/// One data block of a container file.
///
/// The payload is opaque at this layer; the declared byte size has already
/// been verified against the actual payload length, and the trailing sync
/// marker against the header marker.
#[derive(Clone, Debug, PartialEq)]
pub struct DataBlock {
    /// Number of objects serialized within the payload.
    pub object_count: usize,
    /// The raw, uninterpreted payload bytes.
    pub payload: Vec<u8>,
}

impl DataBlock {
    /// Size in bytes of the payload.
    pub fn byte_size(&self) -> usize {
        self.payload.len()
    }
}

/// Main interface for reading an object container file.
///
/// The whole file is read eagerly and forward-only:
///
/// ```no_run
/// # use avro_container::Reader;
/// # use std::io::Cursor;
/// # let input = Cursor::new(Vec::<u8>::new());
/// let container = Reader::new(input).read().unwrap();
/// println!("{} blocks", container.blocks.len());
/// ```
pub struct Reader<R> {
    reader: R,
    marker: [u8; SYNC_MARKER_SIZE],
    metadata: HashMap<String, Vec<u8>>,
    max_schema_depth: usize,
}

#[bon]
impl<R: Read> Reader<R> {
    /// Creates a `Reader` given something implementing the `io::Read` trait
    /// to read from.
    pub fn new(reader: R) -> Reader<R> {
        Reader::builder(reader).build()
    }

    /// Creates a `Reader` given something implementing the `io::Read` trait
    /// to read from, with an optional bound on embedded schema nesting.
    #[builder(finish_fn = build)]
    pub fn builder(
        #[builder(start_fn)] reader: R,
        max_schema_depth: Option<usize>,
    ) -> Reader<R> {
        Reader {
            reader,
            marker: [0; SYNC_MARKER_SIZE],
            metadata: HashMap::new(),
            max_schema_depth: max_schema_depth.unwrap_or(DEFAULT_MAX_SCHEMA_DEPTH),
        }
    }

    /// Read the whole container.
    ///
    /// Consumes the byte source sequentially with no backtracking. Any
    /// violation aborts the read; there are no partial results.
    pub fn read(mut self) -> AvroResult<Container> {
        self.read_header()?;

        let schema = match self.metadata.get(SCHEMA_METADATA_KEY) {
            Some(bytes) => {
                let json = std::str::from_utf8(bytes).map_err(Details::ConvertToUtf8Error)?;
                Some(Schema::parse_str_with_depth(json, self.max_schema_depth)?)
            }
            None => None,
        };

        let mut blocks = Vec::new();
        while let Some(block) = self.read_block()? {
            blocks.push(block);
        }

        Ok(Container {
            metadata: self.metadata,
            sync_marker: self.marker,
            schema,
            blocks,
        })
    }

    /// Read the magic, the metadata map and the sync marker.
    fn read_header(&mut self) -> AvroResult<()> {
        let mut buf = [0u8; 4];
        self.reader
            .read_exact(&mut buf)
            .map_err(Details::ReadHeader)?;

        if buf != MAGIC {
            return Err(Details::HeaderMagic.into());
        }

        self.read_metadata()?;

        self.reader
            .read_exact(&mut self.marker)
            .map_err(|e| Details::ReadMarker(e).into())
    }

    /// Read the counted metadata groups until the terminating zero count.
    fn read_metadata(&mut self) -> AvroResult<()> {
        loop {
            let count = util::read_long(&mut self.reader)?;
            if count == 0 {
                break;
            }
            // A negative count mirrors the "count, or negative count followed
            // by a byte length" block convention; only the absolute value is
            // meaningful here.
            for _ in 0..count.unsigned_abs() {
                let key_bytes = self.read_counted_bytes()?;
                let key = String::from_utf8(key_bytes).map_err(Details::ConvertToUtf8)?;
                let value = self.read_counted_bytes()?;
                if key.starts_with("avro.") && key != SCHEMA_METADATA_KEY {
                    warn!("Ignoring unknown metadata key: {key}");
                }
                self.metadata.insert(key, value);
            }
        }
        Ok(())
    }

    /// Read a varint length followed by that many raw bytes.
    fn read_counted_bytes(&mut self) -> AvroResult<Vec<u8>> {
        let len = util::read_long(&mut self.reader)?;
        let len = usize::try_from(len).map_err(|e| Details::ConvertI64ToUsize(e, len))?;
        let mut buf = vec![0u8; util::safe_len(len)?];
        self.reader
            .read_exact(&mut buf)
            .map_err(Details::ReadBytes)?;
        Ok(buf)
    }

    /// Read the next data block, or `None` on a clean end of stream.
    ///
    /// A clean end is only valid at a block boundary: zero bytes of the next
    /// object count may have been consumed.
    fn read_block(&mut self) -> AvroResult<Option<DataBlock>> {
        let mut first = [0u8; 1];
        let n = loop {
            match self.reader.read(&mut first) {
                Ok(n) => break n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(Details::ReadVariableIntegerBytes(e).into()),
            }
        };
        if n == 0 {
            return Ok(None);
        }

        let count = util::read_long(&mut (&first[..]).chain(&mut self.reader))?;
        // Sign-normalized: the encoding never needs negative counts.
        let abs_count = count.unsigned_abs();
        let object_count =
            usize::try_from(abs_count).map_err(|e| Details::ConvertU64ToUsize(e, abs_count))?;

        let byte_size = util::read_long(&mut self.reader)?;
        let byte_size =
            usize::try_from(byte_size).map_err(|e| Details::ConvertI64ToUsize(e, byte_size))?;

        let mut payload = vec![0u8; util::safe_len(byte_size)?];
        self.reader
            .read_exact(&mut payload)
            .map_err(Details::ReadBlockPayload)?;

        let mut trailing = [0u8; SYNC_MARKER_SIZE];
        self.reader
            .read_exact(&mut trailing)
            .map_err(Details::ReadBlockMarker)?;
        if trailing != self.marker {
            // the stream cannot be reliably resynchronized
            return Err(Details::BlockMarkerMismatch.into());
        }

        Ok(Some(DataBlock {
            object_count,
            payload,
        }))
    }
}
