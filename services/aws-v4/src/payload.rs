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

use bytes::{Buf, Bytes};
use sigsess_core::hash::{hex_sha256, hex_sha256_read, EMPTY_STRING_SHA256};
use sigsess_core::{Error, Result};
use std::fmt::{self, Debug, Formatter};
use std::io::{self, Cursor, Read, Seek, SeekFrom};

/// A reader that can also seek, used for bodies that can be rewound after
/// hashing.
pub trait ReadSeek: Read + Seek + Send {}

impl<T: Read + Seek + Send> ReadSeek for T {}

/// Payload is the body of a request to sign.
///
/// Signing needs the SHA-256 of the body. How it is obtained depends on the
/// variant:
///
/// - `Empty` and `Bytes` are hashed directly.
/// - `Seekable` is hashed from its current position to the end and then
///   rewound to that position.
/// - `Stream` can only be read once, so it is drained into memory and the
///   payload becomes `Bytes`.
///
/// Payload implements [`Read`] so the transport can consume it afterwards.
#[derive(Default)]
pub enum Payload {
    /// No body.
    #[default]
    Empty,
    /// Body already in memory.
    Bytes(Bytes),
    /// Body that supports seeking.
    Seekable(Box<dyn ReadSeek>),
    /// Body that can only be read once.
    Stream(Box<dyn Read + Send>),
}

impl Payload {
    /// Wrap a seekable reader.
    pub fn seekable(r: impl ReadSeek + 'static) -> Self {
        Payload::Seekable(Box::new(r))
    }

    /// Wrap a read once reader.
    pub fn stream(r: impl Read + Send + 'static) -> Self {
        Payload::Stream(Box::new(r))
    }
}

impl Debug for Payload {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Payload::Empty => f.write_str("Empty"),
            Payload::Bytes(b) => f.debug_tuple("Bytes").field(&b.len()).finish(),
            Payload::Seekable(_) => f.write_str("Seekable"),
            Payload::Stream(_) => f.write_str("Stream"),
        }
    }
}

impl From<Bytes> for Payload {
    fn from(b: Bytes) -> Self {
        Payload::Bytes(b)
    }
}

impl From<Vec<u8>> for Payload {
    fn from(b: Vec<u8>) -> Self {
        Payload::Bytes(b.into())
    }
}

impl From<String> for Payload {
    fn from(s: String) -> Self {
        Payload::Bytes(s.into())
    }
}

impl From<&'static str> for Payload {
    fn from(s: &'static str) -> Self {
        Payload::Bytes(Bytes::from_static(s.as_bytes()))
    }
}

impl Read for Payload {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Payload::Empty => Ok(0),
            Payload::Bytes(b) => {
                let n = buf.len().min(b.len());
                b.copy_to_slice(&mut buf[..n]);
                Ok(n)
            }
            Payload::Seekable(r) => r.read(buf),
            Payload::Stream(r) => r.read(buf),
        }
    }
}

/// Compute the hex encoded SHA-256 of a payload.
///
/// The payload reads the same before and after: seekable bodies are rewound,
/// streams are buffered and replaced by [`Payload::Bytes`]. A stream that
/// fails midway keeps the bytes read so far in front of the remaining reader.
pub fn hash_payload(payload: &mut Payload) -> Result<String> {
    match payload {
        Payload::Empty => Ok(EMPTY_STRING_SHA256.to_string()),
        Payload::Bytes(b) => Ok(hex_sha256(b)),
        Payload::Seekable(r) => {
            let pos = r.stream_position().map_err(body_read_error)?;
            let hash = hex_sha256_read(r.as_mut()).map_err(body_read_error);
            r.seek(SeekFrom::Start(pos)).map_err(body_read_error)?;
            hash
        }
        Payload::Stream(r) => {
            let mut buf = Vec::new();
            if let Err(e) = r.read_to_end(&mut buf) {
                let rest = std::mem::replace(r, Box::new(io::empty()));
                *r = Box::new(Read::chain(Cursor::new(buf), rest));
                return Err(body_read_error(e));
            }
            let hash = hex_sha256(&buf);
            *payload = Payload::Bytes(buf.into());
            Ok(hash)
        }
    }
}

fn body_read_error(e: io::Error) -> Error {
    Error::body_read("failed to read request body").with_source(e)
}
