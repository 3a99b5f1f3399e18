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

//! Canonical request construction.
//!
//! - [Create a canonical request](https://docs.aws.amazon.com/IAM/latest/UserGuide/create-signed-request.html#create-canonical-request)

use crate::constants::{AWS_QUERY_ENCODE_SET, AWS_URI_ENCODE_SET};
use http::header::{AUTHORIZATION, HOST};
use http::{HeaderMap, Method, Uri};
use percent_encoding::{percent_decode_str, percent_encode};
use sigsess_core::{Error, Result};
use std::fmt::{self, Display};

/// CanonicalRequest is the exact serialization of a request that gets signed.
///
/// Its [`Display`] output is:
///
/// ```text
/// <method>
/// <canonical uri>
/// <canonical query string>
/// <canonical headers, one `name:value` per line>
///
/// <signed headers>
/// <payload hash>
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalRequest {
    /// HTTP method, like `GET`.
    pub method: String,
    /// Encoded and normalized path.
    pub canonical_uri: String,
    /// Sorted and encoded query string, empty when the request has none.
    pub canonical_query_string: String,
    /// Lower-cased header names with their normalized values, sorted by name.
    pub canonical_headers: Vec<(String, String)>,
    /// `;` joined header names.
    pub signed_headers: String,
    /// Hex encoded SHA-256 of the body, or a precomputed value.
    pub payload_hash: String,
}

impl Display for CanonicalRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.method)?;
        writeln!(f, "{}", self.canonical_uri)?;
        writeln!(f, "{}", self.canonical_query_string)?;
        for (name, value) in &self.canonical_headers {
            writeln!(f, "{name}:{value}")?;
        }
        writeln!(f)?;
        writeln!(f, "{}", self.signed_headers)?;
        write!(f, "{}", self.payload_hash)
    }
}

/// Build the canonical request of `method`, `uri` and `headers`.
///
/// An `authorization` header is never signed. The `host` line comes from the
/// `Host` header, or the uri authority when the header is absent.
pub fn canonicalize(
    method: &Method,
    uri: &Uri,
    headers: &HeaderMap,
    payload_hash: &str,
) -> Result<CanonicalRequest> {
    let canonical_headers = canonical_headers(uri, headers)?;
    let signed_headers = canonical_headers
        .iter()
        .map(|(name, _)| name.as_str())
        .collect::<Vec<_>>()
        .join(";");

    Ok(CanonicalRequest {
        method: method.as_str().to_string(),
        canonical_uri: canonical_uri(uri.path()),
        canonical_query_string: canonical_query_string(uri.query().unwrap_or_default()),
        canonical_headers,
        signed_headers,
        payload_hash: payload_hash.to_string(),
    })
}

/// Normalize and encode a request path.
///
/// The path is percent-decoded and encoded again, `.` and `..` segments are
/// resolved and repeated slashes merged. A trailing slash survives.
pub fn canonical_uri(path: &str) -> String {
    let decoded: Vec<u8> = percent_decode_str(path).collect();
    let encoded = percent_encode(&decoded, &AWS_URI_ENCODE_SET).to_string();

    let mut segments: Vec<&str> = Vec::new();
    for segment in encoded.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }

    let mut uri = String::with_capacity(encoded.len() + 1);
    for segment in &segments {
        uri.push('/');
        uri.push_str(segment);
    }
    if segments.is_empty() || encoded.ends_with('/') {
        uri.push('/');
    }
    uri
}

/// Normalize and encode a raw query string.
///
/// `+` is read as a space. Keys and values are decoded to raw bytes, encoded
/// again with the strict set and the `key=value` pairs are sorted as whole
/// strings.
pub fn canonical_query_string(query: &str) -> String {
    if query.is_empty() {
        return String::new();
    }

    let mut pairs: Vec<String> = query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
            format!("{}={}", encode_query_part(k), encode_query_part(v))
        })
        .collect();
    pairs.sort_unstable();
    pairs.join("&")
}

fn encode_query_part(part: &str) -> String {
    let part = part.replace('+', " ");
    let decoded: Vec<u8> = percent_decode_str(&part).collect();
    percent_encode(&decoded, &AWS_QUERY_ENCODE_SET).to_string()
}

fn canonical_headers(uri: &Uri, headers: &HeaderMap) -> Result<Vec<(String, String)>> {
    let mut lines = Vec::with_capacity(headers.keys_len() + 1);
    lines.push(("host".to_string(), effective_host(uri, headers)?));

    for name in headers.keys() {
        if name == HOST || name == AUTHORIZATION {
            continue;
        }

        let mut value = String::new();
        for (idx, v) in headers.get_all(name).iter().enumerate() {
            let v = std::str::from_utf8(v.as_bytes()).map_err(|e| {
                Error::request_invalid("header value is not valid utf-8")
                    .with_source(e)
                    .with_context(format!("header: {name}"))
            })?;
            if idx > 0 {
                value.push(',');
            }
            normalize_header_value(&mut value, v);
        }
        // HeaderName is always lower-cased.
        lines.push((name.as_str().to_string(), value));
    }

    lines.sort_unstable_by(|(a, _), (b, _)| a.cmp(b));
    Ok(lines)
}

/// Trim `value` and collapse inner whitespace runs into a single space.
fn normalize_header_value(out: &mut String, value: &str) {
    for (idx, word) in value.split_ascii_whitespace().enumerate() {
        if idx > 0 {
            out.push(' ');
        }
        out.push_str(word);
    }
}

fn effective_host(uri: &Uri, headers: &HeaderMap) -> Result<String> {
    let host = match headers.get(HOST) {
        Some(v) => v.to_str().map_err(|e| {
            Error::request_invalid("host header is not visible ascii").with_source(e)
        })?,
        // Userinfo is never part of the host.
        None => uri
            .authority()
            .map(|a| a.as_str().rsplit('@').next().unwrap_or_default())
            .unwrap_or_default(),
    };

    let host = host.trim();
    if host.is_empty() {
        return Err(Error::request_invalid("request has no host")
            .with_context(format!("uri: {uri}")));
    }

    Ok(host.to_ascii_lowercase())
}
