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

use crate::canonical::{canonicalize, CanonicalRequest};
use crate::constants::{AWS4_HMAC_SHA256, X_AMZ_CONTENT_SHA_256, X_AMZ_DATE, X_AMZ_SECURITY_TOKEN};
use crate::payload::hash_payload;
use crate::{Payload, Session};
use http::header::{AUTHORIZATION, DATE};
use http::{HeaderMap, HeaderValue, Request};
use log::debug;
use sigsess_core::hash::{hex_hmac_sha256, hex_sha256};
use sigsess_core::time::{format_iso8601, parse_http_date, parse_iso8601, DateTime};
use sigsess_core::{Error, Result};
use std::fmt::{self, Display};

/// StringToSign is the second signing input, built from the canonical request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringToSign {
    /// Request timestamp in ISO 8601 basic format.
    pub timestamp: String,
    /// `<date>/<region>/<service>/aws4_request`.
    pub credential_scope: String,
    /// Hex encoded SHA-256 of the canonical request.
    pub hashed_canonical_request: String,
}

impl Display for StringToSign {
    // AWS4-HMAC-SHA256
    // 20220313T072004Z
    // 20220313/<region>/<service>/aws4_request
    // <hashed_canonical_request>
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{AWS4_HMAC_SHA256}")?;
        writeln!(f, "{}", self.timestamp)?;
        writeln!(f, "{}", self.credential_scope)?;
        write!(f, "{}", self.hashed_canonical_request)
    }
}

/// Intermediate results of a signature, mostly useful to debug a rejected
/// request.
#[derive(Debug, Clone)]
pub struct SigningOutput {
    /// The canonical request that was hashed.
    pub canonical_request: CanonicalRequest,
    /// The string that was signed.
    pub string_to_sign: StringToSign,
    /// Hex encoded signature.
    pub signature: String,
    /// Value written into the `authorization` header.
    pub authorization: String,
}

impl Session {
    /// Sign `req` in place.
    ///
    /// - The request time is the `x-amz-date` header, else the `date` header,
    ///   else the session clock, which is then written as `x-amz-date`.
    /// - The body hash is the `x-amz-content-sha256` header when present,
    ///   otherwise the body is hashed with [`hash_payload`].
    /// - With a session token, `x-amz-security-token` is set and signed.
    /// - The `authorization` header is replaced.
    ///
    /// Headers are only touched when signing succeeds. A stream body may be
    /// buffered into memory even on failure, with its content unchanged.
    pub fn sign(&self, req: &mut Request<Payload>) -> Result<SigningOutput> {
        let mut headers = req.headers().clone();

        let time = self.resolve_time(&mut headers)?;

        if let Some(token) = &self.session_token {
            let mut value = HeaderValue::from_str(token).map_err(|e| {
                Error::request_invalid("session token is not a valid header value")
                    .with_source(e)
            })?;
            value.set_sensitive(true);
            headers.insert(X_AMZ_SECURITY_TOKEN, value);
        }

        let payload_hash = match headers.get(X_AMZ_CONTENT_SHA_256) {
            Some(v) => v
                .to_str()
                .map_err(|e| {
                    Error::request_invalid("invalid x-amz-content-sha256 header").with_source(e)
                })?
                .to_string(),
            None => hash_payload(req.body_mut())?,
        };

        let canonical_request = canonicalize(req.method(), req.uri(), &headers, &payload_hash)?;
        debug!("calculated canonical request: {canonical_request}");

        let string_to_sign = StringToSign {
            timestamp: format_iso8601(time),
            credential_scope: self.scope.credential_scope(),
            hashed_canonical_request: hex_sha256(canonical_request.to_string().as_bytes()),
        };
        debug!("calculated string to sign: {string_to_sign}");

        let signature = hex_hmac_sha256(&self.key, string_to_sign.to_string().as_bytes());

        let authorization = format!(
            "{AWS4_HMAC_SHA256} Credential={}, SignedHeaders={}, Signature={}",
            self.scope.credential(),
            canonical_request.signed_headers,
            signature
        );
        let mut value = HeaderValue::from_str(&authorization).map_err(|e| {
            Error::request_invalid("failed to create authorization header").with_source(e)
        })?;
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);

        // Apply to the request.
        *req.headers_mut() = headers;

        Ok(SigningOutput {
            canonical_request,
            string_to_sign,
            signature,
            authorization,
        })
    }

    /// Find the request time, stamping `x-amz-date` when the request has none.
    fn resolve_time(&self, headers: &mut HeaderMap) -> Result<DateTime> {
        if let Some(v) = headers.get(X_AMZ_DATE) {
            return parse_iso8601(header_str(v, X_AMZ_DATE)?);
        }
        if let Some(v) = headers.get(DATE) {
            return parse_http_date(header_str(v, "date")?);
        }

        let now = self.clock.now();
        headers.insert(X_AMZ_DATE, HeaderValue::try_from(format_iso8601(now))?);
        Ok(now)
    }
}

fn header_str<'a>(v: &'a HeaderValue, name: &str) -> Result<&'a str> {
    v.to_str().map_err(|e| {
        Error::date_parse(format!("{name} header is not visible ascii")).with_source(e)
    })
}
