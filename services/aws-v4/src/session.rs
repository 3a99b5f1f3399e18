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

use crate::constants::{AWS4, AWS4_REQUEST};
use crate::Credential;
use log::debug;
use sigsess_core::hash::hmac_sha256;
use sigsess_core::time::{format_date, Clock, DateTime};
use sigsess_core::utils::Redact;
use sigsess_core::{Error, Result};
use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

/// Scope binds a signature to a credential, a day, a region and a service.
///
/// The parts are `[key_id, date, region, service, "aws4_request"]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope {
    parts: [String; 5],
}

impl Scope {
    /// Create a scope. `date` is formatted as `YYYYMMDD`.
    pub fn new(key_id: &str, date: DateTime, region: &str, service: &str) -> Self {
        Self {
            parts: [
                key_id.to_string(),
                format_date(date),
                region.to_string(),
                service.to_string(),
                AWS4_REQUEST.to_string(),
            ],
        }
    }

    /// Access key id.
    pub fn key_id(&self) -> &str {
        &self.parts[0]
    }

    /// Date in `YYYYMMDD`.
    pub fn date(&self) -> &str {
        &self.parts[1]
    }

    /// Region.
    pub fn region(&self) -> &str {
        &self.parts[2]
    }

    /// Service signing name.
    pub fn service(&self) -> &str {
        &self.parts[3]
    }

    /// The `Credential=` value of the authorization header:
    /// `<key_id>/<date>/<region>/<service>/aws4_request`.
    pub fn credential(&self) -> String {
        self.parts.join("/")
    }

    /// The credential scope used in the string to sign:
    /// `<date>/<region>/<service>/aws4_request`.
    pub fn credential_scope(&self) -> String {
        self.parts[1..].join("/")
    }

    /// Derive the signing key from `secret`.
    ///
    /// `kSigning = HMAC(HMAC(HMAC(HMAC("AWS4" + secret, date), region), service), "aws4_request")`
    fn derive_key(&self, secret: &str) -> [u8; 32] {
        let seed = format!("{AWS4}{secret}");
        let mut key = hmac_sha256(seed.as_bytes(), self.parts[1].as_bytes());
        for part in &self.parts[2..] {
            key = hmac_sha256(&key, part.as_bytes());
        }
        key
    }
}

/// Session signs requests with AWS Signature Version 4.
///
/// A session is bound to one credential, one day (taken from the clock when it
/// is created), one region and one service. The signing key is derived once in
/// [`Session::new`] and reused for every request. Session never refreshes
/// itself: callers should build a new one when the day changes or
/// [`Session::expires`] has passed.
///
/// Session is immutable, share it with `Arc` to sign from many threads.
pub struct Session {
    pub(crate) scope: Scope,
    pub(crate) key: [u8; 32],
    pub(crate) session_token: Option<String>,
    pub(crate) expires: Option<DateTime>,
    pub(crate) clock: Arc<dyn Clock>,
}

impl Debug for Session {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("scope", &self.scope)
            .field("session_token", &Redact::from(&self.session_token))
            .field("expires", &self.expires)
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Start a session for `region` and `service`.
    ///
    /// Fails with [`sigsess_core::ErrorKind::NoCredentials`] when the access
    /// key id or the secret access key is empty.
    pub fn new(
        clock: Arc<dyn Clock>,
        region: &str,
        service: &str,
        cred: &Credential,
    ) -> Result<Self> {
        if !cred.has_keys() {
            return Err(Error::no_credentials(
                "access key id and secret access key are required to start a session",
            )
            .with_context(format!("service: {service}"))
            .with_context(format!("region: {region}")));
        }

        let scope = Scope::new(&cred.access_key_id, clock.now(), region, service);
        debug!("start signing session with scope: {}", scope.credential_scope());
        let key = scope.derive_key(&cred.secret_access_key);

        Ok(Self {
            scope,
            key,
            session_token: cred.session_token.clone().filter(|t| !t.is_empty()),
            expires: cred.expires_in,
            clock,
        })
    }

    /// Scope of this session.
    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// Expiration of the credential this session was built from.
    ///
    /// Informational only, signing keeps working past it.
    pub fn expires(&self) -> Option<DateTime> {
        self.expires
    }

    /// Whether the session carries a session token.
    pub fn has_session_token(&self) -> bool {
        self.session_token.is_some()
    }
}
