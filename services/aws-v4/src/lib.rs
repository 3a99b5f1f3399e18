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

//! AWS Signature Version 4 signing sessions.
//!
//! This crate signs [`http::Request`]s for AWS services. A [`Session`] is
//! started once per credential, day, region and service; it derives the
//! signing key up front and can then sign any number of requests, from any
//! number of threads.
//!
//! ## Quick Start
//!
//! ```no_run
//! use sigsess_aws_v4::{Config, CredentialResolver, DefaultCredentialProvider, Payload, Session};
//! use sigsess_core::{Context, OsEnv, Result};
//!
//! # async fn example() -> Result<()> {
//! let ctx = Context::new().with_env(OsEnv);
//!
//! let config = Config::default()
//!     .from_env(&ctx)
//!     .from_host("dynamodb.eu-west-1.amazonaws.com");
//!
//! // Explicit config first, then the environment, then the default chain.
//! let resolver = CredentialResolver::new().push(DefaultCredentialProvider::with_config(&config));
//! let cred = resolver.resolve(&ctx, config.credential()).await?;
//!
//! let session = Session::new(
//!     ctx.clock(),
//!     config.region.as_deref().unwrap_or_default(),
//!     config.service.as_deref().unwrap_or_default(),
//!     &cred,
//! )?;
//!
//! let mut req = http::Request::post("https://dynamodb.eu-west-1.amazonaws.com/")
//!     .header("content-type", "application/x-amz-json-1.0")
//!     .header("x-amz-target", "DynamoDB_20120810.ListTables")
//!     .body(Payload::from("{}"))
//!     .expect("request must be valid");
//!
//! session.sign(&mut req)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Credential Sources
//!
//! ### Environment Variables
//!
//! ```bash
//! export AWS_ACCESS_KEY_ID=your-access-key-id          # or AWS_ACCESS_KEY
//! export AWS_SECRET_ACCESS_KEY=your-secret-access-key  # or AWS_SECRET_KEY
//! export AWS_SESSION_TOKEN=your-session-token          # Optional
//! ```
//!
//! ### EC2 Instance Metadata
//!
//! [`IMDSv2CredentialProvider`] loads the credential of the instance role.
//! It needs an [`sigsess_core::HttpSend`] on the context, for example
//! `sigsess-http-send-reqwest`.
//!
//! ## Request Bodies
//!
//! The body is a [`Payload`]. Signing needs its SHA-256: a seekable body is
//! rewound after hashing and a read once stream is buffered. Set
//! `x-amz-content-sha256` yourself (for example to `UNSIGNED-PAYLOAD`) to
//! skip hashing.

mod constants;
pub use constants::UNSIGNED_PAYLOAD;

mod canonical;
pub use canonical::canonical_query_string;
pub use canonical::canonical_uri;
pub use canonical::canonicalize;
pub use canonical::CanonicalRequest;

mod config;
pub use config::Config;

mod credential;
pub use credential::Credential;

mod endpoint;
pub use endpoint::parse_host;
pub use endpoint::KNOWN_REGIONS;

mod payload;
pub use payload::hash_payload;
pub use payload::Payload;
pub use payload::ReadSeek;

mod provide_credential;
pub use provide_credential::*;

mod resolve;
pub use resolve::CredentialResolver;

mod session;
pub use session::Scope;
pub use session::Session;

mod sign_request;
pub use sign_request::SigningOutput;
pub use sign_request::StringToSign;
