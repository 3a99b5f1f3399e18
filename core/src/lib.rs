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

//! Core components for signing API requests with AWS Signature Version 4.
//!
//! This crate provides the foundational types and traits shared by the sigsess
//! crates. It keeps the service specific signing logic free from process
//! globals: environment variables, the current time and outgoing HTTP calls are
//! all reached through a [`Context`].
//!
//! ## Overview
//!
//! - **Context**: A container that holds implementations for environment access,
//!   time and HTTP sending
//! - **Traits**: Abstract interfaces for credential loading ([`ProvideCredential`])
//!   and credential validation ([`SigningCredential`])
//! - **Chain**: [`ProvideCredentialChain`] tries a list of providers in order
//!
//! ## Example
//!
//! ```no_run
//! use async_trait::async_trait;
//! use sigsess_core::{Context, OsEnv, ProvideCredential, Result, SigningCredential};
//!
//! #[derive(Clone, Debug)]
//! struct MyCredential {
//!     key: String,
//!     secret: String,
//! }
//!
//! impl SigningCredential for MyCredential {
//!     fn is_valid(&self) -> bool {
//!         !self.key.is_empty() && !self.secret.is_empty()
//!     }
//! }
//!
//! #[derive(Debug)]
//! struct MyLoader;
//!
//! #[async_trait]
//! impl ProvideCredential for MyLoader {
//!     type Credential = MyCredential;
//!
//!     async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
//!         let (Some(key), Some(secret)) = (ctx.env_var("MY_KEY"), ctx.env_var("MY_SECRET"))
//!         else {
//!             return Ok(None);
//!         };
//!         Ok(Some(MyCredential { key, secret }))
//!     }
//! }
//!
//! # async fn example() -> Result<()> {
//! let ctx = Context::new().with_env(OsEnv);
//! let cred = MyLoader.provide_credential(&ctx).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Utilities
//!
//! - [`hash`]: Cryptographic hashing utilities
//! - [`time`]: Time formatting, parsing and the [`time::Clock`] abstraction
//! - [`utils`]: General utilities including data redaction

// Make sure all our public APIs have docs.
#![warn(missing_docs)]

pub mod hash;
pub mod time;
pub mod utils;

mod context;
pub use context::Context;
pub use context::Env;
pub use context::HttpSend;
pub use context::NoopEnv;
pub use context::NoopHttpSend;
pub use context::OsEnv;
pub use context::StaticEnv;

mod error;
pub use error::Error;
pub use error::ErrorKind;
pub use error::Result;

mod api;
pub use api::ProvideCredential;
pub use api::SigningCredential;

mod chain;
pub use chain::ProvideCredentialChain;
