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

use crate::provide_credential::fill_from_env;
use crate::Credential;
use log::{debug, warn};
use sigsess_core::{Context, Error, ProvideCredential, Result};
use std::fmt::{self, Debug};

/// CredentialResolver turns a possibly partial credential into a usable one.
///
/// 1. Fields set on the explicit credential win.
/// 2. Each empty field is filled from its environment aliases, see
///    [`crate::EnvCredentialProvider`].
/// 3. If the access key id or the secret access key is still missing, the
///    pushed providers are asked in order. The first credential carrying both
///    replaces the partial one as a whole, so a session token never mixes
///    with another key pair. Failing providers are logged and skipped.
///
/// Resolution fails with [`sigsess_core::ErrorKind::NoCredentials`] when
/// nothing yields a key pair.
#[derive(Default)]
pub struct CredentialResolver {
    providers: Vec<Box<dyn ProvideCredential<Credential = Credential>>>,
}

impl Debug for CredentialResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialResolver")
            .field("providers", &self.providers)
            .finish()
    }
}

impl CredentialResolver {
    /// Create a resolver that only looks at the explicit credential and the
    /// environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a provider consulted when the environment is not enough.
    pub fn push(mut self, provider: impl ProvideCredential<Credential = Credential>) -> Self {
        self.providers.push(Box::new(provider));
        self
    }

    /// Resolve the credential to sign with.
    pub async fn resolve(&self, ctx: &Context, explicit: Credential) -> Result<Credential> {
        let cred = fill_from_env(ctx, explicit);
        if cred.has_keys() {
            debug!("credential resolved from explicit values and environment");
            return Ok(cred);
        }

        for provider in &self.providers {
            debug!("trying credential provider: {provider:?}");

            match provider.provide_credential(ctx).await {
                Ok(Some(cred)) if cred.has_keys() => {
                    debug!("loaded credential from provider: {provider:?}");
                    return Ok(cred);
                }
                Ok(Some(_)) => {
                    debug!("ignored incomplete credential from provider: {provider:?}");
                }
                Ok(None) => {
                    debug!("no credential found in provider: {provider:?}");
                }
                Err(e) => {
                    warn!("load credential from provider {provider:?} failed: {e:?}");
                }
            }
        }

        Err(Error::no_credentials(
            "no access key id and secret access key could be resolved",
        )
        .with_context(format!("providers: {}", self.providers.len())))
    }
}
