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

use crate::{Context, ProvideCredential, Result};
use async_trait::async_trait;
use std::fmt::{self, Debug};

/// ProvideCredentialChain tries a list of providers in order.
///
/// The first provider returning `Ok(Some(_))` wins. `Ok(None)` and errors
/// both move on to the next provider, errors are logged at `warn`.
pub struct ProvideCredentialChain<C> {
    providers: Vec<Box<dyn ProvideCredential<Credential = C>>>,
}

impl<C: Send + Sync + Unpin + 'static> ProvideCredentialChain<C> {
    /// Create a new empty chain.
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
        }
    }

    /// Add a credential provider to the end of the chain.
    pub fn push(mut self, provider: impl ProvideCredential<Credential = C>) -> Self {
        self.providers.push(Box::new(provider));
        self
    }

    /// Create a credential provider chain from a vector of providers.
    pub fn from_vec(providers: Vec<Box<dyn ProvideCredential<Credential = C>>>) -> Self {
        Self { providers }
    }

    /// Number of providers in the chain.
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Whether the chain has no providers.
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl<C: Send + Sync + Unpin + 'static> Default for ProvideCredentialChain<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> Debug for ProvideCredentialChain<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProvideCredentialChain")
            .field("providers", &self.providers)
            .finish()
    }
}

#[async_trait]
impl<C: Send + Sync + Unpin + 'static> ProvideCredential for ProvideCredentialChain<C> {
    type Credential = C;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        for provider in &self.providers {
            log::debug!("trying credential provider: {provider:?}");

            match provider.provide_credential(ctx).await {
                Ok(Some(cred)) => {
                    log::debug!("loaded credential from provider: {provider:?}");
                    return Ok(Some(cred));
                }
                Ok(None) => {
                    log::debug!("no credential found in provider: {provider:?}");
                }
                Err(e) => {
                    log::warn!("load credential from provider {provider:?} failed: {e:?}");
                }
            }
        }

        Ok(None)
    }
}
