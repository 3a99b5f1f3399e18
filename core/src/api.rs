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

use crate::{Context, Result};
use std::fmt::Debug;

/// SigningCredential is the trait implemented by credentials a signer can use.
pub trait SigningCredential: Clone + Debug + Send + Sync + Unpin + 'static {
    /// Check if the credential carries everything needed to sign.
    fn is_valid(&self) -> bool;
}

impl<T: SigningCredential> SigningCredential for Option<T> {
    fn is_valid(&self) -> bool {
        let Some(cred) = self else {
            return false;
        };

        cred.is_valid()
    }
}

/// ProvideCredential is the trait used to load credentials from somewhere
/// outside the caller's configuration.
///
/// Returning `Ok(None)` means the provider has nothing to offer and the next
/// one should be asked. Errors are reserved for real failures such as a
/// malformed response from a metadata service.
#[async_trait::async_trait]
pub trait ProvideCredential: Debug + Send + Sync + Unpin + 'static {
    /// Credential returned by this provider.
    type Credential: Send + Sync + Unpin + 'static;

    /// Load credential from the current context.
    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>>;
}
