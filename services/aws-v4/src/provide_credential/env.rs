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

use crate::constants::*;
use crate::Credential;
use async_trait::async_trait;
use sigsess_core::{Context, ProvideCredential, Result};

/// EnvCredentialProvider loads AWS credentials from environment variables.
///
/// Each field takes the first non-empty variable of its alias list:
///
/// - access key id: `AWS_ACCESS_KEY_ID`, `AWS_ACCESS_KEY`
/// - secret access key: `AWS_SECRET_ACCESS_KEY`, `AWS_SECRET_KEY`
/// - session token: `AWS_SESSION_TOKEN` (optional)
///
/// A credential is only returned when both the key id and the secret are found.
#[derive(Debug, Default, Clone)]
pub struct EnvCredentialProvider;

impl EnvCredentialProvider {
    /// Create a new EnvCredentialProvider.
    pub fn new() -> Self {
        Self
    }
}

/// Fill the empty fields of `cred` from the environment.
///
/// Fields that are already set are kept as-is.
pub(crate) fn fill_from_env(ctx: &Context, mut cred: Credential) -> Credential {
    if cred.access_key_id.is_empty() {
        cred.access_key_id = ctx
            .env_var_any(ACCESS_KEY_ID_ENV_VARS)
            .unwrap_or_default();
    }
    if cred.secret_access_key.is_empty() {
        cred.secret_access_key = ctx
            .env_var_any(SECRET_ACCESS_KEY_ENV_VARS)
            .unwrap_or_default();
    }
    if cred.session_token.as_deref().unwrap_or_default().is_empty() {
        cred.session_token = ctx.env_var_any(SESSION_TOKEN_ENV_VARS);
    }
    cred
}

#[async_trait]
impl ProvideCredential for EnvCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        let cred = fill_from_env(ctx, Credential::default());
        Ok(cred.has_keys().then_some(cred))
    }
}
