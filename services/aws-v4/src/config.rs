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
use crate::endpoint::parse_host;
use crate::Credential;
use sigsess_core::utils::Redact;
use sigsess_core::Context;
use std::fmt::{Debug, Formatter};

/// Config for aws services.
///
/// Config is a plain value: loaders consume `self` and return a new one,
/// fields that are already set are never overwritten.
#[derive(Clone, Default)]
pub struct Config {
    /// `region` will be loaded from:
    ///
    /// - this field if it's `is_some`
    /// - env value: [`AWS_REGION`], then [`AWS_DEFAULT_REGION`]
    /// - the endpoint host via [`Config::from_host`]
    pub region: Option<String>,
    /// `service` is the signing name, like `s3` or `sts`. It will be loaded from:
    ///
    /// - this field if it's `is_some`
    /// - the endpoint host via [`Config::from_host`]
    pub service: Option<String>,
    /// `access_key_id` is used as-is, the resolver fills it from env when empty.
    pub access_key_id: Option<String>,
    /// `secret_access_key` is used as-is, the resolver fills it from env when empty.
    pub secret_access_key: Option<String>,
    /// `session_token` is used as-is, the resolver fills it from env when empty.
    pub session_token: Option<String>,
    /// `ec2_metadata_disabled` value will be loaded from:
    ///
    /// - this field
    /// - env value: [`AWS_EC2_METADATA_DISABLED`]
    pub ec2_metadata_disabled: bool,
}

impl Debug for Config {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("region", &self.region)
            .field("service", &self.service)
            .field("access_key_id", &Redact::from(&self.access_key_id))
            .field("secret_access_key", &Redact::from(&self.secret_access_key))
            .field("session_token", &Redact::from(&self.session_token))
            .field("ec2_metadata_disabled", &self.ec2_metadata_disabled)
            .finish()
    }
}

impl Config {
    /// Set the region.
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Set the service signing name.
    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service = Some(service.into());
        self
    }

    /// Set the access key id.
    pub fn with_access_key_id(mut self, access_key_id: impl Into<String>) -> Self {
        self.access_key_id = Some(access_key_id.into());
        self
    }

    /// Set the secret access key.
    pub fn with_secret_access_key(mut self, secret_access_key: impl Into<String>) -> Self {
        self.secret_access_key = Some(secret_access_key.into());
        self
    }

    /// Set the session token.
    pub fn with_session_token(mut self, session_token: impl Into<String>) -> Self {
        self.session_token = Some(session_token.into());
        self
    }

    /// Disable the EC2 instance metadata provider.
    pub fn with_ec2_metadata_disabled(mut self, disabled: bool) -> Self {
        self.ec2_metadata_disabled = disabled;
        self
    }

    /// Load config from env.
    ///
    /// Credentials are not read here, [`crate::CredentialResolver`] owns that.
    pub fn from_env(mut self, ctx: &Context) -> Self {
        if self.region.is_none() {
            self.region = ctx.env_var_any(&[AWS_REGION, AWS_DEFAULT_REGION]);
        }
        if let Some(v) = ctx.env_var(AWS_EC2_METADATA_DISABLED) {
            self.ec2_metadata_disabled = self.ec2_metadata_disabled || v == "true";
        }
        self
    }

    /// Fill region and service from an endpoint host like
    /// `dynamodb.eu-west-1.amazonaws.com`.
    pub fn from_host(mut self, host: &str) -> Self {
        let (service, region) = parse_host(host);
        if self.service.is_none() && !service.is_empty() {
            self.service = Some(service);
        }
        if self.region.is_none() && !region.is_empty() {
            self.region = Some(region);
        }
        self
    }

    /// The explicitly configured credential, possibly partial.
    pub fn credential(&self) -> Credential {
        Credential {
            access_key_id: self.access_key_id.clone().unwrap_or_default(),
            secret_access_key: self.secret_access_key.clone().unwrap_or_default(),
            session_token: self.session_token.clone().filter(|v| !v.is_empty()),
            expires_in: None,
        }
    }
}
