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
use crate::provide_credential::utils::parse_imds_error;
use crate::Credential;
use async_trait::async_trait;
use bytes::Bytes;
use http::header::CONTENT_LENGTH;
use http::Method;
use serde::Deserialize;
use sigsess_core::time::{parse_rfc3339, DateTime};
use sigsess_core::{Context, Error, ProvideCredential, Result};
use std::sync::{Arc, Mutex};

/// IMDSv2CredentialProvider loads the credential of the IAM role attached to
/// an EC2 instance from the instance metadata service (IMDSv2).
///
/// Three requests are involved: a `PUT` for the session token, a `GET`
/// listing the role name and a `GET` of the role credential. The session
/// token is cached until ten minutes before it expires.
///
/// Set `AWS_EC2_METADATA_DISABLED=true` to turn the provider off, and
/// `AWS_EC2_METADATA_SERVICE_ENDPOINT` to point it somewhere else than
/// `http://169.254.169.254`.
#[derive(Debug, Clone)]
pub struct IMDSv2CredentialProvider {
    endpoint: Option<String>,
    token: Arc<Mutex<(String, DateTime)>>,
}

impl Default for IMDSv2CredentialProvider {
    fn default() -> Self {
        Self {
            endpoint: None,
            token: Arc::new(Mutex::new((String::new(), DateTime::default()))),
        }
    }
}

impl IMDSv2CredentialProvider {
    /// Create a new `IMDSv2CredentialProvider` instance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the endpoint for the metadata service.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    fn get_endpoint(&self, ctx: &Context) -> String {
        self.endpoint
            .clone()
            .or_else(|| ctx.env_var(AWS_EC2_METADATA_SERVICE_ENDPOINT))
            .unwrap_or_else(|| IMDS_DEFAULT_ENDPOINT.to_string())
            .trim_end_matches('/')
            .to_string()
    }

    async fn load_ec2_metadata_token(&self, ctx: &Context, endpoint: &str) -> Result<String> {
        {
            let (token, expires_in) = self.token.lock().unwrap_or_else(|e| e.into_inner()).clone();
            if expires_in > ctx.now() {
                return Ok(token);
            }
        }

        let url = format!("{endpoint}/latest/api/token");
        let req = http::Request::builder()
            .uri(&url)
            .method(Method::PUT)
            .header(CONTENT_LENGTH, "0")
            .header(
                X_AWS_EC2_METADATA_TOKEN_TTL_SECONDS,
                IMDS_TOKEN_TTL_SECONDS.to_string(),
            )
            .body(Bytes::new())
            .map_err(|e| {
                Error::request_invalid("failed to build IMDS token request")
                    .with_source(e)
                    .with_context(format!("url: {url}"))
            })?;

        let resp = ctx.http_send_as_string(req).await.map_err(|e| {
            Error::unexpected("failed to connect to IMDS")
                .with_source(e)
                .with_context(format!("endpoint: {endpoint}"))
                .with_context("hint: check if running on EC2 instance")
        })?;

        if resp.status() != http::StatusCode::OK {
            return Err(parse_imds_error(
                "fetch_imds_token",
                resp.status(),
                resp.body(),
            ));
        }
        let ec2_token = resp.into_body();
        // Refresh 10 minutes before the token expires.
        let expires_in = ctx.now() + chrono::TimeDelta::seconds(IMDS_TOKEN_TTL_SECONDS - 600);

        {
            *self.token.lock().unwrap_or_else(|e| e.into_inner()) =
                (ec2_token.clone(), expires_in);
        }

        Ok(ec2_token)
    }

    async fn get_with_token(
        &self,
        ctx: &Context,
        url: &str,
        token: &str,
        operation: &str,
    ) -> Result<String> {
        let req = http::Request::builder()
            .uri(url)
            .method(Method::GET)
            .header(X_AWS_EC2_METADATA_TOKEN, token)
            .body(Bytes::new())
            .map_err(|e| {
                Error::request_invalid("failed to build IMDS request")
                    .with_source(e)
                    .with_context(format!("operation: {operation}"))
            })?;

        let resp = ctx.http_send_as_string(req).await.map_err(|e| {
            Error::unexpected("failed to send IMDS request")
                .with_source(e)
                .with_context(format!("operation: {operation}"))
        })?;

        if resp.status() != http::StatusCode::OK {
            return Err(parse_imds_error(operation, resp.status(), resp.body()));
        }

        Ok(resp.into_body())
    }
}

#[async_trait]
impl ProvideCredential for IMDSv2CredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        if ctx.env_var(AWS_EC2_METADATA_DISABLED).as_deref() == Some("true") {
            return Ok(None);
        }

        let endpoint = self.get_endpoint(ctx);
        let token = self.load_ec2_metadata_token(ctx, &endpoint).await?;

        // List all credentials that node has.
        let url = format!("{endpoint}/latest/meta-data/iam/security-credentials/");
        let profile_name = self
            .get_with_token(ctx, &url, &token, "list_instance_profiles")
            .await?;
        // Use the first listed role.
        let profile_name = profile_name.lines().next().unwrap_or_default().trim();
        if profile_name.is_empty() {
            return Err(
                Error::config_invalid("no IAM role attached to EC2 instance")
                    .with_context("hint: attach an IAM role to your EC2 instance"),
            );
        }

        // Get the credentials via role_name.
        let url = format!("{endpoint}/latest/meta-data/iam/security-credentials/{profile_name}");
        let content = self
            .get_with_token(ctx, &url, &token, "fetch_credentials")
            .await
            .map_err(|e| e.with_context(format!("profile: {profile_name}")))?;

        let resp: Ec2MetadataIamSecurityCredentials =
            serde_json::from_str(&content).map_err(|e| {
                Error::unexpected("failed to parse IMDS credentials response")
                    .with_source(e)
                    .with_context(format!("response_length: {}", content.len()))
                    .with_context(format!("profile: {profile_name}"))
            })?;

        if resp.code != "Success" {
            return Err(Error::unexpected(format!(
                "IMDS returned error: [{}] {}",
                resp.code, resp.message
            ))
            .with_context(format!("profile: {profile_name}")));
        }

        let cred = Credential {
            access_key_id: resp.access_key_id,
            secret_access_key: resp.secret_access_key,
            session_token: Some(resp.token),
            expires_in: Some(parse_rfc3339(&resp.expiration).map_err(|e| {
                Error::unexpected("failed to parse IMDS credential expiration time")
                    .with_source(e)
                    .with_context(format!("expiration_value: {}", resp.expiration))
            })?),
        };

        Ok(Some(cred))
    }
}

#[derive(Default, Debug, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct Ec2MetadataIamSecurityCredentials {
    access_key_id: String,
    secret_access_key: String,
    token: String,
    expiration: String,

    code: String,
    message: String,
}
