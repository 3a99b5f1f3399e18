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

//! Resolve credentials from config, env and providers, then sign.

use super::{suite_time, KEY_ID, SECRET};
use http::Request;
use pretty_assertions::assert_eq;
use sigsess_aws_v4::{
    Config, CredentialResolver, DefaultCredentialProvider, Payload, Session,
    StaticCredentialProvider,
};
use sigsess_core::time::FixedClock;
use sigsess_core::{Context, ErrorKind, StaticEnv};

fn context(envs: &[(&str, &str)]) -> Context {
    Context::new()
        .with_env(StaticEnv::from_pairs(envs.iter().copied()))
        .with_clock(FixedClock(suite_time()))
}

#[tokio::test]
async fn test_sign_with_env_credential() {
    let _ = env_logger::builder().is_test(true).try_init();

    let ctx = context(&[
        ("AWS_ACCESS_KEY", KEY_ID),
        ("AWS_SECRET_KEY", SECRET),
        ("AWS_EC2_METADATA_DISABLED", "true"),
    ]);
    let config = Config::default()
        .from_env(&ctx)
        .with_service("service")
        .from_host("example.us-east-1.amazonaws.com");
    assert_eq!(config.region.as_deref(), Some("us-east-1"));
    assert_eq!(config.service.as_deref(), Some("service"));

    let resolver = CredentialResolver::new().push(DefaultCredentialProvider::with_config(&config));
    let cred = resolver
        .resolve(&ctx, config.credential())
        .await
        .expect("credential must be resolved");
    assert_eq!(cred.access_key_id, KEY_ID);

    let session = Session::new(
        ctx.clock(),
        config.region.as_deref().unwrap(),
        config.service.as_deref().unwrap(),
        &cred,
    )
    .expect("session must be created");

    let mut req = Request::builder()
        .uri("https://example.amazonaws.com/")
        .body(Payload::Empty)
        .unwrap();
    session.sign(&mut req).expect("sign must succeed");

    // get-vanilla, with x-amz-date stamped from the context clock.
    assert_eq!(
        req.headers()["authorization"],
        "AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/20150830/us-east-1/service/aws4_request, SignedHeaders=host;x-amz-date, Signature=5fa00fa31553b73ebf1942676e86291e8372ff2a2260956d9b8aae1d763fbf31"
    );
}

#[tokio::test]
async fn test_explicit_config_wins_over_env() {
    let ctx = context(&[
        ("AWS_ACCESS_KEY_ID", "ENVKEYID"),
        ("AWS_SECRET_ACCESS_KEY", "envsecret"),
    ]);
    let config = Config::default()
        .with_access_key_id(KEY_ID)
        .with_secret_access_key(SECRET);

    let cred = CredentialResolver::new()
        .resolve(&ctx, config.credential())
        .await
        .expect("credential must be resolved");
    assert_eq!(cred.access_key_id, KEY_ID);
    assert_eq!(cred.secret_access_key, SECRET);
}

#[tokio::test]
async fn test_provider_fills_missing_keys() {
    let ctx = context(&[]);
    let config = Config::default().with_access_key_id(KEY_ID);

    let cred = CredentialResolver::new()
        .push(StaticCredentialProvider::new("PROVIDERKEY", "providersecret").with_session_token("token"))
        .resolve(&ctx, config.credential())
        .await
        .expect("credential must be resolved");
    assert_eq!(cred.access_key_id, "PROVIDERKEY");
    assert_eq!(cred.secret_access_key, "providersecret");
    assert_eq!(cred.session_token.as_deref(), Some("token"));
}

#[tokio::test]
async fn test_no_credential_anywhere() {
    let ctx = context(&[("AWS_EC2_METADATA_DISABLED", "true")]);
    let config = Config::default().from_env(&ctx);

    let err = CredentialResolver::new()
        .push(DefaultCredentialProvider::with_config(&config))
        .resolve(&ctx, config.credential())
        .await
        .expect_err("must fail");
    assert_eq!(err.kind(), ErrorKind::NoCredentials);
}
