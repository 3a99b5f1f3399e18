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

//! Live test against a real instance metadata service.
//!
//! Only runs on EC2 with `SIGSESS_AWS_V4_IMDS_TEST=on`.

use http::Request;
use log::warn;
use sigsess_aws_v4::{IMDSv2CredentialProvider, Payload, Session};
use sigsess_core::{Context, OsEnv, ProvideCredential};
use sigsess_http_send_reqwest::ReqwestHttpSend;
use std::env;

fn init_imds_test() -> Option<Context> {
    let _ = env_logger::builder().is_test(true).try_init();

    if env::var("SIGSESS_AWS_V4_IMDS_TEST").ok().as_deref() != Some("on") {
        return None;
    }

    Some(
        Context::new()
            .with_env(OsEnv)
            .with_http_send(ReqwestHttpSend::default()),
    )
}

#[tokio::test]
async fn test_imds_credential_signs() {
    let Some(ctx) = init_imds_test() else {
        warn!("SIGSESS_AWS_V4_IMDS_TEST is not set, skipped");
        return;
    };

    let cred = IMDSv2CredentialProvider::new()
        .provide_credential(&ctx)
        .await
        .expect("load credential must succeed")
        .expect("credential must exist");
    assert!(cred.session_token.is_some());
    assert!(cred.expires_in.is_some());

    let session = Session::new(ctx.clock(), "us-east-1", "sts", &cred)
        .expect("session must be created");
    let mut req = Request::builder()
        .uri("https://sts.amazonaws.com/?Action=GetCallerIdentity&Version=2011-06-15")
        .body(Payload::Empty)
        .unwrap();
    session.sign(&mut req).expect("sign must succeed");
    assert!(req.headers().contains_key("x-amz-security-token"));
}
