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

//! Cross check signatures with the official `aws-sigv4` crate.

use super::suite_time;
use aws_credential_types::Credentials;
use aws_sigv4::http_request::{
    PayloadChecksumKind, PercentEncodingMode, SignableBody, SignableRequest, SigningSettings,
};
use aws_sigv4::sign::v4;
use http::header::CONTENT_LENGTH;
use http::{HeaderValue, Request};
use pretty_assertions::assert_eq;
use sigsess_aws_v4::{Credential, Payload, Session};
use sigsess_core::time::FixedClock;
use std::sync::Arc;
use std::time::SystemTime;

/// (name, request_builder)
type TestCase = (&'static str, fn() -> Request<&'static str>);

fn test_cases() -> Vec<TestCase> {
    vec![
        ("get_request", test_get_request),
        ("get_request_with_sse", test_get_request_with_sse),
        ("get_request_with_query", test_get_request_with_query),
        ("get_request_virtual_host", test_get_request_virtual_host),
        ("get_request_encoded_path", test_get_request_encoded_path),
        ("put_request", test_put_request),
        ("post_request_json", test_post_request_json),
    ]
}

fn test_get_request() -> Request<&'static str> {
    let mut req = Request::new("");
    *req.method_mut() = http::Method::GET;
    *req.uri_mut() = "http://127.0.0.1:9000/hello"
        .parse()
        .expect("url must be valid");

    req
}

fn test_get_request_with_sse() -> Request<&'static str> {
    let mut req = test_get_request();
    for (name, value) in [
        ("x-amz-server-side-encryption", "a"),
        ("x-amz-server-side-encryption-customer-algorithm", "b"),
        ("x-amz-server-side-encryption-customer-key", "c"),
        ("x-amz-server-side-encryption-customer-key-md5", "d"),
        ("x-amz-server-side-encryption-aws-kms-key-id", "e"),
    ] {
        req.headers_mut()
            .insert(name, HeaderValue::from_static(value));
    }

    req
}

fn test_get_request_with_query() -> Request<&'static str> {
    let mut req = Request::new("");
    *req.method_mut() = http::Method::GET;
    *req.uri_mut() = "http://127.0.0.1:9000/hello?list-type=2&max-keys=3&prefix=CI/&start-after=ExampleGuide.pdf"
        .parse()
        .expect("url must be valid");

    req
}

fn test_get_request_virtual_host() -> Request<&'static str> {
    let mut req = Request::new("");
    *req.method_mut() = http::Method::GET;
    *req.uri_mut() = "http://hello.s3.test.example.com/object"
        .parse()
        .expect("url must be valid");

    req
}

fn test_get_request_encoded_path() -> Request<&'static str> {
    let mut req = Request::new("");
    *req.method_mut() = http::Method::GET;
    *req.uri_mut() = "http://127.0.0.1:9000/hello%20world/%E1%88%B4.txt"
        .parse()
        .expect("url must be valid");

    req
}

fn test_put_request() -> Request<&'static str> {
    let content = "Hello,World!";
    let mut req = Request::new(content);
    *req.method_mut() = http::Method::PUT;
    *req.uri_mut() = "http://127.0.0.1:9000/hello"
        .parse()
        .expect("url must be valid");
    req.headers_mut().insert(
        CONTENT_LENGTH,
        HeaderValue::from_str(&content.len().to_string()).expect("must be valid"),
    );

    req
}

fn test_post_request_json() -> Request<&'static str> {
    let content = r#"{"TableName":"test"}"#;
    let mut req = Request::new(content);
    *req.method_mut() = http::Method::POST;
    *req.uri_mut() = "https://dynamodb.us-east-1.amazonaws.com/"
        .parse()
        .expect("url must be valid");
    req.headers_mut().insert(
        "content-type",
        HeaderValue::from_static("application/x-amz-json-1.0"),
    );
    req.headers_mut().insert(
        "x-amz-target",
        HeaderValue::from_static("DynamoDB_20120810.DescribeTable"),
    );

    req
}

/// Sign with `aws-sigv4` and return the authorization header it produced.
fn expected_authorization(req: Request<&'static str>, token: Option<&str>) -> String {
    let mut ss = SigningSettings::default();
    ss.percent_encoding_mode = PercentEncodingMode::Single;
    ss.payload_checksum_kind = PayloadChecksumKind::NoHeader;
    let id = Credentials::new(
        "access_key_id",
        "secret_access_key",
        token.map(|v| v.to_string()),
        None,
        "hardcoded-credentials",
    )
    .into();
    let sp = v4::SigningParams::builder()
        .identity(&id)
        .region("test")
        .name("s3")
        .time(SystemTime::from(suite_time()))
        .settings(ss)
        .build()
        .expect("signing params must be valid");

    let mut req = req;
    let output = aws_sigv4::http_request::sign(
        SignableRequest::new(
            req.method().as_str(),
            req.uri().to_string(),
            req.headers()
                .iter()
                .map(|(k, v)| (k.as_str(), std::str::from_utf8(v.as_bytes()).unwrap())),
            SignableBody::Bytes(req.body().as_bytes()),
        )
        .expect("signable request must be valid"),
        &sp.into(),
    )
    .expect("aws-sigv4 signing must succeed");
    let (aws_sig, _) = output.into_parts();
    aws_sig.apply_to_request_http1x(&mut req);

    req.headers()["authorization"]
        .to_str()
        .expect("authorization must be ascii")
        .to_string()
}

fn actual_authorization(req: Request<&'static str>, token: Option<&str>) -> String {
    let mut cred = Credential::new("access_key_id", "secret_access_key");
    cred.session_token = token.map(|v| v.to_string());
    let session = Session::new(Arc::new(FixedClock(suite_time())), "test", "s3", &cred)
        .expect("session must be created");

    let mut req = req.map(Payload::from);
    session.sign(&mut req).expect("sign must succeed");

    req.headers()["authorization"]
        .to_str()
        .expect("authorization must be ascii")
        .to_string()
}

#[test]
fn test_same_as_aws_sigv4() {
    let _ = env_logger::builder().is_test(true).try_init();

    for (name, req_fn) in test_cases() {
        assert_eq!(
            actual_authorization(req_fn(), None),
            expected_authorization(req_fn(), None),
            "{name} signature mismatch"
        );
    }
}

#[test]
fn test_same_as_aws_sigv4_with_token() {
    let _ = env_logger::builder().is_test(true).try_init();

    for (name, req_fn) in test_cases() {
        assert_eq!(
            actual_authorization(req_fn(), Some("security_token")),
            expected_authorization(req_fn(), Some("security_token")),
            "{name} signature with token mismatch"
        );
    }
}
