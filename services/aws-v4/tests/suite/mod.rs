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

//! Signing test suite.
//!
//! Every directory under `testdata/suite` holds one raw request (`.req`) and
//! the canonical request (`.creq`), string to sign (`.sts`) and signed
//! request (`.sreq`) it must produce with the `AKIDEXAMPLE` credential in
//! `us-east-1` for `service`.

use super::{suite_session, KEY_ID, SECRET};
use http::{HeaderName, HeaderValue, Request};
use log::debug;
use pretty_assertions::assert_eq;
use sigsess_aws_v4::{Credential, Payload};
use std::fs;
use std::path::{Path, PathBuf};
use test_case::test_case;

fn suite_dir(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/testdata/suite")
        .join(name)
}

fn read_fixture(name: &str, ext: &str) -> String {
    let path = suite_dir(name).join(format!("{name}.{ext}"));
    fs::read_to_string(&path)
        .unwrap_or_else(|err| panic!("read {} failed: {err}", path.display()))
}

/// Parse a `.req` or `.sreq` fixture into a request.
fn parse_request(raw: &str) -> Request<Payload> {
    let (head, body) = raw.split_once("\n\n").unwrap_or((raw.trim_end(), ""));
    let head = format!("{}\r\n\r\n", head.replace('\n', "\r\n"));

    let mut headers = [httparse::EMPTY_HEADER; 16];
    let mut parsed = httparse::Request::new(&mut headers);
    let status = parsed
        .parse(head.as_bytes())
        .expect("request must be valid");
    assert!(status.is_complete(), "request head must be complete");

    let mut req = Request::builder()
        .method(parsed.method.expect("method must exist"))
        .uri(parsed.path.expect("path must exist"))
        .body(Payload::from(body.to_string()))
        .expect("request must be valid");
    for h in parsed.headers.iter() {
        req.headers_mut().append(
            HeaderName::from_bytes(h.name.as_bytes()).expect("header name must be valid"),
            HeaderValue::from_bytes(h.value).expect("header value must be valid"),
        );
    }
    req
}

/// Header lines in map order, names lower-cased by `HeaderName`.
fn header_lines(req: &Request<Payload>) -> Vec<(String, String)> {
    req.headers()
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                value
                    .to_str()
                    .expect("header value must be ascii")
                    .to_string(),
            )
        })
        .collect()
}

fn body_bytes(req: &Request<Payload>) -> &[u8] {
    match req.body() {
        Payload::Bytes(bs) => bs.as_ref(),
        _ => &[],
    }
}

#[test_case("get-vanilla")]
#[test_case("get-vanilla-query")]
#[test_case("get-vanilla-empty-query-key")]
#[test_case("get-vanilla-query-order-key")]
#[test_case("get-vanilla-query-order-key-case")]
#[test_case("get-vanilla-query-order-value")]
#[test_case("get-vanilla-query-unreserved")]
#[test_case("get-vanilla-utf8-query")]
#[test_case("get-utf8")]
#[test_case("get-unreserved")]
#[test_case("get-relative")]
#[test_case("get-relative-relative")]
#[test_case("get-slash")]
#[test_case("get-slash-dot-slash")]
#[test_case("get-slash-pointless-dot")]
#[test_case("get-slashes")]
#[test_case("get-header-key-duplicate")]
#[test_case("get-header-value-order")]
#[test_case("get-header-value-trim")]
#[test_case("post-vanilla")]
#[test_case("post-vanilla-query")]
#[test_case("post-vanilla-empty-query-value")]
#[test_case("post-header-key-case")]
#[test_case("post-header-key-sort")]
#[test_case("post-header-value-case")]
#[test_case("post-sts-header-before")]
#[test_case("post-x-www-form-urlencoded")]
#[test_case("post-x-www-form-urlencoded-parameters")]
fn test_suite(name: &str) {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut req = parse_request(&read_fixture(name, "req"));
    let mut cred = Credential::new(KEY_ID, SECRET);
    if let Some(token) = req.headers().get("x-amz-security-token") {
        cred.session_token = Some(token.to_str().expect("token must be ascii").to_string());
    }
    debug!("signing suite request {name}: {req:?}");

    let output = suite_session(&cred)
        .sign(&mut req)
        .unwrap_or_else(|err| panic!("sign {name} should pass: {err:?}"));

    assert_eq!(
        output.canonical_request.to_string(),
        read_fixture(name, "creq"),
        "{name} canonical request mismatch"
    );
    assert_eq!(
        output.string_to_sign.to_string(),
        read_fixture(name, "sts"),
        "{name} string to sign mismatch"
    );
    let expected = parse_request(&read_fixture(name, "sreq"));
    assert_eq!(req.method(), expected.method(), "{name} method mismatch");
    assert_eq!(req.uri(), expected.uri(), "{name} uri mismatch");
    assert_eq!(
        header_lines(&req),
        header_lines(&expected),
        "{name} signed headers mismatch"
    );
    assert_eq!(body_bytes(&req), body_bytes(&expected), "{name} body mismatch");
}
