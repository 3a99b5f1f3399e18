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

use super::{suite_session, KEY_ID, SECRET};
use http::Request;
use pretty_assertions::assert_eq;
use sigsess_aws_v4::{Credential, Payload};
use std::sync::Arc;
use std::thread;

fn request(idx: usize) -> Request<Payload> {
    Request::builder()
        .method("PUT")
        .uri(format!("https://example.amazonaws.com/object-{idx}?part={idx}"))
        .body(Payload::from(format!("body of object {idx}")))
        .expect("request must be valid")
}

#[test]
fn test_shared_session_matches_sequential_signing() {
    let session = Arc::new(suite_session(
        &Credential::new(KEY_ID, SECRET).with_session_token("token"),
    ));

    let expected: Vec<String> = (0..32)
        .map(|idx| {
            session
                .sign(&mut request(idx))
                .expect("sign must succeed")
                .authorization
        })
        .collect();

    let handles: Vec<_> = (0..8)
        .map(|worker| {
            let session = session.clone();
            thread::spawn(move || {
                (0..32)
                    .filter(|idx| idx % 8 == worker)
                    .map(|idx| {
                        let output = session.sign(&mut request(idx)).expect("sign must succeed");
                        (idx, output.authorization)
                    })
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut count = 0;
    for handle in handles {
        for (idx, authorization) in handle.join().expect("worker must not panic") {
            assert_eq!(authorization, expected[idx], "request {idx} mismatch");
            count += 1;
        }
    }
    assert_eq!(count, 32);
}
