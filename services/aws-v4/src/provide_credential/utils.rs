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

use http::StatusCode;
use sigsess_core::Error;

/// Build an error for a non 200 response of the instance metadata service.
pub fn parse_imds_error(operation: &str, status: StatusCode, body: &str) -> Error {
    let message = format!("IMDS {operation} failed with status {status}");
    let err = match status {
        StatusCode::NOT_FOUND => Error::config_invalid(message),
        _ => Error::unexpected(message),
    };

    let body = body.trim();
    if body.is_empty() {
        err
    } else {
        err.with_context(format!("response: {body}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sigsess_core::ErrorKind;

    #[test]
    fn test_parse_imds_error() {
        let err = parse_imds_error("fetch_credentials", StatusCode::NOT_FOUND, "not found\n");
        assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
        assert_eq!(
            err.to_string(),
            "IMDS fetch_credentials failed with status 404 Not Found"
        );
        assert_eq!(err.context(), ["response: not found"]);

        let err = parse_imds_error("fetch_imds_token", StatusCode::UNAUTHORIZED, "");
        assert_eq!(err.kind(), ErrorKind::Unexpected);
        assert!(err.context().is_empty());
    }
}
