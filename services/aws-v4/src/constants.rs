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

use percent_encoding::AsciiSet;
use percent_encoding::NON_ALPHANUMERIC;

// Signing algorithm and scope terminator.
pub const AWS4_HMAC_SHA256: &str = "AWS4-HMAC-SHA256";
pub const AWS4_REQUEST: &str = "aws4_request";
pub const AWS4: &str = "AWS4";

/// Value of `x-amz-content-sha256` telling the service not to check the body.
pub const UNSIGNED_PAYLOAD: &str = "UNSIGNED-PAYLOAD";

// Headers used in aws services.
pub const X_AMZ_CONTENT_SHA_256: &str = "x-amz-content-sha256";
pub const X_AMZ_DATE: &str = "x-amz-date";
pub const X_AMZ_SECURITY_TOKEN: &str = "x-amz-security-token";

// Env values used in aws services.
pub const AWS_ACCESS_KEY_ID: &str = "AWS_ACCESS_KEY_ID";
pub const AWS_ACCESS_KEY: &str = "AWS_ACCESS_KEY";
pub const AWS_SECRET_ACCESS_KEY: &str = "AWS_SECRET_ACCESS_KEY";
pub const AWS_SECRET_KEY: &str = "AWS_SECRET_KEY";
pub const AWS_SESSION_TOKEN: &str = "AWS_SESSION_TOKEN";
pub const AWS_REGION: &str = "AWS_REGION";
pub const AWS_DEFAULT_REGION: &str = "AWS_DEFAULT_REGION";
pub const AWS_EC2_METADATA_DISABLED: &str = "AWS_EC2_METADATA_DISABLED";
pub const AWS_EC2_METADATA_SERVICE_ENDPOINT: &str = "AWS_EC2_METADATA_SERVICE_ENDPOINT";

/// Env aliases for the access key id, first non-empty wins.
pub const ACCESS_KEY_ID_ENV_VARS: &[&str] = &[AWS_ACCESS_KEY_ID, AWS_ACCESS_KEY];
/// Env aliases for the secret access key, first non-empty wins.
pub const SECRET_ACCESS_KEY_ENV_VARS: &[&str] = &[AWS_SECRET_ACCESS_KEY, AWS_SECRET_KEY];
/// Env aliases for the session token.
pub const SESSION_TOKEN_ENV_VARS: &[&str] = &[AWS_SESSION_TOKEN];

// EC2 instance metadata service.
pub const IMDS_DEFAULT_ENDPOINT: &str = "http://169.254.169.254";
pub const X_AWS_EC2_METADATA_TOKEN: &str = "x-aws-ec2-metadata-token";
pub const X_AWS_EC2_METADATA_TOKEN_TTL_SECONDS: &str = "x-aws-ec2-metadata-token-ttl-seconds";
/// 21600s (6h) is recommended by AWS.
pub const IMDS_TOKEN_TTL_SECONDS: i64 = 21600;

/// AsciiSet for [AWS UriEncode](https://docs.aws.amazon.com/AmazonS3/latest/API/sig-v4-header-based-auth.html)
///
/// - URI encode every byte except the unreserved characters: 'A'-'Z', 'a'-'z', '0'-'9', '-', '.', '_', and '~'.
/// - `/` is kept since it separates path segments.
pub static AWS_URI_ENCODE_SET: AsciiSet = NON_ALPHANUMERIC
    .remove(b'/')
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// AsciiSet for [AWS UriEncode](https://docs.aws.amazon.com/AmazonS3/latest/API/sig-v4-header-based-auth.html)
///
/// But used in query, where `/` must be encoded too.
pub static AWS_QUERY_ENCODE_SET: AsciiSet = NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');
