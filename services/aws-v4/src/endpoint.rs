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

//! Service and region detection from AWS endpoint host names.

// Regions on AWS Standard.
pub const AF_SOUTH_1: &str = "af-south-1";
pub const AP_EAST_1: &str = "ap-east-1";
pub const AP_NORTHEAST_1: &str = "ap-northeast-1";
pub const AP_NORTHEAST_2: &str = "ap-northeast-2";
pub const AP_NORTHEAST_3: &str = "ap-northeast-3";
pub const AP_SOUTH_1: &str = "ap-south-1";
pub const AP_SOUTH_2: &str = "ap-south-2";
pub const AP_SOUTHEAST_1: &str = "ap-southeast-1";
pub const AP_SOUTHEAST_2: &str = "ap-southeast-2";
pub const AP_SOUTHEAST_3: &str = "ap-southeast-3";
pub const AP_SOUTHEAST_4: &str = "ap-southeast-4";
pub const CA_CENTRAL_1: &str = "ca-central-1";
pub const CA_WEST_1: &str = "ca-west-1";
pub const EU_CENTRAL_1: &str = "eu-central-1";
pub const EU_CENTRAL_2: &str = "eu-central-2";
pub const EU_NORTH_1: &str = "eu-north-1";
pub const EU_SOUTH_1: &str = "eu-south-1";
pub const EU_SOUTH_2: &str = "eu-south-2";
pub const EU_WEST_1: &str = "eu-west-1";
pub const EU_WEST_2: &str = "eu-west-2";
pub const EU_WEST_3: &str = "eu-west-3";
pub const IL_CENTRAL_1: &str = "il-central-1";
pub const ME_CENTRAL_1: &str = "me-central-1";
pub const ME_SOUTH_1: &str = "me-south-1";
pub const SA_EAST_1: &str = "sa-east-1";
pub const US_EAST_1: &str = "us-east-1";
pub const US_EAST_2: &str = "us-east-2";
pub const US_WEST_1: &str = "us-west-1";
pub const US_WEST_2: &str = "us-west-2";

// Regions on AWS China.
pub const CN_NORTH_1: &str = "cn-north-1";
pub const CN_NORTHWEST_1: &str = "cn-northwest-1";

// Regions on AWS GovCloud (US).
pub const US_GOV_EAST_1: &str = "us-gov-east-1";
pub const US_GOV_WEST_1: &str = "us-gov-west-1";

/// Legacy S3 endpoint `s3-external-1`, served from us-east-1.
const EXTERNAL_1: &str = "external-1";

/// Every region `parse_host` recognizes.
pub const KNOWN_REGIONS: &[&str] = &[
    AF_SOUTH_1,
    AP_EAST_1,
    AP_NORTHEAST_1,
    AP_NORTHEAST_2,
    AP_NORTHEAST_3,
    AP_SOUTH_1,
    AP_SOUTH_2,
    AP_SOUTHEAST_1,
    AP_SOUTHEAST_2,
    AP_SOUTHEAST_3,
    AP_SOUTHEAST_4,
    CA_CENTRAL_1,
    CA_WEST_1,
    EU_CENTRAL_1,
    EU_CENTRAL_2,
    EU_NORTH_1,
    EU_SOUTH_1,
    EU_SOUTH_2,
    EU_WEST_1,
    EU_WEST_2,
    EU_WEST_3,
    IL_CENTRAL_1,
    ME_CENTRAL_1,
    ME_SOUTH_1,
    SA_EAST_1,
    US_EAST_1,
    US_EAST_2,
    US_WEST_1,
    US_WEST_2,
    CN_NORTH_1,
    CN_NORTHWEST_1,
    US_GOV_EAST_1,
    US_GOV_WEST_1,
];

/// The region S3 uses when the host names none.
const S3_DEFAULT_REGION: &str = US_EAST_1;

fn is_known_region(s: &str) -> bool {
    s == EXTERNAL_1 || KNOWN_REGIONS.contains(&s)
}

fn normalize_region(region: &str) -> &str {
    if region == EXTERNAL_1 {
        S3_DEFAULT_REGION
    } else {
        region
    }
}

/// Split `label` into `(service, region)` when it has the `<service>-<region>` shape.
fn split_dashed_region(label: &str) -> Option<(&str, &str)> {
    KNOWN_REGIONS
        .iter()
        .copied()
        .chain([EXTERNAL_1])
        .filter_map(|region| {
            let service = label.strip_suffix(region)?.strip_suffix('-')?;
            (!service.is_empty()).then_some((service, region))
        })
        .max_by_key(|(_, region)| region.len())
}

/// Parse an AWS endpoint host into `(service, region)`.
///
/// The host must end with `.amazonaws.com` or `.amazonaws.com.cn`, the port
/// and case are ignored. Recognized shapes are `<service>.<region>`,
/// `<region>.<service>` and `<service>-<region>`, plus S3 in path style
/// (`s3`, `s3-external-1`) or virtual-hosted style (`<bucket>.s3`) which
/// resolve to `us-east-1`.
///
/// Returns two empty strings when nothing matches.
///
/// ```
/// use sigsess_aws_v4::parse_host;
///
/// assert_eq!(
///     parse_host("some.bucket.s3.amazonaws.com"),
///     ("s3".to_string(), "us-east-1".to_string())
/// );
/// assert_eq!(parse_host("myhost.com"), (String::new(), String::new()));
/// ```
pub fn parse_host(host: &str) -> (String, String) {
    match parse_host_inner(&host.to_ascii_lowercase()) {
        Some((service, region)) => (service.to_string(), normalize_region(region).to_string()),
        None => (String::new(), String::new()),
    }
}

fn parse_host_inner(host: &str) -> Option<(&str, &str)> {
    let host = match host.rsplit_once(':') {
        Some((h, port)) if port.bytes().all(|b| b.is_ascii_digit()) => h,
        _ => host,
    };
    let host = host.strip_suffix('.').unwrap_or(host);
    let rest = host
        .strip_suffix(".amazonaws.com")
        .or_else(|| host.strip_suffix(".amazonaws.com.cn"))?;

    let labels: Vec<&str> = rest.split('.').collect();
    let last = *labels.last()?;

    if last == "s3" {
        return Some(("s3", S3_DEFAULT_REGION));
    }

    if let [.., first, second] = labels[..] {
        if is_known_region(second) {
            return Some((first, second));
        }
        if is_known_region(first) {
            return Some((second, first));
        }
    }

    split_dashed_region(last)
}
