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

//! Time related utils.

use crate::Error;
use chrono::format::{DelayedFormat, StrftimeItems};
use chrono::{NaiveDateTime, TimeZone, Utc};
use std::fmt::Debug;

/// DateTime is the alias for `chrono::DateTime<Utc>`.
pub type DateTime = chrono::DateTime<Utc>;

/// Date format: "20220313"
pub const DATE: &str = "%Y%m%d";

/// Time format for ISO 8601 basic: "20220313T072004Z"
pub const ISO8601: &str = "%Y%m%dT%H%M%SZ";

/// Time format for RFC 850: "Sunday, 13-Mar-22 07:20:04 GMT"
const RFC850: &str = "%A, %d-%b-%y %H:%M:%S GMT";

/// Time format for ANSI C asctime: "Sun Mar 13 07:20:04 2022"
const ASCTIME: &str = "%a %b %e %H:%M:%S %Y";

/// Create a new DateTime with current wall-clock time.
///
/// Only [`SystemClock`] should call this, everything else asks a [`Clock`].
pub fn now() -> DateTime {
    Utc::now()
}

/// Format time into date: `20220313`
pub fn format_date(t: DateTime) -> String {
    t.format(DATE).to_string()
}

/// Format time into ISO 8601 basic: `20220313T072004Z`
pub fn format_iso8601(t: DateTime) -> String {
    t.format(ISO8601).to_string()
}

/// Format time into http date: `Sun, 13 Mar 2022 07:20:04 GMT`
pub fn format_http_date(t: DateTime) -> DelayedFormat<StrftimeItems<'static>> {
    t.format("%a, %d %b %Y %H:%M:%S GMT")
}

/// Parse time from ISO 8601 basic: `20220313T072004Z`
pub fn parse_iso8601(s: &str) -> crate::Result<DateTime> {
    let t = NaiveDateTime::parse_from_str(s, ISO8601).map_err(|e| {
        Error::date_parse(format!("parse '{s}' into iso8601 failed"))
            .with_source(anyhow::Error::new(e))
    })?;
    Ok(Utc.from_utc_datetime(&t))
}

/// Parse a value of the standard http `Date` header.
///
/// RFC 1123 is preferred, the obsolete RFC 850 and asctime forms are accepted.
pub fn parse_http_date(s: &str) -> crate::Result<DateTime> {
    if let Ok(t) = chrono::DateTime::parse_from_rfc2822(s) {
        return Ok(t.with_timezone(&Utc));
    }

    [RFC850, ASCTIME]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(s, format).ok())
        .map(|t| Utc.from_utc_datetime(&t))
        .ok_or_else(|| Error::date_parse(format!("parse '{s}' into http date failed")))
}

/// Parse time from RFC 3339: `2022-03-13T07:20:04Z`
pub fn parse_rfc3339(s: &str) -> crate::Result<DateTime> {
    chrono::DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| {
            Error::date_parse(format!("parse '{s}' into rfc3339 failed"))
                .with_source(anyhow::Error::new(e))
        })
}

/// Clock is the source of the current time for signing.
///
/// Signing code never reads the wall clock directly, so tests can pin the
/// time with [`FixedClock`].
pub trait Clock: Debug + Send + Sync + 'static {
    /// Return the current time in UTC.
    fn now(&self) -> DateTime;
}

/// SystemClock reads the wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime {
        now()
    }
}

/// FixedClock always returns the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime);

impl Clock for FixedClock {
    fn now(&self) -> DateTime {
        self.0
    }
}
