//! The structured capture of one inbound request.

use std::collections::HashMap;
use std::time::{Duration, SystemTime};

use bytes::Bytes;
use http::HeaderMap;
use http::header::COOKIE;

use crate::request::Request;

/// Header the client IP is read from.
///
/// The value is client-supplied and taken verbatim: there is no fallback to
/// the peer address and no validation. It is only meaningful when a trusted
/// proxy in front of the service sets or sanitises it.
pub const FORWARDED_FOR: &str = "x-forwarded-for";

/// Everything [`RequestTracker`](super::RequestTracker) observed about one
/// request.
///
/// Built once on entry. `identity_id` and `time_taken` stay empty / zero
/// until the inner handler has returned.
#[derive(Clone, Debug)]
pub struct RequestRecord {
    pub identity_id: String,
    pub method: String,
    /// Request target as received, path and query.
    pub url: String,
    /// First `X-Forwarded-For` value, verbatim. Empty when absent.
    pub client_ip: String,
    /// Lower-cased header name → every value in arrival order.
    pub headers: HashMap<String, Vec<String>>,
    /// Cookie name → every value sent under that name, in order.
    pub cookies: HashMap<String, Vec<String>>,
    pub body: Bytes,
    pub created_at: SystemTime,
    pub time_taken: Duration,
}

impl RequestRecord {
    /// Captures the request head. The body is filled in separately once the
    /// stream has been read.
    pub(crate) fn capture(req: &Request) -> Self {
        Self {
            identity_id: String::new(),
            method: req.method().to_string(),
            url: req.url().to_owned(),
            client_ip: req.header(FORWARDED_FOR).unwrap_or_default().to_owned(),
            headers: header_groups(req.headers()),
            cookies: cookie_groups(req.headers()),
            body: Bytes::new(),
            created_at: SystemTime::now(),
            time_taken: Duration::ZERO,
        }
    }
}

fn header_groups(headers: &HeaderMap) -> HashMap<String, Vec<String>> {
    headers.keys()
        .map(|name| {
            let values = headers.get_all(name).iter()
                .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
                .collect();
            (name.as_str().to_owned(), values)
        })
        .collect()
}

/// Parses every `Cookie` header into name → values.
///
/// Pairs are split at the first `=` only, so `a=b=c` is cookie `a` with value
/// `b=c`. Pairs without a name or without `=` are skipped. A value wrapped in
/// double quotes is unquoted.
fn cookie_groups(headers: &HeaderMap) -> HashMap<String, Vec<String>> {
    let mut cookies: HashMap<String, Vec<String>> = HashMap::new();

    let pairs = headers.get_all(COOKIE).iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|line| line.split(';'));

    for pair in pairs {
        let Some((name, value)) = pair.trim().split_once('=') else { continue };
        let name = name.trim();
        if name.is_empty() {
            continue;
        }
        let value = value.trim();
        let value = value
            .strip_prefix('"')
            .and_then(|v| v.strip_suffix('"'))
            .unwrap_or(value);
        cookies.entry(name.to_owned()).or_default().push(value.to_owned());
    }

    cookies
}
