use std::time::{Duration, SystemTime};

use http::HeaderValue;

/// Decide whether a request may be answered with `304 Not Modified`.
///
/// Only `If-Modified-Since` is evaluated. The comparison allows one second of slack, because
/// HTTP dates have whole-second precision while filesystem timestamps usually don't.
///
/// Entity tags are not compared: if `If-None-Match` is present at all, the resource is always
/// served normally.
pub fn is_not_modified(
    if_none_match: Option<&HeaderValue>,
    if_modified_since: Option<&HeaderValue>,
    modified: Option<SystemTime>,
) -> bool {
    if if_none_match.is_some() {
        return false;
    }

    let since = if_modified_since
        .and_then(|v| v.to_str().ok())
        .and_then(|v| httpdate::parse_http_date(v).ok());

    match (since, modified) {
        (Some(since), Some(modified)) => modified < since + Duration::from_secs(1),
        _ => false,
    }
}
