//! Structured response metadata.
//!
//! Remote APIs report rate limits, granted OAuth scopes, pagination links,
//! and entity validators through well-known response headers. [`ApiInfo`]
//! gathers them into one value so callers never scrape headers themselves.
//!
//! Extraction never fails: an absent or malformed header degrades to the
//! default (zero counters, empty collections, no etag).

use std::collections::HashMap;

use crate::HeaderMap;

/// Header carrying the rate-limit ceiling.
pub const RATE_LIMIT: &str = "X-RateLimit-Limit";
/// Header carrying the remaining rate-limit budget.
pub const RATE_LIMIT_REMAINING: &str = "X-RateLimit-Remaining";
/// Header listing OAuth scopes granted to the current token.
pub const OAUTH_SCOPES: &str = "X-OAuth-Scopes";
/// Header listing OAuth scopes the endpoint accepts.
pub const ACCEPTED_OAUTH_SCOPES: &str = "X-Accepted-OAuth-Scopes";

/// Metadata extracted from response headers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiInfo {
    /// Rate-limit ceiling for the current window (0 when unreported).
    pub rate_limit: u32,
    /// Remaining requests in the current window (0 when unreported).
    pub rate_limit_remaining: u32,
    /// OAuth scopes granted to the current token.
    pub oauth_scopes: Vec<String>,
    /// OAuth scopes the endpoint accepts.
    pub accepted_oauth_scopes: Vec<String>,
    /// Pagination links keyed by relation name ("next", "last", ...).
    pub links: HashMap<String, String>,
    /// Entity validator for conditional revalidation.
    pub etag: Option<String>,
}

impl ApiInfo {
    /// Extract metadata from response headers, degrading to defaults for
    /// anything absent or unparsable.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self {
            rate_limit: parse_counter(headers.get(RATE_LIMIT)),
            rate_limit_remaining: parse_counter(headers.get(RATE_LIMIT_REMAINING)),
            oauth_scopes: parse_scopes(headers.get(OAUTH_SCOPES)),
            accepted_oauth_scopes: parse_scopes(headers.get(ACCEPTED_OAUTH_SCOPES)),
            links: parse_links(headers.get("Link")),
            etag: headers
                .get("ETag")
                .map(str::trim)
                .filter(|etag| !etag.is_empty())
                .map(ToOwned::to_owned),
        }
    }
}

fn parse_counter(value: Option<&str>) -> u32 {
    value.and_then(|v| v.trim().parse().ok()).unwrap_or(0)
}

fn parse_scopes(value: Option<&str>) -> Vec<String> {
    value
        .map(|v| {
            v.split(',')
                .map(str::trim)
                .filter(|scope| !scope.is_empty())
                .map(ToOwned::to_owned)
                .collect()
        })
        .unwrap_or_default()
}

/// Parse a `Link` header: comma-separated `<url>; rel="name"` segments.
///
/// A segment missing either the angle-bracketed URL or the rel token is
/// skipped; the remaining segments still parse.
fn parse_links(value: Option<&str>) -> HashMap<String, String> {
    let Some(value) = value else {
        return HashMap::new();
    };

    value
        .split(',')
        .filter_map(|segment| {
            let url = link_url(segment)?;
            let rel = link_rel(segment)?;
            Some((rel.to_owned(), url.to_owned()))
        })
        .collect()
}

fn link_url(segment: &str) -> Option<&str> {
    let start = segment.find('<')?;
    let rest = segment.get(start + 1..)?;
    let end = rest.find('>')?;
    rest.get(..end)
}

fn link_rel(segment: &str) -> Option<&str> {
    let (_, rest) = segment.split_once("rel=\"")?;
    let (rel, _) = rest.split_once('"')?;
    (!rel.is_empty()).then_some(rel)
}
