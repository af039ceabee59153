//! Listing URL canonicalization and detail endpoint resolution.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use crate::models::{DetailRef, ListingRef};

static POSTING_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-([0-9]+)").expect("posting id pattern must compile"));

/// Strip query string and fragment from a listing URL to get its dedup key.
pub fn canonicalize(raw: &str) -> String {
    let raw = raw.trim();
    match Url::parse(raw) {
        Ok(mut url) => {
            url.set_query(None);
            url.set_fragment(None);
            url.to_string()
        }
        Err(_) => raw.split(['?', '#']).next().unwrap_or(raw).to_string(),
    }
}

/// Extract the posting id: the last run of digits following a hyphen in the path.
pub fn posting_id(listing_url: &str) -> Option<String> {
    let path = match Url::parse(listing_url) {
        Ok(url) => url.path().to_string(),
        Err(_) => listing_url.split(['?', '#']).next()?.to_string(),
    };

    POSTING_ID_RE
        .captures_iter(&path)
        .last()
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Resolve a listing to its detail endpoint, or `None` when the URL carries no id.
pub fn resolve(listing: &ListingRef, detail_endpoint: &str) -> Option<DetailRef> {
    let detail_id = posting_id(&listing.canonical_url)?;
    let detail_url = format!("{}/{}", detail_endpoint.trim_end_matches('/'), detail_id);

    Some(DetailRef {
        detail_id,
        detail_url,
        keyword: listing.keyword.clone(),
        listing_url: listing.canonical_url.clone(),
    })
}
