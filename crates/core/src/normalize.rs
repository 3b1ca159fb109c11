// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! URL normalization for cache keys and request targets.

use url::Url;

use crate::error::{Error, Result};

/// Normalizes a request URL into a cache key.
///
/// Scheme and host are lower-cased and default ports dropped (by [`Url`]),
/// the fragment is removed, query parameters are sorted, and a trailing
/// slash on a non-root path is trimmed. Two URLs that name the same
/// resource produce the same key.
pub fn normalize_url(raw: &str) -> Result<String> {
    let mut url = parse(raw)?;
    url.set_fragment(None);

    let mut pairs: Vec<(String, String)> =
        url.query_pairs().map(|(k, v)| (k.into_owned(), v.into_owned())).collect();
    if pairs.is_empty() {
        url.set_query(None);
    } else {
        pairs.sort();
        url.query_pairs_mut().clear().extend_pairs(pairs);
    }

    let path = url.path().to_string();
    if path.len() > 1 && path.ends_with('/') {
        url.set_path(path.trim_end_matches('/'));
    }

    Ok(url.to_string())
}

/// Resolves a request target against the API base URL.
///
/// Absolute `http`/`https` targets are returned unchanged. Anything else is
/// appended to the base as a path, so `/tasks/42` against
/// `http://host/api` yields `http://host/api/tasks/42`.
pub fn join_url(base: &str, target: &str) -> Result<String> {
    if let Ok(url) = Url::parse(target) {
        if matches!(url.scheme(), "http" | "https") {
            return Ok(target.to_string());
        }
    }

    let joined = format!("{}/{}", base.trim_end_matches('/'), target.trim_start_matches('/'));
    parse(&joined)?;
    Ok(joined)
}

fn parse(raw: &str) -> Result<Url> {
    let url = Url::parse(raw)
        .map_err(|e| Error::InvalidUrl { url: raw.to_string(), reason: e.to_string() })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(Error::InvalidUrl {
            url: raw.to_string(),
            reason: format!("unsupported scheme '{}'", url.scheme()),
        });
    }
    Ok(url)
}

#[cfg(test)]
#[path = "normalize_tests.rs"]
mod tests;
