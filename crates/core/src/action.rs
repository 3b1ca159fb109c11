// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Deferred request records.
//!
//! A [`PendingAction`] is a mutating API request that could not be delivered
//! while offline. It is written once when deferred and deleted once replayed
//! (or discarded); it is never updated in place.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::clock::ActionId;
use crate::error::{Error, Result};

/// Header name to value mapping, kept sorted for stable storage.
pub type Headers = BTreeMap<String, String>;

/// HTTP method of an API request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Head,
    Options,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    /// Returns the canonical upper-case verb.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Head => "HEAD",
            Method::Options => "OPTIONS",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }

    /// Returns true for verbs without side effects.
    ///
    /// Reads are served from cache when offline, never deferred.
    pub fn is_read(&self) -> bool {
        matches!(self, Method::Get | Method::Head | Method::Options)
    }

    /// Returns true for verbs that change server state and may be deferred.
    pub fn is_mutating(&self) -> bool {
        !self.is_read()
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Method {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "HEAD" => Ok(Method::Head),
            "OPTIONS" => Ok(Method::Options),
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            "PATCH" => Ok(Method::Patch),
            "DELETE" => Ok(Method::Delete),
            _ => Err(Error::InvalidMethod(s.to_string())),
        }
    }
}

/// The parts of a request that are persisted when it is deferred.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRequest {
    pub url: String,
    pub method: Method,
    #[serde(default)]
    pub headers: Headers,
    #[serde(default)]
    pub body: String,
}

impl ActionRequest {
    /// Creates a request with no headers and an empty body.
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        ActionRequest { url: url.into(), method, headers: Headers::new(), body: String::new() }
    }

    /// Adds a header, replacing any existing value with the same name.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        remove_header(&mut self.headers, &name);
        self.headers.insert(name, value.into());
        self
    }

    /// Sets the serialized body.
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }
}

/// A deferred mutating request waiting in the queue.
///
/// Serializes as `{id, url, method, headers, body, timestamp}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingAction {
    pub id: ActionId,
    pub url: String,
    pub method: Method,
    pub headers: Headers,
    pub body: String,
    /// Milliseconds since Unix epoch at enqueue time. Replay order key.
    #[serde(rename = "timestamp")]
    pub enqueued_at: u64,
}

impl PendingAction {
    /// Builds the stored record for a request deferred at `enqueued_at`.
    pub fn new(id: ActionId, request: ActionRequest, enqueued_at: u64) -> Self {
        PendingAction {
            id,
            url: request.url,
            method: request.method,
            headers: request.headers,
            body: request.body,
            enqueued_at,
        }
    }

    /// Returns the request this action will replay.
    pub fn request(&self) -> ActionRequest {
        ActionRequest {
            url: self.url.clone(),
            method: self.method,
            headers: self.headers.clone(),
            body: self.body.clone(),
        }
    }
}

/// Looks up a header by case-insensitive name.
pub fn header<'a>(headers: &'a Headers, name: &str) -> Option<&'a str> {
    headers.iter().find(|(k, _)| k.eq_ignore_ascii_case(name)).map(|(_, v)| v.as_str())
}

/// Removes every header matching `name` case-insensitively.
///
/// Returns true if anything was removed.
pub fn remove_header(headers: &mut Headers, name: &str) -> bool {
    let before = headers.len();
    headers.retain(|k, _| !k.eq_ignore_ascii_case(name));
    headers.len() != before
}

#[cfg(test)]
#[path = "action_tests.rs"]
mod tests;
