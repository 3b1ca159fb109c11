// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Authorization header supply.
//!
//! Credentials are never stored with a pending action. The header is
//! stripped before an action is persisted and re-derived from the
//! [`CredentialSource`] each time a request goes out, so a replay after a
//! token change uses the new token.

use ts_core::action::remove_header;
use ts_core::Headers;

use crate::env;

/// Name of the header carrying credentials.
pub const AUTHORIZATION: &str = "Authorization";

/// Supplies the `Authorization` header value at send time.
pub trait CredentialSource: Send + Sync {
    /// Current header value, or `None` to send the request unauthenticated.
    fn authorization(&self) -> Option<String>;
}

/// A fixed header value.
#[derive(Debug, Clone)]
pub struct StaticCredential {
    value: String,
}

impl StaticCredential {
    pub fn bearer(token: &str) -> Self {
        StaticCredential {
            value: format!("Bearer {}", token),
        }
    }
}

impl CredentialSource for StaticCredential {
    fn authorization(&self) -> Option<String> {
        Some(self.value.clone())
    }
}

/// Bearer token read from an environment variable on every call.
#[derive(Debug, Clone)]
pub struct EnvCredential {
    var: String,
}

impl EnvCredential {
    pub fn new(var: impl Into<String>) -> Self {
        EnvCredential { var: var.into() }
    }
}

impl CredentialSource for EnvCredential {
    fn authorization(&self) -> Option<String> {
        env::token(&self.var).map(|token| format!("Bearer {}", token))
    }
}

/// Sends requests without credentials.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCredential;

impl CredentialSource for NoCredential {
    fn authorization(&self) -> Option<String> {
        None
    }
}

/// Removes any caller-supplied authorization header.
pub fn strip(headers: &mut Headers) -> bool {
    remove_header(headers, AUTHORIZATION)
}

/// Replaces the authorization header with the source's current value.
pub fn apply(headers: &mut Headers, source: &dyn CredentialSource) {
    strip(headers);
    if let Some(value) = source.authorization() {
        headers.insert(AUTHORIZATION.to_string(), value);
    }
}

#[cfg(test)]
#[path = "auth_tests.rs"]
mod tests;
