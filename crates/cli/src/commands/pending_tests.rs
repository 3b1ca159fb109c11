// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use ts_core::{ActionRequest, Method};

fn action(method: Method, body: &str) -> PendingAction {
    let request = ActionRequest::new(method, "http://api.test/api/tasks/1").with_body(body);
    PendingAction::new(ActionId::new(1_700_000_000_000, 3), request, 1_700_000_000_000)
}

#[test]
fn format_action_shows_id_method_and_url() {
    let line = format_action(&action(Method::Delete, ""));
    assert!(line.starts_with("1700000000000-3  "));
    assert!(line.contains("DELETE http://api.test/api/tasks/1"));
    assert!(!line.contains("bytes"));
}

#[test]
fn format_action_shows_body_size() {
    let line = format_action(&action(Method::Patch, r#"{"a":1}"#));
    assert!(line.contains("PATCH  http://api.test/api/tasks/1"));
    assert!(line.ends_with("(7 bytes)"));
}
