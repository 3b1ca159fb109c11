// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use yare::parameterized;

#[parameterized(
    get = { "GET", Method::Get },
    lower = { "patch", Method::Patch },
    mixed = { "Delete", Method::Delete },
    padded = { " post ", Method::Post },
    head = { "HEAD", Method::Head },
    options = { "options", Method::Options },
    put = { "PUT", Method::Put },
)]
fn method_parses(input: &str, expected: Method) {
    assert_eq!(input.parse::<Method>().unwrap(), expected);
}

#[test]
fn method_rejects_unknown_verb() {
    let err = "FETCH".parse::<Method>().unwrap_err();
    assert!(err.to_string().contains("invalid HTTP method"));
}

#[parameterized(
    get = { Method::Get, false },
    head = { Method::Head, false },
    options = { Method::Options, false },
    post = { Method::Post, true },
    put = { Method::Put, true },
    patch = { Method::Patch, true },
    delete = { Method::Delete, true },
)]
fn method_mutating(method: Method, mutating: bool) {
    assert_eq!(method.is_mutating(), mutating);
    assert_eq!(method.is_read(), !mutating);
}

#[test]
fn with_header_replaces_case_insensitively() {
    let request = ActionRequest::new(Method::Post, "http://api.test/tasks")
        .with_header("content-type", "text/plain")
        .with_header("Content-Type", "application/json");

    assert_eq!(request.headers.len(), 1);
    assert_eq!(header(&request.headers, "CONTENT-TYPE"), Some("application/json"));
}

#[test]
fn remove_header_reports_removal() {
    let mut headers = Headers::new();
    headers.insert("Authorization".to_string(), "Bearer old".to_string());
    headers.insert("X-Trace".to_string(), "1".to_string());

    assert!(remove_header(&mut headers, "authorization"));
    assert!(!remove_header(&mut headers, "authorization"));
    assert_eq!(headers.len(), 1);
}

#[test]
fn pending_action_serialized_form() {
    let request = ActionRequest::new(Method::Patch, "http://api.test/tasks/42")
        .with_header("Content-Type", "application/json")
        .with_body(r#"{"status":"completed"}"#);
    let action = PendingAction::new(ActionId::new(1700, 0), request, 1700);

    let value: serde_json::Value = serde_json::to_value(&action).unwrap();
    assert_eq!(value["id"], "1700-0");
    assert_eq!(value["url"], "http://api.test/tasks/42");
    assert_eq!(value["method"], "PATCH");
    assert_eq!(value["headers"]["Content-Type"], "application/json");
    assert_eq!(value["body"], r#"{"status":"completed"}"#);
    assert_eq!(value["timestamp"], 1700);
}

#[test]
fn pending_action_request_matches_original() {
    let request = ActionRequest::new(Method::Delete, "http://api.test/teams/7")
        .with_header("X-Client", "cli");
    let action = PendingAction::new(ActionId::new(5, 1), request.clone(), 5);
    assert_eq!(action.request(), request);
}
