// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use crate::sync::HttpResponse;
use ts_core::{ActionId, CachedResponse};
use yare::parameterized;

#[parameterized(
    simple = { "If-Match: 7", "If-Match", "7" },
    no_space = { "X-Trace:abc", "X-Trace", "abc" },
    padded = { "  Accept :  text/plain  ", "Accept", "text/plain" },
    colon_in_value = { "X-Url: http://a:1", "X-Url", "http://a:1" },
    empty_value = { "X-Empty:", "X-Empty", "" },
)]
fn parse_header_accepts(raw: &str, name: &str, value: &str) {
    assert_eq!(
        parse_header(raw).unwrap(),
        (name.to_string(), value.to_string())
    );
}

#[parameterized(
    no_colon = { "Accept text/plain" },
    empty_name = { ": value" },
    space_in_name = { "Bad Name: x" },
)]
fn parse_header_rejects(raw: &str) {
    assert!(matches!(parse_header(raw), Err(Error::InvalidHeader(_))));
}

#[test]
fn body_defaults_to_json_content_type() {
    let request =
        build_request("post", "/tasks".to_string(), Some("{}".to_string()), &[]).unwrap();

    assert_eq!(request.method, Method::Post);
    assert_eq!(request.body, "{}");
    assert_eq!(
        header(&request.headers, "content-type"),
        Some("application/json")
    );
}

#[test]
fn explicit_content_type_is_kept() {
    let request = build_request(
        "PUT",
        "/tasks/1".to_string(),
        Some("title=x".to_string()),
        &["content-type: application/x-www-form-urlencoded".to_string()],
    )
    .unwrap();

    assert_eq!(request.headers.len(), 1);
    assert_eq!(
        header(&request.headers, "Content-Type"),
        Some("application/x-www-form-urlencoded")
    );
}

#[test]
fn no_body_means_no_content_type() {
    let request = build_request("DELETE", "/tasks/1".to_string(), None, &[]).unwrap();
    assert!(request.headers.is_empty());
}

#[test]
fn unknown_method_is_input_error() {
    let result = build_request("FETCH", "/tasks".to_string(), None, &[]);
    assert!(matches!(result, Err(Error::Input(_))));
}

#[test]
fn view_of_each_outcome() {
    let response = RequestOutcome::Response(HttpResponse::new(201, "{\"id\":5}"));
    assert_eq!(
        view(&response).unwrap(),
        OutcomeView::Response {
            status: 201,
            body: "{\"id\":5}"
        }
    );

    let deferred = RequestOutcome::Deferred {
        id: ActionId::new(1_700_000_000_000, 2),
    };
    assert_eq!(
        view(&deferred).unwrap(),
        OutcomeView::Deferred {
            id: "1700000000000-2".to_string()
        }
    );

    let cached = RequestOutcome::Cached(CachedResponse {
        url: "http://api.test/api/tasks".to_string(),
        status: 200,
        content_type: None,
        body: "[]".to_string(),
        stored_at: 10,
        expires_at: 20,
    });
    assert!(matches!(
        view(&cached).unwrap(),
        OutcomeView::Cached { stored_at: 10, .. }
    ));
}

#[test]
fn unavailable_outcome_is_an_error() {
    let outcome = RequestOutcome::Unavailable {
        url: "http://api.test/api/tasks".to_string(),
    };
    assert!(matches!(view(&outcome), Err(Error::Unavailable(_))));
}

#[test]
fn json_view_is_tagged() {
    let json = serde_json::to_value(OutcomeView::Deferred {
        id: "1-0".to_string(),
    })
    .unwrap();
    assert_eq!(json["outcome"], "deferred");
    assert_eq!(json["id"], "1-0");
}
