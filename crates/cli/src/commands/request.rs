// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! `tasksync request`: one API call through the interceptor.

use serde::Serialize;
use ts_core::action::header;
use ts_core::{ActionRequest, Method};

use super::{block_on, format_time, Project};
use crate::cli::OutputFormat;
use crate::error::{Error, Result};
use crate::sync::RequestOutcome;

/// JSON shape of a request outcome.
#[derive(Debug, Serialize, PartialEq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
enum OutcomeView<'a> {
    Response {
        status: u16,
        body: &'a str,
    },
    Deferred {
        id: String,
    },
    Cached {
        status: u16,
        body: &'a str,
        stored_at: u64,
    },
}

pub fn run(
    method: String,
    path: String,
    data: Option<String>,
    headers: Vec<String>,
    output: OutputFormat,
) -> Result<()> {
    let request = build_request(&method, path, data, &headers)?;
    let project = Project::find()?;

    let outcome = block_on(async {
        let service = project.open_service().await?;
        service.execute(request).await
    })?;

    print_outcome(&outcome, output)
}

/// Turn command-line arguments into a request.
pub(crate) fn build_request(
    method: &str,
    path: String,
    data: Option<String>,
    headers: &[String],
) -> Result<ActionRequest> {
    let method: Method = method.parse()?;
    let mut request = ActionRequest::new(method, path);
    for raw in headers {
        let (name, value) = parse_header(raw)?;
        request = request.with_header(name, value);
    }
    if let Some(body) = data {
        if header(&request.headers, "Content-Type").is_none() {
            request = request.with_header("Content-Type", "application/json");
        }
        request = request.with_body(body);
    }
    Ok(request)
}

/// Split `Name: value`.
pub(crate) fn parse_header(raw: &str) -> Result<(String, String)> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| Error::InvalidHeader(raw.to_string()))?;
    let name = name.trim();
    let valid_name = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "!#$%&'*+-.^_`|~".contains(c));
    if !valid_name {
        return Err(Error::InvalidHeader(raw.to_string()));
    }
    Ok((name.to_string(), value.trim().to_string()))
}

fn view(outcome: &RequestOutcome) -> Result<OutcomeView<'_>> {
    match outcome {
        RequestOutcome::Response(response) => Ok(OutcomeView::Response {
            status: response.status,
            body: &response.body,
        }),
        RequestOutcome::Deferred { id } => Ok(OutcomeView::Deferred { id: id.to_string() }),
        RequestOutcome::Cached(cached) => Ok(OutcomeView::Cached {
            status: cached.status,
            body: &cached.body,
            stored_at: cached.stored_at,
        }),
        RequestOutcome::Unavailable { url } => Err(Error::Unavailable(url.clone())),
    }
}

fn print_outcome(outcome: &RequestOutcome, output: OutputFormat) -> Result<()> {
    let view = view(outcome)?;

    if output == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    match view {
        OutcomeView::Response { body, .. } => println!("{}", body),
        OutcomeView::Deferred { id } => {
            println!("Offline: queued as {}", id);
            println!("It will be sent when the API is reachable. See 'tasksync pending'.");
        }
        OutcomeView::Cached {
            body, stored_at, ..
        } => {
            eprintln!(
                "warning: offline, showing cached response from {}",
                format_time(stored_at)
            );
            println!("{}", body);
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "request_tests.rs"]
mod tests;
