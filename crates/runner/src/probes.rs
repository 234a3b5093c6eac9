// Copyright 2025 Portfolio E2E Contributors
// SPDX-License-Identifier: Apache-2.0

//! The probe battery.
//!
//! Each probe performs its HTTP call(s), logs exactly one result per logical
//! assertion into the [`RunContext`], and returns a value the orchestrator can
//! use. Failure is signalled by `false` / `None`, never by an error.

use crate::config::{RunnerConfig, EMAIL_DISPATCH_PAUSE};
use crate::context::RunContext;
use crate::http::{BodyShape, Expectation, ProbeClient, ProbeFailure, ProbeRequest};
use reqwest::StatusCode;
use serde_json::{json, Value};
use tracing::debug;

/// Result names.
pub mod names {
    /// Health check probe.
    pub const HEALTH_CHECK: &str = "Health Check Endpoint";
    /// Contact submission probe.
    pub const CONTACT_SUBMISSION: &str = "Contact Form Submission";
    /// Prefix shared by every validation sub-case.
    pub const VALIDATION_PREFIX: &str = "Validation - ";
    /// List probe.
    pub const LIST_MESSAGES: &str = "Get Contact Messages";
    /// CORS probe.
    pub const CORS_HEADERS: &str = "CORS Headers";
    /// Email-triggering submission probe.
    pub const EMAIL_FUNCTIONALITY: &str = "Email Functionality";
}

/// Fields a created contact message must echo back.
pub const CONTACT_FIELDS: &[&str] = &["id", "name", "email", "subject", "message", "timestamp"];

/// CORS response headers inspected by [`cors_headers`].
pub const CORS_HEADER_NAMES: [&str; 3] = [
    "Access-Control-Allow-Origin",
    "Access-Control-Allow-Methods",
    "Access-Control-Allow-Headers",
];

/// Minimum number of [`CORS_HEADER_NAMES`] that must be present.
pub const CORS_MIN_PRESENT: usize = 2;

/// Catalogue entry describing one probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeInfo {
    /// Logged name (prefix for validation sub-cases).
    pub name: &'static str,
    /// HTTP call, relative to the API root.
    pub call: &'static str,
    /// Pass condition.
    pub passes_when: &'static str,
}

/// Every probe, in execution order.
pub const PROBES: [ProbeInfo; 6] = [
    ProbeInfo {
        name: names::HEALTH_CHECK,
        call: "GET /",
        passes_when: "200 and message contains 'running' (aborts the run on failure)",
    },
    ProbeInfo {
        name: names::CONTACT_SUBMISSION,
        call: "POST /contact",
        passes_when: "200 and id, name, email, subject, message, timestamp echoed",
    },
    ProbeInfo {
        name: "Validation - <case>",
        call: "POST /contact (x4)",
        passes_when: "422 for each invalid payload",
    },
    ProbeInfo {
        name: names::LIST_MESSAGES,
        call: "GET /contact",
        passes_when: "200 and a JSON array",
    },
    ProbeInfo {
        name: names::CORS_HEADERS,
        call: "OPTIONS /contact",
        passes_when: "at least 2 of 3 Access-Control-Allow-* headers",
    },
    ProbeInfo {
        name: names::EMAIL_FUNCTIONALITY,
        call: "POST /contact",
        passes_when: "200 (email dispatch itself is not verified)",
    },
];

/// Payload submitted by [`contact_submission`].
pub fn contact_payload() -> Value {
    json!({
        "name": "Test User",
        "email": "test@example.com",
        "subject": "Test Subject",
        "message": "This is a test message for the portfolio contact form."
    })
}

/// Payload submitted by [`email_submission`].
pub fn email_payload() -> Value {
    json!({
        "name": "Email Test User",
        "email": "emailtest@example.com",
        "subject": "Email Functionality Test",
        "message": "This is a test to verify that emails are being sent via Mailgun integration."
    })
}

/// One invalid payload the service must reject.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationCase {
    /// Sub-case label, appended to [`names::VALIDATION_PREFIX`].
    pub name: &'static str,
    /// Offending payload.
    pub payload: Value,
    /// Field that makes the payload invalid.
    pub invalid_field: &'static str,
}

impl ValidationCase {
    /// Logged result name.
    pub fn test_name(&self) -> String {
        format!("{}{}", names::VALIDATION_PREFIX, self.name)
    }
}

/// The four validation sub-cases, one per required field.
pub fn validation_cases() -> Vec<ValidationCase> {
    vec![
        ValidationCase {
            name: "Missing Name",
            payload: json!({"email": "test@example.com", "subject": "Test", "message": "Test message"}),
            invalid_field: "name",
        },
        ValidationCase {
            name: "Invalid Email",
            payload: json!({"name": "Test", "email": "invalid-email", "subject": "Test", "message": "Test message"}),
            invalid_field: "email",
        },
        ValidationCase {
            name: "Missing Subject",
            payload: json!({"name": "Test", "email": "test@example.com", "message": "Test message"}),
            invalid_field: "subject",
        },
        ValidationCase {
            name: "Missing Message",
            payload: json!({"name": "Test", "email": "test@example.com", "subject": "Test"}),
            invalid_field: "message",
        },
    ]
}

/// Non-empty id of a created message; strings and numbers are accepted.
pub fn created_id(body: &Value) -> Option<String> {
    match body.get("id")? {
        Value::String(id) if !id.trim().is_empty() => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

fn log_failure(ctx: &mut RunContext, name: impl Into<String>, failure: &ProbeFailure) {
    ctx.log_test(name, false, failure.details(), failure.response_data());
}

/// `GET /` must answer 200 with a `message` containing "running".
pub async fn health_check(ctx: &mut RunContext, client: &ProbeClient, config: &RunnerConfig) -> bool {
    let request = ProbeRequest::get("/", config.read_timeout());
    let expectation = Expectation::ok(BodyShape::MessageContains("running"));

    match client.check(&request, &expectation).await {
        Ok(body) => {
            let message = body.get("message").and_then(Value::as_str).unwrap_or_default();
            ctx.log_test(
                names::HEALTH_CHECK,
                true,
                format!("Status: {}, Message: {}", StatusCode::OK.as_u16(), message),
                None,
            );
            true
        }
        Err(failure) => {
            log_failure(ctx, names::HEALTH_CHECK, &failure);
            false
        }
    }
}

/// `POST /contact` with [`contact_payload`] must echo the created message.
///
/// Returns the created id.
pub async fn contact_submission(
    ctx: &mut RunContext,
    client: &ProbeClient,
    config: &RunnerConfig,
) -> Option<String> {
    let request = ProbeRequest::post("/contact", contact_payload(), config.submit_timeout());
    let expectation = Expectation::ok(BodyShape::Fields(CONTACT_FIELDS));

    let created = client
        .check(&request, &expectation)
        .await
        .and_then(|body| match created_id(&body) {
            Some(id) => Ok(id),
            None => Err(ProbeFailure::Mismatch {
                details: format!("Invalid message id: {}", body["id"]),
                body,
            }),
        });

    match created {
        Ok(id) => {
            ctx.log_test(
                names::CONTACT_SUBMISSION,
                true,
                format!("Message created with ID: {id}"),
                None,
            );
            Some(id)
        }
        Err(failure) => {
            log_failure(ctx, names::CONTACT_SUBMISSION, &failure);
            None
        }
    }
}

/// Each [`validation_cases`] payload must be rejected with 422.
///
/// Returns true iff every sub-case passed. The aggregate is not logged.
pub async fn contact_validation(
    ctx: &mut RunContext,
    client: &ProbeClient,
    config: &RunnerConfig,
) -> bool {
    let cases = validation_cases();
    let expectation = Expectation::status(StatusCode::UNPROCESSABLE_ENTITY);
    let mut passed = 0;

    for case in &cases {
        let request = ProbeRequest::post("/contact", case.payload.clone(), config.read_timeout());
        match client.check(&request, &expectation).await {
            Ok(_) => {
                passed += 1;
                ctx.log_test(
                    case.test_name(),
                    true,
                    format!(
                        "Correctly rejected with status {}",
                        StatusCode::UNPROCESSABLE_ENTITY.as_u16()
                    ),
                    None,
                );
            }
            Err(failure) => log_failure(ctx, case.test_name(), &failure),
        }
    }

    debug!(passed, total = cases.len(), "Validation sub-cases evaluated");
    passed == cases.len()
}

/// `GET /contact` must answer 200 with an array of any length.
pub async fn list_messages(ctx: &mut RunContext, client: &ProbeClient, config: &RunnerConfig) -> bool {
    let request = ProbeRequest::get("/contact", config.read_timeout());

    match client.check(&request, &Expectation::ok(BodyShape::Array)).await {
        Ok(body) => {
            let count = body.as_array().map_or(0, Vec::len);
            ctx.log_test(
                names::LIST_MESSAGES,
                true,
                format!("Retrieved {count} messages"),
                None,
            );
            true
        }
        Err(failure) => {
            log_failure(ctx, names::LIST_MESSAGES, &failure);
            false
        }
    }
}

/// `OPTIONS /contact` must carry at least two of [`CORS_HEADER_NAMES`].
///
/// The status code is not inspected.
pub async fn cors_headers(ctx: &mut RunContext, client: &ProbeClient, config: &RunnerConfig) -> bool {
    let request = ProbeRequest::options("/contact", config.read_timeout());

    let response = match client.send(&request).await {
        Ok(response) => response,
        Err(failure) => {
            log_failure(ctx, names::CORS_HEADERS, &failure);
            return false;
        }
    };

    let present: Vec<&str> = CORS_HEADER_NAMES
        .iter()
        .copied()
        .filter(|name| response.has_header(name))
        .collect();

    if present.len() >= CORS_MIN_PRESENT {
        ctx.log_test(
            names::CORS_HEADERS,
            true,
            format!("Found headers: {present:?}"),
            None,
        );
        true
    } else {
        ctx.log_test(
            names::CORS_HEADERS,
            false,
            format!("Missing CORS headers. Found: {present:?}"),
            None,
        );
        false
    }
}

/// `POST /contact` with [`email_payload`] under the longer timeout.
///
/// Only the submission is verified. On success the probe pauses for
/// [`EMAIL_DISPATCH_PAUSE`] so server-side dispatch can be scheduled.
pub async fn email_submission(
    ctx: &mut RunContext,
    client: &ProbeClient,
    config: &RunnerConfig,
) -> bool {
    let request = ProbeRequest::post("/contact", email_payload(), config.email_timeout());

    match client.check(&request, &Expectation::status(StatusCode::OK)).await {
        Ok(_) => {
            tokio::time::sleep(EMAIL_DISPATCH_PAUSE).await;
            ctx.log_test(
                names::EMAIL_FUNCTIONALITY,
                true,
                "Contact form submitted successfully (email should be sent)",
                None,
            );
            true
        }
        Err(ProbeFailure::UnexpectedStatus { actual, body, .. }) => {
            ctx.log_test(
                names::EMAIL_FUNCTIONALITY,
                false,
                format!(
                    "Contact form submission failed with status {}",
                    actual.as_u16()
                ),
                Some(body),
            );
            false
        }
        Err(failure) => {
            log_failure(ctx, names::EMAIL_FUNCTIONALITY, &failure);
            false
        }
    }
}
