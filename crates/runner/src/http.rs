// Copyright 2025 Portfolio E2E Contributors
// SPDX-License-Identifier: Apache-2.0

//! Declarative request helper shared by the probes.
//!
//! A probe describes its call with a [`ProbeRequest`] and what it considers a
//! pass with an [`Expectation`]. [`ProbeClient::check`] performs the call and
//! classifies the response into either the decoded body or a
//! [`ProbeFailure`]. Transport errors never escape as errors of the run;
//! they are just another failure reason.

use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode};
use serde_json::Value;
use std::fmt;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::debug;

/// Why a probe call did not meet its expectation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProbeFailure {
    /// Connection error, timeout, DNS failure
    #[error("Request failed: {0}")]
    Transport(String),

    /// Status code differs from the expected one
    #[error("Expected {}, got {}", .expected.as_u16(), .actual.as_u16())]
    UnexpectedStatus {
        /// Status the probe required.
        expected: StatusCode,
        /// Status the service answered with.
        actual: StatusCode,
        /// Raw body text.
        body: Value,
    },

    /// Body is not valid JSON
    #[error("Invalid JSON body: {error}")]
    InvalidJson {
        /// Parser error.
        error: String,
        /// Raw body text.
        body: Value,
    },

    /// JSON object lacks required fields
    #[error("Missing fields: {missing:?}")]
    MissingFields {
        /// Required keys absent from the body, in declaration order.
        missing: Vec<String>,
        /// Decoded body.
        body: Value,
    },

    /// JSON value has the wrong type
    #[error("Response is not {expected}")]
    WrongShape {
        /// Expected JSON type, e.g. "a list".
        expected: &'static str,
        /// Decoded body.
        body: Value,
    },

    /// JSON value has the right type but unexpected content
    #[error("{details}")]
    Mismatch {
        /// Explanation for the result log.
        details: String,
        /// Decoded body.
        body: Value,
    },
}

impl ProbeFailure {
    /// Human-readable explanation for the result log.
    pub fn details(&self) -> String {
        self.to_string()
    }

    /// Raw payload to attach to the failed result.
    pub fn response_data(&self) -> Option<Value> {
        match self {
            Self::Transport(_) => None,
            Self::UnexpectedStatus { body, .. }
            | Self::InvalidJson { body, .. }
            | Self::MissingFields { body, .. }
            | Self::WrongShape { body, .. }
            | Self::Mismatch { body, .. } => Some(body.clone()),
        }
    }
}

/// Required shape of a successful response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyShape {
    /// Anything, the body is not inspected.
    Any,
    /// A JSON object containing every listed key.
    Fields(&'static [&'static str]),
    /// A JSON array of any length.
    Array,
    /// A JSON object whose `message` string contains the given text.
    MessageContains(&'static str),
}

/// What a probe call must return to pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Expectation {
    /// Expected status code.
    pub status: StatusCode,
    /// Expected body shape.
    pub shape: BodyShape,
}

impl Expectation {
    /// Expect `status` with any body.
    pub const fn status(status: StatusCode) -> Self {
        Self {
            status,
            shape: BodyShape::Any,
        }
    }

    /// Expect `200 OK` with a body of `shape`.
    pub const fn ok(shape: BodyShape) -> Self {
        Self {
            status: StatusCode::OK,
            shape,
        }
    }
}

/// One HTTP call issued by a probe.
#[derive(Debug, Clone)]
pub struct ProbeRequest {
    /// HTTP method.
    pub method: Method,
    /// Path relative to the API root, e.g. `/contact`.
    pub path: &'static str,
    /// JSON body, if any.
    pub body: Option<Value>,
    /// Per-call timeout.
    pub timeout: Duration,
}

impl ProbeRequest {
    /// `GET path`.
    pub fn get(path: &'static str, timeout: Duration) -> Self {
        Self {
            method: Method::GET,
            path,
            body: None,
            timeout,
        }
    }

    /// `POST path` with a JSON body.
    pub fn post(path: &'static str, body: Value, timeout: Duration) -> Self {
        Self {
            method: Method::POST,
            path,
            body: Some(body),
            timeout,
        }
    }

    /// `OPTIONS path`.
    pub fn options(path: &'static str, timeout: Duration) -> Self {
        Self {
            method: Method::OPTIONS,
            path,
            body: None,
            timeout,
        }
    }
}

/// A received response, before classification.
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// Status code.
    pub status: StatusCode,
    /// Response headers.
    pub headers: HeaderMap,
    /// Body text.
    pub body: String,
}

impl RawResponse {
    /// The body as JSON, or as a JSON string when it does not parse.
    pub fn body_value(&self) -> Value {
        serde_json::from_str(&self.body).unwrap_or_else(|_| Value::String(self.body.clone()))
    }

    /// Whether `name` is present among the response headers.
    pub fn has_header(&self, name: &str) -> bool {
        self.headers.contains_key(name)
    }
}

/// HTTP client bound to one API root.
#[derive(Debug, Clone)]
pub struct ProbeClient {
    client: reqwest::Client,
    api_url: String,
}

impl ProbeClient {
    /// Create a client for `api_url` (e.g. `http://host/api`).
    pub fn new(api_url: impl Into<String>) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("portfolio-e2e/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// API root this client targets.
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Absolute URL of `path`.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    /// Perform the call and return the raw response.
    pub async fn send(&self, request: &ProbeRequest) -> Result<RawResponse, ProbeFailure> {
        let url = self.url(request.path);
        let started = Instant::now();

        let mut builder = self
            .client
            .request(request.method.clone(), &url)
            .timeout(request.timeout);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ProbeFailure::Transport(error_chain(&e)))?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .text()
            .await
            .map_err(|e| ProbeFailure::Transport(error_chain(&e)))?;

        debug!(
            call = %request,
            url = %url,
            status = status.as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Probe call completed"
        );

        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }

    /// Perform the call and classify it against `expectation`.
    ///
    /// Returns the decoded body on a pass.
    pub async fn check(
        &self,
        request: &ProbeRequest,
        expectation: &Expectation,
    ) -> Result<Value, ProbeFailure> {
        let response = self.send(request).await?;
        classify(&response, expectation)
    }
}

/// Classify a received response against an expectation.
pub fn classify(response: &RawResponse, expectation: &Expectation) -> Result<Value, ProbeFailure> {
    if response.status != expectation.status {
        return Err(ProbeFailure::UnexpectedStatus {
            expected: expectation.status,
            actual: response.status,
            body: Value::String(response.body.clone()),
        });
    }

    if expectation.shape == BodyShape::Any {
        return Ok(response.body_value());
    }

    let body: Value = serde_json::from_str(&response.body).map_err(|e| ProbeFailure::InvalidJson {
        error: e.to_string(),
        body: Value::String(response.body.clone()),
    })?;

    match expectation.shape {
        BodyShape::Any => Ok(body),
        BodyShape::Fields(required) => {
            let missing: Vec<String> = required
                .iter()
                .filter(|field| body.get(**field).is_none())
                .map(|field| field.to_string())
                .collect();
            if missing.is_empty() {
                Ok(body)
            } else {
                Err(ProbeFailure::MissingFields { missing, body })
            }
        }
        BodyShape::Array => {
            if body.is_array() {
                Ok(body)
            } else {
                Err(ProbeFailure::WrongShape {
                    expected: "a list",
                    body,
                })
            }
        }
        BodyShape::MessageContains(needle) => {
            let matches = body
                .get("message")
                .and_then(Value::as_str)
                .is_some_and(|message| message.contains(needle));
            if matches {
                Ok(body)
            } else {
                Err(ProbeFailure::Mismatch {
                    details: "Unexpected response format".to_string(),
                    body,
                })
            }
        }
    }
}

/// Render an error with its source chain, e.g. `error sending request: connection refused`.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        if !text.contains(&cause_text) {
            text.push_str(": ");
            text.push_str(&cause_text);
        }
        source = cause.source();
    }
    text
}

impl fmt::Display for ProbeRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}
