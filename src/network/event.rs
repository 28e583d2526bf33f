// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Network event types

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::http::{Request, Response};

/// One request issued by a page, with its outcome
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkEvent {
    /// Event ID
    pub id: String,
    /// What issued the request
    pub event_type: EventType,
    /// When the request was issued
    pub timestamp: DateTime<Utc>,
    /// Request as sent (after interceptors ran)
    pub request: RequestInfo,
    /// Response, if one was received or mocked
    pub response: Option<ResponseInfo>,
    /// Wall time in milliseconds
    pub duration_ms: Option<u64>,
    /// Error message if failed
    pub error: Option<String>,
    /// Set when an interceptor answered or aborted the request
    pub intercepted: Option<String>,
}

/// What issued a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventType {
    /// Document navigation
    Navigation,
    /// Asynchronous request from page code
    Xhr,
    /// Native form submission
    FormSubmission,
    /// Anything else
    Other,
}

/// Request information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestInfo {
    /// Request URL
    pub url: String,
    /// HTTP method
    pub method: String,
    /// Request headers
    pub headers: HashMap<String, String>,
    /// Request body
    pub body: Option<String>,
    /// Content type
    pub content_type: Option<String>,
}

/// Response information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseInfo {
    /// Status code
    pub status: u16,
    /// Response headers
    pub headers: HashMap<String, String>,
    /// Response body (may be truncated)
    pub body: Option<String>,
    /// Content type
    pub content_type: Option<String>,
}

impl EventType {
    /// Issued by page code rather than by the browser itself
    pub fn is_scripted(&self) -> bool {
        matches!(self, EventType::Xhr)
    }
}

impl NetworkEvent {
    pub fn new(id: impl Into<String>, event_type: EventType, request: RequestInfo) -> Self {
        Self {
            id: id.into(),
            event_type,
            timestamp: Utc::now(),
            request,
            response: None,
            duration_ms: None,
            error: None,
            intercepted: None,
        }
    }

    pub fn with_response(mut self, response: ResponseInfo) -> Self {
        self.response = Some(response);
        self
    }

    pub fn with_duration_ms(mut self, ms: u64) -> Self {
        self.duration_ms = Some(ms);
        self
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    pub fn intercepted_by(mut self, what: impl Into<String>) -> Self {
        self.intercepted = Some(what.into());
        self
    }

    /// Check if response was successful
    pub fn is_success(&self) -> bool {
        self.response
            .as_ref()
            .map(|r| (200..300).contains(&r.status))
            .unwrap_or(false)
    }

    /// Header value sent with the request, by lowercase name
    pub fn request_header(&self, name: &str) -> Option<&str> {
        self.request
            .headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}

impl RequestInfo {
    /// Capture a request, truncating the body to `max_body` bytes
    pub fn from_request(request: &Request, max_body: usize) -> Self {
        Self {
            url: request.url.to_string(),
            method: request.method.to_string(),
            headers: header_map(&request.headers),
            body: request
                .body
                .as_ref()
                .map(|b| String::from_utf8_lossy(&b[..b.len().min(max_body)]).into_owned()),
            content_type: request.header_str("content-type").map(String::from),
        }
    }

    /// Decoded urlencoded body pairs, in order
    pub fn body_params(&self) -> Vec<(String, String)> {
        self.body
            .as_deref()
            .map(|body| {
                url::form_urlencoded::parse(body.as_bytes())
                    .into_owned()
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl ResponseInfo {
    /// Capture a response, truncating the body to `max_body` bytes
    pub fn from_response(response: &Response, max_body: Option<usize>) -> Self {
        Self {
            status: response.status.as_u16(),
            headers: header_map(&response.headers),
            body: max_body.map(|max| {
                let body = &response.body;
                String::from_utf8_lossy(&body[..body.len().min(max)]).into_owned()
            }),
            content_type: response.content_type().map(String::from),
        }
    }
}

fn header_map(headers: &reqwest::header::HeaderMap) -> HashMap<String, String> {
    headers
        .iter()
        .map(|(k, v)| (k.to_string(), String::from_utf8_lossy(v.as_bytes()).into_owned()))
        .collect()
}
