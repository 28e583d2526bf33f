// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Error types for the bookmarks widget
//!
//! Library plumbing errors. The widget itself never surfaces these to the
//! page: a failed bookmark POST is reported by revealing the form's error
//! region, not by returning an `Err`.

use thiserror::Error;

/// Result type alias for widget operations
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// HTTP transport failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("HTML parsing error: {0}")]
    HtmlParse(String),

    /// No document loaded, or no element where one was expected
    #[error("DOM error: {0}")]
    Dom(String),

    /// Request aborted by an interceptor before it was sent
    #[error("Request to {url} aborted: {reason}")]
    Aborted { url: String, reason: String },

    #[error("Operation timed out after {duration_ms}ms: {operation}")]
    Timeout { operation: String, duration_ms: u64 },

    #[error("Invalid selector '{selector}': {reason}")]
    Selector { selector: String, reason: String },

    /// JSON payload could not be decoded or encoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    /// A form could not be turned into a request
    #[error("Form submission failed: {reason}")]
    FormSubmission {
        reason: String,
        form_action: Option<String>,
    },

    /// Background work requested outside a tokio runtime
    #[error("No async runtime: {0}")]
    Runtime(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    pub fn dom<S: Into<String>>(msg: S) -> Self {
        Error::Dom(msg.into())
    }

    pub fn aborted(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::Aborted {
            url: url.into(),
            reason: reason.into(),
        }
    }

    pub fn timeout(operation: impl Into<String>, duration_ms: u64) -> Self {
        Error::Timeout {
            operation: operation.into(),
            duration_ms,
        }
    }

    pub fn selector(selector: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::Selector {
            selector: selector.into(),
            reason: reason.into(),
        }
    }

    pub fn form_submission(reason: impl Into<String>) -> Self {
        Error::FormSubmission {
            reason: reason.into(),
            form_action: None,
        }
    }

    /// Transport failures, aborts and timeouts: the request never got an
    /// HTTP answer
    pub fn is_transport(&self) -> bool {
        match self {
            Error::Http(e) => e.status().is_none(),
            Error::Aborted { .. } | Error::Timeout { .. } => true,
            _ => false,
        }
    }

    /// HTTP status carried by the error, if any
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Attach context to errors from lower layers
pub trait ErrorContext<T> {
    /// Record the form action a failure belongs to
    fn for_action(self, action: &str) -> Result<T>;

    /// Prefix the error message with `msg`
    fn context(self, msg: &str) -> Result<T>;
}

impl<T, E: Into<Error>> ErrorContext<T> for std::result::Result<T, E> {
    fn for_action(self, action: &str) -> Result<T> {
        self.map_err(|e| match e.into() {
            Error::FormSubmission { reason, .. } => Error::FormSubmission {
                reason,
                form_action: Some(action.to_string()),
            },
            other => other,
        })
    }

    fn context(self, msg: &str) -> Result<T> {
        self.map_err(|e| Error::Other(format!("{}: {}", msg, e.into())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_classification() {
        assert!(Error::aborted("https://example.com/", "offline").is_transport());
        assert!(Error::timeout("wait_for_idle", 10).is_transport());
        assert!(!Error::form_submission("no action").is_transport());
        assert_eq!(Error::dom("missing").status_code(), None);
    }

    #[test]
    fn test_for_action() {
        let res: Result<()> = Err(Error::form_submission("no document URL"));
        let err = res.for_action("/bookmarks/add/").unwrap_err();

        assert!(matches!(
            err,
            Error::FormSubmission { form_action: Some(ref a), .. } if a == "/bookmarks/add/"
        ));

        let res: Result<()> = Err(Error::dom("gone"));
        assert!(matches!(res.for_action("/x/"), Err(Error::Dom(_))));
    }

    #[test]
    fn test_context_message() {
        let res: Result<()> = Err(Error::dom("no document loaded"));
        let err = res.context("submitting").unwrap_err();

        assert_eq!(err.to_string(), "submitting: DOM error: no document loaded");
    }
}
