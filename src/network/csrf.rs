// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! CSRF token header injection for same-origin unsafe requests
//!
//! Mirrors what a Django page does in its AJAX setup: every request whose
//! method can change server state and whose target stays on the page's
//! origin carries the `csrftoken` cookie back in `X-CSRFToken`.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{HeaderName, HeaderValue};
use reqwest::Method;
use url::Url;

use super::interceptor_trait::{InterceptAction, RequestInterceptor};
use crate::http::{CookieSource, Request};

/// Header value sent when the token cookie is absent
pub const MISSING_TOKEN: &str = "null";

/// Location of the document issuing requests
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentOrigin {
    /// Scheme with trailing colon, e.g. `https:`
    pub protocol: String,
    /// Host, with `:port` when the port is not the scheme default
    pub host: String,
}

impl DocumentOrigin {
    pub fn new(protocol: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            protocol: protocol.into(),
            host: host.into(),
        }
    }

    /// Origin of a document URL
    pub fn from_url(url: &Url) -> Self {
        let host = match (url.host_str(), url.port()) {
            (Some(host), Some(port)) => format!("{}:{}", host, port),
            (Some(host), None) => host.to_string(),
            (None, _) => String::new(),
        };
        Self::new(format!("{}:", url.scheme()), host)
    }

    /// `protocol//host`
    pub fn origin(&self) -> String {
        format!("{}//{}", self.protocol, self.host)
    }

    /// `//host`, the scheme-relative form
    pub fn scheme_relative(&self) -> String {
        format!("//{}", self.host)
    }
}

impl std::fmt::Display for DocumentOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.origin())
    }
}

/// Whether `method` is one that must not change server state
pub fn is_safe_method(method: &Method) -> bool {
    matches!(method.as_str(), "GET" | "HEAD" | "OPTIONS" | "TRACE")
}

/// Whether a request target, as written, stays on the document's origin.
///
/// Targets that are not absolute and not scheme-relative are resolved
/// against the page, so they count as same-origin.
pub fn is_same_origin(target: &str, origin: &DocumentOrigin) -> bool {
    let within = |base: &str| {
        target
            .strip_prefix(base)
            .map(|rest| rest.is_empty() || rest.starts_with('/'))
            .unwrap_or(false)
    };

    within(&origin.origin()) || within(&origin.scheme_relative()) || !is_absolute_target(target)
}

fn is_absolute_target(target: &str) -> bool {
    let has_scheme = |scheme: &str| {
        target
            .get(..scheme.len())
            .map(|prefix| prefix.eq_ignore_ascii_case(scheme))
            .unwrap_or(false)
    };
    target.starts_with("//") || has_scheme("http:") || has_scheme("https:")
}

/// CSRF injection settings
#[derive(Debug, Clone)]
pub struct CsrfConfig {
    /// Cookie holding the token
    pub cookie_name: String,
    /// Header carrying the token
    pub header_name: String,
    /// Methods that never receive the header
    pub safe_methods: Vec<Method>,
}

impl Default for CsrfConfig {
    fn default() -> Self {
        Self {
            cookie_name: "csrftoken".to_string(),
            header_name: "X-CSRFToken".to_string(),
            safe_methods: vec![Method::GET, Method::HEAD, Method::OPTIONS, Method::TRACE],
        }
    }
}

impl CsrfConfig {
    pub fn cookie_name(mut self, name: impl Into<String>) -> Self {
        self.cookie_name = name.into();
        self
    }

    pub fn header_name(mut self, name: impl Into<String>) -> Self {
        self.header_name = name.into();
        self
    }

    pub fn safe_methods(mut self, methods: Vec<Method>) -> Self {
        self.safe_methods = methods;
        self
    }

    fn is_safe(&self, method: &Method) -> bool {
        self.safe_methods.iter().any(|m| m == method)
    }
}

/// Interceptor attaching the CSRF token to same-origin unsafe requests
pub struct CsrfHeaderInjector {
    config: CsrfConfig,
    cookies: Arc<dyn CookieSource>,
    origin: DocumentOrigin,
}

impl CsrfHeaderInjector {
    pub fn new(cookies: Arc<dyn CookieSource>, origin: DocumentOrigin) -> Self {
        Self {
            config: CsrfConfig::default(),
            cookies,
            origin,
        }
    }

    pub fn with_config(mut self, config: CsrfConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &CsrfConfig {
        &self.config
    }

    pub fn origin(&self) -> &DocumentOrigin {
        &self.origin
    }

    /// Header value that a request with this method and target would get,
    /// or `None` if it gets no header. The cookie is read on every call.
    pub fn token_for(&self, method: &Method, target: &str) -> Option<String> {
        if self.config.is_safe(method) {
            tracing::trace!(%method, target, "Safe method, no CSRF header");
            return None;
        }
        if !is_same_origin(target, &self.origin) {
            tracing::debug!(%method, target, origin = %self.origin, "Cross-origin target, no CSRF header");
            return None;
        }

        match self.cookies.get(&self.config.cookie_name) {
            Some(token) => Some(token),
            None => {
                tracing::debug!(cookie = %self.config.cookie_name, "CSRF cookie missing");
                Some(MISSING_TOKEN.to_string())
            }
        }
    }
}

impl std::fmt::Debug for CsrfHeaderInjector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CsrfHeaderInjector")
            .field("config", &self.config)
            .field("origin", &self.origin)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl RequestInterceptor for CsrfHeaderInjector {
    async fn before_request(&self, request: &mut Request) -> InterceptAction {
        let Some(token) = self.token_for(&request.method, &request.target) else {
            return InterceptAction::Continue;
        };

        let name = match HeaderName::from_bytes(self.config.header_name.as_bytes()) {
            Ok(name) => name,
            Err(e) => {
                tracing::warn!(header = %self.config.header_name, error = %e, "Invalid CSRF header name");
                return InterceptAction::Continue;
            }
        };

        let value = HeaderValue::from_str(&token).unwrap_or_else(|_| {
            tracing::warn!("CSRF token is not a valid header value");
            HeaderValue::from_static(MISSING_TOKEN)
        });

        tracing::debug!(method = %request.method, target = %request.target, "Attached CSRF header");
        request.headers.insert(name, value);
        InterceptAction::Continue
    }

    fn priority(&self) -> i32 {
        50
    }

    fn name(&self) -> &str {
        "csrf"
    }
}
