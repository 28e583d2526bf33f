// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Request/Response interceptor trait
//!
//! Middleware run around every asynchronous request a page issues.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::http::{Request, Response};

/// Request interceptor
///
/// Interceptors see the outgoing request before it is sent and may mutate
/// its headers, abort it, or answer it with a canned response.
///
/// # Example
///
/// ```rust,no_run
/// use bookmarks_widget::network::{RequestInterceptor, InterceptAction};
/// use bookmarks_widget::http::Request;
/// use async_trait::async_trait;
///
/// struct Tagger;
///
/// #[async_trait]
/// impl RequestInterceptor for Tagger {
///     async fn before_request(&self, req: &mut Request) -> InterceptAction {
///         req.headers.insert("x-requested-with", "XMLHttpRequest".parse().unwrap());
///         InterceptAction::Continue
///     }
/// }
/// ```
#[async_trait]
pub trait RequestInterceptor: Send + Sync {
    /// Called before a request is sent
    async fn before_request(&self, _request: &mut Request) -> InterceptAction {
        InterceptAction::Continue
    }

    /// Called after a response is received
    async fn after_response(&self, _request: &Request, _response: &mut Response) -> Result<()> {
        Ok(())
    }

    /// Called when the request fails
    async fn on_error(&self, _request: &Request, _error: &Error) {}

    /// Return true if this interceptor should handle the request
    fn should_intercept(&self, _request: &Request) -> bool {
        true
    }

    /// Higher priority interceptors run first
    fn priority(&self) -> i32 {
        0
    }

    /// Name used in logs
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Action to take after interception
#[derive(Debug, Clone)]
pub enum InterceptAction {
    /// Continue with the (possibly modified) request
    Continue,
    /// Abort the request with an error
    Abort(String),
    /// Return a mock response instead of making the actual request
    MockResponse(Response),
    /// Delay the request, then continue
    Delay(std::time::Duration),
}

/// Request logger interceptor
#[derive(Debug, Clone, Default)]
pub struct RequestLogger {
    /// Log request bodies
    pub log_bodies: bool,
    /// Log response bodies
    pub log_responses: bool,
    /// Only log URLs containing this string
    pub url_filter: Option<String>,
}

#[async_trait]
impl RequestInterceptor for RequestLogger {
    fn should_intercept(&self, request: &Request) -> bool {
        match self.url_filter {
            Some(ref filter) => request.url.as_str().contains(filter.as_str()),
            None => true,
        }
    }

    async fn before_request(&self, request: &mut Request) -> InterceptAction {
        tracing::info!(method = %request.method, url = %request.url, "Request");

        if self.log_bodies {
            if let Some(ref body) = request.body {
                tracing::debug!(body = %String::from_utf8_lossy(body), "Request body");
            }
        }

        InterceptAction::Continue
    }

    async fn after_response(&self, request: &Request, response: &mut Response) -> Result<()> {
        tracing::info!(
            url = %request.url,
            status = %response.status,
            time_ms = response.response_time_ms,
            "Response"
        );

        if self.log_responses {
            tracing::debug!(body = %response.text_lossy(), "Response body");
        }

        Ok(())
    }

    async fn on_error(&self, request: &Request, error: &Error) {
        tracing::warn!(url = %request.url, error = %error, "Request failed");
    }

    fn priority(&self) -> i32 {
        -100 // run last so it logs the final request
    }

    fn name(&self) -> &str {
        "request-logger"
    }
}

/// Ordered set of interceptors
///
/// Cloning shares the interceptors.
#[derive(Clone, Default)]
pub struct InterceptorChain {
    interceptors: Vec<Arc<dyn RequestInterceptor>>,
}

impl std::fmt::Debug for InterceptorChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.interceptors.iter().map(|i| i.name().to_string()))
            .finish()
    }
}

impl InterceptorChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an interceptor
    pub fn add<I: RequestInterceptor + 'static>(&mut self, interceptor: I) {
        self.add_shared(Arc::new(interceptor));
    }

    /// Add an interceptor that is also referenced elsewhere
    pub fn add_shared(&mut self, interceptor: Arc<dyn RequestInterceptor>) {
        self.interceptors.push(interceptor);
        // Stable sort keeps registration order among equal priorities
        self.interceptors
            .sort_by_key(|i| std::cmp::Reverse(i.priority()));
    }

    pub fn len(&self) -> usize {
        self.interceptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interceptors.is_empty()
    }

    /// Interceptor names in run order
    pub fn names(&self) -> Vec<String> {
        self.interceptors.iter().map(|i| i.name().to_string()).collect()
    }

    /// Run the request through every interceptor; the first action other
    /// than `Continue` short-circuits the rest
    pub async fn process_request(&self, request: &mut Request) -> InterceptAction {
        for interceptor in &self.interceptors {
            if !interceptor.should_intercept(request) {
                continue;
            }

            match interceptor.before_request(request).await {
                InterceptAction::Continue => continue,
                action => {
                    tracing::debug!(
                        interceptor = interceptor.name(),
                        url = %request.url,
                        "Interceptor short-circuited request"
                    );
                    return action;
                }
            }
        }
        InterceptAction::Continue
    }

    /// Process response through all interceptors
    pub async fn process_response(&self, request: &Request, response: &mut Response) -> Result<()> {
        for interceptor in &self.interceptors {
            if interceptor.should_intercept(request) {
                interceptor.after_response(request, response).await?;
            }
        }
        Ok(())
    }

    /// Notify interceptors of an error
    pub async fn notify_error(&self, request: &Request, error: &Error) {
        for interceptor in &self.interceptors {
            if interceptor.should_intercept(request) {
                interceptor.on_error(request, error).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Tag(&'static str, i32);

    #[async_trait]
    impl RequestInterceptor for Tag {
        async fn before_request(&self, request: &mut Request) -> InterceptAction {
            let seen = request.header_str("x-order").unwrap_or("").to_string();
            let order = format!("{}{}", seen, self.0);
            *request = request.clone().header("x-order", order);
            InterceptAction::Continue
        }

        fn priority(&self) -> i32 {
            self.1
        }

        fn name(&self) -> &str {
            self.0
        }
    }

    struct Blocker;

    #[async_trait]
    impl RequestInterceptor for Blocker {
        async fn before_request(&self, _request: &mut Request) -> InterceptAction {
            InterceptAction::Abort("blocked".to_string())
        }
    }

    #[tokio::test]
    async fn test_chain_runs_by_priority() {
        let mut chain = InterceptorChain::new();
        chain.add(Tag("b", 0));
        chain.add(Tag("a", 10));
        chain.add(Tag("c", 0));
        chain.add(RequestLogger::default());

        assert_eq!(chain.names()[..3], ["a", "b", "c"]);

        let mut request = Request::post("https://example.com/").unwrap();
        let action = chain.process_request(&mut request).await;
        assert!(matches!(action, InterceptAction::Continue));
        assert_eq!(request.header_str("x-order"), Some("abc"));
    }

    #[tokio::test]
    async fn test_abort_short_circuits() {
        let mut chain = InterceptorChain::new();
        chain.add(Blocker);
        chain.add(Tag("late", -1));

        let mut request = Request::post("https://example.com/").unwrap();
        let action = chain.process_request(&mut request).await;
        assert!(matches!(action, InterceptAction::Abort(ref r) if r == "blocked"));
        assert_eq!(request.header_str("x-order"), None);
    }
}
