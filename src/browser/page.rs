// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Page implementation

use std::sync::Arc;

use parking_lot::RwLock;
use reqwest::Method;
use url::Url;

use super::ajax::Ajax;
use super::bookmarks::{BookmarksWidget, SubmissionOutcome};
use super::config::PageConfig;
use super::form::Form;
use crate::dom::{parse_html_with_url, Document, Element, Event, SUBMIT};
use crate::error::{Error, Result};
use crate::http::{CookieJar, DocumentCookies, HttpClient, Request, Response};
use crate::network::{
    CsrfHeaderInjector, DocumentOrigin, EventType, InterceptorChain, NetworkInterceptor, RequestLogger,
};

/// What happened when a form was submitted
#[derive(Debug)]
pub enum SubmitResult {
    /// A handler prevented native submission
    Intercepted,
    /// The form was submitted natively
    Submitted(Response),
}

impl SubmitResult {
    pub fn is_intercepted(&self) -> bool {
        matches!(self, SubmitResult::Intercepted)
    }
}

/// A page: one document at a time, its cookies, and the requests it makes.
///
/// Every loaded document gets a fresh interceptor chain bound to its
/// origin, and the bookmark form handler when enabled.
pub struct Page {
    /// Page configuration
    config: PageConfig,
    /// Network interceptor
    network: NetworkInterceptor,
    /// Scripted requests and background submissions
    ajax: Ajax,
    /// Current document
    document: Arc<RwLock<Option<Document>>>,
    /// Last navigation response
    last_response: Arc<RwLock<Option<Response>>>,
}

impl Page {
    /// Create a page with no document loaded
    pub fn new(config: PageConfig) -> Result<Self> {
        let client = HttpClient::with_config(config.http_config()?)?;
        let network = NetworkInterceptor::new(client)
            .max_events(config.max_network_events)
            .capture_bodies(config.capture_bodies, 64 * 1024);
        let ajax = Ajax::new(network.clone());

        Ok(Self {
            config,
            network,
            ajax,
            document: Arc::new(RwLock::new(None)),
            last_response: Arc::new(RwLock::new(None)),
        })
    }

    /// Navigate to a URL and load the returned HTML
    pub async fn navigate(&self, url: &str) -> Result<Response> {
        let request = Request::get(url)?.timeout(self.config.timeout);
        let response = self.network.execute(request, EventType::Navigation).await?;

        tracing::info!(url = %response.url, status = response.status_code(), "Navigated");

        if response.is_html() {
            self.load_response(&response)?;
        } else {
            tracing::debug!(content_type = ?response.content_type(), "Response is not HTML, document unchanged");
        }

        *self.last_response.write() = Some(response.clone());
        Ok(response)
    }

    /// Load HTML as if it had been served from `url`
    pub fn load_html(&self, html: &str, url: &str) -> Result<Document> {
        let doc = parse_html_with_url(html, Some(Url::parse(url)?))?;
        self.load_document(doc.clone())?;
        Ok(doc)
    }

    fn load_response(&self, response: &Response) -> Result<()> {
        let doc = parse_html_with_url(&response.text_lossy(), Some(response.url.clone()))?;
        self.load_document(doc)
    }

    fn load_document(&self, doc: Document) -> Result<()> {
        let mut chain = InterceptorChain::new();
        if self.config.log_requests {
            chain.add(RequestLogger::default());
        }
        if let (Some(csrf), Some(url)) = (&self.config.csrf, doc.url()) {
            let cookies = DocumentCookies::new(self.cookies(), url.clone());
            chain.add(
                CsrfHeaderInjector::new(Arc::new(cookies), DocumentOrigin::from_url(url))
                    .with_config(csrf.clone()),
            );
        }
        self.network.replace_interceptors(chain);

        if let Some(ref widget) = self.config.widget {
            BookmarksWidget::new(widget.clone()).install(&doc, self.ajax.clone())?;
        }

        tracing::debug!(url = ?doc.url().map(Url::as_str), title = %doc.title(), "Document loaded");
        *self.document.write() = Some(doc);
        Ok(())
    }

    /// Get current document
    pub fn document(&self) -> Option<Document> {
        self.document.read().clone()
    }

    /// Get current URL
    pub fn url(&self) -> Option<Url> {
        self.document.read().as_ref().and_then(|d| d.url().cloned())
    }

    /// Origin of the current document
    pub fn origin(&self) -> Option<DocumentOrigin> {
        self.url().map(|u| DocumentOrigin::from_url(&u))
    }

    /// Get last navigation response
    pub fn response(&self) -> Option<Response> {
        self.last_response.read().clone()
    }

    /// The page's cookie jar
    pub fn cookies(&self) -> CookieJar {
        self.network.client().cookie_jar().clone()
    }

    /// Cookie string page code can read (no HttpOnly cookies)
    pub fn document_cookie(&self) -> String {
        self.url()
            .map(|u| self.cookies().document_cookie(&u))
            .unwrap_or_default()
    }

    /// Network log and interceptors
    pub fn network(&self) -> &NetworkInterceptor {
        &self.network
    }

    /// Find element by selector
    pub fn query_selector(&self, selector: &str) -> Option<Element> {
        self.document().and_then(|d| d.query_selector(selector))
    }

    /// Find all elements by selector
    pub fn query_selector_all(&self, selector: &str) -> Vec<Element> {
        self.document()
            .map(|d| d.query_selector_all(selector))
            .unwrap_or_default()
    }

    /// Build a request to `target` as page code would write it
    pub fn request(&self, method: Method, target: &str) -> Result<Request> {
        let base = self
            .url()
            .ok_or_else(|| Error::dom("no document loaded"))?;
        Ok(Request::resolve(method, target, &base)?.timeout(self.config.timeout))
    }

    /// Send a scripted request through the interceptor chain
    pub async fn ajax(&self, request: Request) -> Result<Response> {
        self.ajax.send(request).await
    }

    /// Submit the form matched by (or enclosing) `selector`.
    ///
    /// The submit event is dispatched first; if no handler prevents it the
    /// form is submitted natively and an HTML response replaces the document.
    pub async fn submit(&self, selector: &str) -> Result<SubmitResult> {
        let doc = self
            .document()
            .ok_or_else(|| Error::dom("no document loaded"))?;
        let element = doc
            .query_selector(selector)
            .ok_or_else(|| Error::dom(format!("no element matches '{}'", selector)))?;
        let form = element
            .form()
            .ok_or_else(|| Error::form_submission(format!("'{}' is not inside a form", selector)))?;

        let event = doc.dispatch(Event::new(SUBMIT, form.clone()));
        if event.default_prevented() {
            tracing::debug!(selector, "Native submission prevented");
            return Ok(SubmitResult::Intercepted);
        }

        let request = Form::from_element(&form)
            .native_request(&form, doc.url())?
            .timeout(self.config.timeout);
        let response = self.network.execute(request, EventType::FormSubmission).await?;

        if response.is_html() {
            self.load_response(&response)?;
        }
        *self.last_response.write() = Some(response.clone());
        Ok(SubmitResult::Submitted(response))
    }

    /// Background submissions still running
    pub fn in_flight(&self) -> usize {
        self.ajax.in_flight()
    }

    /// Wait for all background submissions, bounded by the configured
    /// idle timeout
    pub async fn wait_for_idle(&self) -> Result<Vec<SubmissionOutcome>> {
        let limit = self.config.idle_timeout;
        tokio::time::timeout(limit, self.ajax.wait_for_idle())
            .await
            .map_err(|_| Error::timeout("wait_for_idle", limit.as_millis() as u64))
    }

    pub fn config(&self) -> &PageConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{headers, Cookie};

    const PAGE: &str = r#"<html><head><title>Article</title></head><body>
        <form class="bookmarks_form" action="/bookmarks/add/" method="post">
            <input type="hidden" name="id" value="7">
        </form>
        <form id="search" action="/search"><input name="q" value="x"></form>
    </body></html>"#;

    #[tokio::test]
    async fn test_load_html_installs_interceptors() {
        let page = Page::new(PageConfig::default().log_requests(true)).unwrap();
        let doc = page.load_html(PAGE, "https://example.com/article/7/").unwrap();

        assert_eq!(doc.title(), "Article");
        assert_eq!(page.origin(), Some(DocumentOrigin::new("https:", "example.com")));
        assert_eq!(page.network().interceptors().names(), vec!["csrf", "request-logger"]);
        assert_eq!(doc.listener_count(), 1);
    }

    #[tokio::test]
    async fn test_reload_replaces_chain() {
        let page = Page::new(PageConfig::default()).unwrap();
        page.load_html(PAGE, "https://example.com/a/").unwrap();
        page.load_html(PAGE, "https://example.com/b/").unwrap();
        assert_eq!(page.network().interceptors().len(), 1);

        let bare = Page::new(PageConfig::default().without_csrf().without_widget()).unwrap();
        let doc = bare.load_html(PAGE, "https://example.com/a/").unwrap();
        assert!(bare.network().interceptors().is_empty());
        assert_eq!(doc.listener_count(), 0);
    }

    struct Offline;

    #[async_trait::async_trait]
    impl crate::network::RequestInterceptor for Offline {
        async fn before_request(&self, _request: &mut Request) -> crate::network::InterceptAction {
            crate::network::InterceptAction::Abort("offline".to_string())
        }
    }

    #[tokio::test]
    async fn test_submit_marked_form_is_intercepted() {
        let page = Page::new(PageConfig::default()).unwrap();
        page.load_html(PAGE, "https://example.com/article/").unwrap();
        page.network().add_interceptor(Offline);

        let result = page.submit(".bookmarks_form").await.unwrap();
        assert!(result.is_intercepted());

        let outcomes = page.wait_for_idle().await.unwrap();
        assert_eq!(outcomes.len(), 1);
        assert!(!outcomes[0].is_success());
        assert_eq!(page.network().events_by_type(EventType::FormSubmission).len(), 0);
    }

    /// Answers after a pause
    struct SlowServer(std::time::Duration);

    #[async_trait::async_trait]
    impl crate::network::RequestInterceptor for SlowServer {
        async fn before_request(&self, request: &mut Request) -> crate::network::InterceptAction {
            tokio::time::sleep(self.0).await;
            crate::network::InterceptAction::MockResponse(Response::new(
                reqwest::StatusCode::OK,
                reqwest::header::HeaderMap::new(),
                bytes::Bytes::from_static(b"saved"),
                request.url.clone(),
                0,
            ))
        }
    }

    #[tokio::test]
    async fn test_idle_timeout_keeps_running_submission() {
        use std::time::Duration;

        let page = Page::new(PageConfig::default().idle_timeout(Duration::from_millis(50))).unwrap();
        page.load_html(PAGE, "https://example.com/article/").unwrap();
        page.network().add_interceptor(SlowServer(Duration::from_millis(300)));

        page.submit(".bookmarks_form").await.unwrap();
        let waited = page.wait_for_idle().await;
        assert!(matches!(waited, Err(Error::Timeout { .. })));
        assert_eq!(page.in_flight(), 1);

        tokio::time::sleep(Duration::from_millis(400)).await;
        let outcomes = page.wait_for_idle().await.unwrap();
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].payload(), Some(&serde_json::Value::String("saved".into())));
        assert_eq!(page.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_submit_errors() {
        let page = Page::new(PageConfig::default()).unwrap();
        assert!(page.submit("form").await.is_err());

        page.load_html(PAGE, "https://example.com/").unwrap();
        assert!(matches!(page.submit("#missing").await, Err(Error::Dom(_))));
        assert!(matches!(page.submit("title").await, Err(Error::FormSubmission { .. })));
    }

    #[tokio::test]
    async fn test_request_and_document_cookie() {
        let page = Page::new(PageConfig::default()).unwrap();
        page.load_html(PAGE, "https://example.com/article/").unwrap();
        page.cookies().add(Cookie::new("csrftoken", "t").domain("example.com"));
        page.cookies()
            .add(Cookie::new("sessionid", "s").domain("example.com").http_only(true));

        assert_eq!(page.document_cookie(), "csrftoken=t");

        let request = page.request(Method::POST, "../bookmarks/").unwrap();
        assert_eq!(request.target, "../bookmarks/");
        assert_eq!(request.url.as_str(), "https://example.com/bookmarks/");
        assert_eq!(request.header_str(headers::X_CSRFTOKEN), None);
    }
}
