// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Page configuration

use std::time::Duration;

use reqwest::header::{HeaderName, HeaderValue};

use super::bookmarks::WidgetConfig;
use crate::error::{Error, Result};
use crate::http::{HttpClientConfig, DEFAULT_USER_AGENT};
use crate::network::CsrfConfig;

/// Page configuration
#[derive(Debug, Clone)]
pub struct PageConfig {
    /// User agent string
    pub user_agent: String,
    /// Default timeout for requests
    pub timeout: Duration,
    /// Accept invalid TLS certificates
    pub ignore_https_errors: bool,
    /// Proxy URL
    pub proxy: Option<String>,
    /// Extra HTTP headers sent with every request
    pub extra_headers: Vec<(String, String)>,
    /// Log every scripted request and response
    pub log_requests: bool,
    /// Maximum network events kept in the log
    pub max_network_events: usize,
    /// Keep response bodies in the network log
    pub capture_bodies: bool,
    /// Upper bound for `Page::wait_for_idle`
    pub idle_timeout: Duration,
    /// CSRF header injection; `None` disables it
    pub csrf: Option<CsrfConfig>,
    /// Bookmark form handling; `None` disables it
    pub widget: Option<WidgetConfig>,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(30),
            ignore_https_errors: false,
            proxy: None,
            extra_headers: vec![],
            log_requests: false,
            max_network_events: 1000,
            capture_bodies: true,
            idle_timeout: Duration::from_secs(60),
            csrf: Some(CsrfConfig::default()),
            widget: Some(WidgetConfig::default()),
        }
    }
}

impl PageConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set user agent
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Ignore HTTPS errors
    pub fn ignore_https_errors(mut self, ignore: bool) -> Self {
        self.ignore_https_errors = ignore;
        self
    }

    /// Set proxy
    pub fn proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    /// Add extra header
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_headers.push((name.into(), value.into()));
        self
    }

    pub fn log_requests(mut self, enabled: bool) -> Self {
        self.log_requests = enabled;
        self
    }

    pub fn max_network_events(mut self, max: usize) -> Self {
        self.max_network_events = max;
        self
    }

    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    pub fn csrf(mut self, csrf: CsrfConfig) -> Self {
        self.csrf = Some(csrf);
        self
    }

    pub fn without_csrf(mut self) -> Self {
        self.csrf = None;
        self
    }

    pub fn widget(mut self, widget: WidgetConfig) -> Self {
        self.widget = Some(widget);
        self
    }

    pub fn without_widget(mut self) -> Self {
        self.widget = None;
        self
    }

    /// HTTP client settings for this page
    pub fn http_config(&self) -> Result<HttpClientConfig> {
        let mut config = HttpClientConfig {
            user_agent: self.user_agent.clone(),
            timeout: self.timeout,
            accept_invalid_certs: self.ignore_https_errors,
            proxy: self.proxy.clone(),
            ..Default::default()
        };

        for (name, value) in &self.extra_headers {
            let name = HeaderName::try_from(name.as_str())
                .map_err(|e| Error::Config(format!("Invalid header name '{}': {}", name, e)))?;
            let value = HeaderValue::try_from(value.as_str())
                .map_err(|e| Error::Config(format!("Invalid value for header '{}': {}", name, e)))?;
            config.default_headers.insert(name, value);
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_enable_widget() {
        let config = PageConfig::default();
        assert!(config.csrf.is_some());
        assert_eq!(config.widget.unwrap().form_class, "bookmarks_form");
    }

    #[test]
    fn test_http_config() {
        let config = PageConfig::new()
            .user_agent("test-agent")
            .header("X-Test", "1")
            .ignore_https_errors(true)
            .http_config()
            .unwrap();

        assert_eq!(config.user_agent, "test-agent");
        assert!(config.accept_invalid_certs);
        assert_eq!(config.default_headers.get("x-test").unwrap(), "1");
        assert!(config.default_headers.contains_key("accept"));
    }

    #[test]
    fn test_invalid_extra_header() {
        let result = PageConfig::new().header("bad header", "1").http_config();
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
