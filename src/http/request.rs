// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Outgoing request descriptor

use std::time::Duration;

use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Method;
use serde::Serialize;
use url::form_urlencoded;
use url::Url;

use super::{headers, FORM_URLENCODED};
use crate::error::Result;

/// HTTP request representation
///
/// `target` keeps the URL exactly as the caller wrote it (it may be
/// relative or protocol-relative); `url` is the resolved absolute URL the
/// client will contact. Interceptors that reason about origins look at
/// `target`.
#[derive(Debug, Clone)]
pub struct Request {
    /// Request method
    pub method: Method,
    /// URL as written by the caller
    pub target: String,
    /// Resolved request URL
    pub url: Url,
    /// Request headers
    pub headers: HeaderMap,
    /// Request body
    pub body: Option<Bytes>,
    /// Request timeout
    pub timeout: Option<Duration>,
}

impl Request {
    /// Create a request to an absolute URL
    pub fn new(method: Method, url: impl AsRef<str>) -> Result<Self> {
        let target = url.as_ref().to_string();
        let url = Url::parse(&target)?;
        Ok(Self::with_parts(method, target, url))
    }

    /// Create a GET request to an absolute URL
    pub fn get(url: impl AsRef<str>) -> Result<Self> {
        Self::new(Method::GET, url)
    }

    /// Create a POST request to an absolute URL
    pub fn post(url: impl AsRef<str>) -> Result<Self> {
        Self::new(Method::POST, url)
    }

    /// Create a request whose target is resolved against a document URL
    pub fn resolve(method: Method, target: impl Into<String>, base: &Url) -> Result<Self> {
        let target = target.into();
        let url = base.join(&target)?;
        Ok(Self::with_parts(method, target, url))
    }

    fn with_parts(method: Method, target: String, url: Url) -> Self {
        Self {
            method,
            target,
            url,
            headers: HeaderMap::new(),
            body: None,
            timeout: Some(Duration::from_secs(30)),
        }
    }

    /// Set a header, ignoring names or values that are not valid HTTP
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        if let (Ok(name), Ok(value)) = (
            HeaderName::try_from(name.as_ref()),
            HeaderValue::try_from(value.as_ref()),
        ) {
            self.headers.insert(name, value);
        }
        self
    }

    /// Set the request body
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Set JSON body
    pub fn json<T: Serialize>(mut self, data: &T) -> Result<Self> {
        let json = serde_json::to_vec(data)?;
        self.body = Some(Bytes::from(json));
        Ok(self.header(headers::CONTENT_TYPE, "application/json"))
    }

    /// Set an urlencoded form body, keeping pair order
    pub fn form<I, K, V>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let body = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(pairs)
            .finish();
        self.body = Some(Bytes::from(body));
        self.header(headers::CONTENT_TYPE, FORM_URLENCODED)
    }

    /// Set timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Header value as a string, if present and printable
    pub fn header_str(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Serialized origin of the resolved URL
    pub fn origin(&self) -> String {
        self.url.origin().ascii_serialization()
    }
}
