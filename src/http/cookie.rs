// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Cookie jar and the script-visible cookie string

use std::borrow::Cow;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use url::Url;

/// A cookie as stored by the page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    pub name: String,
    /// Raw value, still percent-encoded if the server encoded it
    pub value: String,
    /// Empty matches every host
    pub domain: String,
    pub path: String,
    /// None for session cookies
    pub expires: Option<DateTime<Utc>>,
    pub secure: bool,
    /// Hidden from the document cookie string
    pub http_only: bool,
}

impl Cookie {
    /// Create a new session cookie with path `/`
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            domain: String::new(),
            path: "/".to_string(),
            expires: None,
            secure: false,
            http_only: false,
        }
    }

    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = domain.into();
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    pub fn http_only(mut self, http_only: bool) -> Self {
        self.http_only = http_only;
        self
    }

    pub fn expires(mut self, expires: DateTime<Utc>) -> Self {
        self.expires = Some(expires);
        self
    }

    pub fn is_expired(&self) -> bool {
        matches!(self.expires, Some(at) if at <= Utc::now())
    }

    /// Whether the cookie is sent to (and visible on) `url`
    pub fn matches(&self, url: &Url) -> bool {
        if self.is_expired() || (self.secure && url.scheme() != "https") {
            return false;
        }
        self.domain_matches(url.host_str().unwrap_or("")) && url.path().starts_with(&self.path)
    }

    fn domain_matches(&self, host: &str) -> bool {
        let domain = self.domain.trim_start_matches('.');
        if domain.is_empty() {
            return true;
        }

        let host = host.to_ascii_lowercase();
        let domain = domain.to_ascii_lowercase();
        host == domain || host.ends_with(&format!(".{}", domain))
    }

    /// Parse a Set-Cookie header value received from `url`.
    ///
    /// Unknown attributes are ignored. A header without `name=` yields `None`.
    pub fn parse(header: &str, url: &Url) -> Option<Self> {
        let mut parts = header.split(';').map(str::trim);
        let (name, value) = parts.next()?.split_once('=')?;
        let name = name.trim();
        if name.is_empty() {
            return None;
        }

        let mut cookie = Cookie::new(name, value.trim()).domain(url.host_str().unwrap_or(""));
        for attribute in parts {
            let (key, value) = match attribute.split_once('=') {
                Some((key, value)) => (key.trim(), value.trim()),
                None => (attribute, ""),
            };
            cookie.apply_attribute(&key.to_ascii_lowercase(), value);
        }
        Some(cookie)
    }

    fn apply_attribute(&mut self, key: &str, value: &str) {
        match key {
            "domain" if !value.is_empty() => self.domain = value.trim_start_matches('.').to_string(),
            "path" if value.starts_with('/') => self.path = value.to_string(),
            "expires" => {
                if let Ok(at) = DateTime::parse_from_rfc2822(value) {
                    self.expires = Some(at.with_timezone(&Utc));
                }
            }
            "max-age" => {
                if let Ok(secs) = value.parse::<i64>() {
                    self.expires = Some(Utc::now() + Duration::seconds(secs));
                }
            }
            "secure" => self.secure = true,
            "httponly" => self.http_only = true,
            _ => {}
        }
    }

    /// `name=value` pair as sent in a Cookie header
    pub fn to_header_value(&self) -> String {
        format!("{}={}", self.name, self.value)
    }
}

/// Thread-safe cookie storage keyed by domain
#[derive(Debug, Clone, Default)]
pub struct CookieJar {
    cookies: Arc<DashMap<String, Vec<Cookie>>>,
}

impl CookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a cookie, replacing any cookie with the same name and path
    pub fn add(&self, cookie: Cookie) {
        let mut entry = self.cookies.entry(cookie.domain.clone()).or_default();
        entry.retain(|c| c.name != cookie.name || c.path != cookie.path);
        entry.push(cookie);
    }

    /// Add a cookie from a Set-Cookie header
    pub fn add_from_header(&self, header: &str, url: &Url) {
        if let Some(cookie) = Cookie::parse(header, url) {
            tracing::trace!(name = %cookie.name, domain = %cookie.domain, "Stored cookie");
            self.add(cookie);
        }
    }

    /// Live cookies that apply to `url`
    pub fn get_cookies(&self, url: &Url) -> Vec<Cookie> {
        let mut cookies = Vec::new();
        for mut entry in self.cookies.iter_mut() {
            entry.value_mut().retain(|c| !c.is_expired());
            cookies.extend(entry.value().iter().filter(|c| c.matches(url)).cloned());
        }
        cookies
    }

    /// Cookie header value for a request to `url`
    pub fn get_cookie_header(&self, url: &Url) -> Option<String> {
        let header = join_pairs(self.get_cookies(url).iter());
        (!header.is_empty()).then_some(header)
    }

    /// The cookie string a script on `url` would see (HttpOnly excluded)
    pub fn document_cookie(&self, url: &Url) -> String {
        join_pairs(self.get_cookies(url).iter().filter(|c| !c.http_only))
    }

    pub fn clear(&self) {
        self.cookies.clear();
    }

    /// Total cookie count
    pub fn len(&self) -> usize {
        self.cookies.iter().map(|e| e.value().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn join_pairs<'a>(cookies: impl Iterator<Item = &'a Cookie>) -> String {
    cookies
        .map(Cookie::to_header_value)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Read access to the cookie string of the current document.
///
/// Implementations are consulted on every request and must not cache.
pub trait CookieSource: Send + Sync {
    /// `name=value` pairs separated by `;`
    fn cookie_string(&self) -> String;

    /// Look up a single cookie by name, percent-decoded
    fn get(&self, name: &str) -> Option<String> {
        read_cookie(&self.cookie_string(), name)
    }
}

impl CookieSource for String {
    fn cookie_string(&self) -> String {
        self.clone()
    }
}

impl CookieSource for &'static str {
    fn cookie_string(&self) -> String {
        (*self).to_string()
    }
}

/// A jar seen through a document URL
#[derive(Debug, Clone)]
pub struct DocumentCookies {
    jar: CookieJar,
    url: Url,
}

impl DocumentCookies {
    pub fn new(jar: CookieJar, url: Url) -> Self {
        Self { jar, url }
    }
}

impl CookieSource for DocumentCookies {
    fn cookie_string(&self) -> String {
        self.jar.document_cookie(&self.url)
    }
}

/// Find `name` in a document cookie string and percent-decode its value.
///
/// The first matching pair wins. `+` is not treated as a space. Invalid
/// UTF-8 after decoding is replaced rather than rejected.
pub fn read_cookie(cookie_string: &str, name: &str) -> Option<String> {
    if cookie_string.is_empty() {
        return None;
    }

    cookie_string
        .split(';')
        .map(str::trim)
        .find_map(|pair| pair.strip_prefix(name)?.strip_prefix('='))
        .map(decode_component)
}

fn decode_component(raw: &str) -> String {
    match urlencoding::decode(raw) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => match urlencoding::decode_binary(raw.as_bytes()) {
            Cow::Borrowed(bytes) => String::from_utf8_lossy(bytes).into_owned(),
            Cow::Owned(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        },
    }
}
