// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTTP client layer
//!
//! Provides a lightweight HTTP client with a page cookie jar and the
//! request/response types that interceptors mutate.

mod client;
mod cookie;
mod request;
mod response;

pub use client::{HttpClient, HttpClientConfig};
pub use cookie::{read_cookie, Cookie, CookieJar, CookieSource, DocumentCookies};
pub use request::Request;
pub use response::Response;

/// Default user agent string
pub const DEFAULT_USER_AGENT: &str = concat!("bookmarks-widget/", env!("CARGO_PKG_VERSION"));

/// Common HTTP headers
pub mod headers {
    pub const ACCEPT: &str = "accept";
    pub const CONTENT_TYPE: &str = "content-type";
    pub const COOKIE: &str = "cookie";
    pub const SET_COOKIE: &str = "set-cookie";
    pub const USER_AGENT: &str = "user-agent";
    pub const X_REQUESTED_WITH: &str = "x-requested-with";
    pub const X_CSRFTOKEN: &str = "x-csrftoken";
}

/// Content type of urlencoded form bodies
pub const FORM_URLENCODED: &str = "application/x-www-form-urlencoded; charset=UTF-8";
