// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! # bookmarks-widget - Headless Django bookmark forms
//!
//! Client side of a Django "generic bookmarks" page, run without a
//! browser: a lightweight page model (html5ever DOM, reqwest with a cookie
//! jar) plus the two behaviors the page script provides.
//!
//! ## Features
//!
//! - CSRF header injection: same-origin requests with an unsafe method
//!   carry the `csrftoken` cookie in `X-CSRFToken`
//! - Bookmark forms: submitting a `.bookmarks_form` flips its
//!   `.bookmarks_toggle` elements and posts the form in the background
//! - Outcome handling: failures reveal `.error`, successes fire
//!   `bookmarked` on the form with the response payload
//! - Delegated events: forms added after load are handled too
//! - Network log: every request with the headers it was sent with
//!
//! ## Example
//!
//! ```rust,no_run
//! use bookmarks_widget::{Page, PageConfig, BOOKMARKED};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let page = Page::new(PageConfig::default())?;
//!     page.navigate("https://example.com/articles/42/").await?;
//!
//!     if let Some(doc) = page.document() {
//!         doc.on(BOOKMARKED, ".bookmarks_form", |event, _| {
//!             println!("bookmarked: {:?}", event.detail);
//!         })?;
//!     }
//!
//!     page.submit(".bookmarks_form").await?;
//!     for outcome in page.wait_for_idle().await? {
//!         println!("{:?}", outcome);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod browser;
pub mod dom;
pub mod error;
pub mod http;
pub mod network;

// Page and widget
pub use browser::{
    Ajax, BookmarksWidget, Form, FormSnapshot, Page, PageConfig, SubmissionOutcome, SubmitResult,
    WidgetConfig, BOOKMARKED,
};

// DOM
pub use dom::{Document, Element, Event, ListenerId, Node};

// Errors
pub use error::{Error, ErrorContext, Result};

// HTTP
pub use http::{Cookie, CookieJar, CookieSource, DocumentCookies, HttpClient, Request, Response};

// Network
pub use network::{
    CsrfConfig, CsrfHeaderInjector, DocumentOrigin, EventType, InterceptAction, InterceptorChain,
    NetworkEvent, NetworkInterceptor, RequestInterceptor, RequestLogger,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
