// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! End-to-end tests against a local mock server

use std::sync::Arc;

use bookmarks_widget::{
    Cookie, EventType, Page, PageConfig, SubmissionOutcome, SubmitResult, BOOKMARKED,
};
use parking_lot::Mutex;
use reqwest::Method;
use serde_json::{json, Value};
use wiremock::matchers::{body_string, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ARTICLE: &str = r#"<html><head><title>Article 7</title></head><body>
    <h1>Article 7</h1>
    <form class="bookmarks_form" action="/bookmarks/add/" method="post">
        <input type="hidden" name="a" value="1">
        <input type="hidden" name="b" value="2">
        <button type="submit" class="bookmarks_toggle">Bookmark</button>
        <button type="submit" class="bookmarks_toggle" style="display: none">Remove bookmark</button>
        <p class="error" style="display: none">Something went wrong</p>
    </form>
    <form id="search" action="/search" method="get">
        <input name="q" value="rust">
    </form>
</body></html>"#;

async fn serve_article(server: &MockServer, set_cookie: Option<&str>) {
    let mut template = ResponseTemplate::new(200).set_body_raw(ARTICLE, "text/html");
    if let Some(cookie) = set_cookie {
        template = template.insert_header("set-cookie", cookie);
    }
    Mock::given(method("GET"))
        .and(path("/article/7/"))
        .respond_with(template)
        .mount(server)
        .await;
}

fn capture_bookmarked(page: &Page) -> Arc<Mutex<Vec<Value>>> {
    let received = Arc::new(Mutex::new(Vec::new()));
    let sink = received.clone();
    page.document()
        .unwrap()
        .on(BOOKMARKED, ".bookmarks_form", move |event, _| {
            sink.lock().push(event.detail.clone().unwrap_or(Value::Null));
        })
        .unwrap();
    received
}

#[tokio::test]
async fn test_bookmark_success_fires_event_with_payload() {
    let server = MockServer::start().await;
    serve_article(&server, Some("csrftoken=ab%2Bc%3D; Path=/")).await;
    Mock::given(method("POST"))
        .and(path("/bookmarks/add/"))
        .and(header("x-csrftoken", "ab+c="))
        .and(header("x-requested-with", "XMLHttpRequest"))
        .and(body_string("a=1&b=2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"bookmarked": true, "count": 3})))
        .expect(1)
        .mount(&server)
        .await;

    let page = Page::new(PageConfig::default()).unwrap();
    page.navigate(&format!("{}/article/7/", server.uri())).await.unwrap();
    let received = capture_bookmarked(&page);

    let result = page.submit(".bookmarks_form").await.unwrap();
    assert!(result.is_intercepted());

    let outcomes = page.wait_for_idle().await.unwrap();
    assert_eq!(outcomes.len(), 1);
    assert!(outcomes[0].is_success());
    assert_eq!(*received.lock(), vec![json!({"bookmarked": true, "count": 3})]);

    let toggles = page.query_selector_all(".bookmarks_toggle");
    assert!(!toggles[0].is_visible());
    assert!(toggles[1].is_visible());
    assert!(!page.query_selector(".error").unwrap().is_visible());

    // The page stayed where it was
    assert_eq!(page.document().unwrap().title(), "Article 7");
    assert_eq!(page.url().unwrap().path(), "/article/7/");
    assert!(page.network().events_by_type(EventType::FormSubmission).is_empty());
}

#[tokio::test]
async fn test_bookmark_failure_reveals_error() {
    let server = MockServer::start().await;
    serve_article(&server, Some("csrftoken=token")).await;
    Mock::given(method("POST"))
        .and(path("/bookmarks/add/"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let page = Page::new(PageConfig::default()).unwrap();
    page.navigate(&format!("{}/article/7/", server.uri())).await.unwrap();
    let received = capture_bookmarked(&page);

    page.submit(".bookmarks_form").await.unwrap();
    let outcomes = page.wait_for_idle().await.unwrap();

    assert!(matches!(
        outcomes[0],
        SubmissionOutcome::Failed { status: Some(500), .. }
    ));
    assert!(page.query_selector(".error").unwrap().is_visible());
    assert!(received.lock().is_empty());
    // Toggles are not rolled back
    assert!(!page.query_selector_all(".bookmarks_toggle")[0].is_visible());
}

#[tokio::test]
async fn test_missing_cookie_sends_null_token() {
    let server = MockServer::start().await;
    serve_article(&server, None).await;
    Mock::given(method("POST"))
        .and(path("/bookmarks/add/"))
        .and(header("x-csrftoken", "null"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&server)
        .await;

    let page = Page::new(PageConfig::default()).unwrap();
    page.navigate(&format!("{}/article/7/", server.uri())).await.unwrap();

    page.submit(".bookmarks_form").await.unwrap();
    let outcomes = page.wait_for_idle().await.unwrap();
    assert_eq!(outcomes[0].status(), Some(403));
    assert!(page.query_selector(".error").unwrap().is_visible());
}

#[tokio::test]
async fn test_csrf_header_only_on_same_origin_unsafe_requests() {
    let server = MockServer::start().await;
    Mock::given(path("/api/"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let page = Page::new(PageConfig::default()).unwrap();
    page.load_html(ARTICLE, &format!("{}/article/7/", server.uri())).unwrap();
    page.cookies().add(Cookie::new("csrftoken", "secret"));

    // Same origin, unsafe method
    let post = page.request(Method::POST, "/api/").unwrap();
    page.ajax(post).await.unwrap();

    // Same origin, safe method
    let get = page.request(Method::GET, "/api/").unwrap();
    page.ajax(get).await.unwrap();

    // Another port is another origin
    let other = MockServer::start().await;
    Mock::given(path("/api/"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&other)
        .await;
    let cross = page
        .request(Method::POST, &format!("{}/api/", other.uri()))
        .unwrap();
    page.ajax(cross).await.unwrap();

    let events = page.network().events_by_type(EventType::Xhr);
    assert_eq!(events.len(), 3);
    assert_eq!(events[0].request_header("x-csrftoken"), Some("secret"));
    assert_eq!(events[1].request_header("x-csrftoken"), None);
    assert_eq!(events[2].request_header("x-csrftoken"), None);
}

#[tokio::test]
async fn test_token_is_read_per_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let page = Page::new(PageConfig::default()).unwrap();
    page.load_html(ARTICLE, &format!("{}/article/7/", server.uri())).unwrap();

    page.cookies().add(Cookie::new("csrftoken", "first"));
    page.ajax(page.request(Method::POST, "/a/").unwrap()).await.unwrap();

    page.cookies().add(Cookie::new("csrftoken", "second"));
    page.ajax(page.request(Method::POST, "/a/").unwrap()).await.unwrap();

    let tokens: Vec<Option<String>> = page
        .network()
        .events()
        .iter()
        .map(|e| e.request_header("x-csrftoken").map(str::to_string))
        .collect();
    assert_eq!(tokens, vec![Some("first".to_string()), Some("second".to_string())]);
}

#[tokio::test]
async fn test_unmarked_form_submits_natively() {
    let server = MockServer::start().await;
    serve_article(&server, None).await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "rust"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("<html><head><title>Results</title></head><body></body></html>", "text/html"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let page = Page::new(PageConfig::default()).unwrap();
    page.navigate(&format!("{}/article/7/", server.uri())).await.unwrap();

    match page.submit("#search").await.unwrap() {
        SubmitResult::Submitted(response) => assert_eq!(response.status_code(), 200),
        SubmitResult::Intercepted => panic!("search form must not be intercepted"),
    }

    assert_eq!(page.document().unwrap().title(), "Results");
    assert_eq!(page.network().events_by_type(EventType::FormSubmission).len(), 1);
    assert_eq!(page.in_flight(), 0);
}

#[tokio::test]
async fn test_forms_added_after_load_are_handled() {
    let server = MockServer::start().await;
    serve_article(&server, Some("csrftoken=t")).await;
    Mock::given(method("POST"))
        .and(path("/bookmarks/remove/"))
        .and(body_string("id=42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"removed": 42})))
        .expect(1)
        .mount(&server)
        .await;

    let page = Page::new(PageConfig::default()).unwrap();
    page.navigate(&format!("{}/article/7/", server.uri())).await.unwrap();

    let doc = page.document().unwrap();
    let body = doc.body().unwrap();
    doc.append_html(
        &body,
        r#"<form id="late" class="bookmarks_form" action="/bookmarks/remove/"><input type="hidden" name="id" value="42"></form>"#,
    )
    .unwrap();
    let received = capture_bookmarked(&page);

    assert!(page.submit("#late").await.unwrap().is_intercepted());
    let outcomes = page.wait_for_idle().await.unwrap();

    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].payload(), Some(&json!({"removed": 42})));
    assert_eq!(*received.lock(), vec![json!({"removed": 42})]);
}
