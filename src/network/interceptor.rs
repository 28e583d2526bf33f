// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Network interceptor: runs the interceptor chain around every request
//! and records what went over the wire

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use parking_lot::RwLock;

use super::event::{EventType, NetworkEvent, RequestInfo, ResponseInfo};
use super::interceptor_trait::{InterceptAction, InterceptorChain, RequestInterceptor};
use crate::error::{Error, Result};
use crate::http::{HttpClient, Request, Response};

/// Executes requests for a page through its interceptor chain
///
/// Cloning shares the client, chain, and event log.
#[derive(Clone)]
pub struct NetworkInterceptor {
    client: HttpClient,
    chain: Arc<RwLock<InterceptorChain>>,
    events: Arc<RwLock<VecDeque<NetworkEvent>>>,
    event_counter: Arc<AtomicU64>,
    max_events: usize,
    capture_bodies: bool,
    max_body_size: usize,
}

impl NetworkInterceptor {
    pub fn new(client: HttpClient) -> Self {
        Self {
            client,
            chain: Arc::new(RwLock::new(InterceptorChain::new())),
            events: Arc::new(RwLock::new(VecDeque::new())),
            event_counter: Arc::new(AtomicU64::new(0)),
            max_events: 1000,
            capture_bodies: true,
            max_body_size: 64 * 1024,
        }
    }

    /// Set max events
    pub fn max_events(mut self, max: usize) -> Self {
        self.max_events = max.max(1);
        self
    }

    /// Set body capture settings
    pub fn capture_bodies(mut self, capture: bool, max_size: usize) -> Self {
        self.capture_bodies = capture;
        self.max_body_size = max_size;
        self
    }

    /// Register an interceptor
    pub fn add_interceptor<I: RequestInterceptor + 'static>(&self, interceptor: I) {
        self.chain.write().add(interceptor);
    }

    /// Register an interceptor shared with the caller
    pub fn add_shared_interceptor(&self, interceptor: Arc<dyn RequestInterceptor>) {
        self.chain.write().add_shared(interceptor);
    }

    /// Replace the chain, returning the previous one
    pub fn replace_interceptors(&self, chain: InterceptorChain) -> InterceptorChain {
        std::mem::replace(&mut *self.chain.write(), chain)
    }

    /// Snapshot of the current chain
    pub fn interceptors(&self) -> InterceptorChain {
        self.chain.read().clone()
    }

    /// Execute a request, recording it in the event log.
    ///
    /// The interceptor chain only runs for requests issued by page code
    /// (`EventType::Xhr`); navigations and native form submissions go out
    /// as the browser would send them.
    pub async fn execute(&self, mut request: Request, event_type: EventType) -> Result<Response> {
        let start = Instant::now();
        let event_id = self.next_event_id();
        // Requests already in flight keep the chain they started with
        let chain = self.interceptors();

        let action = if event_type.is_scripted() {
            chain.process_request(&mut request).await
        } else {
            InterceptAction::Continue
        };

        match action {
            InterceptAction::Continue => {}
            InterceptAction::Delay(delay) => {
                tracing::debug!(url = %request.url, delay_ms = delay.as_millis() as u64, "Delaying request");
                tokio::time::sleep(delay).await;
            }
            InterceptAction::Abort(reason) => {
                let error = Error::aborted(request.url.as_str(), reason.clone());
                let event = NetworkEvent::new(event_id, event_type, self.request_info(&request))
                    .intercepted_by(format!("abort: {}", reason))
                    .with_error(error.to_string())
                    .with_duration_ms(elapsed_ms(start));
                self.store_event(event);
                chain.notify_error(&request, &error).await;
                return Err(error);
            }
            InterceptAction::MockResponse(mut response) => {
                chain.process_response(&request, &mut response).await?;
                let event = NetworkEvent::new(event_id, event_type, self.request_info(&request))
                    .intercepted_by("mock")
                    .with_response(self.response_info(&response))
                    .with_duration_ms(elapsed_ms(start));
                self.store_event(event);
                return Ok(response);
            }
        }

        let info = self.request_info(&request);
        let result = self.client.execute(request.clone()).await;

        let event = NetworkEvent::new(event_id, event_type, info).with_duration_ms(elapsed_ms(start));
        match result {
            Ok(mut response) => {
                if event_type.is_scripted() {
                    chain.process_response(&request, &mut response).await?;
                }
                self.store_event(event.with_response(self.response_info(&response)));
                Ok(response)
            }
            Err(error) => {
                if event_type.is_scripted() {
                    chain.notify_error(&request, &error).await;
                }
                self.store_event(event.with_error(error.to_string()));
                Err(error)
            }
        }
    }

    /// Navigate-style GET
    pub async fn get(&self, url: &str) -> Result<Response> {
        self.execute(Request::get(url)?, EventType::Navigation).await
    }

    /// Asynchronous request from page code
    pub async fn xhr(&self, request: Request) -> Result<Response> {
        self.execute(request, EventType::Xhr).await
    }

    /// Get all captured events, oldest first
    pub fn events(&self) -> Vec<NetworkEvent> {
        self.events.read().iter().cloned().collect()
    }

    pub fn events_by_type(&self, event_type: EventType) -> Vec<NetworkEvent> {
        self.events
            .read()
            .iter()
            .filter(|e| e.event_type == event_type)
            .cloned()
            .collect()
    }

    /// Get failed requests
    pub fn failed_requests(&self) -> Vec<NetworkEvent> {
        self.events
            .read()
            .iter()
            .filter(|e| e.error.is_some() || !e.is_success())
            .cloned()
            .collect()
    }

    pub fn clear(&self) {
        self.events.write().clear();
    }

    pub fn event_count(&self) -> usize {
        self.events.read().len()
    }

    /// Export events as JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.events())
    }

    pub fn client(&self) -> &HttpClient {
        &self.client
    }

    fn next_event_id(&self) -> String {
        format!("evt_{}", self.event_counter.fetch_add(1, Ordering::Relaxed) + 1)
    }

    fn request_info(&self, request: &Request) -> RequestInfo {
        RequestInfo::from_request(request, self.max_body_size)
    }

    fn response_info(&self, response: &Response) -> ResponseInfo {
        ResponseInfo::from_response(response, self.capture_bodies.then_some(self.max_body_size))
    }

    fn store_event(&self, event: NetworkEvent) {
        let mut events = self.events.write();
        while events.len() >= self.max_events {
            events.pop_front();
        }
        events.push_back(event);
    }
}

impl std::fmt::Debug for NetworkInterceptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetworkInterceptor")
            .field("chain", &*self.chain.read())
            .field("events", &self.event_count())
            .finish_non_exhaustive()
    }
}

fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use bytes::Bytes;
    use reqwest::header::HeaderMap;
    use reqwest::StatusCode;

    use super::*;

    struct Canned;

    #[async_trait]
    impl RequestInterceptor for Canned {
        async fn before_request(&self, request: &mut Request) -> InterceptAction {
            InterceptAction::MockResponse(Response::new(
                StatusCode::OK,
                HeaderMap::new(),
                Bytes::from_static(b"{}"),
                request.url.clone(),
                0,
            ))
        }
    }

    struct Refuse;

    #[async_trait]
    impl RequestInterceptor for Refuse {
        async fn before_request(&self, _request: &mut Request) -> InterceptAction {
            InterceptAction::Abort("offline".to_string())
        }
    }

    #[tokio::test]
    async fn test_interceptor_creation() {
        let interceptor = NetworkInterceptor::new(HttpClient::new().unwrap());
        assert_eq!(interceptor.event_count(), 0);
        assert!(interceptor.interceptors().is_empty());
    }

    #[tokio::test]
    async fn test_mock_response_skips_network() {
        let interceptor = NetworkInterceptor::new(HttpClient::new().unwrap());
        interceptor.add_interceptor(Canned);

        let response = interceptor
            .xhr(Request::post("http://unreachable.invalid/x").unwrap())
            .await
            .unwrap();
        assert_eq!(response.status_code(), 200);

        let events = interceptor.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].intercepted.as_deref(), Some("mock"));
        assert!(events[0].is_success());

        let log: serde_json::Value = serde_json::from_str(&interceptor.to_json().unwrap()).unwrap();
        assert_eq!(log.as_array().map(Vec::len), Some(1));
        assert_eq!(log[0]["request"]["url"], "http://unreachable.invalid/x");
        assert_eq!(log[0]["intercepted"], "mock");
    }

    #[tokio::test]
    async fn test_abort_records_error() {
        let interceptor = NetworkInterceptor::new(HttpClient::new().unwrap()).max_events(1);
        interceptor.add_interceptor(Refuse);

        let err = interceptor
            .xhr(Request::post("http://unreachable.invalid/x").unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Aborted { .. }));

        let _ = interceptor.xhr(Request::post("http://unreachable.invalid/y").unwrap()).await;
        assert_eq!(interceptor.event_count(), 1);
        assert_eq!(interceptor.failed_requests().len(), 1);

        let previous = interceptor.replace_interceptors(InterceptorChain::new());
        assert_eq!(previous.len(), 1);
        assert!(interceptor.interceptors().is_empty());
    }
}
