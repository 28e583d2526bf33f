// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Bookmark form handling
//!
//! Any form carrying the marker class is submitted asynchronously instead
//! of natively. On submit the widget flips its toggle elements, posts a
//! snapshot of the form's controls, and then either reveals the form's
//! error region or fires a `bookmarked` event carrying the response.

use reqwest::Method;
use serde_json::Value;
use url::Url;

use super::ajax::Ajax;
use super::form::{Form, FormSnapshot};
use crate::dom::{Document, Element, Event, ListenerId, SUBMIT};
use crate::error::{Error, Result};
use crate::http::{headers, Request, Response};
use crate::network::{is_same_origin, DocumentOrigin};

/// Event fired on a form after a successful submission
pub const BOOKMARKED: &str = "bookmarked";

/// Class names and event name the widget works with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetConfig {
    /// Marks forms handled by the widget
    pub form_class: String,
    /// Elements flipped on submit
    pub toggle_class: String,
    /// Elements revealed on failure
    pub error_class: String,
    /// Event fired on success
    pub event_name: String,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            form_class: "bookmarks_form".to_string(),
            toggle_class: "bookmarks_toggle".to_string(),
            error_class: "error".to_string(),
            event_name: BOOKMARKED.to_string(),
        }
    }
}

impl WidgetConfig {
    pub fn form_class(mut self, class: impl Into<String>) -> Self {
        self.form_class = class.into();
        self
    }

    pub fn toggle_class(mut self, class: impl Into<String>) -> Self {
        self.toggle_class = class.into();
        self
    }

    pub fn error_class(mut self, class: impl Into<String>) -> Self {
        self.error_class = class.into();
        self
    }

    pub fn event_name(mut self, name: impl Into<String>) -> Self {
        self.event_name = name.into();
        self
    }

    pub fn form_selector(&self) -> String {
        format!(".{}", self.form_class)
    }

    fn toggle_selector(&self) -> String {
        format!(".{}", self.toggle_class)
    }

    fn error_selector(&self) -> String {
        format!(".{}", self.error_class)
    }
}

/// How one background submission ended
#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionOutcome {
    /// 2xx or 304 with a decodable body; `bookmarked` was fired
    Succeeded {
        action: Url,
        status: u16,
        payload: Value,
    },
    /// Transport error, other status, or undecodable body; the error
    /// region was revealed
    Failed {
        action: Option<Url>,
        status: Option<u16>,
        reason: String,
    },
}

impl SubmissionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, SubmissionOutcome::Succeeded { .. })
    }

    pub fn payload(&self) -> Option<&Value> {
        match self {
            SubmissionOutcome::Succeeded { payload, .. } => Some(payload),
            SubmissionOutcome::Failed { .. } => None,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            SubmissionOutcome::Succeeded { status, .. } => Some(*status),
            SubmissionOutcome::Failed { status, .. } => *status,
        }
    }

    /// Classify a response the way the page's AJAX utility does
    pub fn from_response(action: Url, response: &Response) -> Self {
        let status = response.status_code();
        if !response.is_accepted() {
            return SubmissionOutcome::Failed {
                action: Some(action),
                status: Some(status),
                reason: format!("server responded with status {}", status),
            };
        }

        match response.payload() {
            Ok(payload) => SubmissionOutcome::Succeeded {
                action,
                status,
                payload,
            },
            Err(e) => SubmissionOutcome::Failed {
                action: Some(action),
                status: Some(status),
                reason: format!("invalid payload: {}", e),
            },
        }
    }

    fn from_error(action: Option<Url>, error: &Error) -> Self {
        if error.is_transport() {
            tracing::debug!(%error, "Bookmark request got no HTTP response");
        }
        SubmissionOutcome::Failed {
            action,
            status: error.status_code(),
            reason: error.to_string(),
        }
    }
}

/// Delegated submit handler for bookmark forms
#[derive(Debug, Clone, Default)]
pub struct BookmarksWidget {
    config: WidgetConfig,
}

impl BookmarksWidget {
    pub fn new(config: WidgetConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &WidgetConfig {
        &self.config
    }

    /// Bind the submit handler on `document`. Forms added to the document
    /// later are covered as well.
    pub fn install(&self, document: &Document, ajax: Ajax) -> Result<ListenerId> {
        let config = self.config.clone();
        let id = document.on(SUBMIT, &config.form_selector(), move |event, ctx| {
            event.prevent_default();
            submit_form(&config, &ajax, ctx.document, ctx.current);
        })?;

        tracing::debug!(form_class = %self.config.form_class, "Bookmark form handler installed");
        Ok(id)
    }
}

fn submit_form(config: &WidgetConfig, ajax: &Ajax, document: &Document, form: &Element) {
    for toggle in form.query_selector_all(&config.toggle_selector()) {
        toggle.toggle();
    }

    let snapshot = FormSnapshot::capture(form);
    let request = match build_request(document, form, &snapshot) {
        Ok(request) => request,
        Err(e) => {
            finish(config, document, form, &SubmissionOutcome::from_error(None, &e));
            return;
        }
    };

    tracing::debug!(
        action = %request.url,
        fields = snapshot.len(),
        "Submitting bookmark form"
    );

    let action = request.url.clone();
    let task = {
        let config = config.clone();
        let ajax = ajax.clone();
        let document = document.clone();
        let form = form.clone();
        async move {
            let outcome = match ajax.send(request).await {
                Ok(response) => SubmissionOutcome::from_response(action, &response),
                Err(e) => SubmissionOutcome::from_error(Some(action), &e),
            };
            finish(&config, &document, &form, &outcome);
            outcome
        }
    };

    if let Err(e) = ajax.spawn(task) {
        finish(config, document, form, &SubmissionOutcome::from_error(None, &e));
    }
}

fn build_request(document: &Document, form: &Element, snapshot: &FormSnapshot) -> Result<Request> {
    let base = document
        .url()
        .ok_or_else(|| Error::form_submission("document has no URL to post the form to"))?;
    let target = Form::from_element(form).target(base);

    let mut request = Request::resolve(Method::POST, target.as_str(), base)?
        .form(snapshot)
        .header(headers::ACCEPT, "*/*");
    if is_same_origin(&target, &DocumentOrigin::from_url(base)) {
        request = request.header(headers::X_REQUESTED_WITH, "XMLHttpRequest");
    }
    Ok(request)
}

fn finish(config: &WidgetConfig, document: &Document, form: &Element, outcome: &SubmissionOutcome) {
    match outcome {
        SubmissionOutcome::Succeeded {
            action,
            status,
            payload,
        } => {
            tracing::info!(%action, status, "Bookmark form submitted");
            let event = Event::new(config.event_name.as_str(), form.clone()).with_detail(payload.clone());
            document.dispatch(event);
        }
        SubmissionOutcome::Failed {
            action,
            status,
            reason,
        } => {
            tracing::warn!(
                action = action.as_ref().map(Url::as_str),
                status,
                %reason,
                "Bookmark form submission failed"
            );
            for error in form.query_selector_all(&config.error_selector()) {
                error.show();
            }
        }
    }
}
