// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Delegated DOM events
//!
//! Listeners are registered once on the document with a selector and an
//! event type. Matching happens at dispatch time while the event bubbles
//! from its target to the root, so elements inserted after registration
//! are covered for the life of the document.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde_json::Value;

use super::document::Document;
use super::element::Element;
use super::selector::Selector;

/// Event type fired when a form is submitted
pub const SUBMIT: &str = "submit";

/// A dispatched event
#[derive(Debug, Clone)]
pub struct Event {
    /// Event type, e.g. `submit`
    pub event_type: String,
    /// Payload attached by the dispatcher
    pub detail: Option<Value>,
    /// Element the event was dispatched on
    pub target: Element,
    default_prevented: bool,
    propagation_stopped: bool,
}

impl Event {
    pub fn new(event_type: impl Into<String>, target: Element) -> Self {
        Self {
            event_type: event_type.into(),
            detail: None,
            target,
            default_prevented: false,
            propagation_stopped: false,
        }
    }

    /// Attach a payload
    pub fn with_detail(mut self, detail: Value) -> Self {
        self.detail = Some(detail);
        self
    }

    /// Suppress the default action (native form submission, navigation)
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }

    /// Stop bubbling after the current element's listeners have run
    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    pub fn propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }
}

/// What a listener sees besides the event itself
pub struct EventContext<'a> {
    /// Document the event is travelling through
    pub document: &'a Document,
    /// Element matched by the listener's selector
    pub current: &'a Element,
}

/// Listener callback
pub type EventHandler = Arc<dyn Fn(&mut Event, &EventContext<'_>) + Send + Sync>;

/// Handle returned by [`Document::on`], used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

impl ListenerId {
    pub(crate) fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

#[derive(Clone)]
pub(crate) struct Listener {
    pub id: ListenerId,
    pub event_type: String,
    pub selector: Selector,
    pub handler: EventHandler,
}

impl std::fmt::Debug for Listener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listener")
            .field("id", &self.id)
            .field("event_type", &self.event_type)
            .field("selector", &self.selector)
            .finish_non_exhaustive()
    }
}
