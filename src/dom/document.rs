// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Document representation

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use url::Url;

use super::element::Element;
use super::event::{Event, EventContext, EventHandler, Listener, ListenerId};
use super::node::{Node, NodeData, NodeId, NodeStore};
use super::selector::Selector;
use crate::error::Result;

/// HTML document: node storage plus the document-level event surface.
///
/// Cloning is cheap and yields a handle to the same document.
#[derive(Debug, Clone)]
pub struct Document {
    url: Option<Url>,
    title: Arc<RwLock<String>>,
    root_id: NodeId,
    pub(crate) nodes: NodeStore,
    listeners: Arc<RwLock<Vec<Listener>>>,
}

impl Document {
    /// Create a new empty document
    pub fn new() -> Self {
        let root_id = NodeId::new();
        let mut nodes = HashMap::new();
        nodes.insert(root_id, NodeData::document());

        Self {
            url: None,
            title: Arc::new(RwLock::new(String::new())),
            root_id,
            nodes: Arc::new(RwLock::new(nodes)),
            listeners: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Create a document with URL
    pub fn with_url(url: Url) -> Self {
        let mut doc = Self::new();
        doc.url = Some(url);
        doc
    }

    /// Document location
    pub fn url(&self) -> Option<&Url> {
        self.url.as_ref()
    }

    pub fn title(&self) -> String {
        self.title.read().clone()
    }

    pub fn set_title(&self, title: impl Into<String>) {
        *self.title.write() = title.into();
    }

    /// Get the root (document) node
    pub fn root(&self) -> Node {
        Node::new(self.root_id, self.nodes.clone())
    }

    pub fn body(&self) -> Option<Element> {
        self.query_selector("body")
    }

    /// Find the first element matching a selector
    pub fn query_selector(&self, selector: &str) -> Option<Element> {
        let sel = Selector::parse(selector).ok()?;
        self.root()
            .descendants()
            .into_iter()
            .find(|n| sel.matches(n))
            .and_then(Element::new)
    }

    /// Find all elements matching a selector, in document order
    pub fn query_selector_all(&self, selector: &str) -> Vec<Element> {
        Selector::parse(selector)
            .map(|sel| {
                self.root()
                    .descendants()
                    .into_iter()
                    .filter(|n| sel.matches(n))
                    .filter_map(Element::new)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn get_element_by_id(&self, id: &str) -> Option<Element> {
        self.query_selector_all("[id]")
            .into_iter()
            .find(|e| e.id().as_deref() == Some(id))
    }

    /// All forms in the document
    pub fn forms(&self) -> Vec<Element> {
        self.query_selector_all("form")
    }

    /// Parse an HTML fragment and append its nodes to `parent`
    pub fn append_html(&self, parent: &Element, html: &str) -> Result<Vec<Element>> {
        super::parser::append_fragment(self, parent, html)
    }

    /// Subscribe to events of `event_type` bubbling through elements
    /// that match `selector`, for the life of this document
    pub fn on<F>(&self, event_type: &str, selector: &str, handler: F) -> Result<ListenerId>
    where
        F: Fn(&mut Event, &EventContext<'_>) + Send + Sync + 'static,
    {
        let handler: EventHandler = Arc::new(handler);
        let listener = Listener {
            id: ListenerId::next(),
            event_type: event_type.to_string(),
            selector: Selector::parse(selector)?,
            handler,
        };
        let id = listener.id;

        tracing::trace!(event_type, selector, "Listener added");
        self.listeners.write().push(listener);
        Ok(id)
    }

    /// Remove a listener; returns whether it was registered
    pub fn off(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.write();
        let before = listeners.len();
        listeners.retain(|l| l.id != id);
        listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.read().len()
    }

    /// Dispatch an event at its target and bubble it to the root.
    ///
    /// Listeners registered during dispatch only see later events.
    /// Returns the event so callers can inspect `default_prevented`.
    pub fn dispatch(&self, mut event: Event) -> Event {
        let listeners: Vec<Listener> = self
            .listeners
            .read()
            .iter()
            .filter(|l| l.event_type == event.event_type)
            .cloned()
            .collect();

        tracing::trace!(
            event_type = %event.event_type,
            listeners = listeners.len(),
            "Dispatching event"
        );

        let mut current = Some(event.target.clone());
        while let Some(element) = current {
            for listener in &listeners {
                if listener.selector.matches(&element.node) {
                    let ctx = EventContext {
                        document: self,
                        current: &element,
                    };
                    (listener.handler)(&mut event, &ctx);
                }
            }
            if event.propagation_stopped() {
                break;
            }
            current = element.parent_element();
        }

        event
    }

    /// All text content
    pub fn text_content(&self) -> String {
        self.root().text_content()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::dom::parse_html;

    #[test]
    fn test_query_selector() {
        let doc = parse_html("<html><body><div id='test'>Hello</div></body></html>").unwrap();
        let elem = doc.get_element_by_id("test").unwrap();
        assert_eq!(elem.text_content(), "Hello");
        assert!(doc.body().is_some());
    }

    #[test]
    fn test_delegated_listener_bubbles_from_child() {
        let doc = parse_html(r#"<form class="bookmarks_form"><button>go</button></form>"#).unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();

        doc.on("click", ".bookmarks_form", move |event, ctx| {
            assert_eq!(ctx.current.local_name(), "form");
            assert_eq!(event.target.local_name(), "button");
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();

        let button = doc.query_selector("button").unwrap();
        doc.dispatch(Event::new("click", button));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_listener_covers_elements_added_later() {
        let doc = parse_html("<div id='host'></div>").unwrap();
        doc.on("submit", ".bookmarks_form", |event, _| event.prevent_default())
            .unwrap();

        let host = doc.get_element_by_id("host").unwrap();
        let added = doc
            .append_html(&host, r#"<form class="bookmarks_form"></form>"#)
            .unwrap();
        assert_eq!(added.len(), 1);

        let event = doc.dispatch(Event::new("submit", added[0].clone()));
        assert!(event.default_prevented());
    }

    #[test]
    fn test_off_and_non_matching() {
        let doc = parse_html("<form class='other'></form>").unwrap();
        let id = doc
            .on("submit", ".bookmarks_form", |event, _| event.prevent_default())
            .unwrap();

        let form = doc.query_selector("form").unwrap();
        assert!(!doc.dispatch(Event::new("submit", form.clone())).default_prevented());

        assert!(doc.off(id));
        assert!(!doc.off(id));
        assert_eq!(doc.listener_count(), 0);
    }

    #[test]
    fn test_stop_propagation() {
        let doc = parse_html("<div class='outer'><p class='inner'>x</p></div>").unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        let outer_hits = hits.clone();

        doc.on("ping", ".inner", |event, _| event.stop_propagation()).unwrap();
        doc.on("ping", ".outer", move |_, _| {
            outer_hits.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();

        let inner = doc.query_selector(".inner").unwrap();
        doc.dispatch(Event::new("ping", inner));
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }
}
