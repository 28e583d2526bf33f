// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Element-specific DOM operations

use std::collections::HashMap;

use super::node::{Node, NodeId, NodeStore, NodeType};
use super::selector::Selector;

/// Element node with extended operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub node: Node,
}

impl Element {
    /// Wrap a node if it is an element
    pub fn new(node: Node) -> Option<Self> {
        if node.node_type() == NodeType::Element {
            Some(Self { node })
        } else {
            None
        }
    }

    pub(crate) fn from_id(id: NodeId, nodes: NodeStore) -> Option<Self> {
        Self::new(Node::new(id, nodes))
    }

    /// Lowercase tag name
    pub fn local_name(&self) -> String {
        self.node.local_name().unwrap_or_default()
    }

    pub fn id(&self) -> Option<String> {
        self.node.get_attribute("id")
    }

    pub fn class_list(&self) -> Vec<String> {
        self.node
            .get_attribute("class")
            .map(|c| c.split_whitespace().map(String::from).collect())
            .unwrap_or_default()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.class_list().iter().any(|c| c == class)
    }

    pub fn add_class(&self, class: &str) {
        let mut classes = self.class_list();
        if !classes.iter().any(|c| c == class) {
            classes.push(class.to_string());
            self.node.set_attribute("class", classes.join(" "));
        }
    }

    pub fn remove_class(&self, class: &str) {
        let classes: Vec<String> = self
            .class_list()
            .into_iter()
            .filter(|c| c != class)
            .collect();
        self.node.set_attribute("class", classes.join(" "));
    }

    pub fn get_attribute(&self, name: &str) -> Option<String> {
        self.node.get_attribute(name)
    }

    pub fn set_attribute(&self, name: impl Into<String>, value: impl Into<String>) {
        self.node.set_attribute(name, value);
    }

    pub fn remove_attribute(&self, name: &str) {
        self.node.remove_attribute(name);
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.node.has_attribute(name)
    }

    pub fn text_content(&self) -> String {
        self.node.text_content()
    }

    pub fn parent_element(&self) -> Option<Element> {
        self.node.parent().and_then(Element::new)
    }

    /// Child elements
    pub fn children(&self) -> Vec<Element> {
        self.node
            .children()
            .into_iter()
            .filter_map(Element::new)
            .collect()
    }

    /// Find the first descendant matching a selector
    pub fn query_selector(&self, selector: &str) -> Option<Element> {
        let sel = Selector::parse(selector).ok()?;
        self.node
            .descendants()
            .into_iter()
            .find(|n| sel.matches(n))
            .and_then(Element::new)
    }

    /// Find all descendants matching a selector, in document order
    pub fn query_selector_all(&self, selector: &str) -> Vec<Element> {
        match Selector::parse(selector) {
            Ok(sel) => self.find_all(&sel),
            Err(e) => {
                tracing::debug!(error = %e, "Ignoring invalid selector");
                Vec::new()
            }
        }
    }

    pub(crate) fn find_all(&self, selector: &Selector) -> Vec<Element> {
        self.node
            .descendants()
            .into_iter()
            .filter(|n| selector.matches(n))
            .filter_map(Element::new)
            .collect()
    }

    /// Check if element matches a selector
    pub fn matches(&self, selector: &str) -> bool {
        Selector::parse(selector)
            .map(|sel| sel.matches(&self.node))
            .unwrap_or(false)
    }

    /// Closest inclusive ancestor matching a selector
    pub fn closest(&self, selector: &str) -> Option<Element> {
        let sel = Selector::parse(selector).ok()?;
        let mut current = Some(self.clone());
        while let Some(element) = current {
            if sel.matches(&element.node) {
                return Some(element);
            }
            current = element.parent_element();
        }
        None
    }

    /// Whether the element is rendered: no `hidden` attribute and no
    /// `display: none` on itself or an ancestor
    pub fn is_visible(&self) -> bool {
        let mut current = Some(self.clone());
        while let Some(element) = current {
            if element.is_hidden_self() {
                return false;
            }
            current = element.parent_element();
        }
        true
    }

    fn is_hidden_self(&self) -> bool {
        self.has_attribute("hidden")
            || self
                .style_declarations()
                .get("display")
                .map(|v| v.eq_ignore_ascii_case("none"))
                .unwrap_or(false)
    }

    /// Reveal the element
    pub fn show(&self) {
        self.remove_attribute("hidden");
        let mut style = self.style_declarations();
        if style.remove("display").is_some() {
            self.write_style(&style);
        }
    }

    /// Hide the element with `display: none`
    pub fn hide(&self) {
        let mut style = self.style_declarations();
        style.insert("display".to_string(), "none".to_string());
        self.write_style(&style);
    }

    /// Flip visibility based on the element's own state
    pub fn toggle(&self) {
        if self.is_hidden_self() {
            self.show();
        } else {
            self.hide();
        }
    }

    fn style_declarations(&self) -> HashMap<String, String> {
        self.get_attribute("style")
            .map(|style| {
                style
                    .split(';')
                    .filter_map(|decl| decl.split_once(':'))
                    .map(|(k, v)| (k.trim().to_lowercase(), v.trim().to_string()))
                    .filter(|(k, _)| !k.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn write_style(&self, style: &HashMap<String, String>) {
        if style.is_empty() {
            self.remove_attribute("style");
            return;
        }
        let mut decls: Vec<String> = style.iter().map(|(k, v)| format!("{}: {}", k, v)).collect();
        decls.sort();
        self.set_attribute("style", decls.join("; "));
    }

    /// Current value of a form control, as a script reading `.val()` sees it.
    ///
    /// Returns `None` for elements that are not form controls.
    pub fn form_value(&self) -> Option<String> {
        match self.local_name().as_str() {
            "textarea" => Some(self.text_content()),
            "select" => Some(self.selected_option_value().unwrap_or_default()),
            "input" => {
                let kind = self
                    .get_attribute("type")
                    .unwrap_or_default()
                    .to_ascii_lowercase();
                match self.get_attribute("value") {
                    Some(v) => Some(v),
                    None if kind == "checkbox" || kind == "radio" => Some("on".to_string()),
                    None => Some(String::new()),
                }
            }
            "button" => Some(self.get_attribute("value").unwrap_or_default()),
            _ => None,
        }
    }

    fn selected_option_value(&self) -> Option<String> {
        let options = self.query_selector_all("option");
        let chosen = options
            .iter()
            .find(|o| o.has_attribute("selected"))
            .or_else(|| options.first())?;
        Some(chosen.option_value())
    }

    fn option_value(&self) -> String {
        self.get_attribute("value").unwrap_or_else(|| {
            self.text_content()
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
        })
    }

    /// Set the value of a form control
    pub fn set_value(&self, value: impl Into<String>) {
        let value = value.into();
        match self.local_name().as_str() {
            "input" | "button" => self.set_attribute("value", value),
            "textarea" => self.node.set_text_content(value),
            "select" => {
                for option in self.query_selector_all("option") {
                    if option.option_value() == value {
                        option.set_attribute("selected", "");
                    } else {
                        option.remove_attribute("selected");
                    }
                }
            }
            _ => {}
        }
    }

    pub fn href(&self) -> Option<String> {
        self.get_attribute("href")
    }

    /// The enclosing form, if any
    pub fn form(&self) -> Option<Element> {
        self.closest("form")
    }
}

impl std::ops::Deref for Element {
    type Target = Node;

    fn deref(&self) -> &Self::Target {
        &self.node
    }
}
