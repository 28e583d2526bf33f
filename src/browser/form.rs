// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Form serialization and native submission

use indexmap::IndexMap;
use reqwest::Method;
use serde::Serialize;
use url::Url;

use crate::dom::Element;
use crate::error::{Error, ErrorContext, Result};
use crate::http::Request;

/// Name to value mapping of a form's controls at one moment.
///
/// Keeps first-seen order; a later control with the same name replaces the
/// value but not the position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FormSnapshot(IndexMap<String, String>);

impl FormSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read every named input-capable descendant of `form`
    pub fn capture(form: &Element) -> Self {
        Self::collect(form, |_| true)
    }

    /// Only the controls a browser would send on native submission:
    /// enabled, not buttons, and checked if checkable
    pub fn capture_successful(form: &Element) -> Self {
        Self::collect(form, |control| {
            if control.has_attribute("disabled") {
                return false;
            }
            let kind = control
                .get_attribute("type")
                .unwrap_or_default()
                .to_ascii_lowercase();
            match control.local_name().as_str() {
                "button" => false,
                "input" => match kind.as_str() {
                    "submit" | "reset" | "button" | "image" | "file" => false,
                    "checkbox" | "radio" => control.has_attribute("checked"),
                    _ => true,
                },
                _ => true,
            }
        })
    }

    fn collect(form: &Element, include: impl Fn(&Element) -> bool) -> Self {
        let mut snapshot = Self::new();
        for control in form.query_selector_all(":input") {
            let Some(name) = control.get_attribute("name") else {
                continue;
            };
            if !include(&control) {
                continue;
            }
            if let Some(value) = control.form_value() {
                snapshot.insert(name, value);
            }
        }
        snapshot
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, String> {
        self.0.iter()
    }

    /// urlencoded body, pairs in snapshot order
    pub fn to_urlencoded(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.iter())
            .finish()
    }
}

impl<'a> IntoIterator for &'a FormSnapshot {
    type Item = (&'a String, &'a String);
    type IntoIter = indexmap::map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormSnapshot {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut snapshot = Self::new();
        for (k, v) in iter {
            snapshot.insert(k, v);
        }
        snapshot
    }
}

/// Submission attributes of a form element
#[derive(Debug, Clone)]
pub struct Form {
    /// Form ID
    pub id: Option<String>,
    /// `action` attribute as written
    pub action: Option<String>,
    /// HTTP method, upper-case
    pub method: String,
}

impl Form {
    pub fn from_element(element: &Element) -> Self {
        Self {
            id: element.id(),
            action: element.get_attribute("action"),
            method: element
                .get_attribute("method")
                .unwrap_or_else(|| "GET".to_string())
                .to_uppercase(),
        }
    }

    /// Where the form submits to, exactly as written; a missing or empty
    /// action means the document itself
    pub fn target(&self, document_url: &Url) -> String {
        match self.action.as_deref() {
            Some(action) if !action.is_empty() => action.to_string(),
            _ => document_url.to_string(),
        }
    }

    /// Resolve the action against the document URL
    pub fn resolve_action(&self, document_url: Option<&Url>) -> Result<Url> {
        let base = document_url
            .ok_or_else(|| Error::form_submission("document has no URL to resolve the form action"))
            .for_action(self.action.as_deref().unwrap_or_default())?;
        Ok(base.join(&self.target(base))?)
    }

    /// The request a browser sends when the form is submitted natively
    pub fn native_request(&self, element: &Element, document_url: Option<&Url>) -> Result<Request> {
        let mut url = self.resolve_action(document_url)?;
        let data = FormSnapshot::capture_successful(element);

        if self.method == "POST" {
            Ok(Request::new(Method::POST, url.as_str())?.form(&data))
        } else {
            url.set_query(None);
            if !data.is_empty() {
                url.query_pairs_mut().extend_pairs(data.iter());
            }
            Request::get(url.as_str())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse_html;

    fn form(html: &str) -> Element {
        parse_html(html).unwrap().query_selector("form").unwrap()
    }

    #[test]
    fn test_snapshot_reads_all_named_controls() {
        let form = form(
            r#"<form class="bookmarks_form">
                <input type="hidden" name="a" value="1">
                <input type="text" name="b" value="2">
                <input type="text" value="no name">
                <button type="submit" name="go" value="add">Add</button>
            </form>"#,
        );

        let snapshot = FormSnapshot::capture(&form);
        assert_eq!(snapshot.len(), 3);
        assert_eq!(snapshot.get("a"), Some("1"));
        assert_eq!(snapshot.get("b"), Some("2"));
        assert_eq!(snapshot.get("go"), Some("add"));
        assert_eq!(snapshot.to_urlencoded(), "a=1&b=2&go=add");
        assert_eq!(
            serde_json::to_value(&snapshot).unwrap(),
            serde_json::json!({"a": "1", "b": "2", "go": "add"})
        );
    }

    #[test]
    fn test_duplicate_names_keep_first_position() {
        let form = form(
            r#"<form>
                <input name="x" value="first"><input name="y" value="y"><input name="x" value="last">
            </form>"#,
        );

        let snapshot = FormSnapshot::capture(&form);
        let pairs: Vec<(&str, &str)> = snapshot.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
        assert_eq!(pairs, vec![("x", "last"), ("y", "y")]);
    }

    #[test]
    fn test_snapshot_sees_current_values() {
        let form = form(r#"<form><textarea name="note">old</textarea></form>"#);
        form.query_selector("textarea").unwrap().set_value("new");
        assert_eq!(FormSnapshot::capture(&form).get("note"), Some("new"));
    }

    #[test]
    fn test_successful_controls() {
        let form = form(
            r#"<form>
                <input name="q" value="rust">
                <input name="off" disabled value="1">
                <input type="checkbox" name="c1">
                <input type="checkbox" name="c2" checked>
                <input type="submit" name="s" value="Go">
            </form>"#,
        );

        let snapshot = FormSnapshot::capture_successful(&form);
        assert_eq!(snapshot.to_urlencoded(), "q=rust&c2=on");
    }

    #[test]
    fn test_target_keeps_action_as_written() {
        let doc_url = Url::parse("https://example.com/article/7/").unwrap();

        let padded = form(r#"<form action=" /bookmarks/add/ "></form>"#);
        assert_eq!(Form::from_element(&padded).target(&doc_url), " /bookmarks/add/ ");

        let empty = form(r#"<form action=""></form>"#);
        assert_eq!(Form::from_element(&empty).target(&doc_url), doc_url.as_str());

        // Resolution still lands on the trimmed path
        let resolved = Form::from_element(&padded).resolve_action(Some(&doc_url)).unwrap();
        assert_eq!(resolved.as_str(), "https://example.com/bookmarks/add/");
    }

    #[test]
    fn test_target_and_native_request() {
        let doc_url = Url::parse("https://example.com/article/7/").unwrap();

        let element = form(r#"<form action="/search" method="get"><input name="q" value="a b"></form>"#);
        let request = Form::from_element(&element)
            .native_request(&element, Some(&doc_url))
            .unwrap();
        assert_eq!(request.method, Method::GET);
        assert_eq!(request.url.as_str(), "https://example.com/search?q=a+b");

        let element = form(r#"<form method="post"><input name="a" value="1"></form>"#);
        let parsed = Form::from_element(&element);
        assert_eq!(parsed.target(&doc_url), doc_url.as_str());
        let request = parsed.native_request(&element, Some(&doc_url)).unwrap();
        assert_eq!(request.method, Method::POST);
        assert_eq!(request.url, doc_url);
        assert_eq!(request.body.as_deref(), Some(&b"a=1"[..]));

        assert!(matches!(
            parsed.resolve_action(None),
            Err(Error::FormSubmission { .. })
        ));
    }
}
