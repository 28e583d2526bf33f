// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTML parser using html5ever

use html5ever::tendril::TendrilSink;
use html5ever::tree_builder::TreeBuilderOpts;
use html5ever::{
    local_name, namespace_url, ns, parse_document, parse_fragment, ParseOpts, QualName,
};
use markup5ever_rcdom::{Handle, NodeData as RcNodeData, RcDom};
use url::Url;

use super::document::Document;
use super::element::Element;
use super::node::{NodeData, NodeId, NodeStore};
use crate::error::{Error, Result};

/// Parse HTML string into a Document
pub fn parse_html(html: &str) -> Result<Document> {
    parse_html_with_url(html, None)
}

/// Parse HTML string with a document URL
pub fn parse_html_with_url(html: &str, url: Option<Url>) -> Result<Document> {
    let opts = ParseOpts {
        tree_builder: TreeBuilderOpts {
            drop_doctype: false,
            ..Default::default()
        },
        ..Default::default()
    };

    let dom = parse_document(RcDom::default(), opts)
        .from_utf8()
        .read_from(&mut html.as_bytes())
        .map_err(|e| Error::HtmlParse(e.to_string()))?;

    let doc = match url {
        Some(u) => Document::with_url(u),
        None => Document::new(),
    };

    let root_id = doc.root().id;
    let converter = DomConverter::new(&doc.nodes);
    for child in dom.document.children.borrow().iter() {
        converter.convert_node(child, root_id);
    }

    if let Some(title_elem) = doc.query_selector("title") {
        doc.set_title(title_elem.text_content().trim());
    }

    tracing::trace!(bytes = html.len(), "Parsed document");
    Ok(doc)
}

/// Parse an HTML fragment in a `<div>` context and append the resulting
/// nodes to `parent`. Returns the top-level elements that were added.
pub(crate) fn append_fragment(doc: &Document, parent: &Element, html: &str) -> Result<Vec<Element>> {
    let context = QualName::new(None, ns!(html), local_name!("div"));
    let dom = parse_fragment(RcDom::default(), ParseOpts::default(), context, Vec::new())
        .from_utf8()
        .read_from(&mut html.as_bytes())
        .map_err(|e| Error::HtmlParse(e.to_string()))?;

    // Fragment parsing yields a synthetic <html> wrapper around the content
    let wrapper = dom
        .document
        .children
        .borrow()
        .first()
        .cloned()
        .ok_or_else(|| Error::HtmlParse("empty fragment".to_string()))?;

    let converter = DomConverter::new(&doc.nodes);
    let added = wrapper
        .children
        .borrow()
        .iter()
        .filter_map(|child| converter.convert_node(child, parent.node.id))
        .filter_map(|id| Element::from_id(id, doc.nodes.clone()))
        .collect();

    Ok(added)
}

/// Copies an html5ever tree into a document's node store
struct DomConverter<'a> {
    nodes: &'a NodeStore,
}

impl<'a> DomConverter<'a> {
    fn new(nodes: &'a NodeStore) -> Self {
        Self { nodes }
    }

    fn convert_node(&self, handle: &Handle, parent_id: NodeId) -> Option<NodeId> {
        let mut data = match handle.data {
            RcNodeData::Document | RcNodeData::ProcessingInstruction { .. } => return None,
            RcNodeData::Doctype { .. } => NodeData::doctype(),
            RcNodeData::Text { ref contents } => {
                let text = contents.borrow().to_string();
                // Drop formatting whitespace but keep single spaces
                if text.trim().is_empty() && text.len() > 1 {
                    return None;
                }
                NodeData::text(text)
            }
            RcNodeData::Comment { ref contents } => NodeData::comment(contents.to_string()),
            RcNodeData::Element {
                ref name,
                ref attrs,
                ..
            } => {
                let mut data = NodeData::element(name.local.to_string());
                for attr in attrs.borrow().iter() {
                    data.attributes
                        .insert(attr.name.local.to_string(), attr.value.to_string());
                }
                data
            }
        };

        let node_id = NodeId::new();
        data.parent = Some(parent_id);
        {
            let mut nodes = self.nodes.write();
            nodes.insert(node_id, data);
            if let Some(parent) = nodes.get_mut(&parent_id) {
                parent.children.push(node_id);
            }
        }

        for child in handle.children.borrow().iter() {
            self.convert_node(child, node_id);
        }

        Some(node_id)
    }
}
