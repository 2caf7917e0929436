//! HTML5 Parser implementation
//!
//! Uses html5ever's RcDom and converts it to the arena DOM. `<template>`
//! contents are moved into the template's inert content fragment.

use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData as RcNodeData, RcDom};
use stamper_dom::{Document, DomTree, NodeId};

use crate::ParseError;

/// HTML5 parser
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlParser;

impl HtmlParser {
    /// Create a new HTML parser
    pub fn new() -> Self {
        Self
    }

    /// Parse HTML string into a Document
    pub fn parse(&self, html: &str) -> Result<Document, ParseError> {
        self.parse_with_url(html, "about:blank")
    }

    /// Parse HTML with a base URL
    pub fn parse_with_url(&self, html: &str, url: &str) -> Result<Document, ParseError> {
        tracing::debug!("Parsing HTML document: {}", url);

        let dom = parse_document(RcDom::default(), Default::default())
            .from_utf8()
            .read_from(&mut html.as_bytes())?;

        let mut document = Document::empty(url);
        self.convert_node(&dom.document, document.tree_mut(), NodeId::ROOT)?;
        document.finalize();

        tracing::debug!("Parsed {} nodes", document.tree().len());
        Ok(document)
    }

    /// Convert an RcDom node (and its subtree) under `parent`
    fn convert_node(&self, handle: &Handle, tree: &mut DomTree, parent: NodeId) -> Result<(), ParseError> {
        match &handle.data {
            RcNodeData::Document => {
                self.convert_children(handle, tree, parent)?;
            }
            RcNodeData::Doctype { name, .. } => {
                let id = tree.create_doctype(name);
                tree.append_child(parent, id)?;
            }
            RcNodeData::Text { contents } => {
                let text = contents.borrow();
                if !text.trim().is_empty() {
                    let id = tree.create_text(&text);
                    tree.append_child(parent, id)?;
                }
            }
            RcNodeData::Comment { contents } => {
                let id = tree.create_comment(contents);
                tree.append_child(parent, id)?;
            }
            RcNodeData::Element {
                name,
                attrs,
                template_contents,
                ..
            } => {
                let id = tree.create_element(&name.local);
                for attr in attrs.borrow().iter() {
                    tree.set_attribute(id, &attr.name.local, &attr.value)?;
                }
                tree.append_child(parent, id)?;

                if let (Some(contents), Some(fragment)) =
                    (template_contents.borrow().as_ref(), tree.template_content(id))
                {
                    self.convert_children(contents, tree, fragment)?;
                }
                self.convert_children(handle, tree, id)?;
            }
            RcNodeData::ProcessingInstruction { .. } => {
                // Not meaningful in HTML documents
            }
        }
        Ok(())
    }

    fn convert_children(&self, handle: &Handle, tree: &mut DomTree, parent: NodeId) -> Result<(), ParseError> {
        for child in handle.children.borrow().iter() {
            self.convert_node(child, tree, parent)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stamper_dom::Selector;

    #[test]
    fn test_parse_simple() {
        let html = "<html><head><title>Test</title></head><body><p>Hello</p></body></html>";
        let doc = HtmlParser::new().parse(html).unwrap();

        assert!(doc.tree().len() > 1, "Expected more than 1 node, got {}", doc.tree().len());
        assert_eq!(doc.title(), "Test");
    }

    #[test]
    fn test_parse_fragment_is_wrapped() {
        let doc = HtmlParser::new().parse("<div><span>Text</span></div>").unwrap();

        // Even fragments get wrapped in html/head/body by html5ever
        let body = doc.body();
        assert!(body.is_valid());
        let div = doc.tree().element_children(body)[0];
        assert_eq!(doc.tree().tag_name(div), Some("div"));
        assert_eq!(doc.tree().text_content(div), "Text");
    }

    #[test]
    fn test_template_content_is_inert() {
        let html = r#"<template s-temp="mock"><div s-sequence="00">n</div></template>"#;
        let doc = HtmlParser::new().parse(html).unwrap();
        let tree = doc.tree();

        let template = doc.query_selector(&Selector::attr_eq("s-temp", "mock")).unwrap();
        assert_eq!(tree.children(template).count(), 0);
        // the template's content does not show up in document queries
        assert!(doc.query_selector(&Selector::has_attr("s-sequence")).is_none());

        let content = tree.template_content(template).unwrap();
        let div = tree.element_children(content)[0];
        assert_eq!(tree.get_attribute(div, "s-sequence"), Some("00"));
    }

    #[test]
    fn test_whitespace_text_dropped() {
        let doc = HtmlParser::new().parse("<ul>\n  <li>a</li>\n  <li>b</li>\n</ul>").unwrap();
        let ul = doc.query_selector(&Selector::Tag("ul".into())).unwrap();
        assert_eq!(doc.tree().children(ul).count(), 2);
    }
}
