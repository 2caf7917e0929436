//! Index rewriter
//!
//! Elements marked with `s-index="attr1, attr2"` get the listed attributes
//! rewritten through [`tokens::substitute`]. Nested `<template>` contents
//! are rewritten as well.

use stamper_dom::{DomTree, NodeId, Selector};

use crate::directives;
use crate::error::Result;
use crate::fragment::select_inclusive;
use crate::tokens;

/// Index-marked elements under `root`, including inside nested templates
fn collect_marked(tree: &DomTree, root: NodeId, out: &mut Vec<NodeId>) {
    out.extend(select_inclusive(tree, root, &Selector::has_attr(directives::INDEX)));
    for template in select_inclusive(tree, root, &Selector::Tag("template".to_string())) {
        if let Some(content) = tree.template_content(template) {
            collect_marked(tree, content, out);
        }
    }
}

/// Substitute index tokens of scope `scope` in every index-marked element
/// under (and including) `root`. Returns the number of attributes changed.
pub fn stamp_index_tokens(tree: &mut DomTree, root: NodeId, scope: &str, current_index: usize) -> Result<usize> {
    let mut marked = Vec::new();
    collect_marked(tree, root, &mut marked);

    let mut rewritten = 0;
    for el in marked {
        let Some(targets) = tree.get_attribute(el, directives::INDEX).map(str::to_string) else {
            continue;
        };
        for name in targets.split(',').map(str::trim).filter(|n| !n.is_empty()) {
            let Some(value) = tree.get_attribute(el, name) else {
                continue;
            };
            let value_new = tokens::substitute(value, scope, current_index);
            if value_new != value {
                tree.set_attribute(el, name, &value_new)?;
                rewritten += 1;
            }
        }
    }

    tracing::trace!(target: "stamper", "rewrote {} index attribute(s) under {}", rewritten, root);
    Ok(rewritten)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marked(tree: &mut DomTree, tag: &str, attrs: &[(&str, &str)]) -> NodeId {
        let el = tree.create_element(tag);
        for (name, value) in attrs {
            tree.set_attribute(el, name, value).unwrap();
        }
        el
    }

    #[test]
    fn test_rewrites_listed_attributes() {
        let mut tree = DomTree::new();
        let li = marked(
            &mut tree,
            "li",
            &[
                ("s-index", "name, id"),
                ("name", "item-{{index}}"),
                ("id", "row-{{index++}}"),
                ("title", "{{index}}"),
            ],
        );

        assert_eq!(stamp_index_tokens(&mut tree, li, "mock", 3).unwrap(), 2);
        assert_eq!(tree.get_attribute(li, "name"), Some("item-3"));
        assert_eq!(tree.get_attribute(li, "id"), Some("row-4"));
        // not listed
        assert_eq!(tree.get_attribute(li, "title"), Some("{{index}}"));
    }

    #[test]
    fn test_missing_target_is_skipped() {
        let mut tree = DomTree::new();
        let ul = tree.create_element("ul");
        let li = marked(&mut tree, "li", &[("s-index", "for,,name"), ("name", "{{index--}}")]);
        tree.append_child(ul, li).unwrap();

        assert_eq!(stamp_index_tokens(&mut tree, ul, "mock", 0).unwrap(), 1);
        assert_eq!(tree.get_attribute(li, "name"), Some("-1"));
        assert!(!tree.has_attribute(li, "for"));
    }

    #[test]
    fn test_nested_template_content() {
        let mut tree = DomTree::new();
        let div = tree.create_element("div");
        let template = tree.create_element("template");
        tree.append_child(div, template).unwrap();
        let content = tree.template_content(template).unwrap();
        let inner = marked(
            &mut tree,
            "p",
            &[("s-index", "data-parent"), ("data-parent", "{{outer:index}}-{{inner:index}}")],
        );
        tree.append_child(content, inner).unwrap();

        stamp_index_tokens(&mut tree, div, "outer", 6).unwrap();
        assert_eq!(tree.get_attribute(inner, "data-parent"), Some("6-{{inner:index}}"));
    }
}
