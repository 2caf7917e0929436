//! Fragment cloner and sequence stamper

use stamper_dom::{DomTree, NodeId, Selector};

use crate::directives;
use crate::error::{Result, StamperError};

/// `root` itself (if it matches) followed by its matching descendants
pub(crate) fn select_inclusive(tree: &DomTree, root: NodeId, selector: &Selector) -> Vec<NodeId> {
    let mut found = Vec::new();
    if tree.matches(root, selector) {
        found.push(root);
    }
    found.extend(tree.query_selector_all(root, selector));
    found
}

/// Deep-clone a template's content into a detached fragment and number its
/// sequence markers with `current_index + 1`
pub fn clone_template(tree: &mut DomTree, template: NodeId, current_index: usize) -> Result<NodeId> {
    let content = tree
        .template_content(template)
        .ok_or_else(|| StamperError::InvalidTemplate(format!("{} is not a template element", template)))?;
    let fragment = tree.clone_node(content, true)?;
    stamp_sequences(tree, fragment, current_index)?;
    Ok(fragment)
}

/// Zero-padded display number: width is the count of `0`s in `pattern`
pub fn sequence_text(pattern: &str, number: usize) -> String {
    let width = pattern.chars().filter(|&c| c == '0').count();
    format!("{:0>width$}", number, width = width)
}

/// Set the text of every sequence-marked element under (and including)
/// `root`. Nothing is written unless every marker has a pattern.
pub fn stamp_sequences(tree: &mut DomTree, root: NodeId, current_index: usize) -> Result<usize> {
    let marked = select_inclusive(tree, root, &Selector::has_attr(directives::SEQUENCE));

    let mut stamps = Vec::with_capacity(marked.len());
    for &el in &marked {
        match tree.get_attribute(el, directives::SEQUENCE) {
            Some(pattern) if !pattern.is_empty() => {
                stamps.push((el, sequence_text(pattern, current_index + 1)));
            }
            _ => {
                return Err(StamperError::MissingAttribute {
                    directive: directives::SEQUENCE,
                });
            }
        }
    }

    for (el, text) in &stamps {
        tree.set_text_content(*el, text)?;
    }
    Ok(stamps.len())
}
