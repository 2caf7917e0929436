//! DOM Tree (arena-based allocation)
//!
//! Core node manipulation: appendChild, insertBefore, remove, cloneNode,
//! attribute access, textContent and selector queries.

use crate::{Attribute, DomError, DomResult, Node, NodeData, NodeId, Selector};

/// Arena-based DOM tree
///
/// Slot 0 always holds the document node. Removing a node only unlinks it,
/// so ids handed out earlier stay valid for the lifetime of the tree.
#[derive(Debug, Clone)]
pub struct DomTree {
    nodes: Vec<Node>,
}

impl DomTree {
    /// Create a tree holding only the document node
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::document()],
        }
    }

    /// The document node
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by ID
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        if !id.is_valid() {
            return None;
        }
        self.nodes.get(id.index())
    }

    /// Get a mutable node by ID
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        if !id.is_valid() {
            return None;
        }
        self.nodes.get_mut(id.index())
    }

    fn node(&self, id: NodeId) -> DomResult<&Node> {
        self.get(id).ok_or(DomError::NotFound(id))
    }

    /// Number of nodes in the arena, detached ones included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the arena is empty (never true once constructed)
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Slots are never reused: a removed node stays in the arena, detached,
    /// so ids held elsewhere keep pointing at it.
    fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    // ------------------------------------------------------------------
    // Node creation
    // ------------------------------------------------------------------

    /// Create a detached element. A `template` also gets its content fragment.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        let id = self.push(Node::element(tag));
        if tag.eq_ignore_ascii_case("template") {
            let content = self.push(Node::fragment());
            if let Some(elem) = self.nodes[id.index()].as_element_mut() {
                elem.template_content = Some(content);
            }
        }
        id
    }

    /// Create a detached text node
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push(Node::text(text))
    }

    /// Create a detached comment node
    pub fn create_comment(&mut self, text: &str) -> NodeId {
        self.push(Node::comment(text))
    }

    /// Create an empty document fragment
    pub fn create_fragment(&mut self) -> NodeId {
        self.push(Node::fragment())
    }

    /// Create a detached doctype node
    pub fn create_doctype(&mut self, name: &str) -> NodeId {
        self.push(Node::doctype(name))
    }

    // ------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------

    /// Parent of a node, if attached
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).map(|n| n.parent).filter(|p| p.is_valid())
    }

    /// Child nodes in order
    pub fn children(&self, id: NodeId) -> Children<'_> {
        Children {
            tree: self,
            next: self.get(id).map_or(NodeId::NONE, |n| n.first_child),
        }
    }

    /// Element children in order
    pub fn element_children(&self, id: NodeId) -> Vec<NodeId> {
        self.children(id).filter(|&c| self.is_element(c)).collect()
    }

    /// All descendants in pre-order, excluding `id` itself.
    ///
    /// Template content is not part of the tree and is never visited.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).collect();
        stack.reverse();
        while let Some(current) = stack.pop() {
            out.push(current);
            let mut kids: Vec<NodeId> = self.children(current).collect();
            kids.reverse();
            stack.extend(kids);
        }
        out
    }

    /// Ancestors from the parent upwards
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut current = self.parent(id);
        while let Some(p) = current {
            out.push(p);
            current = self.parent(p);
        }
        out
    }

    /// Whether `ancestor` is `node` or one of its ancestors
    pub fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        ancestor == node || self.ancestors(node).contains(&ancestor)
    }

    /// Whether the node is reachable from the document node
    pub fn is_connected(&self, id: NodeId) -> bool {
        self.is_inclusive_ancestor(NodeId::ROOT, id)
    }

    // ------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------

    /// Append a child node (fragments move their children)
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<NodeId> {
        self.insert_before(parent, child, None)
    }

    /// Insert `new_child` before `reference`, or append when `None`
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        new_child: NodeId,
        reference: Option<NodeId>,
    ) -> DomResult<NodeId> {
        let parent_node = self.node(parent)?;
        if !matches!(
            parent_node.data,
            NodeData::Document | NodeData::DocumentFragment | NodeData::Element(_)
        ) {
            return Err(DomError::InvalidNodeType(parent));
        }
        let (child_is_fragment, child_next) = {
            let child_node = self.node(new_child)?;
            (
                matches!(child_node.data, NodeData::DocumentFragment),
                child_node.next_sibling,
            )
        };
        if let Some(r) = reference {
            if self.parent(r) != Some(parent) {
                return Err(DomError::NotAChild { parent, child: r });
            }
        }

        if child_is_fragment {
            let kids: Vec<NodeId> = self.children(new_child).collect();
            for kid in kids {
                self.insert_before(parent, kid, reference)?;
            }
            return Ok(new_child);
        }

        if self.is_inclusive_ancestor(new_child, parent) {
            return Err(DomError::HierarchyRequest {
                parent,
                child: new_child,
            });
        }

        let reference = if reference == Some(new_child) {
            Some(child_next).filter(|n| n.is_valid())
        } else {
            reference
        };

        self.detach(new_child);

        let (prev, next) = match reference {
            Some(r) => (self.nodes[r.index()].prev_sibling, r),
            None => (self.nodes[parent.index()].last_child, NodeId::NONE),
        };
        {
            let node = &mut self.nodes[new_child.index()];
            node.parent = parent;
            node.prev_sibling = prev;
            node.next_sibling = next;
        }
        if prev.is_valid() {
            self.nodes[prev.index()].next_sibling = new_child;
        } else {
            self.nodes[parent.index()].first_child = new_child;
        }
        if next.is_valid() {
            self.nodes[next.index()].prev_sibling = new_child;
        } else {
            self.nodes[parent.index()].last_child = new_child;
        }
        Ok(new_child)
    }

    /// Remove a child node from a specific parent
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<NodeId> {
        if self.parent(child) != Some(parent) {
            return Err(DomError::NotAChild { parent, child });
        }
        self.detach(child);
        Ok(child)
    }

    /// Detach a node from wherever it is (`Element.remove()`)
    pub fn remove(&mut self, id: NodeId) -> DomResult<NodeId> {
        self.node(id)?;
        self.detach(id);
        Ok(id)
    }

    fn detach(&mut self, id: NodeId) {
        let (parent, prev, next) = {
            let node = &self.nodes[id.index()];
            (node.parent, node.prev_sibling, node.next_sibling)
        };
        if !parent.is_valid() {
            return;
        }
        if prev.is_valid() {
            self.nodes[prev.index()].next_sibling = next;
        } else {
            self.nodes[parent.index()].first_child = next;
        }
        if next.is_valid() {
            self.nodes[next.index()].prev_sibling = prev;
        } else {
            self.nodes[parent.index()].last_child = prev;
        }
        let node = &mut self.nodes[id.index()];
        node.parent = NodeId::NONE;
        node.prev_sibling = NodeId::NONE;
        node.next_sibling = NodeId::NONE;
    }

    /// Clone a node; a deep clone copies children and template content
    pub fn clone_node(&mut self, id: NodeId, deep: bool) -> DomResult<NodeId> {
        let data = self.node(id)?.data.clone();
        let copy = match data {
            NodeData::Element(mut elem) => {
                let content = elem.template_content.take();
                let copy = self.push(Node::with_data(NodeData::Element(elem)));
                if let Some(content) = content {
                    let cloned = if deep {
                        self.clone_node(content, true)?
                    } else {
                        self.create_fragment()
                    };
                    if let Some(elem) = self.nodes[copy.index()].as_element_mut() {
                        elem.template_content = Some(cloned);
                    }
                }
                copy
            }
            other => self.push(Node::with_data(other)),
        };
        if deep {
            let kids: Vec<NodeId> = self.children(id).collect();
            for kid in kids {
                let cloned = self.clone_node(kid, true)?;
                self.append_child(copy, cloned)?;
            }
        }
        Ok(copy)
    }

    // ------------------------------------------------------------------
    // Elements and attributes
    // ------------------------------------------------------------------

    /// Whether the node is an element
    pub fn is_element(&self, id: NodeId) -> bool {
        self.get(id).is_some_and(Node::is_element)
    }

    /// Lowercase tag name of an element
    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.get(id)?.as_element().map(|e| e.tag.as_str())
    }

    /// Get an attribute value
    pub fn get_attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.get(id)?.as_element()?.get_attr(name)
    }

    /// Check if an attribute exists
    pub fn has_attribute(&self, id: NodeId, name: &str) -> bool {
        self.get_attribute(id, name).is_some()
    }

    /// Set an attribute on an element
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> DomResult<()> {
        let elem = self
            .get_mut(id)
            .ok_or(DomError::NotFound(id))?
            .as_element_mut()
            .ok_or(DomError::InvalidNodeType(id))?;
        elem.set_attr(name, value);
        Ok(())
    }

    /// Remove an attribute, returning the old value
    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> DomResult<Option<String>> {
        let elem = self
            .get_mut(id)
            .ok_or(DomError::NotFound(id))?
            .as_element_mut()
            .ok_or(DomError::InvalidNodeType(id))?;
        Ok(elem.remove_attr(name))
    }

    /// All attributes of an element (empty for other nodes)
    pub fn attributes(&self, id: NodeId) -> &[Attribute] {
        self.get(id)
            .and_then(Node::as_element)
            .map_or(&[][..], |e| e.attrs.as_slice())
    }

    /// Content fragment of a `<template>` element
    pub fn template_content(&self, id: NodeId) -> Option<NodeId> {
        self.get(id)?.as_element()?.template_content
    }

    // ------------------------------------------------------------------
    // Text
    // ------------------------------------------------------------------

    /// Concatenated text of all descendant text nodes
    pub fn text_content(&self, id: NodeId) -> String {
        if let Some(text) = self.get(id).and_then(Node::as_text) {
            return text.to_string();
        }
        self.descendants(id)
            .into_iter()
            .filter_map(|d| self.get(d).and_then(Node::as_text))
            .collect()
    }

    /// Replace all children by a single text node
    pub fn set_text_content(&mut self, id: NodeId, text: &str) -> DomResult<()> {
        let node = self.get_mut(id).ok_or(DomError::NotFound(id))?;
        if let NodeData::Text(content) = &mut node.data {
            *content = text.to_string();
            return Ok(());
        }
        let kids: Vec<NodeId> = self.children(id).collect();
        for kid in kids {
            self.detach(kid);
        }
        if !text.is_empty() {
            let text_node = self.create_text(text);
            self.append_child(id, text_node)?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Check if an element matches a selector
    pub fn matches(&self, id: NodeId, selector: &Selector) -> bool {
        self.get(id)
            .and_then(Node::as_element)
            .is_some_and(|e| selector.matches(e))
    }

    /// First descendant matching the selector
    pub fn query_selector(&self, root: NodeId, selector: &Selector) -> Option<NodeId> {
        self.descendants(root)
            .into_iter()
            .find(|&d| self.matches(d, selector))
    }

    /// All descendants matching the selector, in document order
    pub fn query_selector_all(&self, root: NodeId, selector: &Selector) -> Vec<NodeId> {
        self.descendants(root)
            .into_iter()
            .filter(|&d| self.matches(d, selector))
            .collect()
    }
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over the children of a node
pub struct Children<'a> {
    tree: &'a DomTree,
    next: NodeId,
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        if !self.next.is_valid() {
            return None;
        }
        let current = self.next;
        self.next = self.tree.get(current).map_or(NodeId::NONE, |n| n.next_sibling);
        Some(current)
    }
}
