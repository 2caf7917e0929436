//! Stamper DOM - Document Object Model
//!
//! Arena-backed DOM tree used as the substrate for the Stamper engine.
//! Nodes are addressed by [`NodeId`]; detached nodes stay in the arena.

mod node;
mod tree;
mod document;
mod operations;
mod selector;
mod events;

pub use node::{Node, NodeData, NodeType, ElementData, Attribute};
pub use tree::{Children, DomTree};
pub use document::Document;
pub use operations::{DomError, DomResult};
pub use selector::{Selector, AttrMatch};
pub use events::{Event, EventType, ListenerId, ListenerRegistry};

/// Node identifier (index into arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Document node of every tree
    pub const ROOT: NodeId = NodeId(0);

    /// Sentinel for "no node"
    pub const NONE: NodeId = NodeId(u32::MAX);

    /// Check that this id is not the sentinel
    #[inline]
    pub fn is_valid(self) -> bool {
        self != Self::NONE
    }

    /// Raw arena index
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_valid() {
            write!(f, "#{}", self.0)
        } else {
            f.write_str("#none")
        }
    }
}
