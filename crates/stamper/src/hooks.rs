//! Lifecycle hooks
//!
//! Hooks run synchronously at four points of the item lifecycle. Markup hooks
//! are compiled from attribute code (see [`crate::sandbox`]); programmatic
//! hooks are closures registered through the page. Both receive a
//! [`HookContext`].

use std::collections::HashMap;
use std::fmt;

use stamper_dom::{DomTree, Event, NodeId};

use crate::directives;
use crate::host::Host;

/// Point in the lifecycle a hook runs at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookPhase {
    PreAdd,
    PostAdd,
    PreDelete,
    PostDelete,
}

impl HookPhase {
    /// Attribute carrying the markup hook for this phase
    pub fn attr(self) -> &'static str {
        match self {
            HookPhase::PreAdd => directives::PREADD,
            HookPhase::PostAdd => directives::POSTADD,
            HookPhase::PreDelete => directives::PREDELETE,
            HookPhase::PostDelete => directives::POSTDELETE,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HookPhase::PreAdd => "preadd",
            HookPhase::PostAdd => "postadd",
            HookPhase::PreDelete => "predelete",
            HookPhase::PostDelete => "postdelete",
        }
    }
}

impl fmt::Display for HookPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything a hook may look at or touch
pub struct HookContext<'a> {
    pub tree: &'a mut DomTree,
    pub host: &'a mut dyn Host,
    /// Counter value at the time of the call (hooks cannot change it)
    pub current_index: usize,
    pub root: NodeId,
    pub template: NodeId,
    pub trigger: NodeId,
    pub container: NodeId,
    /// Affected item elements
    pub items: &'a [NodeId],
    /// Triggering event, absent for post-init callbacks
    pub event: Option<&'a Event>,
}

impl HookContext<'_> {
    /// Positional arguments in [`directives::HOOK_PARAMS`] order
    pub fn args(&self) -> Vec<HookValue> {
        vec![
            HookValue::Int(self.current_index as i64),
            HookValue::Element(self.root),
            HookValue::Element(self.template),
            HookValue::Element(self.trigger),
            HookValue::Element(self.container),
            self.items.first().map_or(HookValue::Null, |&id| HookValue::Element(id)),
            self.event.map_or(HookValue::Null, |e| HookValue::Event(e.clone())),
        ]
    }
}

/// Value passed to or computed inside a hook
#[derive(Debug, Clone)]
pub enum HookValue {
    Null,
    Int(i64),
    Str(String),
    Element(NodeId),
    Event(Event),
}

impl HookValue {
    /// Element handle, if this value is one
    pub fn as_element(&self) -> Option<NodeId> {
        match self {
            HookValue::Element(id) => Some(*id),
            _ => None,
        }
    }

    /// String form used for messages and attribute values
    pub fn render(&self, tree: &DomTree) -> String {
        match self {
            HookValue::Null => "null".to_string(),
            HookValue::Int(n) => n.to_string(),
            HookValue::Str(s) => s.clone(),
            HookValue::Element(id) => match tree.tag_name(*id) {
                Some(tag) => format!("<{}>", tag),
                None => format!("<node {}>", id),
            },
            HookValue::Event(event) => event.event_type.as_str().to_string(),
        }
    }
}

/// Closure run at a lifecycle phase
pub type HookCallback = Box<dyn FnMut(&mut HookContext<'_>) -> anyhow::Result<()>>;

/// Closure run once a scope finished initializing
pub type PostInitCallback = HookCallback;

/// Named callback referenced from markup hooks
pub type NamedCallback = Box<dyn FnMut(&mut HookContext<'_>, &[HookValue]) -> anyhow::Result<()>>;

/// Programmatic hooks of a scope
#[derive(Default)]
pub struct Hooks {
    pub preadd: Option<HookCallback>,
    pub postadd: Option<HookCallback>,
    pub predelete: Option<HookCallback>,
    pub postdelete: Option<HookCallback>,
}

impl Hooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn preadd<F>(mut self, f: F) -> Self
    where
        F: FnMut(&mut HookContext<'_>) -> anyhow::Result<()> + 'static,
    {
        self.preadd = Some(Box::new(f));
        self
    }

    pub fn postadd<F>(mut self, f: F) -> Self
    where
        F: FnMut(&mut HookContext<'_>) -> anyhow::Result<()> + 'static,
    {
        self.postadd = Some(Box::new(f));
        self
    }

    pub fn predelete<F>(mut self, f: F) -> Self
    where
        F: FnMut(&mut HookContext<'_>) -> anyhow::Result<()> + 'static,
    {
        self.predelete = Some(Box::new(f));
        self
    }

    pub fn postdelete<F>(mut self, f: F) -> Self
    where
        F: FnMut(&mut HookContext<'_>) -> anyhow::Result<()> + 'static,
    {
        self.postdelete = Some(Box::new(f));
        self
    }

    /// Hook registered for a phase
    pub fn get_mut(&mut self, phase: HookPhase) -> Option<&mut HookCallback> {
        match phase {
            HookPhase::PreAdd => self.preadd.as_mut(),
            HookPhase::PostAdd => self.postadd.as_mut(),
            HookPhase::PreDelete => self.predelete.as_mut(),
            HookPhase::PostDelete => self.postdelete.as_mut(),
        }
    }

    /// Take over the hooks set in `other`, keeping the rest
    pub fn merge(&mut self, other: Hooks) {
        if other.preadd.is_some() {
            self.preadd = other.preadd;
        }
        if other.postadd.is_some() {
            self.postadd = other.postadd;
        }
        if other.predelete.is_some() {
            self.predelete = other.predelete;
        }
        if other.postdelete.is_some() {
            self.postdelete = other.postdelete;
        }
    }

    /// Number of phases with a hook
    pub fn len(&self) -> usize {
        [&self.preadd, &self.postadd, &self.predelete, &self.postdelete]
            .iter()
            .filter(|h| h.is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("preadd", &self.preadd.is_some())
            .field("postadd", &self.postadd.is_some())
            .field("predelete", &self.predelete.is_some())
            .field("postdelete", &self.postdelete.is_some())
            .finish()
    }
}

/// Callbacks markup hooks can call by name
#[derive(Default)]
pub struct CallbackTable {
    callbacks: HashMap<String, NamedCallback>,
}

impl CallbackTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a callback
    pub fn register<F>(&mut self, name: &str, f: F)
    where
        F: FnMut(&mut HookContext<'_>, &[HookValue]) -> anyhow::Result<()> + 'static,
    {
        if self.callbacks.insert(name.to_string(), Box::new(f)).is_some() {
            tracing::debug!(target: "stamper", "callback `{}` replaced", name);
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.callbacks.contains_key(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut NamedCallback> {
        self.callbacks.get_mut(name)
    }

    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }
}

impl fmt::Debug for CallbackTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.callbacks.keys().collect();
        names.sort();
        f.debug_struct("CallbackTable").field("names", &names).finish()
    }
}
