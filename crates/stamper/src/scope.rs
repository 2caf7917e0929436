//! Scope controller
//!
//! A [`Stamper`] is one root element with its template, trigger and
//! container. Initialization resolves and validates those elements, seeds
//! the items already present in the container and wires the trigger.

use std::fmt;

use stamper_dom::{DomTree, EventType, NodeId, Selector};

use crate::directives;
use crate::error::{Result, StamperError};
use crate::fragment::stamp_sequences;
use crate::hooks::{HookContext, Hooks, PostInitCallback};
use crate::index::stamp_index_tokens;
use crate::lifecycle::{Action, Env, LifecycleState};

/// Handle of a scope within its page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(pub(crate) usize);

impl ScopeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "scope#{}", self.0)
    }
}

/// Elements a scope resolved at initialization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScopeElements {
    pub template: NodeId,
    pub trigger: NodeId,
    pub container: NodeId,
}

/// One repeating-template scope
pub struct Stamper {
    pub(crate) id: ScopeId,
    pub(crate) root: NodeId,
    pub(crate) identifier: Option<String>,
    pub(crate) elements: Option<ScopeElements>,
    pub(crate) current_index: usize,
    pub(crate) state: LifecycleState,
    pub(crate) initialized: bool,
    pub(crate) hooks: Hooks,
    pub(crate) post_init: Option<PostInitCallback>,
}

impl Stamper {
    pub(crate) fn new(id: ScopeId, root: NodeId) -> Self {
        Self {
            id,
            root,
            identifier: None,
            elements: None,
            current_index: 0,
            state: LifecycleState::Idle,
            initialized: false,
            hooks: Hooks::default(),
            post_init: None,
        }
    }

    pub fn id(&self) -> ScopeId {
        self.id
    }

    /// Root element of the scope
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Scope identifier, once initialized
    pub fn identifier(&self) -> Option<&str> {
        self.identifier.as_deref()
    }

    /// Resolved template/trigger/container, once initialized
    pub fn elements(&self) -> Option<ScopeElements> {
        self.elements
    }

    /// Running counter: number of items ever seeded or added
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Identifier for log lines
    pub(crate) fn label(&self) -> String {
        match &self.identifier {
            Some(id) => id.clone(),
            None => self.id.to_string(),
        }
    }

    /// Resolve, validate, seed and wire the scope.
    ///
    /// Everything is validated before the first mutation. Initializing again
    /// rewires the trigger and the container's items without duplicating
    /// handlers; the counter and already stamped items are left alone.
    pub(crate) fn initialize(&mut self, env: &mut Env<'_>) -> Result<()> {
        let identifier = env
            .tree
            .get_attribute(self.root, directives::ROOT)
            .filter(|id| !id.is_empty())
            .ok_or(StamperError::MissingIdentifier)?
            .to_string();

        let template = find_marked(env.tree, self.root, directives::TEMPLATE, &identifier)?;
        let trigger = find_marked(env.tree, self.root, directives::TRIGGER, &identifier)?;
        let container = find_marked(env.tree, self.root, directives::CONTAINER, &identifier)?;
        validate_template(env.tree, template)?;

        let reinit = self.initialized;
        let seeded = env.tree.element_children(container);
        if !reinit {
            // stamping is all-or-nothing per child, so check every child first
            for &child in &seeded {
                check_sequences(env.tree, child)?;
            }
        }

        // container children are rewired below; items living elsewhere
        // (added from data before the trigger) keep their delete wiring
        let scope = self.id;
        let tree = &*env.tree;
        env.listeners.retain(|action| match *action {
            Action::Delete { scope: owner, item } if owner == scope => {
                tree.is_connected(item) && tree.parent(item) != Some(container)
            }
            other => other.scope() != scope,
        });
        self.identifier = Some(identifier.clone());
        self.elements = Some(ScopeElements {
            template,
            trigger,
            container,
        });

        if reinit {
            tracing::debug!(target: "stamper", scope = %identifier, "re-initializing, counter stays at {}", self.current_index);
        } else {
            for &child in &seeded {
                stamp_sequences(env.tree, child, self.current_index)?;
                stamp_index_tokens(env.tree, child, &identifier, self.current_index)?;
                self.current_index += 1;
            }
        }
        for &child in &seeded {
            self.wire_delete(env, child);
        }

        env.listeners.add(trigger, EventType::Click, Action::Add { scope });
        env.tree.set_attribute(self.root, directives::INITED, &env.config.inited_value)?;
        self.initialized = true;
        tracing::info!(
            target: "stamper",
            scope = %identifier,
            items = seeded.len(),
            "scope initialized"
        );

        if let Some(callback) = self.post_init.as_mut() {
            let mut ctx = HookContext {
                tree: &mut *env.tree,
                host: &mut *env.host,
                current_index: self.current_index,
                root: self.root,
                template,
                trigger,
                container,
                items: &seeded,
                event: None,
            };
            callback(&mut ctx).map_err(StamperError::from_hook)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Stamper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stamper")
            .field("id", &self.id)
            .field("root", &self.root)
            .field("identifier", &self.identifier)
            .field("elements", &self.elements)
            .field("current_index", &self.current_index)
            .field("state", &self.state)
            .field("initialized", &self.initialized)
            .field("hooks", &self.hooks)
            .field("post_init", &self.post_init.is_some())
            .finish()
    }
}

/// First `[directive=identifier]` element inside `root`
fn find_marked(tree: &DomTree, root: NodeId, directive: &'static str, identifier: &str) -> Result<NodeId> {
    tree.query_selector(root, &Selector::attr_eq(directive, identifier))
        .ok_or(StamperError::MissingElement { directive })
}

/// A template must be a `<template>` whose content has at most one element
fn validate_template(tree: &DomTree, template: NodeId) -> Result<()> {
    let content = tree
        .template_content(template)
        .ok_or_else(|| StamperError::InvalidTemplate(format!("[{}] is not a <template> element", directives::TEMPLATE)))?;
    let count = tree.element_children(content).len();
    if count > 1 {
        return Err(StamperError::InvalidTemplate(format!(
            "the template must have at most one child element, found {}",
            count
        )));
    }
    Ok(())
}

fn check_sequences(tree: &DomTree, root: NodeId) -> Result<()> {
    let marked = crate::fragment::select_inclusive(tree, root, &Selector::has_attr(directives::SEQUENCE));
    if marked
        .iter()
        .any(|&el| tree.get_attribute(el, directives::SEQUENCE).is_none_or(str::is_empty))
    {
        return Err(StamperError::MissingAttribute {
            directive: directives::SEQUENCE,
        });
    }
    Ok(())
}
