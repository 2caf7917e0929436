//! Lifecycle manager
//!
//! Add and delete flows of a scope. Each flow validates and compiles
//! everything it needs before touching the container, runs the pre hook,
//! mutates, then runs the post hook.

use std::fmt;

use stamper_dom::{DomTree, Event, EventType, ListenerRegistry, NodeId, Selector};

use crate::config::Config;
use crate::directives;
use crate::error::{Result, StamperError};
use crate::fragment::{clone_template, select_inclusive};
use crate::hooks::{CallbackTable, HookContext, HookPhase};
use crate::host::Host;
use crate::index::stamp_index_tokens;
use crate::sandbox::{synthesize, HookFn};
use crate::scope::{ScopeElements, ScopeId, Stamper};
use crate::slots::populate_slots;

/// What a scope is doing right now
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LifecycleState {
    #[default]
    Idle,
    Adding,
    Deleting,
}

impl LifecycleState {
    pub fn as_str(self) -> &'static str {
        match self {
            LifecycleState::Idle => "idle",
            LifecycleState::Adding => "adding",
            LifecycleState::Deleting => "deleting",
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Listener payload wired by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Trigger click: add an item
    Add { scope: ScopeId },
    /// Delete control click: remove `item`
    Delete { scope: ScopeId, item: NodeId },
}

impl Action {
    pub fn scope(&self) -> ScopeId {
        match self {
            Action::Add { scope } | Action::Delete { scope, .. } => *scope,
        }
    }
}

/// Page state a scope operation borrows
pub(crate) struct Env<'a> {
    pub tree: &'a mut DomTree,
    pub host: &'a mut dyn Host,
    pub listeners: &'a mut ListenerRegistry<Action>,
    pub callbacks: &'a mut CallbackTable,
    pub config: &'a Config,
}

/// Compile the markup hook of `phase` carried by `el`, if any.
///
/// A blank attribute counts as no hook.
fn compile_hook(tree: &DomTree, el: NodeId, phase: HookPhase) -> Result<Option<HookFn>> {
    tree.get_attribute(el, phase.attr())
        .filter(|code| !code.trim().is_empty())
        .map(|code| synthesize(code, &directives::HOOK_PARAMS))
        .transpose()
}

impl Stamper {
    fn resolved(&self) -> Result<(ScopeElements, String)> {
        match (self.elements, &self.identifier) {
            (Some(elements), Some(identifier)) => Ok((elements, identifier.clone())),
            _ => Err(StamperError::MissingElement {
                directive: directives::TEMPLATE,
            }),
        }
    }

    /// Move from `Idle` into a running flow.
    ///
    /// Hooks only see a [`HookContext`], never the page, so a flow cannot
    /// start another one on the same scope; a scope left outside `Idle`
    /// still refuses new flows instead of interleaving them.
    fn enter(&mut self, state: LifecycleState) -> Result<()> {
        if self.state != LifecycleState::Idle {
            return Err(StamperError::Busy(self.state.as_str()));
        }
        tracing::trace!(target: "stamper", scope = %self.label(), "{} -> {}", self.state, state);
        self.state = state;
        Ok(())
    }

    /// Run the markup hook, then the registered hook, of a phase
    fn run_hook(
        &mut self,
        env: &mut Env<'_>,
        phase: HookPhase,
        compiled: Option<&HookFn>,
        elements: ScopeElements,
        items: &[NodeId],
        event: Option<&Event>,
    ) -> Result<()> {
        let registered = self.hooks.get_mut(phase);
        if compiled.is_none() && registered.is_none() {
            return Ok(());
        }

        let mut ctx = HookContext {
            tree: &mut *env.tree,
            host: &mut *env.host,
            current_index: self.current_index,
            root: self.root,
            template: elements.template,
            trigger: elements.trigger,
            container: elements.container,
            items,
            event,
        };
        if let Some(hook) = compiled {
            let args = ctx.args();
            hook.call(&mut ctx, &mut *env.callbacks, &args)?;
        }
        if let Some(callback) = registered {
            callback(&mut ctx).map_err(StamperError::from_hook)?;
        }
        tracing::debug!(target: "stamper", "{} hook done", phase);
        Ok(())
    }

    /// Wire the delete control of `item`, if it has an actionable one
    pub(crate) fn wire_delete(&self, env: &mut Env<'_>, item: NodeId) {
        let Some(identifier) = self.identifier.as_deref() else {
            return;
        };
        let selector = Selector::attr_eq(directives::DELETE, identifier);
        let Some(&control) = select_inclusive(env.tree, item, &selector).first() else {
            return;
        };
        if !env.tree.tag_name(control).is_some_and(|tag| env.config.is_delete_control(tag)) {
            tracing::debug!(
                target: "stamper",
                scope = identifier,
                "ignoring [{}] on non-actionable <{}>",
                directives::DELETE,
                env.tree.tag_name(control).unwrap_or("?")
            );
            return;
        }
        env.listeners.add(control, EventType::Click, Action::Delete { scope: self.id, item });
    }

    /// Trigger click
    pub(crate) fn handle_add(&mut self, env: &mut Env<'_>, event: &Event) -> Result<()> {
        let (elements, identifier) = self.resolved()?;
        self.enter(LifecycleState::Adding)?;
        let result = self.add(env, elements, &identifier, event);
        self.state = LifecycleState::Idle;
        result
    }

    fn add(&mut self, env: &mut Env<'_>, elements: ScopeElements, identifier: &str, event: &Event) -> Result<()> {
        let preadd = compile_hook(env.tree, elements.trigger, HookPhase::PreAdd)?;
        let postadd = compile_hook(env.tree, elements.trigger, HookPhase::PostAdd)?;

        let fragment = clone_template(env.tree, elements.template, self.current_index)?;
        stamp_index_tokens(env.tree, fragment, identifier, self.current_index)?;
        let items = env.tree.element_children(fragment);

        self.run_hook(env, HookPhase::PreAdd, preadd.as_ref(), elements, &items, Some(event))?;
        env.tree.append_child(elements.container, fragment)?;

        if let Err(err) = self.run_hook(env, HookPhase::PostAdd, postadd.as_ref(), elements, &items, Some(event)) {
            for &item in &items {
                env.tree.remove(item)?;
            }
            return Err(err);
        }

        for &item in &items {
            self.wire_delete(env, item);
        }
        self.current_index += 1;
        tracing::debug!(target: "stamper", scope = identifier, "item added, counter now {}", self.current_index);
        Ok(())
    }

    /// Delete control click
    pub(crate) fn handle_delete(&mut self, env: &mut Env<'_>, event: &Event, item: NodeId) -> Result<()> {
        let (elements, identifier) = self.resolved()?;
        let control = event.current_target.unwrap_or(event.target);
        let tag = env.tree.tag_name(control).unwrap_or_default();
        if !env.config.is_delete_control(tag) {
            return Err(StamperError::InvalidElement(format!(
                "delete control must be one of {:?}, got <{}>",
                env.config.delete_control_tags, tag
            )));
        }

        let label = env
            .tree
            .get_attribute(control, directives::ARIA_LABEL)
            .filter(|l| !l.is_empty())
            .unwrap_or(env.config.default_delete_label.as_str())
            .to_string();
        if !env.host.confirm(&env.config.confirm_message(&label)) {
            tracing::debug!(target: "stamper", scope = %identifier, "delete declined");
            return Ok(());
        }

        self.enter(LifecycleState::Deleting)?;
        let result = self.delete(env, elements, control, item, event);
        self.state = LifecycleState::Idle;
        result
    }

    fn delete(
        &mut self,
        env: &mut Env<'_>,
        elements: ScopeElements,
        control: NodeId,
        item: NodeId,
        event: &Event,
    ) -> Result<()> {
        let predelete = compile_hook(env.tree, control, HookPhase::PreDelete)?;
        let postdelete = compile_hook(env.tree, control, HookPhase::PostDelete)?;
        let items = [item];

        self.run_hook(env, HookPhase::PreDelete, predelete.as_ref(), elements, &items, Some(event))?;

        env.tree.remove(item)?;
        env.listeners
            .retain(|action| !matches!(action, Action::Delete { item: wired, .. } if *wired == item));

        self.run_hook(env, HookPhase::PostDelete, postdelete.as_ref(), elements, &items, Some(event))?;
        tracing::debug!(target: "stamper", scope = %self.label(), "item {} deleted", item);
        Ok(())
    }

    /// Insert an item filled from `data` right before the trigger. No hooks
    /// run; the counter advances as for a click.
    pub(crate) fn add_item_using_data<I, K, V>(&mut self, env: &mut Env<'_>, data: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let (elements, identifier) = self.resolved()?;
        self.enter(LifecycleState::Adding)?;
        let result = self.add_from_data(env, elements, &identifier, data);
        self.state = LifecycleState::Idle;
        result
    }

    fn add_from_data<I, K, V>(&mut self, env: &mut Env<'_>, elements: ScopeElements, identifier: &str, data: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let parent = env
            .tree
            .parent(elements.trigger)
            .ok_or(StamperError::MissingElement {
                directive: directives::TRIGGER,
            })?;

        let fragment = clone_template(env.tree, elements.template, self.current_index)?;
        let filled = populate_slots(env.tree, fragment, data)?;
        stamp_index_tokens(env.tree, fragment, identifier, self.current_index)?;
        let items = env.tree.element_children(fragment);

        env.tree.insert_before(parent, fragment, Some(elements.trigger))?;
        for &item in &items {
            self.wire_delete(env, item);
        }
        self.current_index += 1;
        tracing::debug!(
            target: "stamper",
            scope = identifier,
            slots = filled,
            "item added from data, counter now {}",
            self.current_index
        );
        Ok(())
    }
}
