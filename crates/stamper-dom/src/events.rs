//! DOM Events
//!
//! UI events and a listener registry keyed by `(target, type)`. The registry
//! is generic over the handler payload so the embedder decides what a
//! listener actually does.

use std::collections::HashMap;

use crate::NodeId;

/// Event type identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    Click,
    DblClick,
    Input,
    Change,
    Submit,
    KeyDown,
    KeyUp,
    Focus,
    Blur,
}

impl EventType {
    /// Check if this event type can bubble
    pub fn bubbles(&self) -> bool {
        !matches!(self, EventType::Focus | EventType::Blur)
    }

    /// DOM name of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Click => "click",
            EventType::DblClick => "dblclick",
            EventType::Input => "input",
            EventType::Change => "change",
            EventType::Submit => "submit",
            EventType::KeyDown => "keydown",
            EventType::KeyUp => "keyup",
            EventType::Focus => "focus",
            EventType::Blur => "blur",
        }
    }
}

/// DOM event
#[derive(Debug, Clone)]
pub struct Event {
    pub event_type: EventType,
    pub target: NodeId,
    pub current_target: Option<NodeId>,
    pub bubbles: bool,
    pub cancelable: bool,
    default_prevented: bool,
    propagation_stopped: bool,
}

impl Event {
    /// Create a new event aimed at `target`
    pub fn new(event_type: EventType, target: NodeId) -> Self {
        Self {
            event_type,
            target,
            current_target: None,
            bubbles: event_type.bubbles(),
            cancelable: true,
            default_prevented: false,
            propagation_stopped: false,
        }
    }

    /// Create a click event
    pub fn click(target: NodeId) -> Self {
        Self::new(EventType::Click, target)
    }

    /// Prevent default action
    pub fn prevent_default(&mut self) {
        if self.cancelable {
            self.default_prevented = true;
        }
    }

    /// Stop propagation
    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    /// Check if default was prevented
    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }

    /// Check if propagation was stopped
    pub fn is_propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }
}

/// Listener handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub u64);

/// Event listener registry
#[derive(Debug)]
pub struct ListenerRegistry<H> {
    /// Maps (target, event_type) -> listeners in registration order
    listeners: HashMap<(NodeId, EventType), Vec<(ListenerId, H)>>,
    next_id: u64,
}

impl<H> ListenerRegistry<H> {
    pub fn new() -> Self {
        Self {
            listeners: HashMap::new(),
            next_id: 1,
        }
    }

    /// Add an event listener
    pub fn add(&mut self, target: NodeId, event_type: EventType, handler: H) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners
            .entry((target, event_type))
            .or_default()
            .push((id, handler));
        tracing::trace!("listener {:?} added for {} on {}", id, event_type.as_str(), target);
        id
    }

    /// Remove a listener by id
    pub fn remove(&mut self, id: ListenerId) -> Option<H> {
        let mut removed = None;
        for list in self.listeners.values_mut() {
            if let Some(pos) = list.iter().position(|(lid, _)| *lid == id) {
                removed = Some(list.remove(pos).1);
                break;
            }
        }
        self.listeners.retain(|_, list| !list.is_empty());
        removed
    }

    /// Keep only listeners whose handler satisfies the predicate
    pub fn retain(&mut self, mut keep: impl FnMut(&H) -> bool) {
        for list in self.listeners.values_mut() {
            list.retain(|(_, handler)| keep(handler));
        }
        self.listeners.retain(|_, list| !list.is_empty());
    }

    /// Listeners registered on a target for an event type
    pub fn get(&self, target: NodeId, event_type: EventType) -> &[(ListenerId, H)] {
        self.listeners
            .get(&(target, event_type))
            .map_or(&[][..], Vec::as_slice)
    }

    /// Total number of listeners
    pub fn len(&self) -> usize {
        self.listeners.values().map(Vec::len).sum()
    }

    /// Check if no listener is registered
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl<H> Default for ListenerRegistry<H> {
    fn default() -> Self {
        Self::new()
    }
}
