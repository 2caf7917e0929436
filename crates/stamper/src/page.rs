//! Page
//!
//! A loaded document with its stamper scopes. The page owns the DOM, the
//! host primitives and the listeners the engine wires, and dispatches clicks
//! to them. Public operations never return engine errors: failures are
//! logged and abort only the operation at hand.

use stamper_dom::{Document, DomTree, Event, EventType, ListenerRegistry, NodeId, Selector};
use stamper_html::ParseError;

use crate::config::Config;
use crate::directives;
use crate::error::{report, Result};
use crate::hooks::{CallbackTable, HookContext, HookValue, Hooks};
use crate::host::{AutoConfirm, Host};
use crate::lifecycle::{Action, Env};
use crate::scope::{ScopeId, Stamper};

/// A document with its stamper scopes
pub struct Page<H: Host = AutoConfirm> {
    document: Document,
    host: H,
    config: Config,
    scopes: Vec<Stamper>,
    listeners: ListenerRegistry<Action>,
    callbacks: CallbackTable,
}

impl<H: Host> Page<H> {
    /// Create a page over a parsed document
    pub fn new(document: Document, host: H) -> Self {
        Self::with_config(document, host, Config::default())
    }

    pub fn with_config(document: Document, host: H, config: Config) -> Self {
        Self {
            document,
            host,
            config,
            scopes: Vec::new(),
            listeners: ListenerRegistry::new(),
            callbacks: CallbackTable::new(),
        }
    }

    /// Parse HTML and create a page over it
    pub fn from_html(html: &str, host: H) -> std::result::Result<Self, ParseError> {
        Ok(Self::new(stamper_html::parse(html)?, host))
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    pub fn tree(&self) -> &DomTree {
        self.document.tree()
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Attach a scope to `root`; attaching the same root twice returns the
    /// existing scope
    pub fn attach(&mut self, root: NodeId) -> ScopeId {
        if let Some(scope) = self.scopes.iter().find(|s| s.root() == root) {
            return scope.id();
        }
        let id = ScopeId(self.scopes.len());
        self.scopes.push(Stamper::new(id, root));
        id
    }

    /// Attach a scope to every `[stamper]` element, in document order
    pub fn discover(&mut self) -> Vec<ScopeId> {
        let roots = self.document.query_selector_all(&Selector::has_attr(directives::ROOT));
        roots.into_iter().map(|root| self.attach(root)).collect()
    }

    pub fn scope(&self, id: ScopeId) -> Option<&Stamper> {
        self.scopes.get(id.0)
    }

    pub fn scopes(&self) -> &[Stamper] {
        &self.scopes
    }

    /// Scope whose root carries the given identifier
    pub fn scope_by_identifier(&self, identifier: &str) -> Option<ScopeId> {
        self.scopes
            .iter()
            .find(|s| self.document.tree().get_attribute(s.root(), directives::ROOT) == Some(identifier))
            .map(Stamper::id)
    }

    /// Resolve, validate, seed and wire a scope
    pub fn initialize(&mut self, id: ScopeId) {
        self.with_scope(id, "initialize", |scope, env| scope.initialize(env));
    }

    /// Discover every scope and initialize each of them
    pub fn initialize_all(&mut self) {
        for id in self.discover() {
            self.initialize(id);
        }
    }

    /// Insert an item filled from `data` before the scope's trigger
    pub fn add_item_using_data<I, K, V>(&mut self, id: ScopeId, data: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.with_scope(id, "add_item_using_data", |scope, env| scope.add_item_using_data(env, data));
    }

    /// Run `f` after each (re-)initialization of the scope
    pub fn register_post_init_callback<F>(&mut self, id: ScopeId, f: F)
    where
        F: FnMut(&mut HookContext<'_>) -> anyhow::Result<()> + 'static,
    {
        match self.scopes.get_mut(id.0) {
            Some(scope) => scope.post_init = Some(Box::new(f)),
            None => tracing::warn!(target: "stamper", "no scope {}", id),
        }
    }

    /// Register programmatic lifecycle hooks; phases left unset keep their
    /// previous hook
    pub fn register_hooks(&mut self, id: ScopeId, hooks: Hooks) {
        match self.scopes.get_mut(id.0) {
            Some(scope) => scope.hooks.merge(hooks),
            None => tracing::warn!(target: "stamper", "no scope {}", id),
        }
    }

    /// Register a callback markup hooks can call by name
    pub fn register_callback<F>(&mut self, name: &str, f: F)
    where
        F: FnMut(&mut HookContext<'_>, &[HookValue]) -> anyhow::Result<()> + 'static,
    {
        self.callbacks.register(name, f);
    }

    /// Dispatch a click on `target`, bubbling through its ancestors.
    ///
    /// Returns false if a listener prevented the default action.
    pub fn click(&mut self, target: NodeId) -> bool {
        let mut event = Event::click(target);
        let mut path = vec![target];
        path.extend(self.document.tree().ancestors(target));

        for node in path {
            let actions: Vec<Action> = self
                .listeners
                .get(node, EventType::Click)
                .iter()
                .map(|(_, action)| *action)
                .collect();
            if actions.is_empty() {
                continue;
            }
            event.current_target = Some(node);
            for action in actions {
                self.run_action(action, &event);
            }
            if event.is_propagation_stopped() || !event.bubbles {
                break;
            }
        }
        !event.is_default_prevented()
    }

    /// Click the first element matching `selector`; false if none matched
    pub fn click_selector(&mut self, selector: &Selector) -> bool {
        match self.document.query_selector(selector) {
            Some(target) => {
                self.click(target);
                true
            }
            None => false,
        }
    }

    fn run_action(&mut self, action: Action, event: &Event) {
        match action {
            Action::Add { scope } => {
                self.with_scope(scope, "add", |s, env| s.handle_add(env, event));
            }
            Action::Delete { scope, item } => {
                self.with_scope(scope, "delete", |s, env| s.handle_delete(env, event, item));
            }
        }
    }

    /// Run a scope operation with the page state it needs, reporting failure
    fn with_scope<R>(
        &mut self,
        id: ScopeId,
        operation: &str,
        f: impl FnOnce(&mut Stamper, &mut Env<'_>) -> Result<R>,
    ) -> Option<R> {
        let Page {
            document,
            host,
            config,
            scopes,
            listeners,
            callbacks,
        } = self;
        let Some(scope) = scopes.get_mut(id.0) else {
            tracing::warn!(target: "stamper", operation, "no scope {}", id);
            return None;
        };

        let mut env = Env {
            tree: document.tree_mut(),
            host,
            listeners,
            callbacks,
            config,
        };
        match f(scope, &mut env) {
            Ok(value) => Some(value),
            Err(err) => {
                report(&err, operation, &scope.label());
                None
            }
        }
    }
}

impl Page<AutoConfirm> {
    /// Parse HTML into a page that accepts every confirmation
    pub fn parse(html: &str) -> std::result::Result<Self, ParseError> {
        Self::from_html(html, AutoConfirm)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIST: &str = r#"
        <div stamper="mock">
          <template s-temp="mock"><li s-sequence="0"></li></template>
          <ul s-crate="mock"></ul>
          <button s-cast="mock">add</button>
        </div>"#;

    #[test]
    fn test_discover_and_attach() {
        let mut page = Page::parse(LIST).unwrap();
        let ids = page.discover();
        assert_eq!(ids.len(), 1);
        assert_eq!(page.discover(), ids);
        assert_eq!(page.scope_by_identifier("mock"), Some(ids[0]));
        assert_eq!(page.scope_by_identifier("other"), None);
        assert!(!page.scope(ids[0]).unwrap().is_initialized());
    }

    #[test]
    fn test_click_without_listeners() {
        let mut page = Page::parse(LIST).unwrap();
        let body = page.document().body();
        assert!(page.click(body));
        assert!(!page.click_selector(&Selector::has_attr("s-missing")));
    }

    #[test]
    fn test_unknown_scope_is_reported() {
        let mut page = Page::parse(LIST).unwrap();
        page.initialize(ScopeId(9));
        page.register_hooks(ScopeId(9), Hooks::new());
        assert!(page.scopes().is_empty());
    }
}
