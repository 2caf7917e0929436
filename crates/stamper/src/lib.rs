//! Stamper
//!
//! Attribute-driven template repeating over the Stamper DOM. A scope is a
//! root element marked `stamper="<id>"` holding a `<template s-temp>`, a
//! trigger `[s-cast]` and a container `[s-crate]`. Clicking the trigger
//! clones the template, numbers and index-stamps the clone, runs the
//! lifecycle hooks and appends it to the container.
//!
//! ```no_run
//! use stamper::Page;
//!
//! let mut page = Page::parse(r#"<div stamper="list">...</div>"#).unwrap();
//! page.initialize_all();
//! ```

pub mod config;
pub mod directives;
pub mod error;
pub mod fragment;
pub mod hooks;
pub mod host;
pub mod index;
pub mod lifecycle;
pub mod page;
pub mod sandbox;
pub mod scope;
pub mod slots;
pub mod tokens;

pub use config::{Config, ConfigError};
pub use error::{Result, StamperError};
pub use fragment::clone_template;
pub use hooks::{CallbackTable, HookContext, HookPhase, HookValue, Hooks};
pub use host::{AutoConfirm, Host, ScriptedHost};
pub use index::stamp_index_tokens;
pub use lifecycle::{Action, LifecycleState};
pub use page::Page;
pub use sandbox::{synthesize, HookFn};
pub use scope::{ScopeElements, ScopeId, Stamper};
pub use slots::populate_slots;
pub use tokens::{IndexToken, TokenKind};

pub use stamper_dom as dom;
pub use stamper_html as html;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
