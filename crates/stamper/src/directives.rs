//! Directive vocabulary
//!
//! Attribute names the engine recognizes, the positional hook parameters,
//! and the denylist applied to hook code before it is compiled.

use lazy_static::lazy_static;
use regex::Regex;

/// Scope identifier on the root element
pub const ROOT: &str = "stamper";
/// Completion flag set on the root after initialization
pub const INITED: &str = "s-inited";
/// Template marker
pub const TEMPLATE: &str = "s-temp";
/// Trigger marker ("cast")
pub const TRIGGER: &str = "s-cast";
/// Container marker ("crate")
pub const CONTAINER: &str = "s-crate";
/// Delete control marker, valued with the scope identifier
pub const DELETE: &str = "s-delete";
/// Comma-separated list of attributes to token-substitute
pub const INDEX: &str = "s-index";
/// Zero-padding pattern for the running number
pub const SEQUENCE: &str = "s-sequence";
/// Slot name matched against caller data keys
pub const SLOT: &str = "s-slot";
pub const PREADD: &str = "s-preadd";
pub const POSTADD: &str = "s-postadd";
pub const PREDELETE: &str = "s-predelete";
pub const POSTDELETE: &str = "s-postdelete";

/// Accessible label read from delete controls
pub const ARIA_LABEL: &str = "aria-label";

/// Hook parameters, in the order hooks receive them
pub const HOOK_PARAMS: [&str; 7] = [
    "currentIndex",
    "rootEl",
    "tempEl",
    "castEl",
    "crateEl",
    "child",
    "event",
];

/// Tokens hook code may not mention
pub const FORBIDDEN_TOKENS: &[&str] = &[
    "function",
    "eval",
    "localStorage",
    "sessionStorage",
    "indexedDB",
    "XMLHttpRequest",
    "fetch",
    "WebSocket",
    "setTimeout",
    "setInterval",
    "requestAnimationFrame",
    "Promise",
    "async",
    "await",
    "import",
    "export",
];

lazy_static! {
    static ref FORBIDDEN_PATTERNS: Vec<(&'static str, Regex)> = FORBIDDEN_TOKENS
        .iter()
        .map(|token| (*token, Regex::new(&format!(r"\b{}\b", regex::escape(token))).unwrap()))
        .collect();
}

/// First denylisted token found in `code`, matched on word boundaries
pub fn find_forbidden(code: &str) -> Option<&'static str> {
    FORBIDDEN_PATTERNS
        .iter()
        .find(|(_, re)| re.is_match(code))
        .map(|(token, _)| *token)
}
