//! Engine error taxonomy
//!
//! Every failure the engine raises itself is a [`StamperError`]. Failures
//! coming from the DOM substrate or from user closures are carried too, but
//! classified as unexpected when reported.

use stamper_dom::DomError;

/// Errors raised while resolving directives or running the item lifecycle
#[derive(Debug, thiserror::Error)]
pub enum StamperError {
    #[error("missing identifier: the root element has no `stamper` attribute")]
    MissingIdentifier,

    #[error("missing element: no [{directive}] element for this scope")]
    MissingElement { directive: &'static str },

    #[error("invalid template: {0}")]
    InvalidTemplate(String),

    #[error("missing attribute: [{directive}] must carry a value")]
    MissingAttribute { directive: &'static str },

    #[error("hook code is empty")]
    MissingCode,

    #[error("hook code contains the forbidden pattern `{pattern}`")]
    ForbiddenPattern { pattern: &'static str },

    #[error("invalid element: {0}")]
    InvalidElement(String),

    #[error("hook syntax error at offset {offset}: {message}")]
    HookSyntax { offset: usize, message: String },

    #[error("hook arithmetic overflowed: {left} + {right}")]
    HookOverflow { left: i64, right: i64 },

    #[error("no callback registered under the name `{0}`")]
    UnknownCallback(String),

    #[error("scope is busy ({0})")]
    Busy(&'static str),

    #[error("DOM operation failed: {0}")]
    Dom(#[from] DomError),

    #[error("hook failed: {0:#}")]
    Hook(anyhow::Error),
}

/// Result alias for engine operations
pub type Result<T> = std::result::Result<T, StamperError>;

impl StamperError {
    /// Wrap an error returned by a user closure.
    ///
    /// A closure that propagated a `StamperError` through `anyhow` gets the
    /// original error back, so it keeps its classification.
    pub fn from_hook(err: anyhow::Error) -> Self {
        match err.downcast::<StamperError>() {
            Ok(inner) => inner,
            Err(other) => StamperError::Hook(other),
        }
    }

    /// Whether this is one of the engine's own, recognized error kinds
    pub fn is_engine_error(&self) -> bool {
        !matches!(self, StamperError::Dom(_) | StamperError::Hook(_))
    }
}

/// Log an error at the boundary of a public operation.
///
/// Recognized errors are warnings; anything else is logged as an error with
/// its full debug representation.
pub(crate) fn report(err: &StamperError, operation: &str, scope: &str) {
    if err.is_engine_error() {
        tracing::warn!(target: "stamper", scope, operation, "{}", err);
    } else {
        tracing::error!(target: "stamper", scope, operation, error = ?err, "unexpected failure");
    }
}
