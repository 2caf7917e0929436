//! Host primitives
//!
//! The blocking confirmation prompt and the alert box are provided by the
//! embedder. Hooks reach `alert`; deletes ask `confirm`.

/// User-facing primitives supplied by the embedder
pub trait Host {
    /// Blocking yes/no prompt
    fn confirm(&mut self, message: &str) -> bool;

    /// Informational message
    fn alert(&mut self, message: &str);
}

/// Accepts every confirmation; alerts go to the log
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoConfirm;

impl Host for AutoConfirm {
    fn confirm(&mut self, message: &str) -> bool {
        tracing::debug!(target: "stamper", "auto-confirming: {}", message);
        true
    }

    fn alert(&mut self, message: &str) {
        tracing::info!(target: "stamper", "alert: {}", message);
    }
}

/// Answers confirmations with a fixed reply and records every prompt
#[derive(Debug, Clone, Default)]
pub struct ScriptedHost {
    /// Reply given to every confirmation
    pub answer: bool,
    /// Confirmation messages, in order
    pub confirms: Vec<String>,
    /// Alert messages, in order
    pub alerts: Vec<String>,
}

impl ScriptedHost {
    /// Host that answers `answer` to every prompt
    pub fn new(answer: bool) -> Self {
        Self {
            answer,
            ..Self::default()
        }
    }
}

impl Host for ScriptedHost {
    fn confirm(&mut self, message: &str) -> bool {
        self.confirms.push(message.to_string());
        self.answer
    }

    fn alert(&mut self, message: &str) {
        self.alerts.push(message.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_host_records() {
        let mut host = ScriptedHost::new(false);
        assert!(!host.confirm("delete?"));
        host.alert("hello");
        assert_eq!(host.confirms, vec!["delete?"]);
        assert_eq!(host.alerts, vec!["hello"]);
    }

    #[test]
    fn test_auto_confirm() {
        assert!(AutoConfirm.confirm("anything"));
    }
}
