//! Terminal host
//!
//! Confirmations are answered from the command line flags; prompts and
//! alerts are echoed to stderr.

use stamper::Host;

pub struct TerminalHost {
    accept: bool,
}

impl TerminalHost {
    pub fn new(accept: bool) -> Self {
        Self { accept }
    }
}

impl Host for TerminalHost {
    fn confirm(&mut self, message: &str) -> bool {
        let answer = if self.accept { "yes" } else { "no" };
        eprintln!("confirm: {} [{}]", message.replace('\n', " "), answer);
        self.accept
    }

    fn alert(&mut self, message: &str) {
        eprintln!("alert: {}", message);
    }
}
