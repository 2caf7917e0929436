//! Stamper HTML
//!
//! HTML5 parsing (built on html5ever) into the Stamper arena DOM, and
//! serialization back to markup.

mod parser;
mod serializer;

pub use parser::HtmlParser;
pub use serializer::{get_inner_html, get_outer_html, HtmlSerializer};

use stamper_dom::{Document, DomError};

/// Parse an HTML string into a Document
pub fn parse(html: &str) -> Result<Document, ParseError> {
    HtmlParser::new().parse(html)
}

/// Parse error
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("failed to read HTML input: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to build DOM: {0}")]
    Dom(#[from] DomError),
}
