//! Element selectors
//!
//! The subset of CSS simple selectors the engine needs: tag, class, id,
//! universal, and attribute presence / equality (`[s-cast]`, `[s-cast="mock"]`).

use crate::ElementData;

/// How an attribute selector compares the value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrMatch {
    /// `[name]`
    Exists,
    /// `[name="value"]`
    Equals(String),
}

/// Simple selector for matching
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    Tag(String),
    Class(String),
    Id(String),
    Attr { name: String, test: AttrMatch },
    Universal,
}

impl Selector {
    /// `[name]`
    pub fn has_attr(name: &str) -> Self {
        Self::Attr {
            name: name.to_string(),
            test: AttrMatch::Exists,
        }
    }

    /// `[name="value"]`
    pub fn attr_eq(name: &str, value: &str) -> Self {
        Self::Attr {
            name: name.to_string(),
            test: AttrMatch::Equals(value.to_string()),
        }
    }

    /// Parse a simple selector string
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.is_empty() {
            return None;
        }

        if s == "*" {
            Some(Self::Universal)
        } else if let Some(id) = s.strip_prefix('#') {
            Some(Self::Id(id.to_string()))
        } else if let Some(class) = s.strip_prefix('.') {
            Some(Self::Class(class.to_string()))
        } else if let Some(body) = s.strip_prefix('[').and_then(|b| b.strip_suffix(']')) {
            Self::parse_attr(body)
        } else {
            Some(Self::Tag(s.to_lowercase()))
        }
    }

    fn parse_attr(body: &str) -> Option<Self> {
        match body.split_once('=') {
            None => {
                let name = body.trim();
                (!name.is_empty()).then(|| Self::has_attr(name))
            }
            Some((name, value)) => {
                let name = name.trim();
                let value = value.trim();
                let value = value
                    .strip_prefix('"')
                    .and_then(|v| v.strip_suffix('"'))
                    .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
                    .unwrap_or(value);
                (!name.is_empty()).then(|| Self::attr_eq(name, value))
            }
        }
    }

    /// Check if an element matches
    pub fn matches(&self, elem: &ElementData) -> bool {
        match self {
            Self::Universal => true,
            Self::Tag(tag) => elem.tag.eq_ignore_ascii_case(tag),
            Self::Id(id) => elem.get_attr("id") == Some(id.as_str()),
            Self::Class(class) => elem.classes().any(|c| c == class),
            Self::Attr { name, test } => match (elem.get_attr(name), test) {
                (None, _) => false,
                (Some(_), AttrMatch::Exists) => true,
                (Some(actual), AttrMatch::Equals(expected)) => actual == expected,
            },
        }
    }
}

impl std::fmt::Display for Selector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Universal => f.write_str("*"),
            Self::Tag(tag) => f.write_str(tag),
            Self::Id(id) => write!(f, "#{id}"),
            Self::Class(class) => write!(f, ".{class}"),
            Self::Attr { name, test: AttrMatch::Exists } => write!(f, "[{name}]"),
            Self::Attr { name, test: AttrMatch::Equals(v) } => write!(f, "[{name}=\"{v}\"]"),
        }
    }
}
