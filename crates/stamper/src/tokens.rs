//! Index tokens
//!
//! `{{index}}`, `{{index++}}` and `{{index--}}`, optionally qualified by a
//! scope identifier (`{{list:index}}`). Substitution is one left-to-right
//! pass; replaced text is never scanned again.

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// Which counter-derived value a token stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// `index`: the counter
    Current,
    /// `index++`: counter + 1
    Next,
    /// `index--`: counter - 1
    Prev,
}

impl TokenKind {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "index" => Some(TokenKind::Current),
            "index++" => Some(TokenKind::Next),
            "index--" => Some(TokenKind::Prev),
            _ => None,
        }
    }

    /// Value of this token for a counter
    pub fn resolve(self, current: usize) -> i64 {
        let current = current as i64;
        match self {
            TokenKind::Current => current,
            TokenKind::Next => current + 1,
            TokenKind::Prev => current - 1,
        }
    }
}

/// A parsed `{{...}}` token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexToken<'a> {
    /// Scope identifier the token is restricted to
    pub qualifier: Option<&'a str>,
    pub kind: TokenKind,
}

impl<'a> IndexToken<'a> {
    /// Parse the text between the braces
    pub fn parse(inner: &'a str) -> Option<Self> {
        match inner.rsplit_once(':') {
            Some((qualifier, kind)) if !qualifier.is_empty() => Some(Self {
                qualifier: Some(qualifier),
                kind: TokenKind::parse(kind)?,
            }),
            Some(_) => None,
            None => Some(Self {
                qualifier: None,
                kind: TokenKind::parse(inner)?,
            }),
        }
    }

    /// Whether the token is substituted inside the given scope
    pub fn applies_to(&self, scope: &str) -> bool {
        self.qualifier.is_none_or(|q| q == scope)
    }
}

/// Replace every token applying to `scope` with its value for `current`
pub fn substitute(value: &str, scope: &str, current: usize) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(start) = rest.find(OPEN) {
        out.push_str(&rest[..start]);
        let after = &rest[start + OPEN.len()..];
        let Some(end) = after.find(CLOSE) else {
            rest = &rest[start..];
            break;
        };

        match IndexToken::parse(&after[..end]).filter(|t| t.applies_to(scope)) {
            Some(token) => {
                out.push_str(&token.kind.resolve(current).to_string());
                rest = &after[end + CLOSE.len()..];
            }
            None => {
                // not a token for us: keep the braces and resume right after them
                out.push_str(OPEN);
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}
