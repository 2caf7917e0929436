//! Hook synthesizer
//!
//! Markup hook code is checked against the denylist, then compiled into a
//! small whitelisted statement language:
//!
//! ```text
//! program := stmt ((';' | newline) stmt)*
//! stmt    := callee '(' [expr (',' expr)*] ')'
//! callee  := name | name '.' name
//! expr    := term ('+' term)*
//! term    := string | integer | param
//! ```
//!
//! Callees are `alert`, `console.<level>`, element methods on a parameter
//! (`child.setAttribute(...)`), or the name of a callback registered on the
//! page. Nothing else is reachable from hook code.

use stamper_dom::{DomTree, NodeId};

use crate::directives;
use crate::error::{Result, StamperError};
use crate::hooks::{CallbackTable, HookContext, HookValue};

/// Compile hook `code` whose formal parameters are `params`
pub fn synthesize(code: &str, params: &[&str]) -> Result<HookFn> {
    if code.trim().is_empty() {
        return Err(StamperError::MissingCode);
    }
    if let Some(pattern) = directives::find_forbidden(code) {
        return Err(StamperError::ForbiddenPattern { pattern });
    }

    let tokens = Lexer::new(code).tokenize()?;
    let program = Parser { tokens, pos: 0, params }.program()?;

    Ok(HookFn {
        params: params.iter().map(|p| p.to_string()).collect(),
        program,
    })
}

/// A compiled hook
#[derive(Debug, Clone)]
pub struct HookFn {
    params: Vec<String>,
    program: Vec<Statement>,
}

impl HookFn {
    /// Formal parameter names
    pub fn params(&self) -> &[String] {
        &self.params
    }

    /// Number of statements
    pub fn len(&self) -> usize {
        self.program.len()
    }

    pub fn is_empty(&self) -> bool {
        self.program.is_empty()
    }

    /// Run the hook with positional `args`; missing arguments are null
    pub fn call(
        &self,
        ctx: &mut HookContext<'_>,
        callbacks: &mut CallbackTable,
        args: &[HookValue],
    ) -> Result<()> {
        for stmt in &self.program {
            let values = stmt
                .args
                .iter()
                .map(|e| e.eval(args))
                .collect::<Result<Vec<HookValue>>>()?;
            match &stmt.callee {
                Callee::Alert => {
                    let message = values.first().map(|v| v.render(ctx.tree)).unwrap_or_default();
                    ctx.host.alert(&message);
                }
                Callee::Console(level) => {
                    let message = render_all(ctx.tree, &values);
                    level.log(&message);
                }
                Callee::Method { receiver, method } => {
                    let target = args.get(*receiver).and_then(HookValue::as_element).ok_or_else(|| {
                        StamperError::InvalidElement(format!(
                            "`{}` is not an element",
                            self.params[*receiver]
                        ))
                    })?;
                    method.apply(ctx.tree, target, &values)?;
                }
                Callee::Callback(name) => {
                    let callback = callbacks
                        .get_mut(name)
                        .ok_or_else(|| StamperError::UnknownCallback(name.clone()))?;
                    callback(ctx, &values).map_err(StamperError::from_hook)?;
                }
            }
        }
        Ok(())
    }
}

fn render_all(tree: &DomTree, values: &[HookValue]) -> String {
    values.iter().map(|v| v.render(tree)).collect::<Vec<_>>().join(" ")
}

#[derive(Debug, Clone)]
struct Statement {
    callee: Callee,
    args: Vec<Expr>,
}

#[derive(Debug, Clone)]
enum Callee {
    Alert,
    Console(ConsoleLevel),
    Method { receiver: usize, method: ElementMethod },
    Callback(String),
}

#[derive(Debug, Clone, Copy)]
enum ConsoleLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl ConsoleLevel {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "debug" => Some(ConsoleLevel::Debug),
            "log" | "info" => Some(ConsoleLevel::Info),
            "warn" => Some(ConsoleLevel::Warn),
            "error" => Some(ConsoleLevel::Error),
            _ => None,
        }
    }

    fn log(self, message: &str) {
        match self {
            ConsoleLevel::Debug => tracing::debug!(target: "stamper::hook", "{}", message),
            ConsoleLevel::Info => tracing::info!(target: "stamper::hook", "{}", message),
            ConsoleLevel::Warn => tracing::warn!(target: "stamper::hook", "{}", message),
            ConsoleLevel::Error => tracing::error!(target: "stamper::hook", "{}", message),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ElementMethod {
    SetAttribute,
    RemoveAttribute,
    SetText,
    AddClass,
    RemoveClass,
}

impl ElementMethod {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "setAttribute" => Some(ElementMethod::SetAttribute),
            "removeAttribute" => Some(ElementMethod::RemoveAttribute),
            "setText" => Some(ElementMethod::SetText),
            "addClass" => Some(ElementMethod::AddClass),
            "removeClass" => Some(ElementMethod::RemoveClass),
            _ => None,
        }
    }

    fn arity(self) -> usize {
        match self {
            ElementMethod::SetAttribute => 2,
            _ => 1,
        }
    }

    fn apply(self, tree: &mut DomTree, target: NodeId, values: &[HookValue]) -> Result<()> {
        let arg = |i: usize| values.get(i).map(|v| v.render(tree)).unwrap_or_default();
        match self {
            ElementMethod::SetAttribute => {
                let (name, value) = (arg(0), arg(1));
                tree.set_attribute(target, &name, &value)?;
            }
            ElementMethod::RemoveAttribute => {
                let name = arg(0);
                tree.remove_attribute(target, &name)?;
            }
            ElementMethod::SetText => {
                let text = arg(0);
                tree.set_text_content(target, &text)?;
            }
            ElementMethod::AddClass | ElementMethod::RemoveClass => {
                let class = arg(0);
                let mut classes: Vec<String> = tree
                    .get_attribute(target, "class")
                    .unwrap_or_default()
                    .split_whitespace()
                    .filter(|c| *c != class)
                    .map(str::to_string)
                    .collect();
                if self == ElementMethod::AddClass {
                    classes.push(class);
                }
                tree.set_attribute(target, "class", &classes.join(" "))?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
struct Expr {
    terms: Vec<Term>,
}

#[derive(Debug, Clone)]
enum Term {
    Str(String),
    Int(i64),
    Param(usize),
}

impl Expr {
    /// `+` adds integers and concatenates anything else
    fn eval(&self, args: &[HookValue]) -> Result<HookValue> {
        let mut terms = self.terms.iter().map(|t| match t {
            Term::Str(s) => HookValue::Str(s.clone()),
            Term::Int(n) => HookValue::Int(*n),
            Term::Param(i) => args.get(*i).cloned().unwrap_or(HookValue::Null),
        });
        let Some(first) = terms.next() else {
            return Ok(HookValue::Null);
        };
        terms.try_fold(first, |acc, next| match (acc, next) {
            (HookValue::Int(a), HookValue::Int(b)) => a
                .checked_add(b)
                .map(HookValue::Int)
                .ok_or(StamperError::HookOverflow { left: a, right: b }),
            (a, b) => Ok(HookValue::Str(format!("{}{}", plain(&a), plain(&b)))),
        })
    }
}

/// String form of a value without tree access (elements show their id)
fn plain(value: &HookValue) -> String {
    match value {
        HookValue::Null => "null".to_string(),
        HookValue::Int(n) => n.to_string(),
        HookValue::Str(s) => s.clone(),
        HookValue::Element(id) => format!("[element {}]", id),
        HookValue::Event(e) => e.event_type.as_str().to_string(),
    }
}

// ----------------------------------------------------------------------
// Lexer
// ----------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
enum Tok {
    Ident(String),
    Str(String),
    Int(i64),
    LParen,
    RParen,
    Comma,
    Dot,
    Plus,
    Sep,
    End,
}

struct Lexer<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    fn error(&self, offset: usize, message: impl Into<String>) -> StamperError {
        StamperError::HookSyntax {
            offset,
            message: message.into(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn tokenize(mut self) -> Result<Vec<(Tok, usize)>> {
        let mut tokens = Vec::new();
        loop {
            let start = self.pos;
            let Some(c) = self.bump() else {
                tokens.push((Tok::End, start));
                return Ok(tokens);
            };
            let tok = match c {
                ' ' | '\t' | '\r' => continue,
                '\n' | ';' => Tok::Sep,
                '(' => Tok::LParen,
                ')' => Tok::RParen,
                ',' => Tok::Comma,
                '.' => Tok::Dot,
                '+' => Tok::Plus,
                '/' if self.peek() == Some('/') => {
                    while self.peek().is_some_and(|c| c != '\n') {
                        self.bump();
                    }
                    continue;
                }
                '\'' | '"' => Tok::Str(self.string(c, start)?),
                '-' if self.peek().is_some_and(|c| c.is_ascii_digit()) => {
                    Tok::Int(-self.integer(start, self.pos)?)
                }
                c if c.is_ascii_digit() => Tok::Int(self.integer(start, start)?),
                c if c.is_alphabetic() || c == '_' || c == '$' => {
                    while self
                        .peek()
                        .is_some_and(|c| c.is_alphanumeric() || c == '_' || c == '$')
                    {
                        self.bump();
                    }
                    Tok::Ident(self.src[start..self.pos].to_string())
                }
                other => return Err(self.error(start, format!("unexpected character `{}`", other))),
            };
            tokens.push((tok, start));
        }
    }

    fn string(&mut self, quote: char, start: usize) -> Result<String> {
        let mut out = String::new();
        loop {
            match self.bump() {
                None => return Err(self.error(start, "unterminated string")),
                Some(c) if c == quote => return Ok(out),
                Some('\\') => match self.bump() {
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    Some(c) => out.push(c),
                    None => return Err(self.error(start, "unterminated string")),
                },
                Some(c) => out.push(c),
            }
        }
    }

    fn integer(&mut self, start: usize, digits_from: usize) -> Result<i64> {
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.bump();
        }
        self.src[digits_from..self.pos]
            .parse()
            .map_err(|_| self.error(start, "integer out of range"))
    }
}

// ----------------------------------------------------------------------
// Parser
// ----------------------------------------------------------------------

struct Parser<'p> {
    tokens: Vec<(Tok, usize)>,
    pos: usize,
    params: &'p [&'p str],
}

impl Parser<'_> {
    fn peek(&self) -> &Tok {
        &self.tokens[self.pos.min(self.tokens.len() - 1)].0
    }

    fn offset(&self) -> usize {
        self.tokens[self.pos.min(self.tokens.len() - 1)].1
    }

    fn next(&mut self) -> Tok {
        let tok = self.peek().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        tok
    }

    fn error(&self, message: impl Into<String>) -> StamperError {
        StamperError::HookSyntax {
            offset: self.offset(),
            message: message.into(),
        }
    }

    fn expect(&mut self, expected: Tok, what: &str) -> Result<()> {
        if *self.peek() == expected {
            self.next();
            Ok(())
        } else {
            Err(self.error(format!("expected {}", what)))
        }
    }

    fn skip_separators(&mut self) {
        while *self.peek() == Tok::Sep {
            self.next();
        }
    }

    fn param(&self, name: &str) -> Option<usize> {
        self.params.iter().position(|p| *p == name)
    }

    fn program(mut self) -> Result<Vec<Statement>> {
        let mut program = Vec::new();
        self.skip_separators();
        while *self.peek() != Tok::End {
            program.push(self.statement()?);
            match self.peek() {
                Tok::Sep => self.skip_separators(),
                Tok::End => {}
                _ => return Err(self.error("expected `;` or a new line")),
            }
        }
        Ok(program)
    }

    fn statement(&mut self) -> Result<Statement> {
        let callee = self.callee()?;
        self.expect(Tok::LParen, "`(`")?;
        let mut args = Vec::new();
        if *self.peek() != Tok::RParen {
            args.push(self.expr()?);
            while *self.peek() == Tok::Comma {
                self.next();
                args.push(self.expr()?);
            }
        }
        self.expect(Tok::RParen, "`)`")?;

        if let Callee::Method { method, .. } = &callee {
            if args.len() != method.arity() {
                return Err(self.error(format!(
                    "{:?} takes {} argument(s), got {}",
                    method,
                    method.arity(),
                    args.len()
                )));
            }
        }
        Ok(Statement { callee, args })
    }

    fn callee(&mut self) -> Result<Callee> {
        let Tok::Ident(name) = self.next() else {
            return Err(self.error("expected a call"));
        };
        if *self.peek() != Tok::Dot {
            if name == "alert" {
                return Ok(Callee::Alert);
            }
            if self.param(&name).is_some() {
                return Err(self.error(format!("`{}` is not callable", name)));
            }
            return Ok(Callee::Callback(name));
        }

        self.next();
        let Tok::Ident(member) = self.next() else {
            return Err(self.error("expected a member name after `.`"));
        };
        if name == "console" {
            return ConsoleLevel::parse(&member)
                .map(Callee::Console)
                .ok_or_else(|| self.error(format!("unsupported console method `{}`", member)));
        }
        let receiver = self
            .param(&name)
            .ok_or_else(|| self.error(format!("unknown identifier `{}`", name)))?;
        let method = ElementMethod::parse(&member)
            .ok_or_else(|| self.error(format!("unsupported method `{}.{}`", name, member)))?;
        Ok(Callee::Method { receiver, method })
    }

    fn expr(&mut self) -> Result<Expr> {
        let mut terms = vec![self.term()?];
        while *self.peek() == Tok::Plus {
            self.next();
            terms.push(self.term()?);
        }
        Ok(Expr { terms })
    }

    fn term(&mut self) -> Result<Term> {
        match self.next() {
            Tok::Str(s) => Ok(Term::Str(s)),
            Tok::Int(n) => Ok(Term::Int(n)),
            Tok::Ident(name) => self
                .param(&name)
                .map(Term::Param)
                .ok_or_else(|| self.error(format!("unknown identifier `{}`", name))),
            _ => Err(self.error("expected a string, a number or a parameter")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directives::HOOK_PARAMS;
    use crate::host::ScriptedHost;

    fn run(code: &str, tree: &mut DomTree, host: &mut ScriptedHost, child: NodeId) -> Result<()> {
        let hook = synthesize(code, &HOOK_PARAMS)?;
        let root = tree.create_element("div");
        let items = [child];
        let mut ctx = HookContext {
            tree,
            host,
            current_index: 2,
            root,
            template: root,
            trigger: root,
            container: root,
            items: &items,
            event: None,
        };
        let args = ctx.args();
        hook.call(&mut ctx, &mut CallbackTable::new(), &args)
    }

    #[test]
    fn test_empty_code() {
        assert!(matches!(synthesize("", &HOOK_PARAMS), Err(StamperError::MissingCode)));
        assert!(matches!(synthesize("  \n ", &HOOK_PARAMS), Err(StamperError::MissingCode)));
    }

    #[test]
    fn test_forbidden_code() {
        let err = synthesize("setTimeout(alert, 0)", &HOOK_PARAMS).unwrap_err();
        assert!(matches!(err, StamperError::ForbiddenPattern { pattern: "setTimeout" }));
        let err = synthesize("fetch('/api')", &HOOK_PARAMS).unwrap_err();
        assert!(matches!(err, StamperError::ForbiddenPattern { pattern: "fetch" }));
    }

    #[test]
    fn test_params_kept_in_order() {
        let hook = synthesize("alert(currentIndex)", &HOOK_PARAMS).unwrap();
        assert_eq!(hook.params(), HOOK_PARAMS.map(String::from).as_slice());
        assert_eq!(hook.len(), 1);
    }

    #[test]
    fn test_syntax_errors() {
        for code in [
            "alert(",
            "alert('x') alert('y')",
            "unknown.call()",
            "alert(missing)",
            "child()",
            "child.innerHTML('x')",
            "child.setAttribute('a')",
            "alert('x' +)",
            "x = 1",
        ] {
            let err = synthesize(code, &HOOK_PARAMS).unwrap_err();
            assert!(matches!(err, StamperError::HookSyntax { .. }), "{code}: {err}");
        }
    }

    #[test]
    fn test_alert_concat() {
        let mut tree = DomTree::new();
        let mut host = ScriptedHost::default();
        let child = tree.create_element("li");

        run("alert('item ' + currentIndex + 1)", &mut tree, &mut host, child).unwrap();
        run("alert(currentIndex + 1)", &mut tree, &mut host, child).unwrap();
        assert_eq!(host.alerts, vec!["item 21", "3"]);
    }

    #[test]
    fn test_integer_overflow_is_an_error() {
        let mut tree = DomTree::new();
        let mut host = ScriptedHost::default();
        let child = tree.create_element("li");

        let err = run("alert(9223372036854775807 + 1)", &mut tree, &mut host, child).unwrap_err();
        assert!(matches!(
            err,
            StamperError::HookOverflow {
                left: i64::MAX,
                right: 1
            }
        ));
        assert!(err.is_engine_error());
        assert!(host.alerts.is_empty());

        // the same operands concatenate once a string is involved
        run("alert('' + 9223372036854775807 + 1)", &mut tree, &mut host, child).unwrap();
        assert_eq!(host.alerts, vec!["92233720368547758071"]);
    }

    #[test]
    fn test_element_methods() {
        let mut tree = DomTree::new();
        let mut host = ScriptedHost::default();
        let child = tree.create_element("li");
        tree.set_attribute(child, "class", "row").unwrap();

        let code = "child.setAttribute('data-n', 'n' + currentIndex);\n\
                    child.addClass('new'); child.removeClass('row')\n\
                    child.setText(\"hello\")";
        run(code, &mut tree, &mut host, child).unwrap();

        assert_eq!(tree.get_attribute(child, "data-n"), Some("n2"));
        assert_eq!(tree.get_attribute(child, "class"), Some("new"));
        assert_eq!(tree.text_content(child), "hello");
    }

    #[test]
    fn test_method_on_null_param() {
        let mut tree = DomTree::new();
        let mut host = ScriptedHost::default();
        let child = tree.create_element("li");
        let err = run("event.setText('x')", &mut tree, &mut host, child).unwrap_err();
        assert!(matches!(err, StamperError::InvalidElement(_)));
    }

    #[test]
    fn test_unknown_callback_fails_at_call() {
        let mut tree = DomTree::new();
        let mut host = ScriptedHost::default();
        let child = tree.create_element("li");
        assert!(synthesize("track(child)", &HOOK_PARAMS).is_ok());
        let err = run("track(child)", &mut tree, &mut host, child).unwrap_err();
        assert!(matches!(err, StamperError::UnknownCallback(name) if name == "track"));
    }

    #[test]
    fn test_registered_callback_receives_args() {
        let mut tree = DomTree::new();
        let mut host = ScriptedHost::default();
        let root = tree.create_element("div");
        let mut callbacks = CallbackTable::new();
        callbacks.register("mark", |ctx, args| {
            let target = args[0].as_element().ok_or_else(|| anyhow::anyhow!("not an element"))?;
            let label = args[1].render(ctx.tree);
            ctx.tree.set_attribute(target, "data-mark", &label)?;
            Ok(())
        });

        let hook = synthesize("// tag the root\nmark(rootEl, 'n' + currentIndex)", &HOOK_PARAMS).unwrap();
        let items = [];
        let mut ctx = HookContext {
            tree: &mut tree,
            host: &mut host,
            current_index: 5,
            root,
            template: root,
            trigger: root,
            container: root,
            items: &items,
            event: None,
        };
        let args = ctx.args();
        hook.call(&mut ctx, &mut callbacks, &args).unwrap();
        assert_eq!(tree.get_attribute(root, "data-mark"), Some("n5"));
    }
}
