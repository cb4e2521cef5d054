//! Lexer and parser for the EJS-style template subset.
//!
//! Supported tags:
//!
//! | Tag                   | Meaning                                       |
//! |-----------------------|-----------------------------------------------|
//! | `<%= expr %>`         | interpolate, HTML-escaped                     |
//! | `<%- expr %>`         | interpolate, raw                              |
//! | `<%# ... %>`          | comment                                       |
//! | `<% if (cond) { %>`   | open a conditional block                      |
//! | `<% } else if (c) { %>` | next branch                                 |
//! | `<% } else { %>`      | fallback branch                               |
//! | `<% } %>`             | close the block                               |
//! | `<%%`                 | literal `<%`                                  |
//!
//! `-%>` swallows one following newline, `<%_` strips spaces and tabs before
//! the tag, `_%>` strips spaces and tabs plus one newline after it.

use thiserror::Error;

const OPEN: &str = "<%";
const CLOSE: &str = "%>";

/// A template syntax or evaluation error, with the 1-based line of the tag.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("line {line}: {message}")]
pub struct TemplateError {
    pub line: usize,
    pub message: String,
}

impl TemplateError {
    pub(crate) fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

/// An interpolated value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Var(String),
    Str(String),
    Bool(bool),
}

/// A boolean guard of an `if` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cond {
    Truthy(Expr),
    Not(Box<Cond>),
    Eq(Expr, Expr),
    NotEq(Expr, Expr),
    And(Box<Cond>, Box<Cond>),
    Or(Box<Cond>, Box<Cond>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branch {
    pub cond: Cond,
    pub body: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Text(String),
    Output { expr: Expr, escape: bool, line: usize },
    If {
        branches: Vec<Branch>,
        otherwise: Vec<Node>,
        line: usize,
    },
}

#[derive(Debug, PartialEq, Eq)]
enum Token {
    Text(String),
    Output { src: String, escape: bool, line: usize },
    Code { src: String, line: usize },
}

/// Split template source into text, output and code tokens.
fn lex(src: &str) -> Result<Vec<Token>, TemplateError> {
    let mut tokens = Vec::new();
    let mut text = String::new();
    let mut rest = src;
    let mut line = 1usize;

    while let Some(pos) = rest.find(OPEN) {
        text.push_str(&rest[..pos]);
        line += rest[..pos].matches('\n').count();
        rest = &rest[pos + OPEN.len()..];

        // `<%%` is an escaped opener
        if let Some(after) = rest.strip_prefix('%') {
            text.push_str(OPEN);
            rest = after;
            continue;
        }

        let tag_line = line;
        let (kind, body_start) = match rest.chars().next() {
            Some('=') => (TagKind::Escaped, 1),
            Some('-') => (TagKind::Raw, 1),
            Some('#') => (TagKind::Comment, 1),
            Some('_') => {
                let trimmed = text.trim_end_matches([' ', '\t']).len();
                text.truncate(trimmed);
                (TagKind::Code, 1)
            }
            _ => (TagKind::Code, 0),
        };

        let close = rest
            .find(CLOSE)
            .ok_or_else(|| TemplateError::new(tag_line, "unclosed tag: missing `%>`"))?;
        let inner = &rest[body_start..close];
        line += rest[..close + CLOSE.len()].matches('\n').count();
        rest = &rest[close + CLOSE.len()..];

        let (inner, trim) = if let Some(stripped) = inner.strip_suffix('-') {
            (stripped, TrimAfter::Newline)
        } else if let Some(stripped) = inner.strip_suffix('_') {
            (stripped, TrimAfter::WhitespaceAndNewline)
        } else {
            (inner, TrimAfter::None)
        };

        if !text.is_empty() {
            tokens.push(Token::Text(std::mem::take(&mut text)));
        }
        match kind {
            TagKind::Escaped | TagKind::Raw => tokens.push(Token::Output {
                src: inner.trim().to_string(),
                escape: kind == TagKind::Escaped,
                line: tag_line,
            }),
            TagKind::Code => tokens.push(Token::Code {
                src: inner.trim().to_string(),
                line: tag_line,
            }),
            TagKind::Comment => {}
        }

        if trim == TrimAfter::WhitespaceAndNewline {
            rest = rest.trim_start_matches([' ', '\t']);
        }
        if trim != TrimAfter::None {
            if let Some(after) = rest.strip_prefix("\r\n").or_else(|| rest.strip_prefix('\n')) {
                rest = after;
                line += 1;
            }
        }
    }

    text.push_str(rest);
    if !text.is_empty() {
        tokens.push(Token::Text(text));
    }
    Ok(tokens)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TagKind {
    Escaped,
    Raw,
    Comment,
    Code,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TrimAfter {
    None,
    Newline,
    WhitespaceAndNewline,
}

enum Statement {
    If(Cond),
    ElseIf(Cond),
    Else,
    End,
}

fn parse_statement(src: &str, line: usize) -> Result<Statement, TemplateError> {
    let unsupported = || TemplateError::new(line, format!("unsupported statement `{src}`"));

    if let Some(rest) = src.strip_prefix('}') {
        let rest = rest.trim_start();
        if rest.is_empty() {
            return Ok(Statement::End);
        }
        let rest = rest.strip_prefix("else").ok_or_else(unsupported)?.trim_start();
        if rest == "{" {
            return Ok(Statement::Else);
        }
        let cond = parse_if_head(rest, line).ok_or_else(unsupported)??;
        return Ok(Statement::ElseIf(cond));
    }

    let cond = parse_if_head(src, line).ok_or_else(unsupported)??;
    Ok(Statement::If(cond))
}

/// Parse `if <cond> {`. Returns `None` when `src` is not an `if` head.
fn parse_if_head(src: &str, line: usize) -> Option<Result<Cond, TemplateError>> {
    let rest = src.strip_prefix("if")?;
    if !rest.starts_with([' ', '\t', '(']) {
        return None;
    }
    let cond_src = rest.trim().strip_suffix('{')?.trim_end();
    Some(parse_cond(cond_src, line))
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum CondToken {
    Ident(String),
    Str(String),
    Not,
    Eq,
    NotEq,
    And,
    Or,
    LParen,
    RParen,
}

fn tokenize_cond(src: &str, line: usize) -> Result<Vec<CondToken>, TemplateError> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = src.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            ' ' | '\t' | '\n' | '\r' => i += 1,
            '(' => {
                tokens.push(CondToken::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(CondToken::RParen);
                i += 1;
            }
            '&' | '|' => {
                if chars.get(i + 1) != Some(&c) {
                    return Err(TemplateError::new(line, format!("unexpected `{c}` in condition")));
                }
                tokens.push(if c == '&' { CondToken::And } else { CondToken::Or });
                i += 2;
            }
            '!' | '=' => {
                let mut j = i + 1;
                while j < chars.len() && chars[j] == '=' {
                    j += 1;
                }
                let op: String = chars[i..j].iter().collect();
                let token = match op.as_str() {
                    "!" => CondToken::Not,
                    "!=" | "!==" => CondToken::NotEq,
                    "==" | "===" => CondToken::Eq,
                    _ => {
                        return Err(TemplateError::new(line, format!("unsupported operator `{op}`")));
                    }
                };
                tokens.push(token);
                i = j;
            }
            '\'' | '"' => {
                let end = chars[i + 1..]
                    .iter()
                    .position(|&ch| ch == c)
                    .ok_or_else(|| TemplateError::new(line, "unterminated string literal"))?;
                tokens.push(CondToken::Str(chars[i + 1..i + 1 + end].iter().collect()));
                i += end + 2;
            }
            c if is_ident_start(c) => {
                let mut j = i + 1;
                while j < chars.len() && is_ident_char(chars[j]) {
                    j += 1;
                }
                tokens.push(CondToken::Ident(chars[i..j].iter().collect()));
                i = j;
            }
            other => {
                return Err(TemplateError::new(line, format!("unexpected `{other}` in condition")));
            }
        }
    }

    Ok(tokens)
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '$'
}

fn is_ident_char(c: char) -> bool {
    is_ident_start(c) || c.is_ascii_digit()
}

struct CondParser {
    tokens: Vec<CondToken>,
    pos: usize,
    line: usize,
}

impl CondParser {
    fn peek(&self) -> Option<&CondToken> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<CondToken> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn error(&self, message: impl Into<String>) -> TemplateError {
        TemplateError::new(self.line, message)
    }

    fn parse_or(&mut self) -> Result<Cond, TemplateError> {
        let mut left = self.parse_and()?;
        while self.peek() == Some(&CondToken::Or) {
            self.pos += 1;
            let right = self.parse_and()?;
            left = Cond::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Cond, TemplateError> {
        let mut left = self.parse_unary()?;
        while self.peek() == Some(&CondToken::And) {
            self.pos += 1;
            let right = self.parse_unary()?;
            left = Cond::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Cond, TemplateError> {
        if self.peek() == Some(&CondToken::Not) {
            self.pos += 1;
            return Ok(Cond::Not(Box::new(self.parse_unary()?)));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Cond, TemplateError> {
        if self.peek() == Some(&CondToken::LParen) {
            self.pos += 1;
            let inner = self.parse_or()?;
            if self.advance() != Some(CondToken::RParen) {
                return Err(self.error("expected `)` in condition"));
            }
            return Ok(inner);
        }

        let left = self.parse_operand()?;
        match self.peek() {
            Some(CondToken::Eq) => {
                self.pos += 1;
                Ok(Cond::Eq(left, self.parse_operand()?))
            }
            Some(CondToken::NotEq) => {
                self.pos += 1;
                Ok(Cond::NotEq(left, self.parse_operand()?))
            }
            _ => Ok(Cond::Truthy(left)),
        }
    }

    fn parse_operand(&mut self) -> Result<Expr, TemplateError> {
        match self.advance() {
            Some(CondToken::Ident(name)) => Ok(ident_expr(name)),
            Some(CondToken::Str(s)) => Ok(Expr::Str(s)),
            Some(other) => Err(self.error(format!("unexpected {other:?} in condition"))),
            None => Err(self.error("unexpected end of condition")),
        }
    }
}

fn ident_expr(name: String) -> Expr {
    match name.as_str() {
        "true" => Expr::Bool(true),
        "false" => Expr::Bool(false),
        _ => Expr::Var(name),
    }
}

/// Parse a condition such as `(includeManifold && variant !== 'metaplex')`.
pub fn parse_cond(src: &str, line: usize) -> Result<Cond, TemplateError> {
    let tokens = tokenize_cond(src, line)?;
    if tokens.is_empty() {
        return Err(TemplateError::new(line, "empty condition"));
    }
    let mut parser = CondParser { tokens, pos: 0, line };
    let cond = parser.parse_or()?;
    if parser.pos < parser.tokens.len() {
        return Err(parser.error(format!("trailing tokens in condition `{src}`")));
    }
    Ok(cond)
}

/// Parse the body of an output tag: a parameter name or a string literal.
pub fn parse_expr(src: &str, line: usize) -> Result<Expr, TemplateError> {
    let src = src.trim().trim_end_matches(';').trim_end();
    if src.is_empty() {
        return Err(TemplateError::new(line, "empty output tag"));
    }

    for quote in ['\'', '"'] {
        if let Some(inner) = src.strip_prefix(quote).and_then(|s| s.strip_suffix(quote)) {
            if !inner.contains(quote) {
                return Ok(Expr::Str(inner.to_string()));
            }
        }
    }

    let mut chars = src.chars();
    let valid = chars.next().is_some_and(is_ident_start) && chars.all(is_ident_char);
    if !valid {
        return Err(TemplateError::new(line, format!("unsupported expression `{src}`")));
    }
    Ok(ident_expr(src.to_string()))
}

struct Frame {
    branches: Vec<Branch>,
    cond: Option<Cond>,
    body: Vec<Node>,
    line: usize,
}

/// Parse template source into a node tree.
pub fn parse(src: &str) -> Result<Vec<Node>, TemplateError> {
    let mut root = Vec::new();
    let mut stack: Vec<Frame> = Vec::new();

    for token in lex(src)? {
        let node = match token {
            Token::Text(text) => Node::Text(text),
            Token::Output { src, escape, line } => Node::Output {
                expr: parse_expr(&src, line)?,
                escape,
                line,
            },
            Token::Code { src, line } => {
                match parse_statement(&src, line)? {
                    Statement::If(cond) => stack.push(Frame {
                        branches: Vec::new(),
                        cond: Some(cond),
                        body: Vec::new(),
                        line,
                    }),
                    Statement::ElseIf(cond) => {
                        let frame = open_frame(&mut stack, line, "else if")?;
                        let prev = frame.cond.replace(cond).ok_or_else(|| {
                            TemplateError::new(line, "`else if` after `else`")
                        })?;
                        let body = std::mem::take(&mut frame.body);
                        frame.branches.push(Branch { cond: prev, body });
                    }
                    Statement::Else => {
                        let frame = open_frame(&mut stack, line, "else")?;
                        let prev = frame
                            .cond
                            .take()
                            .ok_or_else(|| TemplateError::new(line, "duplicate `else`"))?;
                        let body = std::mem::take(&mut frame.body);
                        frame.branches.push(Branch { cond: prev, body });
                    }
                    Statement::End => {
                        let mut frame = stack
                            .pop()
                            .ok_or_else(|| TemplateError::new(line, "unmatched `}`"))?;
                        let otherwise = match frame.cond.take() {
                            Some(cond) => {
                                frame.branches.push(Branch { cond, body: frame.body });
                                Vec::new()
                            }
                            None => frame.body,
                        };
                        let node = Node::If {
                            branches: frame.branches,
                            otherwise,
                            line: frame.line,
                        };
                        push_node(&mut stack, &mut root, node);
                    }
                }
                continue;
            }
        };
        push_node(&mut stack, &mut root, node);
    }

    if let Some(frame) = stack.last() {
        return Err(TemplateError::new(frame.line, "unclosed `if` block"));
    }
    Ok(root)
}

fn open_frame<'a>(
    stack: &'a mut [Frame],
    line: usize,
    keyword: &str,
) -> Result<&'a mut Frame, TemplateError> {
    stack
        .last_mut()
        .ok_or_else(|| TemplateError::new(line, format!("`{keyword}` without `if`")))
}

fn push_node(stack: &mut [Frame], root: &mut Vec<Node>, node: Node) {
    match stack.last_mut() {
        Some(frame) => frame.body.push(node),
        None => root.push(node),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn var(name: &str) -> Expr {
        Expr::Var(name.to_string())
    }

    #[test]
    fn test_lex_plain_text() {
        assert_eq!(lex("hello").unwrap(), vec![Token::Text("hello".into())]);
        assert!(lex("").unwrap().is_empty());
    }

    #[test]
    fn test_lex_escaped_opener() {
        assert_eq!(lex("a <%% b").unwrap(), vec![Token::Text("a <% b".into())]);
    }

    #[test]
    fn test_lex_trim_modifiers() {
        let tokens = lex("  <%_ if (x) { _%>  \nbody\n<% } -%>\nend").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Code { src: "if (x) {".into(), line: 1 },
                Token::Text("body\n".into()),
                Token::Code { src: "}".into(), line: 3 },
                Token::Text("end".into()),
            ]
        );
    }

    #[test]
    fn test_lex_comment_dropped() {
        assert_eq!(
            lex("a<%# note %>b").unwrap(),
            vec![Token::Text("a".into()), Token::Text("b".into())]
        );
    }

    #[test]
    fn test_lex_unclosed_reports_line() {
        let err = lex("one\ntwo <%= name").unwrap_err();
        assert_eq!(err.line, 2);
    }

    #[test]
    fn test_parse_expr() {
        assert_eq!(parse_expr(" name ", 1).unwrap(), var("name"));
        assert_eq!(parse_expr("'lit'", 1).unwrap(), Expr::Str("lit".into()));
        assert_eq!(parse_expr("true", 1).unwrap(), Expr::Bool(true));
        assert!(parse_expr("a + b", 1).is_err());
        assert!(parse_expr("", 1).is_err());
    }

    #[test]
    fn test_parse_cond_precedence() {
        let cond = parse_cond("a || b && !c", 1).unwrap();
        assert_eq!(
            cond,
            Cond::Or(
                Box::new(Cond::Truthy(var("a"))),
                Box::new(Cond::And(
                    Box::new(Cond::Truthy(var("b"))),
                    Box::new(Cond::Not(Box::new(Cond::Truthy(var("c"))))),
                )),
            )
        );
    }

    #[test]
    fn test_parse_cond_comparison() {
        assert_eq!(
            parse_cond("(variant === 'manifold')", 1).unwrap(),
            Cond::Eq(var("variant"), Expr::Str("manifold".into()))
        );
        assert_eq!(
            parse_cond("variant != \"metaplex\"", 1).unwrap(),
            Cond::NotEq(var("variant"), Expr::Str("metaplex".into()))
        );
    }

    #[test]
    fn test_parse_cond_errors() {
        assert!(parse_cond("", 1).is_err());
        assert!(parse_cond("(a", 1).is_err());
        assert!(parse_cond("a b", 1).is_err());
        assert!(parse_cond("a = b", 1).is_err());
        assert!(parse_cond("a & b", 1).is_err());
        assert!(parse_cond("'open", 1).is_err());
    }

    #[test]
    fn test_parse_if_else_chain() {
        let nodes = parse("<% if (a) { %>A<% } else if (b) { %>B<% } else { %>C<% } %>").unwrap();
        assert_eq!(
            nodes,
            vec![Node::If {
                branches: vec![
                    Branch {
                        cond: Cond::Truthy(var("a")),
                        body: vec![Node::Text("A".into())],
                    },
                    Branch {
                        cond: Cond::Truthy(var("b")),
                        body: vec![Node::Text("B".into())],
                    },
                ],
                otherwise: vec![Node::Text("C".into())],
                line: 1,
            }]
        );
    }

    #[test]
    fn test_parse_nested_blocks() {
        let nodes = parse("<% if (a) { %><% if (b) { %>x<% } %><% } %>").unwrap();
        match &nodes[0] {
            Node::If {
                branches, otherwise, ..
            } => {
                assert!(otherwise.is_empty());
                assert!(matches!(branches[0].body[0], Node::If { .. }));
            }
            other => panic!("unexpected node: {other:?}"),
        }
    }

    #[test]
    fn test_parse_block_errors() {
        assert_eq!(parse("<% if (a) { %>x").unwrap_err().line, 1);
        assert!(parse("<% } %>").is_err());
        assert!(parse("<% } else { %>").is_err());
        assert!(parse("<% if (a) { %><% } else { %><% } else { %><% } %>").is_err());
        assert!(parse("<% for (const x of y) { %>").is_err());
        assert!(parse("<% iffy { %>").is_err());
    }
}
