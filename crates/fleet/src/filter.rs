// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The include/exclude filter expression language (§4.12): a small
//! hand-rolled lexer, recursive-descent parser and evaluator over the field
//! set `{id, name, type, state, host.id, host.name, host.provider,
//! host.tags.<key>, age, idle}`.
//!
//! Grammar: `field OP literal` combined with `&&` / `||` / `!` / parens.
//! `OP` is one of `== != ~= < > <= >=`; `~=` is a substring match.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FilterError {
    #[error("unexpected character {0:?} at position {1}")]
    UnexpectedChar(char, usize),
    #[error("unterminated string literal")]
    UnterminatedString,
    #[error("unexpected end of filter expression")]
    UnexpectedEnd,
    #[error("expected {expected}, found {found:?}")]
    Expected { expected: &'static str, found: String },
    #[error("unknown field {0:?}")]
    UnknownField(String),
    #[error("operator {op} is not valid for field {field:?}")]
    InvalidOperator { op: &'static str, field: String },
    #[error("{field:?} expects a numeric or duration literal, found {value:?}")]
    InvalidLiteral { field: String, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Match,
    Lt,
    Gt,
    Le,
    Ge,
}

impl CompareOp {
    fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Match => "~=",
            Self::Lt => "<",
            Self::Gt => ">",
            Self::Le => "<=",
            Self::Ge => ">=",
        }
    }
}

/// A dotted field path, e.g. `host.tags.env` -> `["host", "tags", "env"]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath(pub Vec<String>);

impl FieldPath {
    fn as_display(&self) -> String {
        self.0.join(".")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Compare { field: FieldPath, op: CompareOp, value: String },
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Not(Box<Expr>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Ident(String),
    Str(String),
    Op(CompareOp),
    And,
    Or,
    Not,
    LParen,
    RParen,
}

struct Lexer<'a> {
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
    src: &'a str,
}

impl<'a> Lexer<'a> {
    fn new(src: &'a str) -> Self {
        Self { chars: src.char_indices().peekable(), src }
    }

    fn tokenize(mut self) -> Result<Vec<Token>, FilterError> {
        let mut tokens = Vec::new();
        while let Some(&(pos, ch)) = self.chars.peek() {
            match ch {
                c if c.is_whitespace() => {
                    self.chars.next();
                }
                '(' => {
                    self.chars.next();
                    tokens.push(Token::LParen);
                }
                ')' => {
                    self.chars.next();
                    tokens.push(Token::RParen);
                }
                '!' => {
                    self.chars.next();
                    if self.consume_if('=') {
                        tokens.push(Token::Op(CompareOp::Ne));
                    } else {
                        tokens.push(Token::Not);
                    }
                }
                '=' => {
                    self.chars.next();
                    if self.consume_if('=') {
                        tokens.push(Token::Op(CompareOp::Eq));
                    } else {
                        return Err(FilterError::UnexpectedChar('=', pos));
                    }
                }
                '~' => {
                    self.chars.next();
                    if self.consume_if('=') {
                        tokens.push(Token::Op(CompareOp::Match));
                    } else {
                        return Err(FilterError::UnexpectedChar('~', pos));
                    }
                }
                '<' => {
                    self.chars.next();
                    if self.consume_if('=') {
                        tokens.push(Token::Op(CompareOp::Le));
                    } else {
                        tokens.push(Token::Op(CompareOp::Lt));
                    }
                }
                '>' => {
                    self.chars.next();
                    if self.consume_if('=') {
                        tokens.push(Token::Op(CompareOp::Ge));
                    } else {
                        tokens.push(Token::Op(CompareOp::Gt));
                    }
                }
                '&' => {
                    self.chars.next();
                    if self.consume_if('&') {
                        tokens.push(Token::And);
                    } else {
                        return Err(FilterError::UnexpectedChar('&', pos));
                    }
                }
                '|' => {
                    self.chars.next();
                    if self.consume_if('|') {
                        tokens.push(Token::Or);
                    } else {
                        return Err(FilterError::UnexpectedChar('|', pos));
                    }
                }
                '"' | '\'' => {
                    tokens.push(Token::Str(self.read_quoted(ch)?));
                }
                c if c.is_alphanumeric() || c == '_' || c == '.' || c == '-' => {
                    tokens.push(Token::Ident(self.read_ident()));
                }
                other => return Err(FilterError::UnexpectedChar(other, pos)),
            }
        }
        Ok(tokens)
    }

    fn consume_if(&mut self, expect: char) -> bool {
        if self.chars.peek().map(|&(_, c)| c) == Some(expect) {
            self.chars.next();
            true
        } else {
            false
        }
    }

    fn read_quoted(&mut self, quote: char) -> Result<String, FilterError> {
        self.chars.next();
        let mut out = String::new();
        loop {
            match self.chars.next() {
                Some((_, c)) if c == quote => return Ok(out),
                Some((_, c)) => out.push(c),
                None => return Err(FilterError::UnterminatedString),
            }
        }
    }

    fn read_ident(&mut self) -> String {
        let start = self.chars.peek().map(|&(pos, _)| pos).unwrap_or(self.src.len());
        let mut end = start;
        while let Some(&(pos, c)) = self.chars.peek() {
            if c.is_alphanumeric() || c == '_' || c == '.' || c == '-' {
                end = pos + c.len_utf8();
                self.chars.next();
            } else {
                break;
            }
        }
        self.src[start..end].to_string()
    }
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let tok = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        tok
    }

    fn parse_expr(&mut self) -> Result<Expr, FilterError> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> Result<Expr, FilterError> {
        let mut left = self.parse_and()?;
        while matches!(self.peek(), Some(Token::Or)) {
            self.advance();
            let right = self.parse_and()?;
            left = Expr::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, FilterError> {
        let mut left = self.parse_unary()?;
        while matches!(self.peek(), Some(Token::And)) {
            self.advance();
            let right = self.parse_unary()?;
            left = Expr::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, FilterError> {
        match self.peek() {
            Some(Token::Not) => {
                self.advance();
                Ok(Expr::Not(Box::new(self.parse_unary()?)))
            }
            Some(Token::LParen) => {
                self.advance();
                let inner = self.parse_expr()?;
                match self.advance() {
                    Some(Token::RParen) => Ok(inner),
                    other => Err(FilterError::Expected { expected: "')'", found: format!("{other:?}") }),
                }
            }
            _ => self.parse_comparison(),
        }
    }

    fn parse_comparison(&mut self) -> Result<Expr, FilterError> {
        let field = match self.advance() {
            Some(Token::Ident(name)) => FieldPath(name.split('.').map(str::to_string).collect()),
            other => return Err(FilterError::Expected { expected: "field name", found: format!("{other:?}") }),
        };
        let op = match self.advance() {
            Some(Token::Op(op)) => op,
            other => return Err(FilterError::Expected { expected: "comparison operator", found: format!("{other:?}") }),
        };
        let value = match self.advance() {
            Some(Token::Ident(text)) | Some(Token::Str(text)) => text,
            other => return Err(FilterError::Expected { expected: "literal", found: format!("{other:?}") }),
        };
        Ok(Expr::Compare { field, op, value })
    }
}

/// Parse one filter expression. Callers pass each `--include`/`--exclude`
/// occurrence through this separately; the fleet pipeline ANDs the includes
/// together and ORs the excludes together per §4.12.
pub fn parse(src: &str) -> Result<Expr, FilterError> {
    let tokens = Lexer::new(src).tokenize()?;
    if tokens.is_empty() {
        return Err(FilterError::UnexpectedEnd);
    }
    let mut parser = Parser::new(tokens);
    let expr = parser.parse_expr()?;
    if parser.pos != parser.tokens.len() {
        return Err(FilterError::Expected { expected: "end of expression", found: format!("{:?}", parser.tokens[parser.pos]) });
    }
    Ok(expr)
}

/// One field value as resolved from a fleet target, typed so the evaluator
/// can reject operators that don't make sense for it (`age < running` is a
/// parse-time-unknowable error, caught here instead).
#[derive(Debug, Clone)]
pub enum FieldValue {
    Str(String),
    OptStr(Option<String>),
    Num(u64),
    OptNum(Option<u64>),
}

/// Implemented by whatever the filter is being matched against (an agent
/// summary, in practice); kept as a trait so tests can use a minimal fixture
/// instead of constructing a full `AgentSummary`.
pub trait FilterTarget {
    fn field(&self, path: &[String]) -> Option<FieldValue>;
}

pub fn eval<T: FilterTarget>(expr: &Expr, target: &T) -> Result<bool, FilterError> {
    match expr {
        Expr::And(a, b) => Ok(eval(a, target)? && eval(b, target)?),
        Expr::Or(a, b) => Ok(eval(a, target)? || eval(b, target)?),
        Expr::Not(inner) => Ok(!eval(inner, target)?),
        Expr::Compare { field, op, value } => eval_compare(field, *op, value, target),
    }
}

fn eval_compare<T: FilterTarget>(field: &FieldPath, op: CompareOp, literal: &str, target: &T) -> Result<bool, FilterError> {
    let field_display = field.as_display();
    let resolved = target.field(&field.0).ok_or_else(|| FilterError::UnknownField(field_display.clone()))?;
    match resolved {
        FieldValue::Str(actual) => eval_str(&actual, op, literal, &field_display),
        FieldValue::OptStr(actual) => eval_str(actual.as_deref().unwrap_or(""), op, literal, &field_display),
        FieldValue::Num(actual) => eval_num(actual, op, literal, &field_display),
        FieldValue::OptNum(actual) => match actual {
            Some(actual) => eval_num(actual, op, literal, &field_display),
            // A field with no recorded value (e.g. idle before any activity
            // has ever been touched) never satisfies a numeric comparison.
            None => Ok(false),
        },
    }
}

fn eval_str(actual: &str, op: CompareOp, literal: &str, field: &str) -> Result<bool, FilterError> {
    match op {
        CompareOp::Eq => Ok(actual == literal),
        CompareOp::Ne => Ok(actual != literal),
        CompareOp::Match => Ok(actual.contains(literal)),
        CompareOp::Lt | CompareOp::Gt | CompareOp::Le | CompareOp::Ge => {
            Err(FilterError::InvalidOperator { op: op.as_str(), field: field.to_string() })
        }
    }
}

fn eval_num(actual: u64, op: CompareOp, literal: &str, field: &str) -> Result<bool, FilterError> {
    let value = parse_duration_seconds(literal)
        .ok_or_else(|| FilterError::InvalidLiteral { field: field.to_string(), value: literal.to_string() })?;
    match op {
        CompareOp::Eq => Ok(actual == value),
        CompareOp::Ne => Ok(actual != value),
        CompareOp::Lt => Ok(actual < value),
        CompareOp::Gt => Ok(actual > value),
        CompareOp::Le => Ok(actual <= value),
        CompareOp::Ge => Ok(actual >= value),
        CompareOp::Match => Err(FilterError::InvalidOperator { op: op.as_str(), field: field.to_string() }),
    }
}

/// Accepts a bare second count (`"600"`) or a single suffixed duration
/// (`"10m"`, `"2h"`, `"1d"`).
fn parse_duration_seconds(literal: &str) -> Option<u64> {
    if let Ok(secs) = literal.parse::<u64>() {
        return Some(secs);
    }
    let (digits, suffix) = literal.split_at(literal.len().saturating_sub(1));
    let amount: u64 = digits.parse().ok()?;
    match suffix {
        "s" => Some(amount),
        "m" => Some(amount * 60),
        "h" => Some(amount * 3600),
        "d" => Some(amount * 86400),
        _ => None,
    }
}

#[cfg(test)]
#[path = "filter_tests.rs"]
mod tests;
