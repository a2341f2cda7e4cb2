//! Label selectors, as understood by the Kubernetes API server.
//!
//! Selectors are validated locally before they are sent, so that a malformed
//! expression can be told apart from a failing API server.

use std::collections::BTreeSet;

use kube_core::{Expression, Selector};

use crate::error::{Error, Result};

const MAX_NAME_LEN: usize = 63;
const MAX_PREFIX_LEN: usize = 253;

/// Parse a label selector such as `name=deis,tier in (web,worker),!legacy`.
///
/// The empty selector is valid and selects everything.
pub fn parse_selector(selector: &str) -> Result<Selector> {
    let tokens = tokenize(selector);
    let expressions = Parser { tokens, pos: 0 }
        .parse()
        .map_err(|reason| Error::SelectorParse {
            selector: selector.to_string(),
            reason,
        })?;
    Ok(expressions.into_iter().collect())
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Ident(String),
    OpenParen,
    CloseParen,
    Comma,
    Equals,
    DoubleEquals,
    NotEquals,
    Bang,
}

fn is_special(c: char) -> bool {
    matches!(c, '(' | ')' | ',' | '=' | '!')
}

fn tokenize(input: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }
        let token = match c {
            '(' => Token::OpenParen,
            ')' => Token::CloseParen,
            ',' => Token::Comma,
            '=' => {
                chars.next();
                if chars.peek() == Some(&'=') {
                    chars.next();
                    tokens.push(Token::DoubleEquals);
                } else {
                    tokens.push(Token::Equals);
                }
                continue;
            }
            '!' => {
                chars.next();
                if chars.peek() == Some(&'=') {
                    chars.next();
                    tokens.push(Token::NotEquals);
                } else {
                    tokens.push(Token::Bang);
                }
                continue;
            }
            _ => {
                let mut ident = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_whitespace() || is_special(c) {
                        break;
                    }
                    ident.push(c);
                    chars.next();
                }
                tokens.push(Token::Ident(ident));
                continue;
            }
        };
        chars.next();
        tokens.push(token);
    }

    tokens
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

type ParseResult<T> = std::result::Result<T, String>;

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn parse(mut self) -> ParseResult<Vec<Expression>> {
        let mut requirements = Vec::new();
        if self.tokens.is_empty() {
            return Ok(requirements);
        }

        loop {
            requirements.push(self.requirement()?);
            match self.next() {
                None => return Ok(requirements),
                Some(Token::Comma) => continue,
                Some(token) => return Err(format!("expected ',' but found {token:?}")),
            }
        }
    }

    fn requirement(&mut self) -> ParseResult<Expression> {
        match self.next() {
            Some(Token::Bang) => {
                let key = self.key()?;
                Ok(Expression::DoesNotExist(key))
            }
            Some(Token::Ident(key)) => {
                validate_key(&key)?;
                self.operator(key)
            }
            Some(token) => Err(format!("expected a label key but found {token:?}")),
            None => Err("expected a label key but found end of input".to_string()),
        }
    }

    fn key(&mut self) -> ParseResult<String> {
        match self.next() {
            Some(Token::Ident(key)) => {
                validate_key(&key)?;
                Ok(key)
            }
            Some(token) => Err(format!("expected a label key but found {token:?}")),
            None => Err("expected a label key but found end of input".to_string()),
        }
    }

    fn operator(&mut self, key: String) -> ParseResult<Expression> {
        match self.peek() {
            None | Some(Token::Comma) => Ok(Expression::Exists(key)),
            Some(Token::Equals) | Some(Token::DoubleEquals) => {
                self.next();
                Ok(Expression::Equal(key, self.value()?))
            }
            Some(Token::NotEquals) => {
                self.next();
                Ok(Expression::NotEqual(key, self.value()?))
            }
            Some(Token::Ident(op)) if op == "in" => {
                self.next();
                Ok(Expression::In(key, self.value_set()?))
            }
            Some(Token::Ident(op)) if op == "notin" => {
                self.next();
                Ok(Expression::NotIn(key, self.value_set()?))
            }
            Some(token) => Err(format!("expected an operator after {key:?} but found {token:?}")),
        }
    }

    fn value(&mut self) -> ParseResult<String> {
        let value = match self.peek() {
            Some(Token::Ident(value)) => value.clone(),
            _ => return Ok(String::new()),
        };
        self.next();
        validate_value(&value)?;
        Ok(value)
    }

    fn value_set(&mut self) -> ParseResult<BTreeSet<String>> {
        match self.next() {
            Some(Token::OpenParen) => {}
            other => return Err(format!("expected '(' but found {other:?}")),
        }
        if self.peek() == Some(&Token::CloseParen) {
            return Err("values set can't be empty".to_string());
        }

        let mut values = BTreeSet::new();
        loop {
            values.insert(self.value()?);
            match self.next() {
                Some(Token::Comma) => continue,
                Some(Token::CloseParen) => return Ok(values),
                other => return Err(format!("expected ',' or ')' but found {other:?}")),
            }
        }
    }
}

/// Names are alphanumerics plus `-`, `_` and `.`, beginning and ending with an alphanumeric.
fn is_qualified_name(s: &str) -> bool {
    let starts_and_ends_alnum = s.chars().next().map_or(false, |c| c.is_ascii_alphanumeric())
        && s.chars().last().map_or(false, |c| c.is_ascii_alphanumeric());
    starts_and_ends_alnum
        && s.chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

fn is_dns_subdomain(s: &str) -> bool {
    s.len() <= MAX_PREFIX_LEN
        && s.split('.').all(|part| {
            !part.is_empty()
                && part.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
                && !part.starts_with('-')
                && !part.ends_with('-')
        })
}

fn validate_key(key: &str) -> ParseResult<()> {
    let (prefix, name) = match key.split_once('/') {
        Some((prefix, name)) => (Some(prefix), name),
        None => (None, key),
    };
    if let Some(prefix) = prefix {
        if !is_dns_subdomain(prefix) {
            return Err(format!("key prefix {prefix:?} is not a valid DNS subdomain"));
        }
    }
    if name.len() > MAX_NAME_LEN || !is_qualified_name(name) {
        return Err(format!("key {key:?} is not a valid label key"));
    }
    Ok(())
}

fn validate_value(value: &str) -> ParseResult<()> {
    if value.is_empty() {
        return Ok(());
    }
    if value.len() > MAX_NAME_LEN || !is_qualified_name(value) {
        return Err(format!("value {value:?} is not a valid label value"));
    }
    Ok(())
}
