//! Reader for the bracket notation printed by `Term`'s `Display` impl.
//!
//! ```text
//! identifier:x               leaf
//! [statements a b]           sequence
//! {function name | a b}      container, `_` for a missing slot
//! (call f x)                 branch
//! ```

#![allow(dead_code)]

use eucalyptus::{SimpleTypes, Term};

pub type Types = SimpleTypes<String, String>;

pub fn parse(input: &str) -> Result<Term<Types>, String> {
    let tokens = tokenize(input);
    let mut pos = 0;
    let term = term(&tokens, &mut pos)?;
    if pos != tokens.len() {
        return Err(format!("trailing input after term: {:?}", &tokens[pos..]));
    }
    Ok(term)
}

/// Like [`parse`], for literals in test code.
pub fn term_of(input: &str) -> Term<Types> {
    match parse(input) {
        Ok(term) => term,
        Err(e) => panic!("bad term {input:?}: {e}"),
    }
}

fn tokenize(input: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    for c in input.chars() {
        match c {
            '[' | ']' | '{' | '}' | '(' | ')' | '|' => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
                tokens.push(c.to_string());
            }
            c if c.is_whitespace() => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

fn next<'t>(tokens: &'t [String], pos: &mut usize) -> Result<&'t str, String> {
    let token = tokens
        .get(*pos)
        .ok_or_else(|| "unexpected end of input".to_string())?;
    *pos += 1;
    Ok(token)
}

fn peek<'t>(tokens: &'t [String], pos: usize) -> Option<&'t str> {
    tokens.get(pos).map(String::as_str)
}

fn category(tokens: &[String], pos: &mut usize) -> Result<String, String> {
    let token = next(tokens, pos)?;
    if is_punct(token) {
        return Err(format!("expected a category, found {token:?}"));
    }
    Ok(token.to_string())
}

fn is_punct(token: &str) -> bool {
    matches!(token, "[" | "]" | "{" | "}" | "(" | ")" | "|")
}

fn children(tokens: &[String], pos: &mut usize, close: &str) -> Result<Vec<Term<Types>>, String> {
    let mut out = Vec::new();
    while peek(tokens, *pos) != Some(close) {
        out.push(term(tokens, pos)?);
    }
    *pos += 1;
    Ok(out)
}

fn term(tokens: &[String], pos: &mut usize) -> Result<Term<Types>, String> {
    match next(tokens, pos)? {
        "[" => {
            let cat = category(tokens, pos)?;
            Ok(Term::sequence(cat, children(tokens, pos, "]")?))
        }
        "(" => {
            let cat = category(tokens, pos)?;
            Ok(Term::branch(cat, children(tokens, pos, ")")?))
        }
        "{" => {
            let cat = category(tokens, pos)?;
            let slot = if peek(tokens, *pos) == Some("_") {
                *pos += 1;
                None
            } else {
                Some(term(tokens, pos)?)
            };
            match next(tokens, pos)? {
                "|" => {}
                other => return Err(format!("expected '|' after slot, found {other:?}")),
            }
            Ok(Term::container(cat, slot, children(tokens, pos, "}")?))
        }
        token if is_punct(token) => Err(format!("unexpected {token:?}")),
        token => match token.split_once(':') {
            Some((cat, label)) => Ok(Term::leaf(cat.to_string(), label.to_string())),
            None => Err(format!("leaf {token:?} must be written category:label")),
        },
    }
}
