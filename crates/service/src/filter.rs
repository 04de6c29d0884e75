//! Result filtering.
//!
//! A filter is a JSON-path-like selector over the fetched body. All matches
//! are wrapped into a JSON array so that zero-vs-one-vs-many selections
//! serialize uniformly across nodes.

use crate::{OracleError, Result};
use serde_json::Value;

/// Applies a filter expression to a fetched body.
///
/// An empty or absent filter passes the body through as strict UTF-8 bytes.
/// A non-empty filter requires the body to parse as JSON and to produce at
/// least one match.
pub fn filter(input: &str, expression: Option<&str>) -> Result<Vec<u8>> {
    let Some(expression) = expression.filter(|e| !e.is_empty()) else {
        return Ok(input.as_bytes().to_vec());
    };

    let root: Value = serde_json::from_str(input)
        .map_err(|e| OracleError::Filter(format!("body is not JSON: {e}")))?;

    let matches = select_tokens(&root, expression)?;
    if matches.is_empty() {
        return Err(OracleError::Filter(format!(
            "selector '{expression}' matched nothing"
        )));
    }

    serde_json::to_vec(&Value::Array(matches))
        .map_err(|e| OracleError::Filter(format!("serialize matches: {e}")))
}

/// One step of a selector path.
#[derive(Debug, PartialEq)]
enum Segment {
    /// `.name` or `['name']`
    Child(String),
    /// `[n]`
    Index(usize),
    /// `.*` or `[*]`
    Wildcard,
    /// `..name` / `..*` / `..[n]`: the inner segment applied at every depth.
    Recursive(Box<Segment>),
}

/// Evaluates a selector, returning every matching value in document order.
fn select_tokens(root: &Value, expression: &str) -> Result<Vec<Value>> {
    let segments = parse_expression(expression)?;
    let mut current = vec![root];
    for segment in &segments {
        let mut next = Vec::new();
        for value in current {
            apply_segment(value, segment, &mut next);
        }
        current = next;
    }
    Ok(current.into_iter().cloned().collect())
}

fn apply_segment<'a>(value: &'a Value, segment: &Segment, out: &mut Vec<&'a Value>) {
    match segment {
        Segment::Child(name) => {
            if let Some(v) = value.get(name.as_str()) {
                out.push(v);
            }
        }
        Segment::Index(index) => {
            if let Some(v) = value.get(index) {
                out.push(v);
            }
        }
        Segment::Wildcard => match value {
            Value::Object(map) => out.extend(map.values()),
            Value::Array(items) => out.extend(items.iter()),
            _ => {}
        },
        Segment::Recursive(inner) => {
            apply_segment(value, inner, out);
            match value {
                Value::Object(map) => {
                    for v in map.values() {
                        apply_segment(v, segment, out);
                    }
                }
                Value::Array(items) => {
                    for v in items {
                        apply_segment(v, segment, out);
                    }
                }
                _ => {}
            }
        }
    }
}

fn parse_expression(expression: &str) -> Result<Vec<Segment>> {
    let bad = |reason: &str| OracleError::Filter(format!("bad selector '{expression}': {reason}"));

    let mut chars = expression.chars().peekable();
    if chars.next() != Some('$') {
        return Err(bad("must start with '$'"));
    }

    let mut segments = Vec::new();
    while let Some(&c) = chars.peek() {
        match c {
            '.' => {
                chars.next();
                let recursive = chars.peek() == Some(&'.');
                if recursive {
                    chars.next();
                }
                let inner = if chars.peek() == Some(&'[') {
                    parse_bracket(&mut chars).ok_or_else(|| bad("unterminated bracket"))?
                } else {
                    let name = read_name(&mut chars);
                    if name.is_empty() {
                        return Err(bad("empty member name"));
                    }
                    if name == "*" {
                        Segment::Wildcard
                    } else {
                        Segment::Child(name)
                    }
                };
                if recursive {
                    segments.push(Segment::Recursive(Box::new(inner)));
                } else {
                    segments.push(inner);
                }
            }
            '[' => {
                let inner =
                    parse_bracket(&mut chars).ok_or_else(|| bad("unterminated bracket"))?;
                segments.push(inner);
            }
            _ => return Err(bad("expected '.' or '['")),
        }
    }
    Ok(segments)
}

fn read_name(chars: &mut std::iter::Peekable<std::str::Chars>) -> String {
    if chars.peek() == Some(&'*') {
        chars.next();
        return "*".to_string();
    }
    let mut name = String::new();
    while let Some(&c) = chars.peek() {
        if c == '.' || c == '[' {
            break;
        }
        name.push(c);
        chars.next();
    }
    name
}

fn parse_bracket(chars: &mut std::iter::Peekable<std::str::Chars>) -> Option<Segment> {
    chars.next(); // consume '['
    let mut body = String::new();
    loop {
        let c = chars.next()?;
        if c == ']' {
            break;
        }
        body.push(c);
    }
    if body == "*" {
        return Some(Segment::Wildcard);
    }
    if (body.starts_with('\'') && body.ends_with('\'') && body.len() >= 2)
        || (body.starts_with('"') && body.ends_with('"') && body.len() >= 2)
    {
        return Some(Segment::Child(body[1..body.len() - 1].to_string()));
    }
    body.parse::<usize>().ok().map(Segment::Index)
}
