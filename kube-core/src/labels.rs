//! Label selectors: the [`Expression`]/[`Selector`] model, plus a parser for
//! the wire-format selector string (`k=v,k2!=v2,k3 in (a,b),k4,!k5`) that
//! the upstream builder-only type didn't need, since it only ever built
//! selectors rather than decoding them off an incoming query string.
use std::{collections::BTreeMap, fmt, iter::FromIterator};
use thiserror::Error;

type Map = BTreeMap<String, String>;
type Expressions = Vec<Expression>;

/// A single selector requirement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Expression {
    /// `key in (v1,v2,...)`
    In(String, Vec<String>),
    /// `key notin (v1,v2,...)`
    NotIn(String, Vec<String>),
    /// `key=value` or `key==value`
    Equal(String, String),
    /// `key!=value`
    NotEqual(String, String),
    /// `key` (bare existence check)
    Exists(String),
    /// `!key`
    DoesNotExist(String),
}

/// A conjunction of [`Expression`]s: an object matches the selector only if
/// it matches every expression in it.
#[derive(Clone, Debug, Eq, PartialEq, Default)]
pub struct Selector(Expressions);

/// A malformed selector string.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid selector term: {0}")]
pub struct ParseSelectorError(pub String);

impl Selector {
    /// Build from a vector of expressions.
    pub fn from_expressions(exprs: Expressions) -> Self {
        Self(exprs)
    }

    /// Build an all-equality selector from a label map.
    pub fn from_map(map: Map) -> Self {
        Self(map.into_iter().map(|(k, v)| Expression::Equal(k, v)).collect())
    }

    /// Whether this selector matches everything (no terms).
    pub fn selects_all(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether the given label set satisfies every term.
    pub fn matches(&self, labels: &Map) -> bool {
        self.0.iter().all(|expr| expr.matches(labels))
    }

    /// Parse a wire-format selector string.
    ///
    /// Grammar (comma-separated terms):
    /// - `key=value` / `key==value`
    /// - `key!=value`
    /// - `key in (v1,v2)`
    /// - `key notin (v1,v2)`
    /// - `key` (exists)
    /// - `!key` (does not exist)
    ///
    /// An empty or all-whitespace string parses to the empty (match-all)
    /// selector.
    pub fn parse(raw: &str) -> Result<Self, ParseSelectorError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(Self::default());
        }
        let mut exprs = Vec::new();
        for term in split_terms(raw) {
            exprs.push(parse_term(term.trim())?);
        }
        Ok(Self(exprs))
    }
}

// Splits on top-level commas, respecting `( ... )` grouping used by in/notin.
fn split_terms(raw: &str) -> Vec<&str> {
    let mut terms = Vec::new();
    let mut depth = 0i32;
    let mut start = 0usize;
    for (i, c) in raw.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth -= 1,
            ',' if depth == 0 => {
                terms.push(&raw[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    terms.push(&raw[start..]);
    terms
}

fn parse_term(term: &str) -> Result<Expression, ParseSelectorError> {
    if let Some(key) = term.strip_prefix('!') {
        let key = key.trim();
        if key.is_empty() || key.contains(char::is_whitespace) {
            return Err(ParseSelectorError(term.to_string()));
        }
        return Ok(Expression::DoesNotExist(key.to_string()));
    }
    if let Some(rest) = term.find("!=").map(|i| (i, "!=")).or_else(|| term.find("==").map(|i| (i, "=="))) {
        let (idx, op) = rest;
        let key = term[..idx].trim();
        let value = term[idx + op.len()..].trim();
        if key.is_empty() {
            return Err(ParseSelectorError(term.to_string()));
        }
        return Ok(if op == "!=" {
            Expression::NotEqual(key.to_string(), value.to_string())
        } else {
            Expression::Equal(key.to_string(), value.to_string())
        });
    }
    if let Some(idx) = term.find('=') {
        let key = term[..idx].trim();
        let value = term[idx + 1..].trim();
        if key.is_empty() {
            return Err(ParseSelectorError(term.to_string()));
        }
        return Ok(Expression::Equal(key.to_string(), value.to_string()));
    }
    if let Some(rest) = term.strip_suffix(')') {
        for (kw, ctor) in [
            (" notin (", Expression::NotIn as fn(String, Vec<String>) -> Expression),
            (" in (", Expression::In),
        ] {
            if let Some(idx) = rest.find(kw) {
                let key = rest[..idx].trim();
                let values_raw = &rest[idx + kw.len()..];
                if key.is_empty() {
                    return Err(ParseSelectorError(term.to_string()));
                }
                let values = values_raw
                    .split(',')
                    .map(|v| v.trim().to_string())
                    .filter(|v| !v.is_empty())
                    .collect::<Vec<_>>();
                if values.is_empty() {
                    return Err(ParseSelectorError(term.to_string()));
                }
                return Ok(ctor(key.to_string(), values));
            }
        }
        return Err(ParseSelectorError(term.to_string()));
    }
    let key = term.trim();
    if key.is_empty() || key.contains(char::is_whitespace) {
        return Err(ParseSelectorError(term.to_string()));
    }
    Ok(Expression::Exists(key.to_string()))
}

impl Expression {
    fn matches(&self, labels: &Map) -> bool {
        match self {
            Expression::In(key, values) => labels.get(key).is_some_and(|v| values.contains(v)),
            Expression::NotIn(key, values) => labels.get(key).is_none_or(|v| !values.contains(v)),
            Expression::Exists(key) => labels.contains_key(key),
            Expression::DoesNotExist(key) => !labels.contains_key(key),
            Expression::Equal(key, value) => labels.get(key) == Some(value),
            Expression::NotEqual(key, value) => labels.get(key) != Some(value),
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::In(key, values) => write!(f, "{key} in ({})", values.join(",")),
            Expression::NotIn(key, values) => write!(f, "{key} notin ({})", values.join(",")),
            Expression::Equal(key, value) => write!(f, "{key}={value}"),
            Expression::NotEqual(key, value) => write!(f, "{key}!={value}"),
            Expression::Exists(key) => write!(f, "{key}"),
            Expression::DoesNotExist(key) => write!(f, "!{key}"),
        }
    }
}

impl FromIterator<(String, String)> for Selector {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self::from_map(iter.into_iter().collect())
    }
}
