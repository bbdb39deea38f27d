//! Structured paths: ordered steps, each with an optional key predicate.
//!
//! The textual form is `/a/b[k1=v1][k2=v2]/c`. Inside a predicate value,
//! `/` needs no escaping while `]` and `\` are written as `\]` and `\\`.
//! The canonical rendering orders predicates by key name, so two paths that
//! differ only in predicate order render identically.

use crate::error::{PathError, PathResult};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Key value that matches any value for its dimension.
pub const WILDCARD: &str = "*";

/// One step of a path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct PathElem {
    /// Schema node name of this step.
    pub name: String,
    /// Key predicate: key field name -> wire value.
    pub keys: BTreeMap<String, String>,
}

impl PathElem {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            keys: BTreeMap::new(),
        }
    }

    /// Add a key predicate entry.
    pub fn with_key(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.keys.insert(key.into(), value.into());
        self
    }

    /// Returns true if this step carries a key predicate.
    pub fn has_keys(&self) -> bool {
        !self.keys.is_empty()
    }

    /// Returns true if any predicate value is the wildcard.
    pub fn has_wildcard(&self) -> bool {
        self.keys.values().any(|v| v == WILDCARD)
    }
}

impl fmt::Display for PathElem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        for (key, value) in &self.keys {
            write!(f, "[{}={}]", key, escape_value(value))?;
        }
        Ok(())
    }
}

fn escape_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if c == '\\' || c == ']' {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// An address in the tree, relative to whatever node it is resolved from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Path {
    origin: Option<String>,
    elems: Vec<PathElem>,
}

impl Path {
    /// The empty path (addresses the node it is resolved from).
    pub fn root() -> Self {
        Self::default()
    }

    pub fn new(elems: Vec<PathElem>) -> Self {
        Self {
            origin: None,
            elems,
        }
    }

    /// Attach an origin (schema namespace selector).
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    pub fn origin(&self) -> Option<&str> {
        self.origin.as_deref()
    }

    pub fn elems(&self) -> &[PathElem] {
        &self.elems
    }

    pub fn len(&self) -> usize {
        self.elems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elems.is_empty()
    }

    pub fn push(&mut self, elem: PathElem) {
        self.elems.push(elem);
    }

    /// A copy of this path extended by one step.
    pub fn child(&self, elem: PathElem) -> Self {
        let mut path = self.clone();
        path.push(elem);
        path
    }

    /// Returns true if any step carries a wildcard key value.
    pub fn has_wildcards(&self) -> bool {
        self.elems.iter().any(PathElem::has_wildcard)
    }

    /// Parse the textual form.
    pub fn parse(s: &str) -> PathResult<Self> {
        Parser::new(s).parse()
    }

    /// Join `path` under `prefix`.
    ///
    /// The result keeps whichever origin is set; differing origins, or any
    /// empty element or key name in either half, are rejected.
    pub fn join(prefix: &Path, path: &Path) -> PathResult<Self> {
        let origin = match (&prefix.origin, &path.origin) {
            (Some(a), Some(b)) if a != b => {
                return Err(PathError::OriginMismatch {
                    prefix: a.clone(),
                    path: b.clone(),
                })
            }
            (Some(a), _) => Some(a.clone()),
            (None, b) => b.clone(),
        };
        let joined = Self {
            origin,
            elems: prefix
                .elems
                .iter()
                .chain(path.elems.iter())
                .cloned()
                .collect(),
        };
        joined.check_names()?;
        Ok(joined)
    }

    /// Canonical string form, used as a cache key.
    pub fn canonical(&self) -> String {
        self.to_string()
    }

    /// Returns true if `prefix` is an element-wise prefix of this path.
    pub fn starts_with(&self, prefix: &Path) -> bool {
        prefix.elems.len() <= self.elems.len()
            && prefix.elems.iter().zip(&self.elems).all(|(a, b)| a == b)
    }

    fn check_names(&self) -> PathResult<()> {
        for elem in &self.elems {
            if elem.name.is_empty() || elem.keys.keys().any(|k| k.is_empty()) {
                return Err(PathError::EmptyName(self.to_string()));
            }
        }
        Ok(())
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.elems.is_empty() {
            return write!(f, "/");
        }
        for elem in &self.elems {
            write!(f, "/{}", elem)?;
        }
        Ok(())
    }
}

impl FromStr for Path {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Path::parse(s)
    }
}

impl From<Vec<PathElem>> for Path {
    fn from(elems: Vec<PathElem>) -> Self {
        Path::new(elems)
    }
}

/// Character-level parser for the textual path form.
struct Parser<'a> {
    input: &'a str,
    chars: std::iter::Peekable<std::str::Chars<'a>>,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.chars().peekable(),
        }
    }

    fn error(&self, reason: impl Into<String>) -> PathError {
        PathError::syntax(self.input, reason)
    }

    fn parse(mut self) -> PathResult<Path> {
        if self.chars.peek() == Some(&'/') {
            self.chars.next();
        }
        let mut path = Path::root();
        if self.chars.peek().is_none() {
            return Ok(path);
        }
        loop {
            path.push(self.parse_elem()?);
            match self.chars.next() {
                None => break,
                Some('/') => continue,
                Some(c) => return Err(self.error(format!("unexpected character {:?}", c))),
            }
        }
        Ok(path)
    }

    fn parse_elem(&mut self) -> PathResult<PathElem> {
        let mut name = String::new();
        while let Some(&c) = self.chars.peek() {
            match c {
                '/' | '[' => break,
                ']' | '=' => return Err(self.error(format!("unexpected {:?} in name", c))),
                _ => {
                    name.push(c);
                    self.chars.next();
                }
            }
        }
        if name.is_empty() {
            return Err(PathError::EmptyName(self.input.to_string()));
        }
        let mut elem = PathElem::new(name);
        while self.chars.peek() == Some(&'[') {
            self.chars.next();
            let (key, value) = self.parse_predicate()?;
            if elem.keys.insert(key.clone(), value).is_some() {
                return Err(self.error(format!("duplicate key {:?}", key)));
            }
        }
        Ok(elem)
    }

    fn parse_predicate(&mut self) -> PathResult<(String, String)> {
        let mut key = String::new();
        loop {
            match self.chars.next() {
                Some('=') => break,
                Some(']') | None => return Err(self.error("key predicate without '='")),
                Some(c) => key.push(c),
            }
        }
        let key = key.trim().to_string();
        if key.is_empty() {
            return Err(PathError::EmptyName(self.input.to_string()));
        }
        let mut value = String::new();
        loop {
            match self.chars.next() {
                Some('\\') => match self.chars.next() {
                    Some(c) => value.push(c),
                    None => return Err(self.error("dangling escape")),
                },
                Some(']') => break,
                Some(c) => value.push(c),
                None => return Err(self.error("unterminated key predicate")),
            }
        }
        Ok((key, value))
    }
}
