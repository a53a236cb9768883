//! Selection shapes — which reference fields to resolve, and how deep
//!
//! A shape is a tree of field names. It can be written as a GraphQL-style
//! selection (`trigger { resourceTemplate } actions`) or as a JSON object
//! (`{"trigger": {"resourceTemplate": {}}, "actions": true}`).

use flowlink_core::{default_selection, reference_fields, CollectionKind, Error, Result};
use serde_json::Value;
use std::collections::BTreeMap;
use std::iter::Peekable;
use std::str::CharIndices;

/// Deepest `{ }` nesting a selection string may use.
pub const MAX_SELECTION_DEPTH: usize = 32;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Shape {
    fields: BTreeMap<String, Shape>,
}

impl Shape {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builder: select `name` with sub-selection `sub`.
    pub fn field(mut self, name: impl Into<String>, sub: Shape) -> Self {
        self.insert(name.into(), sub);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Shape> {
        self.fields.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// What a record of `kind` resolves when reached through a reference.
    pub fn default_for(kind: CollectionKind) -> Self {
        let mut shape = Self::empty();
        for name in default_selection(kind) {
            if let Some(field) = reference_fields(kind).find(|f| f.name == *name) {
                shape.insert(field.name.to_string(), Self::default_for(field.target));
            }
        }
        shape
    }

    /// Every reference field of `kind`, each with its target's default shape.
    pub fn full(kind: CollectionKind) -> Self {
        let mut shape = Self::empty();
        for field in reference_fields(kind) {
            shape.insert(field.name.to_string(), Self::default_for(field.target));
        }
        shape
    }

    /// Union of two shapes.
    pub fn merge(&self, other: &Shape) -> Shape {
        let mut merged = self.clone();
        for (name, sub) in &other.fields {
            merged.insert(name.clone(), sub.clone());
        }
        merged
    }

    fn insert(&mut self, name: String, sub: Shape) {
        match self.fields.get_mut(&name) {
            Some(existing) => *existing = existing.merge(&sub),
            None => {
                self.fields.insert(name, sub);
            }
        }
    }

    /// Parse a selection string. Commas count as whitespace; an outer `{ }` is optional.
    pub fn parse(input: &str) -> Result<Self> {
        let mut parser = Parser {
            chars: input.char_indices().peekable(),
            depth: 0,
        };
        parser.skip_separators();
        let shape = if parser.eat('{') {
            parser.selection(true)?
        } else {
            parser.selection(false)?
        };
        parser.skip_separators();
        match parser.chars.next() {
            None => Ok(shape),
            Some((pos, c)) => Err(Error::invalid_shape(format!(
                "unexpected '{}' at {}",
                c, pos
            ))),
        }
    }

    /// Build from a request's `select` value.
    pub fn from_json(value: &Value) -> Result<Self> {
        match value {
            Value::String(s) => Self::parse(s),
            Value::Object(map) => {
                let mut shape = Self::empty();
                for (name, sub) in map {
                    let sub = match sub {
                        Value::Null | Value::Bool(true) => Self::empty(),
                        Value::Bool(false) => continue,
                        Value::Object(_) | Value::String(_) => Self::from_json(sub)?,
                        other => {
                            return Err(Error::invalid_shape(format!(
                                "field {:?} has unsupported selection {}",
                                name, other
                            )))
                        }
                    };
                    shape.insert(name.clone(), sub);
                }
                Ok(shape)
            }
            Value::Array(items) => {
                let mut shape = Self::empty();
                for item in items {
                    let Value::String(name) = item else {
                        return Err(Error::invalid_shape(format!(
                            "selection list entries must be field names, got {}",
                            item
                        )));
                    };
                    shape = shape.merge(&Self::parse(name)?);
                }
                Ok(shape)
            }
            other => Err(Error::invalid_shape(format!("unsupported selection {}", other))),
        }
    }
}

impl std::str::FromStr for Shape {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

struct Parser<'a> {
    chars: Peekable<CharIndices<'a>>,
    depth: usize,
}

impl Parser<'_> {
    fn selection(&mut self, nested: bool) -> Result<Shape> {
        if nested {
            self.depth += 1;
            if self.depth > MAX_SELECTION_DEPTH {
                return Err(Error::invalid_shape("selection nested too deeply"));
            }
        }
        let shape = self.fields(nested)?;
        if nested {
            self.depth -= 1;
        }
        Ok(shape)
    }

    fn fields(&mut self, nested: bool) -> Result<Shape> {
        let mut shape = Shape::empty();
        loop {
            self.skip_separators();
            match self.chars.peek().copied() {
                None if nested => return Err(Error::invalid_shape("unclosed '{'")),
                None => return Ok(shape),
                Some((_, '}')) if nested => {
                    self.chars.next();
                    return Ok(shape);
                }
                Some((_, c)) if is_name_start(c) => {
                    let name = self.name();
                    self.skip_separators();
                    let sub = if self.eat('{') {
                        self.selection(true)?
                    } else {
                        Shape::empty()
                    };
                    shape.insert(name, sub);
                }
                Some((pos, c)) => {
                    return Err(Error::invalid_shape(format!(
                        "unexpected '{}' at {}",
                        c, pos
                    )))
                }
            }
        }
    }

    fn name(&mut self) -> String {
        let mut name = String::new();
        while let Some((_, c)) = self.chars.peek().copied() {
            if !(c == '_' || c.is_ascii_alphanumeric()) {
                break;
            }
            name.push(c);
            self.chars.next();
        }
        name
    }

    fn eat(&mut self, expected: char) -> bool {
        if matches!(self.chars.peek(), Some((_, c)) if *c == expected) {
            self.chars.next();
            return true;
        }
        false
    }

    fn skip_separators(&mut self) {
        while matches!(self.chars.peek(), Some((_, c)) if c.is_whitespace() || *c == ',') {
            self.chars.next();
        }
    }
}

fn is_name_start(c: char) -> bool {
    c == '_' || c.is_ascii_alphabetic()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_nested_selection() {
        let shape = Shape::parse("trigger { resourceTemplate } actions, parents").unwrap();
        assert!(shape.get("trigger").unwrap().contains("resourceTemplate"));
        assert!(shape.get("actions").unwrap().is_empty());
        assert!(shape.contains("parents"));
        assert!(!shape.contains("responses"));
    }

    #[test]
    fn test_parse_outer_braces_and_plain_fields() {
        let shape = Shape::parse("{ _id name trigger { _id } }").unwrap();
        assert_eq!(shape.names().collect::<Vec<_>>(), vec!["_id", "name", "trigger"]);
    }

    #[test]
    fn test_parse_empty_is_empty_shape() {
        assert!(Shape::parse("").unwrap().is_empty());
        assert!(Shape::parse("  { } ").unwrap().is_empty());
    }

    #[test]
    fn test_parse_errors() {
        assert!(Shape::parse("trigger {").is_err());
        assert!(Shape::parse("trigger }").is_err());
        assert!(Shape::parse("actions [0]").is_err());
        assert!(Shape::parse("{ trigger } extra").is_err());
    }

    #[test]
    fn test_nesting_depth_is_bounded() {
        let nested = |depth: usize| format!("{}{}", "parents {".repeat(depth), "}".repeat(depth));
        assert!(Shape::parse(&nested(MAX_SELECTION_DEPTH)).is_ok());

        let err = Shape::parse(&nested(MAX_SELECTION_DEPTH + 1)).unwrap_err();
        assert!(err.to_string().contains("nested too deeply"));

        // Deep enough to exhaust a worker thread's stack if unbounded.
        let handle = std::thread::Builder::new()
            .stack_size(256 * 1024)
            .spawn(move || Shape::parse(&nested(20_000)).is_err())
            .unwrap();
        assert!(handle.join().unwrap());
    }

    #[test]
    fn test_duplicate_fields_merge() {
        let shape = Shape::parse("trigger trigger { resourceTemplate }").unwrap();
        assert!(shape.get("trigger").unwrap().contains("resourceTemplate"));
    }

    #[test]
    fn test_from_json_object_and_string() {
        let shape = Shape::from_json(&json!({
            "trigger": {"resourceTemplate": {}},
            "actions": true,
            "responses": false,
            "parents": "trigger"
        }))
        .unwrap();
        assert!(shape.get("trigger").unwrap().contains("resourceTemplate"));
        assert!(shape.contains("actions"));
        assert!(!shape.contains("responses"));
        assert!(shape.get("parents").unwrap().contains("trigger"));
        assert!(Shape::from_json(&json!(42)).is_err());
        assert!(Shape::from_json(&json!({"trigger": 1})).is_err());
    }

    #[test]
    fn test_from_json_list() {
        let shape = Shape::from_json(&json!(["trigger", "actions { resourceTemplate }"])).unwrap();
        assert!(shape.contains("trigger"));
        assert!(shape.get("actions").unwrap().contains("resourceTemplate"));
        assert!(Shape::from_json(&json!([1])).is_err());
    }

    #[test]
    fn test_defaults_and_full() {
        let trigger = Shape::default_for(CollectionKind::Trigger);
        assert!(trigger.contains("resourceTemplate"));
        assert!(Shape::default_for(CollectionKind::Node).is_empty());

        let full = Shape::full(CollectionKind::Node);
        let names: Vec<_> = full.names().collect();
        assert_eq!(names, vec!["actions", "parents", "postActions", "responses", "trigger"]);
        assert!(full.get("actions").unwrap().contains("resourceTemplate"));
        assert!(full.get("parents").unwrap().is_empty());
    }
}
