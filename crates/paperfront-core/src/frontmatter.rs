//! Split a note into its YAML frontmatter and body, and stitch them back together.
//!
//! The block must open on the very first line with `---` (a leading byte-order mark is
//! allowed and dropped on write) and close on the next line that
//! is exactly `---`. Anything else, including YAML that does not parse to a mapping, leaves
//! the whole file as body with empty frontmatter.

use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_yaml::{Mapping, Value};
use tracing::warn;

use crate::error::Result;

static FRONTMATTER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?ms)\A\x{FEFF}?---\r?\n(.*?)^---\r?$\n?").expect("valid regex"));

const DELIMITER: &str = "---\n";

/// A note file: ordered frontmatter mapping plus the untouched body text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NoteDocument {
    pub frontmatter: Mapping,
    pub body: String,
}

impl NoteDocument {
    pub fn new(frontmatter: Mapping, body: impl Into<String>) -> Self {
        Self {
            frontmatter,
            body: body.into(),
        }
    }

    pub fn parse(content: &str) -> Self {
        let Some(caps) = FRONTMATTER_RE.captures(content) else {
            return Self::new(Mapping::new(), content);
        };
        let block = caps.get(1).map_or("", |m| m.as_str());
        let end = caps.get(0).map_or(0, |m| m.end());
        if block.trim().is_empty() {
            return Self::new(Mapping::new(), &content[end..]);
        }

        match serde_yaml::from_str::<Value>(block) {
            Ok(Value::Mapping(map)) => Self::new(map, &content[end..]),
            Ok(Value::Null) => Self::new(Mapping::new(), &content[end..]),
            Ok(other) => {
                warn!(kind = value_kind(&other), "frontmatter is not a mapping; treating file as body");
                Self::new(Mapping::new(), content)
            }
            Err(e) => {
                warn!(error = %e, "malformed frontmatter; treating file as body");
                Self::new(Mapping::new(), content)
            }
        }
    }

    /// Read `path`, or start empty if it does not exist yet.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Ok(Self::parse(&content))
    }

    pub fn render(&self) -> Result<String> {
        let mut out = String::from(DELIMITER);
        if !self.frontmatter.is_empty() {
            out.push_str(&serde_yaml::to_string(&self.frontmatter)?);
        }
        out.push_str(DELIMITER);
        out.push_str(&self.body);
        Ok(out)
    }

    /// Overwrites `path` in place.
    pub fn write(&self, path: &Path) -> Result<()> {
        let rendered = self.render()?;
        std::fs::write(path, rendered)?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.frontmatter.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.frontmatter.contains_key(key)
    }

    /// Replaces an existing value in place, otherwise appends.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.frontmatter
            .insert(Value::String(key.to_string()), value.into());
    }

    /// A field that may be written as a scalar or as a list, flattened to strings.
    pub fn string_list(&self, key: &str) -> Vec<String> {
        match self.get(key) {
            Some(Value::Sequence(items)) => items.iter().filter_map(scalar_string).collect(),
            Some(v) => scalar_string(v).into_iter().collect(),
            None => Vec::new(),
        }
    }

    /// First non-empty string of a scalar-or-list field.
    pub fn first_string(&self, key: &str) -> Option<String> {
        self.string_list(key)
            .into_iter()
            .map(|s| s.trim().to_string())
            .find(|s| !s.is_empty())
    }
}

fn scalar_string(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn value_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged",
    }
}
