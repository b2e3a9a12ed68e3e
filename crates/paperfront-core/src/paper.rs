//! Paper records as returned by the ReadPaper listing, and the per-run title index.

use chrono::{DateTime, Local, TimeZone};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{PaperfrontError, Result};

/// `published_datetime` rendering, e.g. `2021年01月01日`.
pub const DATE_FORMAT: &str = "%Y年%m月%d日";

/// One paper entry from the remote library.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct PaperRecord {
    pub title: String,
    pub authors: Vec<String>,
    pub tags: Vec<String>,
    pub conference: Option<String>,
    pub journal: Option<String>,
    /// Milliseconds since the Unix epoch.
    pub publish_date_ms: i64,
    /// `pdfId`, used to build the annotation link.
    pub pdf_id: String,
    #[serde(default)]
    pub raw: Value,
}

impl PaperRecord {
    pub fn from_json(v: &Value) -> Result<Self> {
        let title = v
            .get("docName")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ToOwned::to_owned)
            .ok_or_else(|| PaperfrontError::InvalidRecord("missing docName".to_string()))?;

        let authors = v
            .get("authors")
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(author_name).collect::<Vec<_>>())
            .unwrap_or_default();

        let tags = v
            .get("classifyInfos")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|c| c.get("classifyName").and_then(Value::as_str))
                    .map(ToOwned::to_owned)
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();

        let publish_date_ms = v.get("publishDate").and_then(Value::as_i64).unwrap_or(0);

        let pdf_id = match v.get("pdfId") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => String::new(),
        };

        Ok(Self {
            title,
            authors,
            tags,
            conference: non_empty_str(v.get("conference")),
            journal: non_empty_str(v.get("journal")),
            publish_date_ms,
            pdf_id,
            raw: v.clone(),
        })
    }

    /// Conference if present, else journal, else empty.
    pub fn venue(&self) -> &str {
        self.conference
            .as_deref()
            .or(self.journal.as_deref())
            .unwrap_or_default()
    }

    pub fn annotate_url(&self, base: &str) -> String {
        format!("{base}?pdfId={}", self.pdf_id)
    }

    pub fn published_local(&self) -> String {
        format_publish_date(self.publish_date_ms, &Local)
    }
}

/// Render an epoch-millisecond timestamp as a calendar date in `tz`.
pub fn format_publish_date<Tz>(ms: i64, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    // Whole seconds, floored, like the web client does.
    let secs = ms.div_euclid(1000);
    match DateTime::from_timestamp(secs, 0) {
        Some(utc) => utc.with_timezone(tz).format(DATE_FORMAT).to_string(),
        None => String::new(),
    }
}

fn author_name(v: &Value) -> Option<String> {
    let name = match v {
        Value::String(s) => Some(s.as_str()),
        Value::Object(_) => v.get("name").and_then(Value::as_str),
        _ => None,
    };
    name.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned)
}

fn non_empty_str(v: Option<&Value>) -> Option<String> {
    v.and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned)
}

// ─── PaperIndex ───────────────────────────────────────────────────────────────

/// Title → record table, kept in listing order.
#[derive(Debug, Clone, Default)]
pub struct PaperIndex {
    entries: Vec<PaperRecord>,
}

impl PaperIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// A repeated title replaces the earlier record but keeps its position.
    pub fn insert(&mut self, record: PaperRecord) {
        match self.entries.iter_mut().find(|r| r.title == record.title) {
            Some(existing) => *existing = record,
            None => self.entries.push(record),
        }
    }

    #[cfg(test)]
    fn get(&self, title: &str) -> Option<&PaperRecord> {
        self.entries.iter().find(|r| r.title == title)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[cfg(test)]
    fn titles(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|r| r.title.as_str())
    }

    /// Every record whose title contains `name`, ignoring case, in listing order.
    pub fn matches<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a PaperRecord> + 'a {
        let needle = name.to_lowercase();
        self.entries
            .iter()
            .filter(move |r| r.title.to_lowercase().contains(&needle))
    }

    /// The first record whose title contains `name`, ignoring case.
    pub fn find_containing(&self, name: &str) -> Option<&PaperRecord> {
        self.matches(name).next()
    }
}

impl FromIterator<PaperRecord> for PaperIndex {
    fn from_iter<I: IntoIterator<Item = PaperRecord>>(iter: I) -> Self {
        let mut index = Self::new();
        for record in iter {
            index.insert(record);
        }
        index
    }
}
