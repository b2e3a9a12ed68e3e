//! Inject paper metadata into a note's frontmatter.

use std::path::Path;

use async_trait::async_trait;
use serde_yaml::Value;
use tracing::{debug, info, warn};

use crate::config::{AppConfig, NotesConfig};
use crate::error::{PaperfrontError, Result};
use crate::frontmatter::NoteDocument;
use crate::paper::{PaperIndex, PaperRecord};

/// `authors` keeps at most this many names.
pub const MAX_AUTHORS: usize = 3;

/// Source of the full paper listing.
#[async_trait]
pub trait PaperCatalog: Send + Sync {
    async fn fetch_all_papers(&self) -> Result<Vec<PaperRecord>>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    Updated { title: String },
    /// The note already carried a `readpaper` link and `skip_enriched` is on.
    Skipped,
}

pub struct NoteUpdater<C> {
    catalog: C,
    notes: NotesConfig,
    annotate_url: String,
    /// Filled by the first lookup; never refreshed for the lifetime of the updater.
    index: Option<PaperIndex>,
}

impl<C: PaperCatalog> NoteUpdater<C> {
    pub fn new(catalog: C, config: &AppConfig) -> Self {
        Self {
            catalog,
            notes: config.notes.clone(),
            annotate_url: config.readpaper.annotate_url.clone(),
            index: None,
        }
    }

    #[cfg(test)]
    fn catalog(&self) -> &C {
        &self.catalog
    }

    /// The full listing, fetched on first use only.
    pub async fn paper_index(&mut self) -> Result<&PaperIndex> {
        if self.index.is_none() {
            let records = self.catalog.fetch_all_papers().await?;
            let index: PaperIndex = records.into_iter().collect();
            info!(papers = index.len(), "fetched paper listing");
            self.index = Some(index);
        }
        Ok(self.index.get_or_insert_with(PaperIndex::new))
    }

    /// Look up the first paper whose title contains `name`, ignoring case.
    pub async fn find_paper(&mut self, name: &str) -> Result<PaperRecord> {
        let index = self.paper_index().await?;
        let mut hits = index.matches(name);
        let Some(first) = hits.next() else {
            return Err(PaperfrontError::PaperNotFound(name.to_string()));
        };
        let others = hits.count();
        if others > 0 {
            warn!(
                search = name,
                chosen = %first.title,
                candidates = others + 1,
                "several papers match; using the first in listing order"
            );
        }
        Ok(first.clone())
    }

    /// Rewrite the note at `path` with the matched paper's metadata.
    ///
    /// Nothing is written unless a paper matches.
    pub async fn update_file(&mut self, path: &Path) -> Result<UpdateOutcome> {
        let mut doc = NoteDocument::load(path)?;

        if self.notes.skip_enriched && doc.contains_key("readpaper") {
            debug!(path = %path.display(), "note already enriched");
            return Ok(UpdateOutcome::Skipped);
        }

        let name = search_name(&doc, path)?;
        debug!(search = %name, "looking up paper");
        let record = self.find_paper(&name).await?;

        self.apply(&mut doc, &record);
        doc.write(path)?;
        info!(path = %path.display(), title = %record.title, "note updated");

        Ok(UpdateOutcome::Updated {
            title: record.title,
        })
    }

    /// Overlay `record`'s fields onto `doc`. Existing tags are kept alongside the new ones.
    pub fn apply(&self, doc: &mut NoteDocument, record: &PaperRecord) {
        let tags = if doc.contains_key("tags") {
            merge_tags(&record.tags, &doc.string_list("tags"))
        } else {
            merge_tags(&record.tags, &[])
        };

        let authors: Vec<Value> = record
            .authors
            .iter()
            .take(MAX_AUTHORS)
            .map(|a| Value::from(a.as_str()))
            .collect();

        doc.set("aliases", record.title.as_str());
        doc.set("readpaper", record.annotate_url(&self.annotate_url));
        doc.set("authors", Value::Sequence(authors));
        doc.set(
            "tags",
            Value::Sequence(tags.into_iter().map(Value::from).collect()),
        );
        doc.set("published_on", record.venue());
        doc.set("published_datetime", record.published_local());
    }
}

/// `aliases` from the frontmatter if present, else the file stem.
pub fn search_name(doc: &NoteDocument, path: &Path) -> Result<String> {
    if let Some(alias) = doc.first_string("aliases") {
        return Ok(alias);
    }
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned)
        .ok_or_else(|| PaperfrontError::InvalidPath(path.display().to_string()))
}

/// Union of `fresh` and `existing`, `fresh` first, without duplicates.
pub fn merge_tags(fresh: &[String], existing: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(fresh.len() + existing.len());
    for tag in fresh.iter().chain(existing) {
        if !out.contains(tag) {
            out.push(tag.clone());
        }
    }
    out
}
