use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Root application configuration, loaded from `~/.config/paperfront/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub readpaper: ReadPaperConfig,
    pub credentials: Credentials,
    pub notes: NotesConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadPaperConfig {
    pub base_url: String,
    pub org_id: String,
    pub app_id: String,
    /// Page that opens a paper's annotations; the record's `pdfId` is appended as a query.
    pub annotate_url: String,
}

/// Session material copied out of a logged-in browser. Sent verbatim with every request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Credentials {
    pub cookies: BTreeMap<String, String>,
    pub headers: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NotesConfig {
    /// Leave notes that already carry a `readpaper` link untouched.
    pub skip_enriched: bool,
}

// ─── Defaults ──────────────────────────────────────────────

impl Default for ReadPaperConfig {
    fn default() -> Self {
        Self {
            base_url: "https://readpaper.com".to_string(),
            org_id: "535992339879038976".to_string(),
            app_id: "aiKnowledge".to_string(),
            annotate_url: "https://readpaper.com/pdf-annotate/note".to_string(),
        }
    }
}

impl Credentials {
    /// Merge a raw `Cookie:` header value (`a=1; b=2`) into the cookie table.
    pub fn merge_cookie_header(&mut self, raw: &str) {
        for pair in raw.split(';') {
            let Some((name, value)) = pair.split_once('=') else {
                continue;
            };
            let name = name.trim();
            if name.is_empty() {
                continue;
            }
            self.cookies
                .insert(name.to_string(), value.trim().to_string());
        }
    }
}

// ─── Load / Save ───────────────────────────────────────────

impl AppConfig {
    /// Standard config file path: `~/.config/paperfront/config.toml`
    pub fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var("PAPERFRONT_CONFIG") {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("paperfront")
            .join("config.toml")
    }

    /// Load config from disk, falling back to defaults if file doesn't exist.
    /// `PAPERFRONT_COOKIE` is merged into the credentials afterwards.
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        let mut config = Self::load_from(&path)?;
        if let Ok(raw) = std::env::var("PAPERFRONT_COOKIE") {
            config.credentials.merge_cookie_header(&raw);
        }
        Ok(config)
    }

    /// Load config from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save config to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let toml_str = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_str)?;
        Ok(())
    }
}
