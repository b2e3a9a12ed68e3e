pub mod config;
pub mod error;
pub mod frontmatter;
pub mod paper;
pub mod updater;

pub use config::{AppConfig, Credentials, NotesConfig, ReadPaperConfig};
pub use error::{ExitCode, PaperfrontError, Result};
pub use frontmatter::NoteDocument;
pub use paper::{DATE_FORMAT, PaperIndex, PaperRecord, format_publish_date};
pub use updater::{MAX_AUTHORS, NoteUpdater, PaperCatalog, UpdateOutcome};
