//! ReadPaper web API client: paper listing, tags, note details and annotations.

pub mod client;
pub mod error;
pub mod http;

pub use client::ReadPaperClient;
pub use error::{ReadPaperError, Result};
