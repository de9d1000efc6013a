//! Corpus: snippet identifiers and per-bucket file discovery.

mod file_id;
mod walker;

pub use file_id::{FileId, LineSpan};
pub use walker::Corpus;
