use std::borrow::Borrow;
use std::fmt;
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{CloneEvalError, Result};

/// Corpus-relative identifier of a source snippet.
///
/// Ids are file names with the extension removed, e.g. `1113987_41_451.java`
/// becomes `1113987_41_451`. Ordering is plain lexicographic byte order, which
/// is what the sampler sorts by.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileId(String);

/// Inclusive line range encoded in an identifier's `_start_end` suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineSpan {
    pub start: u32,
    pub end: u32,
}

impl LineSpan {
    pub fn line_count(&self) -> u32 {
        self.end - self.start + 1
    }
}

fn line_suffix_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"_(\d+)_(\d+)$").expect("Invalid regex pattern"))
}

impl FileId {
    pub fn new(id: impl Into<String>) -> Self {
        FileId(id.into())
    }

    /// Build an id from a bare file name (`123_4_20.java` -> `123_4_20`).
    /// Names without an extension are kept as they are.
    pub fn from_file_name(name: &str) -> Self {
        let name = name.trim();
        match name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() && ext.chars().all(|c| c.is_ascii_alphabetic()) => {
                FileId(stem.to_string())
            }
            _ => FileId(name.to_string()),
        }
    }

    /// Build an id from a path, using its final component.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.file_name()
            .and_then(|n| n.to_str())
            .map(FileId::from_file_name)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse the trailing `_start_end` line numbers.
    pub fn line_span(&self) -> Result<LineSpan> {
        let caps = line_suffix_regex()
            .captures(&self.0)
            .ok_or_else(|| CloneEvalError::MalformedIdentifier(self.0.clone()))?;
        let parse = |i: usize| -> Result<u32> {
            caps[i]
                .parse::<u32>()
                .map_err(|_| CloneEvalError::MalformedIdentifier(self.0.clone()))
        };
        let start = parse(1)?;
        let end = parse(2)?;
        if end < start {
            return Err(CloneEvalError::MalformedIdentifier(format!(
                "{} (end line {} before start line {})",
                self.0, end, start
            )));
        }
        Ok(LineSpan { start, end })
    }

    /// Number of lines covered by the snippet, from the `_start_end` suffix.
    pub fn line_count(&self) -> Result<u32> {
        self.line_span().map(|span| span.line_count())
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for FileId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for FileId {
    fn from(s: &str) -> Self {
        FileId(s.to_string())
    }
}

impl From<String> for FileId {
    fn from(s: String) -> Self {
        FileId(s)
    }
}
