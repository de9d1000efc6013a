//! Sample files: one snippet path per line, in sample order.
//!
//! The first line may be a `# ` comment holding the stamp of the sampling
//! parameters the sample was drawn with. Replay compares it against the
//! current parameters.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::corpus::{Corpus, FileId};
use crate::error::{CloneEvalError, Result};

/// File name used for the sample of `seed` inside a sample directory.
pub fn sample_file_name(functionality: &str, seed: u64) -> String {
    format!("sample_{}_{}.txt", functionality, seed)
}

/// A sample read back from disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedSample {
    pub stamp: Option<String>,
    pub ids: Vec<FileId>,
}

/// Write `sample` to `path`, one absolute file path per line, after a
/// `# {stamp}` header.
///
/// Ids missing from `corpus` are written as bare ids so the file still
/// replays to the same sequence.
pub fn write_sample(path: &Path, sample: &[FileId], corpus: &Corpus, stamp: &str) -> Result<()> {
    if stamp.contains('\n') {
        return Err(CloneEvalError::InvalidInput("sample stamp must be a single line".to_string()));
    }
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let mut out = fs::File::create(path)?;
    writeln!(out, "# {}", stamp)?;
    for id in sample {
        match corpus.path_of(id) {
            Some(p) => writeln!(out, "{}", p.display())?,
            None => writeln!(out, "{}", id)?,
        }
    }
    out.flush()?;
    log::info!("Wrote sample of {} files to {}", sample.len(), path.display());
    Ok(())
}

/// Read a sample written by [`write_sample`] back into ids, in order.
pub fn read_sample(path: &Path) -> Result<PersistedSample> {
    let content = fs::read_to_string(path)?;
    let mut stamp = None;
    let mut ids = Vec::new();
    for (line_no, line) in content.lines().map(str::trim).enumerate() {
        if let Some(comment) = line.strip_prefix('#') {
            if line_no == 0 {
                stamp = Some(comment.trim().to_string());
            }
            continue;
        }
        if line.is_empty() {
            continue;
        }
        let id = FileId::from_path(&PathBuf::from(line)).ok_or_else(|| {
            CloneEvalError::Parse(format!("Bad sample entry in {}: {}", path.display(), line))
        })?;
        ids.push(id);
    }
    Ok(PersistedSample { stamp, ids })
}
